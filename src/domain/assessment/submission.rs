//! Assessment Context - 完整答卷

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::Instrument;

/// 单个测评工具的答案：题目代码 -> 答案
///
/// 答案形态随题型变化（单选 "1"、多选 ["1","3"]、打分 4、文本、排序 {"order": [...]}），
/// 因此保留为原始 JSON。
pub type AnswerMap = BTreeMap<String, Value>;

/// 答题人基本信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserInfo {
    pub name: String,
    pub gender: String,
    pub age: String,
    pub city: String,
    pub occupation: String,
    pub education: String,
    pub phone: String,
}

/// 完整答卷（`POST /answer/submit` 的请求体）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSubmission {
    #[serde(default)]
    pub user_info: UserInfo,
    #[serde(default)]
    pub five_questions: AnswerMap,
    #[serde(default)]
    pub mbti: AnswerMap,
    #[serde(default)]
    pub big_five: AnswerMap,
    #[serde(default)]
    pub disc: AnswerMap,
    #[serde(default)]
    pub holland: AnswerMap,
    #[serde(default)]
    pub values: AnswerMap,
}

impl AssessmentSubmission {
    /// 获取某个测评工具的答案
    pub fn answers(&self, instrument: Instrument) -> &AnswerMap {
        match instrument {
            Instrument::FiveQuestions => &self.five_questions,
            Instrument::Mbti => &self.mbti,
            Instrument::BigFive => &self.big_five,
            Instrument::Disc => &self.disc,
            Instrument::Holland => &self.holland,
            Instrument::Values => &self.values,
        }
    }

    /// 答案总数（仅用于日志）
    pub fn answer_count(&self) -> usize {
        Instrument::ALL
            .iter()
            .map(|instrument| self.answers(*instrument).len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_field_names() {
        let mut submission = AssessmentSubmission::default();
        submission.user_info.name = "张三".to_string();
        submission.big_five.insert("B1".to_string(), json!(4));
        submission.values.insert("V1".to_string(), json!({"order": [2, 1, 3]}));

        let value = serde_json::to_value(&submission).unwrap();
        assert_eq!(value["userInfo"]["name"], "张三");
        assert_eq!(value["bigFive"]["B1"], 4);
        assert_eq!(value["values"]["V1"]["order"][0], 2);
        for instrument in Instrument::ALL {
            assert!(value.get(instrument.payload_key()).is_some());
        }
    }

    #[test]
    fn test_partial_payload_deserializes() {
        let submission: AssessmentSubmission =
            serde_json::from_value(json!({"mbti": {"M1": "1", "M2": "2"}})).unwrap();
        assert_eq!(submission.answers(Instrument::Mbti).len(), 2);
        assert_eq!(submission.answer_count(), 2);
        assert!(submission.user_info.name.is_empty());
    }
}
