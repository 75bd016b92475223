//! Assessment Context - 测评工具

use serde::{Deserialize, Serialize};

/// 测评工具
///
/// 每种工具在后端题库中有独立的模型代码，在提交结构中有独立的答案字段。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instrument {
    /// 五问法（开放问题）
    FiveQuestions,
    /// MBTI
    Mbti,
    /// 大五人格
    BigFive,
    /// DISC 行为风格
    Disc,
    /// 霍兰德职业兴趣
    Holland,
    /// 价值观与动机
    Values,
}

impl Instrument {
    /// 全部测评工具，按问卷向导中的顺序排列
    pub const ALL: [Instrument; 6] = [
        Instrument::FiveQuestions,
        Instrument::Mbti,
        Instrument::BigFive,
        Instrument::Disc,
        Instrument::Holland,
        Instrument::Values,
    ];

    /// 后端题库使用的模型代码（`/survey/model?code=`）
    pub fn model_code(&self) -> &'static str {
        match self {
            Instrument::FiveQuestions => "fiveq",
            Instrument::Mbti => "mbti",
            Instrument::BigFive => "big5",
            Instrument::Disc => "disc",
            Instrument::Holland => "holland",
            Instrument::Values => "motivation",
        }
    }

    pub fn from_model_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|instrument| instrument.model_code() == code)
    }

    /// 提交结构中对应的字段名
    pub fn payload_key(&self) -> &'static str {
        match self {
            Instrument::FiveQuestions => "fiveQuestions",
            Instrument::Mbti => "mbti",
            Instrument::BigFive => "bigFive",
            Instrument::Disc => "disc",
            Instrument::Holland => "holland",
            Instrument::Values => "values",
        }
    }
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.model_code())
    }
}
