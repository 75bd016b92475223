//! Assessment Commands - 答卷提交与结果监听

use crate::application::presentation::ViewId;
use crate::domain::analysis::ResultId;
use crate::domain::assessment::AssessmentSubmission;

/// 提交答卷命令，成功后在视图上开启轮询
///
/// `view_id` 为空时创建新视图；指向已有视图时，旧会话被取代。
#[derive(Debug, Clone)]
pub struct SubmitAssessmentCommand {
    pub view_id: Option<ViewId>,
    pub submission: AssessmentSubmission,
}

/// 监听已知结果标识的命令（不提交）
#[derive(Debug, Clone)]
pub struct WatchResultCommand {
    pub view_id: Option<ViewId>,
    pub result_id: ResultId,
}

/// 会话开启响应
#[derive(Debug, Clone)]
pub struct SessionStartedResponse {
    pub view_id: ViewId,
    pub result_id: ResultId,
    pub generation: u64,
    pub max_attempts: u32,
}
