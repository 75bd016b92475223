//! View Commands - 报告视图操作

use crate::application::presentation::ViewId;

/// 重试命令：从第 1 次尝试重新开始新会话
#[derive(Debug, Clone)]
pub struct RetryPollCommand {
    pub view_id: ViewId,
}

/// 关闭视图命令
#[derive(Debug, Clone)]
pub struct CloseViewCommand {
    pub view_id: ViewId,
}

/// 关闭视图响应
#[derive(Debug, Clone)]
pub struct CloseViewResponse {
    pub view_id: ViewId,
}
