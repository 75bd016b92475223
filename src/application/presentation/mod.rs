//! Presentation Adapter - 报告视图
//!
//! 把轮询器接到 UI：维护进度，终态映射为报告 / 空结果 / 超时 / 失败，
//! 并保证只有最新会话的状态能写入视图。

mod report_view;
mod view_state;

pub use report_view::{ReportView, ReportViewFactory, SessionHandle, ViewId, ViewSnapshot};
pub use view_state::{
    ViewState, MSG_EMPTY, MSG_FAILED, MSG_SUBMISSION_FAILED, MSG_TIMED_OUT,
};
