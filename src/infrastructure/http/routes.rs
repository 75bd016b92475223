//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                              GET   存活检查
//! - /api/assessment/submit                 POST  提交答卷并开启轮询
//! - /api/assessment/watch                  POST  监听已知结果标识
//! - /api/view/{view_id}                    GET   视图快照
//! - /api/view/retry                        POST  重新开始轮询
//! - /api/view/close                        POST  关闭视图（取消轮询）
//! - /api/survey/model?code=                GET   题目目录
//! - /api/backend/status                    GET   后端健康与 AI 状态
//! - /api/analysis/{user_id}/history        GET   分析历史
//! - /api/analysis/{user_id}/summary        GET   分析摘要
//! - /ws/view/{view_id}                     WS    视图状态事件

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route("/ws/view/:view_id", get(handlers::websocket_handler))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/assessment", assessment_routes())
        .nest("/view", view_routes())
        .route("/survey/model", get(handlers::survey_model))
        .route("/backend/status", get(handlers::backend_status))
        .nest("/analysis", analysis_routes())
}

/// Assessment 路由
fn assessment_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/submit", post(handlers::submit_assessment))
        .route("/watch", post(handlers::watch_result))
}

/// View 路由
fn view_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/retry", post(handlers::retry_view))
        .route("/close", post(handlers::close_view))
        .route("/:view_id", get(handlers::get_view))
}

/// Analysis 路由
fn analysis_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/:user_id/history", get(handlers::analysis_history))
        .route("/:user_id/summary", get(handlers::analysis_summary))
}
