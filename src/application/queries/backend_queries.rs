//! Backend Queries - 后端透传查询

use crate::domain::assessment::Instrument;

/// 获取某个测评工具的题目目录
#[derive(Debug, Clone)]
pub struct GetSurveyModel {
    pub instrument: Instrument,
}

/// 后端健康状态与 AI 服务状态
#[derive(Debug, Clone)]
pub struct GetBackendStatus;

/// 用户分析历史
#[derive(Debug, Clone)]
pub struct GetAnalysisHistory {
    pub user_id: String,
    pub limit: u32,
    pub offset: u32,
}

/// 用户分析摘要
#[derive(Debug, Clone)]
pub struct GetAnalysisSummary {
    pub user_id: String,
}
