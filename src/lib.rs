//! NeuroSnap - 心理测评前端服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Assessment Context: 量表与答卷
//! - Analysis Context: 分析结果、后端响应信封
//!
//! 应用层 (application/):
//! - Ports: 端口定义（BackendApi, ViewRegistry, ViewEventSink）
//! - Submission: 提交答卷并提取结果标识
//! - Polling: 分阶段抖动轮询分析结果
//! - Presentation: 报告视图与过期会话抑制
//! - Commands / Queries: CQRS 处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + WebSocket
//! - Adapters: 测评后端 HTTP 客户端、离线假后端
//! - Memory: ViewRegistry 内存实现
//! - Worker: ViewSweeper 空闲视图清理
//! - Events: WebSocket 事件发布

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
