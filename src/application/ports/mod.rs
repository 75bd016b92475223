//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod backend_api;
mod view_events;
mod view_registry;

pub use backend_api::{BackendApiPort, BackendError};
pub use view_events::ViewEventSink;
pub use view_registry::{ViewError, ViewRegistryPort};
