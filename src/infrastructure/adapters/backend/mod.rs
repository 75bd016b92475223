//! Backend Adapter - 测评后端 HTTP 客户端实现

mod fake_backend_client;
mod http_backend_client;

pub use fake_backend_client::{FakeBackendClient, FakeBackendClientConfig};
pub use http_backend_client::*;
