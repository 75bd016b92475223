//! HTTP Handlers

mod assessment;
mod catalog;
mod ping;
mod view;
mod websocket;

pub use assessment::*;
pub use catalog::*;
pub use ping::*;
pub use view::*;
pub use websocket::*;
