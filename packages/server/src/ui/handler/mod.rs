//! HTTP / WebSocket endpoint handlers.

mod http;
mod websocket;

pub use http::{debug_presence_state, health_check, notify_membership_changed, notify_new_message};
pub use websocket::websocket_handler;
