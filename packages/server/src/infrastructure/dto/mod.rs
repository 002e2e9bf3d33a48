//! Data Transfer Objects (DTOs) for the presence service.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket message DTOs (client signals / server events)
//! - `http`: internal HTTP API DTOs

pub mod http;
pub mod websocket;
