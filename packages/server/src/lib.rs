//! Realtime presence & message fan-out server.
//!
//! ## レイヤー構成
//!
//! - `domain`: 値オブジェクト、エンティティ、Repository / MessagePusher trait
//! - `usecase`: 1 操作 1 構造体のユースケース
//! - `infrastructure`: trait の具体実装と DTO
//! - `ui`: axum のルーティングとハンドラー

pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
