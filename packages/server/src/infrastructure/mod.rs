//! Infrastructure 層
//!
//! ドメイン層が定義する trait の具体的な実装と、プロトコル境界の DTO を持つ。
//!
//! - `message_pusher`: WebSocket 経由のメッセージ送信実装
//! - `repository`: 会話メタデータの永続化実装（インメモリ）
//! - `dto`: WebSocket / HTTP のワイヤフォーマット定義

pub mod dto;
pub mod message_pusher;
pub mod repository;
