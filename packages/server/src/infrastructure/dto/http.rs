//! 内部 HTTP API のワイヤフォーマット定義
//!
//! REST 層（メッセージの永続化を担う外部サービス）からの通知と、
//! デバッグ用エンドポイントのレスポンスを定義する。

use serde::{Deserialize, Serialize};

/// POST /internal/messages のリクエスト
///
/// `message` は永続化済みメッセージの JSON 表現（不透明に中継される）。
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessageRequest {
    pub conversation_id: String,
    pub message: serde_json::Value,
}

/// POST /internal/membership-changed のリクエスト
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipChangedRequest {
    pub conversation_id: String,
}

/// POST /internal/messages のレスポンス
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessageResponse {
    /// new-message イベントの配送対象となった接続数
    pub delivered_to: usize,
}

/// POST /internal/membership-changed のレスポンス
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipChangedResponse {
    /// 再導出後のルームメンバー接続数
    pub member_count: usize,
}

/// GET /api/health のレスポンス
#[derive(Debug, Clone, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
}

/// GET /debug/presence のレスポンス
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceStateResponse {
    /// スナップショット取得時刻（RFC 3339、UTC）
    pub generated_at: String,
    pub online_user_ids: Vec<String>,
    pub rooms: Vec<RoomStateResponse>,
    pub typing: Vec<TypingStateResponse>,
}

/// ルームの状態（デバッグ用）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStateResponse {
    pub conversation_id: String,
    pub member_count: usize,
}

/// タイピングの状態（デバッグ用）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingStateResponse {
    pub conversation_id: String,
    pub user_ids: Vec<String>,
}
