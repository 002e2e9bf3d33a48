//! WebSocket ワイヤフォーマット定義
//!
//! ## 責務
//!
//! - クライアント → サーバーのシグナル（`ClientSignal`）のデシリアライズ
//! - サーバー → クライアントのイベントのシリアライズ
//!
//! ## ワイヤ規約
//!
//! 全メッセージは JSON テキストフレーム。`type` フィールドは kebab-case、
//! その他のフィールドは camelCase。不正なフレームは警告ログを残して無視する
//! （デシリアライズの失敗は UI 層で処理）。

use serde::{Deserialize, Serialize};

/// クライアントから受信するシグナル
///
/// ユーザー ID はフレーム内のものではなく接続時に確立したものを信頼するのが
/// 原則だが、ワイヤ互換のためフィールド自体は受け取る（UI 層で上書き）。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientSignal {
    /// 会話をフォアグラウンドで開いた
    OpenChat { conversation_id: String },
    /// 会話を閉じた（一覧画面に戻った等）
    CloseChat,
    /// 入力開始
    TypingStart {
        conversation_id: String,
        user_id: String,
        user_name: String,
    },
    /// 入力終了
    TypingStop {
        conversation_id: String,
        user_id: String,
    },
    /// 既読マーク
    MarkSeen {
        conversation_id: String,
        user_id: String,
    },
}

/// サーバーから送信するイベントの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    OnlineUsers,
    NewMessage,
    TypingStart,
    TypingStop,
    SeenUpdate,
}

/// online-users イベント（全量ブロードキャスト）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineUsersEvent {
    pub r#type: EventType,
    pub user_ids: Vec<String>,
}

impl OnlineUsersEvent {
    pub fn new(user_ids: Vec<String>) -> Self {
        Self {
            r#type: EventType::OnlineUsers,
            user_ids,
        }
    }
}

/// new-message イベント
///
/// メッセージ本体は REST 層が永続化済みの不透明な JSON として中継する。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessageEvent {
    pub r#type: EventType,
    pub conversation_id: String,
    pub message: serde_json::Value,
}

impl NewMessageEvent {
    pub fn new(conversation_id: String, message: serde_json::Value) -> Self {
        Self {
            r#type: EventType::NewMessage,
            conversation_id,
            message,
        }
    }
}

/// typing-start イベント
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingStartEvent {
    pub r#type: EventType,
    pub conversation_id: String,
    pub user_id: String,
    pub user_name: String,
}

impl TypingStartEvent {
    pub fn new(conversation_id: String, user_id: String, user_name: String) -> Self {
        Self {
            r#type: EventType::TypingStart,
            conversation_id,
            user_id,
            user_name,
        }
    }
}

/// typing-stop イベント
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingStopEvent {
    pub r#type: EventType,
    pub conversation_id: String,
    pub user_id: String,
}

impl TypingStopEvent {
    pub fn new(conversation_id: String, user_id: String) -> Self {
        Self {
            r#type: EventType::TypingStop,
            conversation_id,
            user_id,
        }
    }
}

/// seen-update イベント
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeenUpdateEvent {
    pub r#type: EventType,
    pub conversation_id: String,
    pub user_id: String,
}

impl SeenUpdateEvent {
    pub fn new(conversation_id: String, user_id: String) -> Self {
        Self {
            r#type: EventType::SeenUpdate,
            conversation_id,
            user_id,
        }
    }
}
