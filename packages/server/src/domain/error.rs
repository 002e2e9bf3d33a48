//! ドメイン層のエラー定義

use thiserror::Error;

/// Value Object 生成時の検証エラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValueObjectError {
    #[error("value must not be empty")]
    Empty,
    #[error("value exceeds maximum length of {0} characters")]
    TooLong(usize),
}

/// 永続化層（外部コラボレーター）へのアクセスエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// ストレージに到達できない（一時的な障害）
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// 会話が存在しない
    #[error("conversation not found: {0}")]
    ConversationNotFound(String),
}

/// メッセージ送信エラー
///
/// ブロードキャストは fire-and-forget のため、このエラーは単一接続への
/// push (`push_to`) でのみ呼び出し元に返される。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessagePushError {
    #[error("connection not found: {0}")]
    ConnectionNotFound(String),
    #[error("failed to push message: {0}")]
    PushFailed(String),
}
