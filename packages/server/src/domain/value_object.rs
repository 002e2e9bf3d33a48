//! Value Object 定義
//!
//! 外部から受け取った生の文字列はすべてここで検証し、ドメイン層では
//! 型付きの識別子のみを扱います。

use uuid::Uuid;

use super::error::ValueObjectError;

/// 識別子の最大長（文字数）
const MAX_ID_LENGTH: usize = 64;

/// 表示名の最大長（文字数）
const MAX_DISPLAY_NAME_LENGTH: usize = 128;

fn validate_identifier(value: &str) -> Result<(), ValueObjectError> {
    if value.trim().is_empty() {
        return Err(ValueObjectError::Empty);
    }
    if value.chars().count() > MAX_ID_LENGTH {
        return Err(ValueObjectError::TooLong(MAX_ID_LENGTH));
    }
    Ok(())
}

/// ユーザー ID
///
/// CRUD 層（外部）が発行した永続的なユーザー識別子。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_identifier(&value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// 接続 ID
///
/// トランスポートレベルの接続（タブ・デバイス）1 本ごとに発行される一意な識別子。
/// 接続の寿命と同じ寿命を持ち、再利用されない。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// 新しい接続 ID を生成（UUID v4）
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_identifier(&value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 会話 ID
///
/// 永続化層（外部）が管理する会話の識別子。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_identifier(&value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// 表示名
///
/// タイピングインジケーターに表示するユーザー名。クライアントから
/// シグナルごとに送られてくるため、永続的な一意性は持たない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::Empty);
        }
        if value.chars().count() > MAX_DISPLAY_NAME_LENGTH {
            return Err(ValueObjectError::TooLong(MAX_DISPLAY_NAME_LENGTH));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
