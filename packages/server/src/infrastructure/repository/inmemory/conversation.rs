//! InMemory Conversation Repository 実装
//!
//! ドメイン層が定義する ConversationRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! ## 技術的負債
//!
//! 本番では会話メタデータと既読マークは外部 DB（チャット本体のストレージ）
//! に置かれる想定で、この実装は開発・テスト用です。DBMS を実装する際は、
//! 以下の変換層が必要になります：
//!
//! ```text
//! DB Row/JSON → ConversationData (DTO) → Conversation (ドメインモデル)
//! ```

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Conversation, ConversationId, ConversationRepository, RepositoryError, UserId,
};

/// インメモリ Conversation Repository 実装
///
/// 会話メタデータと既読マークを保持し、ドメイン層の ConversationRepository
/// trait を実装します（依存性の逆転）。
pub struct InMemoryConversationRepository {
    /// 会話メタデータ
    conversations: Arc<Mutex<HashMap<ConversationId, Conversation>>>,
    /// 会話ごとの既読マーク
    seen_marks: Arc<Mutex<HashMap<ConversationId, HashSet<UserId>>>>,
}

impl InMemoryConversationRepository {
    /// 新しい InMemoryConversationRepository を作成
    pub fn new() -> Self {
        Self {
            conversations: Arc::new(Mutex::new(HashMap::new())),
            seen_marks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// 会話を登録または更新（シード・テスト用）
    pub async fn upsert_conversation(&self, conversation: Conversation) {
        let mut conversations = self.conversations.lock().await;
        conversations.insert(conversation.id.clone(), conversation);
    }

    /// 会話を削除（テスト用）
    pub async fn remove_conversation(&self, conversation_id: &ConversationId) {
        let mut conversations = self.conversations.lock().await;
        conversations.remove(conversation_id);
    }

    /// 会話を既読にしたユーザー一覧（テスト・検証用）
    pub async fn seen_by(&self, conversation_id: &ConversationId) -> HashSet<UserId> {
        let seen_marks = self.seen_marks.lock().await;
        seen_marks.get(conversation_id).cloned().unwrap_or_default()
    }
}

impl Default for InMemoryConversationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn conversations_containing(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        let conversations = self.conversations.lock().await;
        Ok(conversations
            .values()
            .filter(|conversation| conversation.has_participant(user_id))
            .cloned()
            .collect())
    }

    async fn find_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError> {
        let conversations = self.conversations.lock().await;
        Ok(conversations.get(conversation_id).cloned())
    }

    async fn mark_conversation_seen(
        &self,
        conversation_id: &ConversationId,
        user_id: &UserId,
    ) -> Result<(), RepositoryError> {
        {
            let conversations = self.conversations.lock().await;
            if !conversations.contains_key(conversation_id) {
                return Err(RepositoryError::ConversationNotFound(
                    conversation_id.as_str().to_string(),
                ));
            }
        }

        let mut seen_marks = self.seen_marks.lock().await;
        seen_marks
            .entry(conversation_id.clone())
            .or_default()
            .insert(user_id.clone());
        Ok(())
    }
}
