//! UseCase: 参加者リスト変更によるルーム再導出
//!
//! 参加者の追加・削除を行った呼び出し元は、必ずこの通知を発行する
//! 必要がある（発行されない限りメンバーシップは次回再接続まで古いまま
//! になる。これはこの設計の前提条件）。

use std::sync::Arc;

use crate::domain::{ConnectionId, ConversationId, ConversationRepository, RepositoryError};

use super::{SharedConnectionRegistry, SharedRoomDirectory};

/// ルーム再導出のユースケース
pub struct MembershipChangedUseCase {
    registry: SharedConnectionRegistry,
    rooms: SharedRoomDirectory,
    /// Repository（永続化層の抽象化）
    repository: Arc<dyn ConversationRepository>,
}

impl MembershipChangedUseCase {
    pub fn new(
        registry: SharedConnectionRegistry,
        rooms: SharedRoomDirectory,
        repository: Arc<dyn ConversationRepository>,
    ) -> Self {
        Self {
            registry,
            rooms,
            repository,
        }
    }

    /// 会話のルームメンバーシップを永続化層の参加者リストから再導出する
    ///
    /// 会話が存在しなくなっていた場合はルームを削除する。
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - 再導出後のメンバー接続数
    /// * `Err(RepositoryError)` - 参加者リストの取得失敗（ルームは現状維持）
    pub async fn execute(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<usize, RepositoryError> {
        let conversation = self.repository.find_conversation(conversation_id).await?;

        let members: Vec<ConnectionId> = match conversation {
            Some(conversation) => {
                let registry = self.registry.lock().await;
                conversation
                    .participant_ids
                    .iter()
                    .flat_map(|user_id| registry.connections_of(user_id))
                    .collect()
            }
            None => {
                tracing::info!(
                    "Conversation '{}' no longer exists, removing its room",
                    conversation_id.as_str()
                );
                Vec::new()
            }
        };

        let member_count = members.len();
        {
            let mut rooms = self.rooms.lock().await;
            rooms.replace_room(conversation_id.clone(), members);
        }
        Ok(member_count)
    }
}
