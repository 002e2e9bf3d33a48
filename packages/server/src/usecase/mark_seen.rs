//! UseCase: 既読マーク
//!
//! 「会話 X を読んだ」というシグナルを受けて、永続化層に既読を書き込み、
//! 本人以外のルームメンバーへの seen-update ブロードキャスト対象を返す。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, ConversationId, ConversationRepository, MessagePusher, RepositoryError, UserId,
};

use super::{SharedConnectionRegistry, SharedRoomDirectory};

/// 既読マークのユースケース
pub struct MarkSeenUseCase {
    registry: SharedConnectionRegistry,
    rooms: SharedRoomDirectory,
    /// Repository（永続化層の抽象化）
    repository: Arc<dyn ConversationRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl MarkSeenUseCase {
    pub fn new(
        registry: SharedConnectionRegistry,
        rooms: SharedRoomDirectory,
        repository: Arc<dyn ConversationRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            registry,
            rooms,
            repository,
            message_pusher,
        }
    }

    /// 既読マークを実行
    ///
    /// 永続化層への書き込みが先。失敗した場合はエラーを返し、
    /// ブロードキャストは行わない（呼び出し元でログに残すだけ）。
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ConnectionId>)` - seen-update のブロードキャスト対象
    ///   （ルームメンバー − 本人の全接続）
    /// * `Err(RepositoryError)` - 既読の書き込み失敗
    pub async fn execute(
        &self,
        conversation_id: &ConversationId,
        user_id: &UserId,
    ) -> Result<Vec<ConnectionId>, RepositoryError> {
        self.repository
            .mark_conversation_seen(conversation_id, user_id)
            .await?;

        let members = {
            let rooms = self.rooms.lock().await;
            rooms.members_of(conversation_id)
        };
        let exclude = {
            let registry = self.registry.lock().await;
            registry.connections_of(user_id)
        };

        Ok(members
            .into_iter()
            .filter(|connection_id| !exclude.contains(connection_id))
            .collect())
    }

    /// seen-update イベントを対象にブロードキャスト
    pub async fn broadcast(&self, targets: Vec<ConnectionId>, payload: &str) {
        self.message_pusher.broadcast(targets, payload).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ConnectionRegistry, Conversation, RoomDirectory},
        infrastructure::{
            message_pusher::WebSocketMessagePusher, repository::InMemoryConversationRepository,
        },
    };
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    fn conv(id: &str) -> ConversationId {
        ConversationId::new(id.to_string()).unwrap()
    }

    fn create_test_message_pusher() -> Arc<WebSocketMessagePusher> {
        Arc::new(WebSocketMessagePusher::new(Arc::new(Mutex::new(
            HashMap::new(),
        ))))
    }

    #[tokio::test]
    async fn test_mark_seen_excludes_markers_own_connections() {
        // テスト項目: seen-update の対象から本人の全接続が除外される
        // given (前提条件):
        let registry: SharedConnectionRegistry = Arc::new(Mutex::new(ConnectionRegistry::new()));
        let rooms: SharedRoomDirectory = Arc::new(Mutex::new(RoomDirectory::new()));
        let repository = Arc::new(InMemoryConversationRepository::new());
        repository
            .upsert_conversation(Conversation::new(
                conv("c1"),
                vec![user("alice"), user("bob")],
            ))
            .await;

        let alice_tab1 = ConnectionId::generate();
        let alice_tab2 = ConnectionId::generate();
        let bob_conn = ConnectionId::generate();
        {
            let mut reg = registry.lock().await;
            reg.register(user("alice"), alice_tab1.clone());
            reg.register(user("alice"), alice_tab2.clone());
            reg.register(user("bob"), bob_conn.clone());
        }
        {
            let mut dir = rooms.lock().await;
            dir.join(conv("c1"), alice_tab1);
            dir.join(conv("c1"), alice_tab2);
            dir.join(conv("c1"), bob_conn.clone());
        }

        let usecase = MarkSeenUseCase::new(
            registry,
            rooms,
            repository.clone(),
            create_test_message_pusher(),
        );

        // when (操作):
        let result = usecase.execute(&conv("c1"), &user("alice")).await;

        // then (期待する結果):
        assert_eq!(result, Ok(vec![bob_conn]));
        // 既読が永続化層に書き込まれている
        assert!(repository.seen_by(&conv("c1")).await.contains(&user("alice")));
    }

    #[tokio::test]
    async fn test_storage_failure_prevents_broadcast_targets() {
        // テスト項目: 既読の書き込み失敗時はエラーが返り、対象は計算されない
        // given (前提条件):
        let registry: SharedConnectionRegistry = Arc::new(Mutex::new(ConnectionRegistry::new()));
        let rooms: SharedRoomDirectory = Arc::new(Mutex::new(RoomDirectory::new()));
        // 会話を登録しないことで ConversationNotFound を発生させる
        let repository = Arc::new(InMemoryConversationRepository::new());
        let usecase = MarkSeenUseCase::new(
            registry,
            rooms,
            repository,
            create_test_message_pusher(),
        );

        // when (操作):
        let result = usecase.execute(&conv("missing"), &user("alice")).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(RepositoryError::ConversationNotFound("missing".to_string()))
        );
    }
}
