//! UseCase: 接続処理
//!
//! トランスポートレベルの接続が確立したときの一連の処理：
//! 接続の登録、所属する会話ルームへの参加。presence ブロードキャストは
//! 呼び出し元（UI 層）が `PresenceBroadcastUseCase` で行う。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, ConversationId, ConversationRepository, MessagePusher, PusherChannel, UserId,
};

use super::{SharedConnectionRegistry, SharedRoomDirectory};

/// 接続処理の結果
#[derive(Debug)]
pub struct ConnectOutcome {
    /// ユーザーがオフライン → オンラインに遷移したか
    pub came_online: bool,
    /// 参加した会話ルームの一覧
    pub joined_conversations: Vec<ConversationId>,
}

/// 接続処理のユースケース
pub struct ConnectUseCase {
    registry: SharedConnectionRegistry,
    rooms: SharedRoomDirectory,
    /// Repository（永続化層の抽象化）
    repository: Arc<dyn ConversationRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectUseCase {
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

    /// 接続処理を実行
    ///
    /// 1. MessagePusher に送信チャンネルを登録
    /// 2. 接続レジストリに接続を登録
    /// 3. 永続化層からユーザーの会話一覧を取得し、各ルームに参加
    ///
    /// 会話一覧の取得に失敗した場合はログに残し、ルームなしで接続を
    /// 継続する（致命的ではない。再接続か membership-changed 通知で
    /// 自己回復する）。
    pub async fn execute(
        &self,
        user_id: UserId,
        connection_id: ConnectionId,
        sender: PusherChannel,
    ) -> ConnectOutcome {
        self.message_pusher
            .register_connection(connection_id.clone(), sender)
            .await;

        let came_online = {
            let mut registry = self.registry.lock().await;
            registry.register(user_id.clone(), connection_id.clone())
        };

        let joined_conversations = match self.repository.conversations_containing(&user_id).await {
            Ok(conversations) => {
                let mut rooms = self.rooms.lock().await;
                conversations
                    .into_iter()
                    .map(|conversation| {
                        rooms.join(conversation.id.clone(), connection_id.clone());
                        conversation.id
                    })
                    .collect()
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to fetch conversations for user '{}', joining no rooms: {}",
                    user_id.as_str(),
                    e
                );
                Vec::new()
            }
        };

        ConnectOutcome {
            came_online,
            joined_conversations,
        }
    }
}
