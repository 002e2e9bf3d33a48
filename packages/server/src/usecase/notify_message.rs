//! UseCase: 新着メッセージの fan-out
//!
//! REST 層（外部）がメッセージを永続化した後に呼ばれるエントリポイント。
//! メッセージ本体はすでに永続化済みの不透明なペイロードとして扱い、
//! コアは配送対象の計算だけを行う。
//!
//! 送信者の他のタブも対象に含める（マルチタブ同期）。送信者自身のタブは
//! クライアント側でメッセージ ID により重複排除される。
//!
//! 会話をフォアグラウンドで開いているユーザーには即時既読を適用する：
//! 永続化層に既読を書き込み、他のメンバーへの seen-update を指示する。
//! open-chat シグナルは検証なしで受け付けるため、即時既読の対象は
//! 会話の参加者に限定する。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, ConversationId, ConversationRepository, MessagePusher, UserId,
};

use super::{SharedConnectionRegistry, SharedRoomDirectory};

/// 即時既読によって発生する seen-update ブロードキャストの指示
#[derive(Debug)]
pub struct SeenUpdate {
    pub user_id: UserId,
    /// ルームメンバー − 既読したユーザー自身の接続
    pub targets: Vec<ConnectionId>,
}

/// 新着メッセージ通知の結果
#[derive(Debug)]
pub struct NotifyMessageOutcome {
    /// new-message イベントの配送対象（ルームの全メンバー）
    pub message_targets: Vec<ConnectionId>,
    /// 即時既読の seen-update 指示
    pub seen_updates: Vec<SeenUpdate>,
}

/// 新着メッセージ fan-out のユースケース
pub struct NotifyMessageUseCase {
    registry: SharedConnectionRegistry,
    rooms: SharedRoomDirectory,
    /// Repository（永続化層の抽象化）
    repository: Arc<dyn ConversationRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl NotifyMessageUseCase {
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

    /// 配送対象と即時既読の指示を計算する
    ///
    /// 即時既読の書き込みに失敗した場合、そのユーザーの seen-update は
    /// スキップされる（ログのみ。メッセージ自体の配送は影響を受けない）。
    pub async fn execute(&self, conversation_id: &ConversationId) -> NotifyMessageOutcome {
        let message_targets = {
            let rooms = self.rooms.lock().await;
            rooms.members_of(conversation_id)
        };

        let mut viewers = {
            let registry = self.registry.lock().await;
            registry.users_viewing(conversation_id)
        };

        // 参加者以外が open-chat を送っていても既読は書き込まない
        if !viewers.is_empty() {
            match self.repository.find_conversation(conversation_id).await {
                Ok(Some(conversation)) => {
                    viewers.retain(|user_id| {
                        let is_participant = conversation.has_participant(user_id);
                        if !is_participant {
                            tracing::warn!(
                                "User '{}' is viewing conversation '{}' without being a participant, skipping seen mark",
                                user_id.as_str(),
                                conversation_id.as_str()
                            );
                        }
                        is_participant
                    });
                }
                Ok(None) => {
                    tracing::warn!(
                        "Conversation '{}' not found, skipping immediate seen marks",
                        conversation_id.as_str()
                    );
                    viewers.clear();
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to load conversation '{}' for immediate seen: {}",
                        conversation_id.as_str(),
                        e
                    );
                    viewers.clear();
                }
            }
        }

        let mut seen_updates = Vec::new();
        for user_id in viewers {
            if let Err(e) = self
                .repository
                .mark_conversation_seen(conversation_id, &user_id)
                .await
            {
                tracing::warn!(
                    "Failed to mark conversation '{}' seen for viewer '{}': {}",
                    conversation_id.as_str(),
                    user_id.as_str(),
                    e
                );
                continue;
            }
            let exclude = {
                let registry = self.registry.lock().await;
                registry.connections_of(&user_id)
            };
            let targets = message_targets
                .iter()
                .filter(|connection_id| !exclude.contains(connection_id))
                .cloned()
                .collect();
            seen_updates.push(SeenUpdate { user_id, targets });
        }

        NotifyMessageOutcome {
            message_targets,
            seen_updates,
        }
    }

    /// イベントを対象にブロードキャスト
    pub async fn broadcast(&self, targets: Vec<ConnectionId>, payload: &str) {
        self.message_pusher.broadcast(targets, payload).await;
    }
}
