//! UseCase: プレゼンス状態の取得（デバッグ用）
//!
//! `/debug/presence` エンドポイントのための読み取り専用スナップショット。

use std::sync::Arc;

use tsubame_shared::time::Clock;

use crate::domain::{ConversationId, UserId};

use super::{SharedConnectionRegistry, SharedRoomDirectory, SharedTypingBoard};

/// プレゼンス・ルーム・タイピングの読み取り専用スナップショット
#[derive(Debug)]
pub struct PresenceStateSnapshot {
    /// スナップショット取得時刻（UTC、Unix ミリ秒）
    pub generated_at_millis: i64,
    /// オンラインユーザー ID（辞書順）
    pub online_user_ids: Vec<UserId>,
    /// 会話 ID とルームメンバー接続数（会話 ID 順）
    pub rooms: Vec<(ConversationId, usize)>,
    /// 会話 ID と入力中ユーザー ID（会話 ID 順）
    pub typing: Vec<(ConversationId, Vec<UserId>)>,
}

/// プレゼンス状態取得のユースケース
pub struct GetPresenceStateUseCase {
    registry: SharedConnectionRegistry,
    rooms: SharedRoomDirectory,
    typing: SharedTypingBoard,
    clock: Arc<dyn Clock>,
}

impl GetPresenceStateUseCase {
    pub fn new(
        registry: SharedConnectionRegistry,
        rooms: SharedRoomDirectory,
        typing: SharedTypingBoard,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            rooms,
            typing,
            clock,
        }
    }

    pub async fn execute(&self) -> PresenceStateSnapshot {
        let online_user_ids = {
            let registry = self.registry.lock().await;
            registry.online_user_ids()
        };
        let rooms = {
            let rooms = self.rooms.lock().await;
            rooms.snapshot()
        };
        let typing = {
            let typing = self.typing.lock().await;
            typing.snapshot()
        };
        PresenceStateSnapshot {
            generated_at_millis: self.clock.now_millis(),
            online_user_ids,
            rooms,
            typing,
        }
    }
}
