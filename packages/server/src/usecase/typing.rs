//! UseCase: タイピングインジケーター
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - TypingUseCase::start() / stop() メソッド
//! - タイピング状態の更新とブロードキャスト対象の選定
//!
//! ### なぜこのテストが必要か
//! - 入力中のユーザー自身の接続（全タブ）が対象から除外されることを保証
//! - stop の冪等性（エントリがなくてもブロードキャストは行う）を確認
//!
//! ### どのような状況を想定しているか
//! - 正常系: start → 他のメンバーにイベント、stop → エントリ削除
//! - エッジケース: 入力者が複数タブを持つ場合、ルームが存在しない場合

use std::sync::Arc;

use crate::domain::{ConnectionId, ConversationId, DisplayName, MessagePusher, UserId};

use super::{SharedConnectionRegistry, SharedRoomDirectory, SharedTypingBoard};

/// タイピングインジケーターのユースケース
pub struct TypingUseCase {
    registry: SharedConnectionRegistry,
    rooms: SharedRoomDirectory,
    typing: SharedTypingBoard,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl TypingUseCase {
    pub fn new(
        registry: SharedConnectionRegistry,
        rooms: SharedRoomDirectory,
        typing: SharedTypingBoard,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            registry,
            rooms,
            typing,
            message_pusher,
        }
    }

    /// 入力開始を記録し、ブロードキャスト対象を返す
    ///
    /// 対象は「ルームメンバー − 入力者自身の全接続」。再送（start の連打）は
    /// 冪等で、イベントの再送出以外の副作用はない。
    pub async fn start(
        &self,
        conversation_id: ConversationId,
        user_id: UserId,
        display_name: DisplayName,
    ) -> Vec<ConnectionId> {
        {
            let mut typing = self.typing.lock().await;
            typing.start(conversation_id.clone(), user_id.clone(), display_name);
        }
        self.targets_excluding(&conversation_id, &user_id).await
    }

    /// 入力終了を記録し、ブロードキャスト対象を返す
    ///
    /// エントリが存在しなくても対象は返す（冪等 stop：クライアント側の
    /// 状態を確実に巻き戻すため、イベントは常にブロードキャストする）。
    pub async fn stop(
        &self,
        conversation_id: &ConversationId,
        user_id: &UserId,
    ) -> Vec<ConnectionId> {
        {
            let mut typing = self.typing.lock().await;
            typing.stop(conversation_id, user_id);
        }
        self.targets_excluding(conversation_id, user_id).await
    }

    /// タイピングイベントを対象にブロードキャスト
    pub async fn broadcast(&self, targets: Vec<ConnectionId>, payload: &str) {
        self.message_pusher.broadcast(targets, payload).await;
    }

    /// ルームメンバーから指定ユーザーの全接続を除いた対象一覧
    async fn targets_excluding(
        &self,
        conversation_id: &ConversationId,
        user_id: &UserId,
    ) -> Vec<ConnectionId> {
        let members = {
            let rooms = self.rooms.lock().await;
            rooms.members_of(conversation_id)
        };
        let exclude = {
            let registry = self.registry.lock().await;
            registry.connections_of(user_id)
        };
        members
            .into_iter()
            .filter(|connection_id| !exclude.contains(connection_id))
            .collect()
    }
}
