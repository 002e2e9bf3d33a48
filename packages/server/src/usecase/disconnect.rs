//! UseCase: 切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectUseCase::execute() メソッド
//! - 切断時のクリーンアップ（登録解除、ルームからの刈り取り、
//!   タイピングエントリの掃除）
//!
//! ### なぜこのテストが必要か
//! - 切断したユーザーが「入力中」のまま残らないことを保証
//! - ルームメンバーシップに死んだ接続が残らないことを保証
//! - 最後の接続かどうかでオフライン遷移が正しく判定されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系: 最後の接続の切断（オフライン遷移 + タイピング掃除）
//! - エッジケース: 複数タブのうち 1 本だけの切断
//! - 異常系: 未知の接続の切断（冪等な no-op）

use std::sync::Arc;

use crate::domain::{ConnectionId, ConversationId, MessagePusher, UserId};

use super::{SharedConnectionRegistry, SharedRoomDirectory, SharedTypingBoard};

/// 切断によって発生する stop-typing ブロードキャストの指示
#[derive(Debug)]
pub struct TypingStopNotice {
    pub conversation_id: ConversationId,
    /// 残っているルームメンバー（切断した本人の接続は既に刈り取られている）
    pub targets: Vec<ConnectionId>,
}

/// 切断処理の結果
#[derive(Debug)]
pub struct DisconnectOutcome {
    /// ユーザーの最後の接続が消えてオフラインに遷移したか
    pub went_offline: bool,
    /// 会話ごとの stop-typing ブロードキャスト指示
    pub typing_stops: Vec<TypingStopNotice>,
}

/// 切断処理のユースケース
pub struct DisconnectUseCase {
    registry: SharedConnectionRegistry,
    rooms: SharedRoomDirectory,
    typing: SharedTypingBoard,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectUseCase {
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

    /// 切断処理を実行
    ///
    /// 1. MessagePusher から送信チャンネルを登録解除
    /// 2. 接続レジストリから接続を解除（最後の接続ならアクティブチャットもクリア）
    /// 3. 全ルームから接続を刈り取る
    /// 4. 最後の接続だった場合、タイピングエントリを掃除し、
    ///    会話ごとの stop-typing ブロードキャスト指示を組み立てる
    ///
    /// presence ブロードキャストと stop イベントの送出は呼び出し元が行う。
    pub async fn execute(
        &self,
        user_id: &UserId,
        connection_id: &ConnectionId,
    ) -> DisconnectOutcome {
        self.message_pusher
            .unregister_connection(connection_id)
            .await;

        let went_offline = {
            let mut registry = self.registry.lock().await;
            registry.unregister(user_id, connection_id)
        };

        {
            let mut rooms = self.rooms.lock().await;
            rooms.prune_connection(connection_id);
        }

        let mut typing_stops = Vec::new();
        if went_offline {
            let cleared = {
                let mut typing = self.typing.lock().await;
                typing.clear_user(user_id)
            };
            if !cleared.is_empty() {
                let rooms = self.rooms.lock().await;
                for conversation_id in cleared {
                    typing_stops.push(TypingStopNotice {
                        targets: rooms.members_of(&conversation_id),
                        conversation_id,
                    });
                }
            }
        }

        DisconnectOutcome {
            went_offline,
            typing_stops,
        }
    }

    /// stop-typing イベントを残りのメンバーにブロードキャスト
    pub async fn broadcast(&self, targets: Vec<ConnectionId>, payload: &str) {
        self.message_pusher.broadcast(targets, payload).await;
    }
}
