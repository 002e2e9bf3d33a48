//! UseCase: プレゼンスの全量ブロードキャスト
//!
//! ユーザーのオンライン/オフライン遷移が起きるたびに、全接続へ
//! オンラインユーザーの完全なリストを配信する（差分配信ではない）。
//! 全量方式なのでイベントの取りこぼしがあっても次の配信で収束する。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, UserId};

use super::SharedConnectionRegistry;

/// プレゼンスのスナップショット
///
/// オンラインユーザーのリストと配信対象を同一ロック内で取得したもの。
/// 別々に取得するとリストと対象がずれる可能性がある。
#[derive(Debug)]
pub struct PresenceSnapshot {
    /// オンラインユーザー ID（辞書順）
    pub online_user_ids: Vec<UserId>,
    /// 全接続（全タブ）
    pub targets: Vec<ConnectionId>,
}

/// プレゼンスブロードキャストのユースケース
pub struct PresenceBroadcastUseCase {
    registry: SharedConnectionRegistry,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl PresenceBroadcastUseCase {
    pub fn new(registry: SharedConnectionRegistry, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// 現在のプレゼンスとその配信対象を一度のロックで取得
    pub async fn snapshot(&self) -> PresenceSnapshot {
        let registry = self.registry.lock().await;
        PresenceSnapshot {
            online_user_ids: registry.online_user_ids(),
            targets: registry.all_connection_ids(),
        }
    }

    /// online-users イベントを対象にブロードキャスト
    pub async fn broadcast(&self, targets: Vec<ConnectionId>, payload: &str) {
        self.message_pusher.broadcast(targets, payload).await;
    }
}
