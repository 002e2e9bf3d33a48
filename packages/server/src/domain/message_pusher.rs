//! MessagePusher trait 定義
//!
//! 「接続 ID へペイロードを送る」操作の抽象化。UseCase 層はこの trait に
//! 依存し、WebSocket という具体的なトランスポートには依存しない。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError};

/// 接続ごとの送信チャンネル
///
/// WebSocket の送信ループ（UI 層）がこのチャンネルの受信側を持つ。
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// MessagePusher trait
///
/// `push_to` は (接続 ID, ペイロード) の純粋関数としてローカルに
/// 成功/失敗を返す。`broadcast` は fire-and-forget：既に消えた接続への
/// 送信は飲み込み、リトライも送信者への通知も行わない。
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続の送信チャンネルを登録
    async fn register_connection(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 接続の送信チャンネルを登録解除
    async fn unregister_connection(&self, connection_id: &ConnectionId);

    /// 単一の接続へペイロードを送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        payload: &str,
    ) -> Result<(), MessagePushError>;

    /// 複数の接続へペイロードを送信（fire-and-forget、部分失敗を許容）
    async fn broadcast(&self, targets: Vec<ConnectionId>, payload: &str);
}
