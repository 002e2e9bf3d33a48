//! UseCase 層
//!
//! イベントディスパッチャーの本体。トランスポート（UI 層）から届いた
//! ドメインイベントを、対象となる接続集合の計算と状態の更新に変換します。
//! 共有状態（接続レジストリ・ルームディレクトリ・タイピングボード）は
//! `Arc<Mutex<_>>` で各 UseCase に注入され、モジュールレベルの
//! グローバルは存在しません。

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{ConnectionRegistry, RoomDirectory, TypingBoard};

mod active_chat;
mod connect;
mod disconnect;
mod mark_seen;
mod membership;
mod notify_message;
mod presence;
mod presence_state;
mod typing;

pub use active_chat::ActiveChatUseCase;
pub use connect::{ConnectOutcome, ConnectUseCase};
pub use disconnect::{DisconnectOutcome, DisconnectUseCase, TypingStopNotice};
pub use mark_seen::MarkSeenUseCase;
pub use membership::MembershipChangedUseCase;
pub use notify_message::{NotifyMessageOutcome, NotifyMessageUseCase, SeenUpdate};
pub use presence::{PresenceBroadcastUseCase, PresenceSnapshot};
pub use presence_state::{GetPresenceStateUseCase, PresenceStateSnapshot};
pub use typing::TypingUseCase;

/// プロセス内で共有される接続レジストリ
pub type SharedConnectionRegistry = Arc<Mutex<ConnectionRegistry>>;
/// プロセス内で共有されるルームディレクトリ
pub type SharedRoomDirectory = Arc<Mutex<RoomDirectory>>;
/// プロセス内で共有されるタイピングボード
pub type SharedTypingBoard = Arc<Mutex<TypingBoard>>;
