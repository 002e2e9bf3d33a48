//! Server state and connection management.

use std::sync::Arc;

use crate::usecase::{
    ActiveChatUseCase, ConnectUseCase, DisconnectUseCase, GetPresenceStateUseCase,
    MarkSeenUseCase, MembershipChangedUseCase, NotifyMessageUseCase, PresenceBroadcastUseCase,
    TypingUseCase,
};

/// Shared application state
pub struct AppState {
    /// ConnectUseCase（接続確立のユースケース）
    pub connect_usecase: Arc<ConnectUseCase>,
    /// DisconnectUseCase（切断処理のユースケース）
    pub disconnect_usecase: Arc<DisconnectUseCase>,
    /// ActiveChatUseCase（アクティブチャット追跡のユースケース）
    pub active_chat_usecase: Arc<ActiveChatUseCase>,
    /// TypingUseCase（タイピングインジケーターのユースケース）
    pub typing_usecase: Arc<TypingUseCase>,
    /// MarkSeenUseCase（既読マークのユースケース）
    pub mark_seen_usecase: Arc<MarkSeenUseCase>,
    /// NotifyMessageUseCase（新着メッセージ fan-out のユースケース）
    pub notify_message_usecase: Arc<NotifyMessageUseCase>,
    /// MembershipChangedUseCase（ルーム再導出のユースケース）
    pub membership_changed_usecase: Arc<MembershipChangedUseCase>,
    /// PresenceBroadcastUseCase（プレゼンス全量配信のユースケース）
    pub presence_broadcast_usecase: Arc<PresenceBroadcastUseCase>,
    /// GetPresenceStateUseCase（プレゼンス状態取得のユースケース）
    pub get_presence_state_usecase: Arc<GetPresenceStateUseCase>,
}
