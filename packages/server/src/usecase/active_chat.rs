//! UseCase: アクティブチャットの追跡
//!
//! open-chat / close-chat シグナルでアクティブチャットポインターを
//! 更新するだけの小さなユースケース。ブロードキャストは発生しない。

use crate::domain::{ConversationId, UserId};

use super::SharedConnectionRegistry;

/// アクティブチャット追跡のユースケース
pub struct ActiveChatUseCase {
    registry: SharedConnectionRegistry,
}

impl ActiveChatUseCase {
    pub fn new(registry: SharedConnectionRegistry) -> Self {
        Self { registry }
    }

    /// 会話をフォアグラウンドで開いたことを記録
    pub async fn open(&self, user_id: UserId, conversation_id: ConversationId) {
        let mut registry = self.registry.lock().await;
        registry.open_chat(user_id, conversation_id);
    }

    /// 会話を閉じたことを記録
    pub async fn close(&self, user_id: &UserId) {
        let mut registry = self.registry.lock().await;
        registry.close_chat(user_id);
    }
}
