//! Repository trait 定義
//!
//! リアルタイム層が永続化層（外部コラボレーター）に要求するインターフェース。
//! メッセージや会話の永続化そのものはこの層の外で行われ、コアは
//! 「ユーザーの参加している会話一覧」と「既読マークの書き込み」だけを
//! この trait 経由で利用します（依存性の逆転）。

use async_trait::async_trait;

use super::{ConversationId, RepositoryError, UserId};

/// 会話（参加者リスト付き）
///
/// 永続化層から取得されるスナップショット。ルームメンバーシップの
/// 導出にのみ使われ、コアが書き換えることはない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: ConversationId,
    pub participant_ids: Vec<UserId>,
}

impl Conversation {
    pub fn new(id: ConversationId, participant_ids: Vec<UserId>) -> Self {
        Self {
            id,
            participant_ids,
        }
    }

    /// 指定ユーザーが参加者かどうか
    pub fn has_participant(&self, user_id: &UserId) -> bool {
        self.participant_ids.contains(user_id)
    }
}

/// Conversation Repository trait
///
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装
/// （インメモリ、将来的には RDBMS / 外部サービス）には依存しない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// 指定ユーザーが参加している会話の一覧を取得
    ///
    /// 接続時のルーム参加に使用。失敗は呼び出し元でログに残し、
    /// 接続自体は継続する（再接続で自己回復する）。
    async fn conversations_containing(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Conversation>, RepositoryError>;

    /// 会話を 1 件取得（存在しなければ `None`）
    ///
    /// membership-changed 通知によるルーム再導出に使用。
    async fn find_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError>;

    /// 会話内の未読メッセージを既読としてマーク
    ///
    /// seen-update ブロードキャストの前に呼ぶ。
    async fn mark_conversation_seen(
        &self,
        conversation_id: &ConversationId,
        user_id: &UserId,
    ) -> Result<(), RepositoryError>;
}
