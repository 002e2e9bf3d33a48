//! タイピングボード
//!
//! 会話ごとの「誰が入力中か」という短命な状態。サーバー側のタイマーでは
//! 失効させず、明示的な stop シグナルか最終接続の切断だけがエントリを
//! 消します（クライアントが stop を送る責務を持つ）。

use std::collections::HashMap;

use crate::domain::value_object::{ConversationId, DisplayName, UserId};

/// 会話 ID → (入力中ユーザー → 表示名)
#[derive(Debug, Default)]
pub struct TypingBoard {
    typing: HashMap<ConversationId, HashMap<UserId, DisplayName>>,
}

impl TypingBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// 入力開始（再送は表示名だけ更新する冪等操作）
    pub fn start(&mut self, conversation_id: ConversationId, user_id: UserId, name: DisplayName) {
        self.typing
            .entry(conversation_id)
            .or_default()
            .insert(user_id, name);
    }

    /// 入力終了
    ///
    /// 会話のマップが空になったらマップエントリ自体を削除する。
    ///
    /// # Returns
    ///
    /// エントリが実在した場合 `true`（stop イベントのブロードキャストは
    /// 戻り値にかかわらず行う：冪等 stop）。
    pub fn stop(&mut self, conversation_id: &ConversationId, user_id: &UserId) -> bool {
        let Some(entry) = self.typing.get_mut(conversation_id) else {
            return false;
        };
        let existed = entry.remove(user_id).is_some();
        if entry.is_empty() {
            self.typing.remove(conversation_id);
        }
        existed
    }

    /// ユーザーのエントリを全会話から消す
    ///
    /// 最終接続の切断時に呼ぶ。
    ///
    /// # Returns
    ///
    /// stop イベントをブロードキャストすべき会話の一覧（ソート済み）。
    pub fn clear_user(&mut self, user_id: &UserId) -> Vec<ConversationId> {
        let mut cleared = Vec::new();
        self.typing.retain(|conversation_id, entry| {
            if entry.remove(user_id).is_some() {
                cleared.push(conversation_id.clone());
            }
            !entry.is_empty()
        });
        cleared.sort();
        cleared
    }

    /// 指定会話で入力中のユーザーかどうか
    pub fn is_typing(&self, conversation_id: &ConversationId, user_id: &UserId) -> bool {
        self.typing
            .get(conversation_id)
            .is_some_and(|entry| entry.contains_key(user_id))
    }

    /// 会話ごとの入力中ユーザーのスナップショット（デバッグ用）
    pub fn snapshot(&self) -> Vec<(ConversationId, Vec<UserId>)> {
        let mut rows: Vec<(ConversationId, Vec<UserId>)> = self
            .typing
            .iter()
            .map(|(conv, entry)| {
                let mut users: Vec<UserId> = entry.keys().cloned().collect();
                users.sort();
                (conv.clone(), users)
            })
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    }

    /// エントリを持つ会話の数
    pub fn conversation_count(&self) -> usize {
        self.typing.len()
    }
}
