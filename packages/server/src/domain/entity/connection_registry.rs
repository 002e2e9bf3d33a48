//! 接続レジストリ
//!
//! どの接続が存在し、それぞれどのユーザーに属するかを一元管理します。
//! 1 ユーザーが複数の接続（タブ・デバイス）を同時に持てるため、
//! ユーザー ID ごとに接続 ID の集合を保持します。
//!
//! ## 不変条件
//!
//! - ユーザーがオンライン集合に現れる ⇔ そのユーザーの接続集合が空でない
//! - アクティブチャットポインターは、そのユーザーの最後の接続が切断された
//!   時点で必ずクリアされる

use std::collections::{HashMap, HashSet};

use crate::domain::value_object::{ConnectionId, ConversationId, UserId};

/// 接続レジストリ（ユーザー → 接続集合、ユーザー → アクティブチャット）
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    /// ユーザーごとの生きている接続 ID の集合（空になったらエントリごと削除）
    connections: HashMap<UserId, HashSet<ConnectionId>>,
    /// ユーザーが現在フォアグラウンドで開いている会話
    active_chats: HashMap<UserId, ConversationId>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 接続を登録する
    ///
    /// 同じ (user, connection) ペアを二度登録しても冪等。
    ///
    /// # Returns
    ///
    /// ユーザーがオフライン → オンラインに遷移した場合 `true`。
    /// 呼び出し元はこのとき presence ブロードキャストを行う必要がある。
    pub fn register(&mut self, user_id: UserId, connection_id: ConnectionId) -> bool {
        let entry = self.connections.entry(user_id).or_default();
        let came_online = entry.is_empty();
        entry.insert(connection_id);
        came_online
    }

    /// 接続を登録解除する
    ///
    /// 未知のペアの解除は no-op（切断は他のクリーンアップと競合し得るため、
    /// エラーにはしない）。
    ///
    /// # Returns
    ///
    /// ユーザーの最後の接続が消えてオフラインに遷移した場合 `true`。
    pub fn unregister(&mut self, user_id: &UserId, connection_id: &ConnectionId) -> bool {
        let Some(entry) = self.connections.get_mut(user_id) else {
            return false;
        };
        entry.remove(connection_id);
        if entry.is_empty() {
            self.connections.remove(user_id);
            self.active_chats.remove(user_id);
            return true;
        }
        false
    }

    /// ユーザーがオンラインかどうか
    pub fn is_online(&self, user_id: &UserId) -> bool {
        self.connections.contains_key(user_id)
    }

    /// オンラインユーザー ID の一覧（出力を安定させるためソート済み）
    pub fn online_user_ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.connections.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// 指定ユーザーの全接続 ID
    pub fn connections_of(&self, user_id: &UserId) -> Vec<ConnectionId> {
        self.connections
            .get(user_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// 全ユーザーの全接続 ID（presence のフルブロードキャスト対象）
    pub fn all_connection_ids(&self) -> Vec<ConnectionId> {
        self.connections
            .values()
            .flat_map(|set| set.iter().cloned())
            .collect()
    }

    /// アクティブチャットポインターを設定する
    ///
    /// オフラインのユーザーに対しては no-op（open-chat シグナルが
    /// 切断処理と競合した場合の残留を防ぐ）。
    pub fn open_chat(&mut self, user_id: UserId, conversation_id: ConversationId) {
        if self.connections.contains_key(&user_id) {
            self.active_chats.insert(user_id, conversation_id);
        }
    }

    /// アクティブチャットポインターをクリアする
    pub fn close_chat(&mut self, user_id: &UserId) {
        self.active_chats.remove(user_id);
    }

    /// 指定ユーザーのアクティブチャット
    pub fn active_chat_of(&self, user_id: &UserId) -> Option<&ConversationId> {
        self.active_chats.get(user_id)
    }

    /// 指定の会話をフォアグラウンドで開いているユーザーの一覧
    pub fn users_viewing(&self, conversation_id: &ConversationId) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self
            .active_chats
            .iter()
            .filter(|(_, conv)| *conv == conversation_id)
            .map(|(user, _)| user.clone())
            .collect();
        ids.sort();
        ids
    }
}
