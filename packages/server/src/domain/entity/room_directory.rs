//! 会話ルームディレクトリ
//!
//! 「会話 X のイベントをどの接続が受け取るべきか」を答えるための導出状態。
//! 永続化されず、接続時に永続化層の参加者リストから再構築されます。
//!
//! ## 不変条件
//!
//! - 接続がルームメンバーである ⇔ その接続の所有ユーザーが会話の参加者で、
//!   かつ接続が生きている（切断時に `prune_connection` で刈り取る）

use std::collections::{HashMap, HashSet};

use crate::domain::value_object::{ConnectionId, ConversationId};

/// 会話 ID → 購読中の接続 ID 集合
#[derive(Debug, Default)]
pub struct RoomDirectory {
    rooms: HashMap<ConversationId, HashSet<ConnectionId>>,
}

impl RoomDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 接続をルームに参加させる（冪等）
    pub fn join(&mut self, conversation_id: ConversationId, connection_id: ConnectionId) {
        self.rooms
            .entry(conversation_id)
            .or_default()
            .insert(connection_id);
    }

    /// ルームのメンバー接続一覧
    pub fn members_of(&self, conversation_id: &ConversationId) -> Vec<ConnectionId> {
        self.rooms
            .get(conversation_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// 接続を全ルームから取り除く
    ///
    /// 切断時に呼ぶ。空になったルームはエントリごと削除してメモリを返す。
    pub fn prune_connection(&mut self, connection_id: &ConnectionId) {
        self.rooms.retain(|_, members| {
            members.remove(connection_id);
            !members.is_empty()
        });
    }

    /// ルームのメンバー集合を丸ごと差し替える
    ///
    /// 参加者リストの変更（membership-changed 通知）による再導出で使用。
    /// 空集合を渡すとルームエントリ自体が削除される。
    pub fn replace_room(&mut self, conversation_id: ConversationId, members: Vec<ConnectionId>) {
        if members.is_empty() {
            self.rooms.remove(&conversation_id);
        } else {
            self.rooms
                .insert(conversation_id, members.into_iter().collect());
        }
    }

    /// 存在するルームの数（デバッグ用）
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// 全ルームのスナップショット（デバッグ用）
    pub fn snapshot(&self) -> Vec<(ConversationId, usize)> {
        let mut rooms: Vec<(ConversationId, usize)> = self
            .rooms
            .iter()
            .map(|(conv, members)| (conv.clone(), members.len()))
            .collect();
        rooms.sort_by(|a, b| a.0.cmp(&b.0));
        rooms
    }
}
