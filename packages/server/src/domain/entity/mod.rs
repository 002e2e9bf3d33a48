//! ドメインエンティティ定義
//!
//! リアルタイム層のプロセス内状態を表す純粋なデータ構造。
//! ロックや I/O は持たず、UseCase 層が `Arc<Mutex<_>>` 越しに所有します。

mod connection_registry;
mod room_directory;
mod typing_board;

pub use connection_registry::ConnectionRegistry;
pub use room_directory::RoomDirectory;
pub use typing_board::TypingBoard;
