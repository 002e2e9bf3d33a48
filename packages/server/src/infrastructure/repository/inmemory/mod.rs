//! インメモリ Repository 実装

pub mod conversation;

pub use conversation::InMemoryConversationRepository;
