//! Domain layer: value objects, entities, and the interfaces the core
//! requires from the outside world (repository, message pusher).

pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use entity::{ConnectionRegistry, RoomDirectory, TypingBoard};
pub use error::{MessagePushError, RepositoryError, ValueObjectError};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use repository::{Conversation, ConversationRepository};
pub use value_object::{ConnectionId, ConversationId, DisplayName, UserId};
