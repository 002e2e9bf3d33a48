//! Realtime presence & message fan-out server for a web chat application.
//!
//! Tracks online users, conversation rooms and typing indicators, and fans
//! out message / seen events to connected WebSocket clients.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tsubame-server
//! cargo run --bin tsubame-server -- --host 0.0.0.0 --port 3000
//! ```

use std::{collections::HashMap, sync::Arc};

use clap::Parser;
use tokio::sync::Mutex;

use tsubame_server::{
    domain::{ConnectionRegistry, Conversation, ConversationId, RoomDirectory, TypingBoard, UserId},
    infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemoryConversationRepository,
    },
    ui::Server,
    usecase::{
        ActiveChatUseCase, ConnectUseCase, DisconnectUseCase, GetPresenceStateUseCase,
        MarkSeenUseCase, MembershipChangedUseCase, NotifyMessageUseCase, PresenceBroadcastUseCase,
        TypingUseCase,
    },
};
use tsubame_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "tsubame-server")]
#[command(about = "Realtime presence server for a web chat application", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Domain entities (shared mutable state)
    // 2. Repository
    // 3. MessagePusher
    // 4. UseCases
    // 5. Server

    // 1. Create the shared trackers
    let registry = Arc::new(Mutex::new(ConnectionRegistry::new()));
    let rooms = Arc::new(Mutex::new(RoomDirectory::new()));
    let typing = Arc::new(Mutex::new(TypingBoard::new()));

    // 2. Create Repository (in-memory, seeded with a demo conversation)
    let repository = Arc::new(InMemoryConversationRepository::new());
    seed_demo_conversations(&repository).await;

    // 3. Create MessagePusher (WebSocket implementation)
    let pusher_connections = Arc::new(Mutex::new(HashMap::new()));
    let message_pusher = Arc::new(WebSocketMessagePusher::new(pusher_connections.clone()));

    // 4. Create UseCases
    let connect_usecase = Arc::new(ConnectUseCase::new(
        registry.clone(),
        rooms.clone(),
        repository.clone(),
        message_pusher.clone(),
    ));
    let disconnect_usecase = Arc::new(DisconnectUseCase::new(
        registry.clone(),
        rooms.clone(),
        typing.clone(),
        message_pusher.clone(),
    ));
    let active_chat_usecase = Arc::new(ActiveChatUseCase::new(registry.clone()));
    let typing_usecase = Arc::new(TypingUseCase::new(
        registry.clone(),
        rooms.clone(),
        typing.clone(),
        message_pusher.clone(),
    ));
    let mark_seen_usecase = Arc::new(MarkSeenUseCase::new(
        registry.clone(),
        rooms.clone(),
        repository.clone(),
        message_pusher.clone(),
    ));
    let notify_message_usecase = Arc::new(NotifyMessageUseCase::new(
        registry.clone(),
        rooms.clone(),
        repository.clone(),
        message_pusher.clone(),
    ));
    let membership_changed_usecase = Arc::new(MembershipChangedUseCase::new(
        registry.clone(),
        rooms.clone(),
        repository.clone(),
    ));
    let presence_broadcast_usecase = Arc::new(PresenceBroadcastUseCase::new(
        registry.clone(),
        message_pusher.clone(),
    ));
    let get_presence_state_usecase = Arc::new(GetPresenceStateUseCase::new(
        registry.clone(),
        rooms.clone(),
        typing.clone(),
        Arc::new(SystemClock),
    ));

    // 5. Create and run the server
    let server = Server::new(
        connect_usecase,
        disconnect_usecase,
        active_chat_usecase,
        typing_usecase,
        mark_seen_usecase,
        notify_message_usecase,
        membership_changed_usecase,
        presence_broadcast_usecase,
        get_presence_state_usecase,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// 開発用のデモ会話を登録する（本番では REST 層の DB を参照する）
async fn seed_demo_conversations(repository: &InMemoryConversationRepository) {
    let alice = UserId::new("alice".to_string()).expect("Failed to create UserId");
    let bob = UserId::new("bob".to_string()).expect("Failed to create UserId");
    let carol = UserId::new("carol".to_string()).expect("Failed to create UserId");

    let dm = ConversationId::new("demo-dm".to_string()).expect("Failed to create ConversationId");
    repository
        .upsert_conversation(Conversation::new(dm, vec![alice.clone(), bob.clone()]))
        .await;

    let group =
        ConversationId::new("demo-group".to_string()).expect("Failed to create ConversationId");
    repository
        .upsert_conversation(Conversation::new(group, vec![alice, bob, carol]))
        .await;

    tracing::info!("Seeded demo conversations: demo-dm, demo-group");
}
