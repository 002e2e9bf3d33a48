//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::usecase::{
    ActiveChatUseCase, ConnectUseCase, DisconnectUseCase, GetPresenceStateUseCase,
    MarkSeenUseCase, MembershipChangedUseCase, NotifyMessageUseCase, PresenceBroadcastUseCase,
    TypingUseCase,
};

use super::{
    handler::{
        debug_presence_state, health_check, notify_membership_changed, notify_new_message,
        websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Realtime presence server
///
/// This struct encapsulates the server configuration and provides methods to run the server.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     connect_usecase,
///     disconnect_usecase,
///     active_chat_usecase,
///     typing_usecase,
///     mark_seen_usecase,
///     notify_message_usecase,
///     membership_changed_usecase,
///     presence_broadcast_usecase,
///     get_presence_state_usecase,
/// );
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    /// ConnectUseCase（接続確立のユースケース）
    connect_usecase: Arc<ConnectUseCase>,
    /// DisconnectUseCase（切断処理のユースケース）
    disconnect_usecase: Arc<DisconnectUseCase>,
    /// ActiveChatUseCase（アクティブチャット追跡のユースケース）
    active_chat_usecase: Arc<ActiveChatUseCase>,
    /// TypingUseCase（タイピングインジケーターのユースケース）
    typing_usecase: Arc<TypingUseCase>,
    /// MarkSeenUseCase（既読マークのユースケース）
    mark_seen_usecase: Arc<MarkSeenUseCase>,
    /// NotifyMessageUseCase（新着メッセージ fan-out のユースケース）
    notify_message_usecase: Arc<NotifyMessageUseCase>,
    /// MembershipChangedUseCase（ルーム再導出のユースケース）
    membership_changed_usecase: Arc<MembershipChangedUseCase>,
    /// PresenceBroadcastUseCase（プレゼンス全量配信のユースケース）
    presence_broadcast_usecase: Arc<PresenceBroadcastUseCase>,
    /// GetPresenceStateUseCase（プレゼンス状態取得のユースケース）
    get_presence_state_usecase: Arc<GetPresenceStateUseCase>,
}

impl Server {
    /// Create a new Server instance
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        connect_usecase: Arc<ConnectUseCase>,
        disconnect_usecase: Arc<DisconnectUseCase>,
        active_chat_usecase: Arc<ActiveChatUseCase>,
        typing_usecase: Arc<TypingUseCase>,
        mark_seen_usecase: Arc<MarkSeenUseCase>,
        notify_message_usecase: Arc<NotifyMessageUseCase>,
        membership_changed_usecase: Arc<MembershipChangedUseCase>,
        presence_broadcast_usecase: Arc<PresenceBroadcastUseCase>,
        get_presence_state_usecase: Arc<GetPresenceStateUseCase>,
    ) -> Self {
        Self {
            connect_usecase,
            disconnect_usecase,
            active_chat_usecase,
            typing_usecase,
            mark_seen_usecase,
            notify_message_usecase,
            membership_changed_usecase,
            presence_broadcast_usecase,
            get_presence_state_usecase,
        }
    }

    /// Build the axum router (also used by integration tests)
    pub fn router(self) -> Router {
        let app_state = Arc::new(AppState {
            connect_usecase: self.connect_usecase,
            disconnect_usecase: self.disconnect_usecase,
            active_chat_usecase: self.active_chat_usecase,
            typing_usecase: self.typing_usecase,
            mark_seen_usecase: self.mark_seen_usecase,
            notify_message_usecase: self.notify_message_usecase,
            membership_changed_usecase: self.membership_changed_usecase,
            presence_broadcast_usecase: self.presence_broadcast_usecase,
            get_presence_state_usecase: self.get_presence_state_usecase,
        });

        // Define handlers
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // 内部 HTTP エンドポイント（REST 層からの通知）
            .route("/internal/messages", post(notify_new_message))
            .route("/internal/membership-changed", post(notify_membership_changed))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/debug/presence", get(debug_presence_state))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the realtime presence server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        // Start the server
        tracing::info!(
            "Realtime presence server listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Connect to: ws://{}/ws?userId=<user_id>", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        // Set up graceful shutdown signal handler
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
