//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, ConversationId, DisplayName, UserId},
    infrastructure::dto::websocket::{
        ClientSignal, OnlineUsersEvent, SeenUpdateEvent, TypingStartEvent, TypingStopEvent,
    },
    ui::state::AppState,
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectQuery {
    pub user_id: String,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let user_id_str = query.user_id;

    // Convert String -> UserId (Domain Model)
    let user_id = match UserId::new(user_id_str.clone()) {
        Ok(id) => id,
        Err(_) => {
            tracing::warn!("Invalid userId format: '{}'", user_id_str);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user_id)))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// This function handles the outbound message flow: events produced by the
/// UseCases (via rx channel) are sent to this connection's WebSocket.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            // Send the message to this connection
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

/// Broadcast the full online-user list to every connection.
async fn broadcast_online_users(state: &AppState) {
    let snapshot = state.presence_broadcast_usecase.snapshot().await;
    let event = OnlineUsersEvent::new(
        snapshot
            .online_user_ids
            .into_iter()
            .map(UserId::into_string)
            .collect(),
    );
    let payload = serde_json::to_string(&event).unwrap();
    state
        .presence_broadcast_usecase
        .broadcast(snapshot.targets, &payload)
        .await;
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, user_id: UserId) {
    let (sender, mut receiver) = socket.split();

    // Each connection (browser tab) gets its own identity
    let connection_id = ConnectionId::generate();

    // Create a channel for this connection to receive messages
    let (tx, rx) = mpsc::unbounded_channel();

    // Use ConnectUseCase to register the connection and derive room membership
    let outcome = state
        .connect_usecase
        .execute(user_id.clone(), connection_id.clone(), tx)
        .await;
    tracing::info!(
        "User '{}' connected (connection '{}', came_online: {}, joined {} conversations)",
        user_id.as_str(),
        connection_id.as_str(),
        outcome.came_online,
        outcome.joined_conversations.len()
    );

    // Broadcast the full presence list to everyone (including this connection)
    broadcast_online_users(&state).await;

    // Spawn a task to push events to this connection
    let mut send_task = pusher_loop(rx, sender);

    let state_clone = state.clone();
    let user_id_clone = user_id.clone();

    // Spawn a task to receive signals from this connection
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    let signal = match serde_json::from_str::<ClientSignal>(&text) {
                        Ok(signal) => signal,
                        Err(e) => {
                            tracing::warn!("Ignoring malformed frame: {}", e);
                            continue;
                        }
                    };
                    handle_signal(&state_clone, &user_id_clone, signal).await;
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("User '{}' requested close", user_id_clone.as_str());
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Use DisconnectUseCase to clean up all per-connection state
    let outcome = state.disconnect_usecase.execute(&user_id, &connection_id).await;
    tracing::info!(
        "User '{}' disconnected (connection '{}', went_offline: {})",
        user_id.as_str(),
        connection_id.as_str(),
        outcome.went_offline
    );

    // The last tab going away implicitly ends any typing in progress
    for notice in outcome.typing_stops {
        let event = TypingStopEvent::new(
            notice.conversation_id.into_string(),
            user_id.as_str().to_string(),
        );
        let payload = serde_json::to_string(&event).unwrap();
        state.disconnect_usecase.broadcast(notice.targets, &payload).await;
    }

    broadcast_online_users(&state).await;
}

/// Dispatch a parsed client signal to the matching UseCase.
///
/// 会話 ID やユーザー ID がドメインの制約を満たさないフレームは
/// 警告ログを残して無視する。ユーザー ID は接続時に確立したものを使い、
/// フレーム内のものは信頼しない。
async fn handle_signal(state: &AppState, user_id: &UserId, signal: ClientSignal) {
    match signal {
        ClientSignal::OpenChat { conversation_id } => {
            let Ok(conversation_id) = ConversationId::new(conversation_id) else {
                tracing::warn!("Ignoring open-chat with invalid conversationId");
                return;
            };
            state
                .active_chat_usecase
                .open(user_id.clone(), conversation_id)
                .await;
        }
        ClientSignal::CloseChat => {
            state.active_chat_usecase.close(user_id).await;
        }
        ClientSignal::TypingStart {
            conversation_id,
            user_name,
            ..
        } => {
            let Ok(conversation_id) = ConversationId::new(conversation_id) else {
                tracing::warn!("Ignoring typing-start with invalid conversationId");
                return;
            };
            let Ok(display_name) = DisplayName::new(user_name.clone()) else {
                tracing::warn!("Ignoring typing-start with invalid userName");
                return;
            };
            let targets = state
                .typing_usecase
                .start(conversation_id.clone(), user_id.clone(), display_name)
                .await;

            let event = TypingStartEvent::new(
                conversation_id.into_string(),
                user_id.as_str().to_string(),
                user_name,
            );
            let payload = serde_json::to_string(&event).unwrap();
            state.typing_usecase.broadcast(targets, &payload).await;
        }
        ClientSignal::TypingStop {
            conversation_id, ..
        } => {
            let Ok(conversation_id) = ConversationId::new(conversation_id) else {
                tracing::warn!("Ignoring typing-stop with invalid conversationId");
                return;
            };
            let targets = state.typing_usecase.stop(&conversation_id, user_id).await;

            let event = TypingStopEvent::new(
                conversation_id.into_string(),
                user_id.as_str().to_string(),
            );
            let payload = serde_json::to_string(&event).unwrap();
            state.typing_usecase.broadcast(targets, &payload).await;
        }
        ClientSignal::MarkSeen {
            conversation_id, ..
        } => {
            let Ok(conversation_id) = ConversationId::new(conversation_id) else {
                tracing::warn!("Ignoring mark-seen with invalid conversationId");
                return;
            };
            match state
                .mark_seen_usecase
                .execute(&conversation_id, user_id)
                .await
            {
                Ok(targets) => {
                    let event = SeenUpdateEvent::new(
                        conversation_id.into_string(),
                        user_id.as_str().to_string(),
                    );
                    let payload = serde_json::to_string(&event).unwrap();
                    state.mark_seen_usecase.broadcast(targets, &payload).await;
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to mark conversation seen for '{}': {}",
                        user_id.as_str(),
                        e
                    );
                }
            }
        }
    }
}
