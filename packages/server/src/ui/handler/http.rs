//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use tsubame_shared::time::timestamp_to_rfc3339;

use crate::{
    domain::ConversationId,
    infrastructure::dto::{
        http::{
            MembershipChangedRequest, MembershipChangedResponse, NewMessageRequest,
            NewMessageResponse, PresenceStateResponse, RoomStateResponse, TypingStateResponse,
        },
        websocket::{NewMessageEvent, SeenUpdateEvent},
    },
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Fan out a newly persisted message to every room member.
///
/// Called by the REST layer after it has written the message to storage.
/// Viewers with the conversation in the foreground get an immediate seen
/// mark, which in turn produces seen-update events for the other members.
pub async fn notify_new_message(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewMessageRequest>,
) -> Result<(StatusCode, Json<NewMessageResponse>), StatusCode> {
    let conversation_id = match ConversationId::new(request.conversation_id.clone()) {
        Ok(id) => id,
        Err(_) => {
            tracing::warn!("Invalid conversationId format: '{}'", request.conversation_id);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    let outcome = state.notify_message_usecase.execute(&conversation_id).await;
    let delivered_to = outcome.message_targets.len();

    // Domain Model から DTO への変換
    let event = NewMessageEvent::new(request.conversation_id.clone(), request.message);
    let payload = serde_json::to_string(&event).unwrap();
    state
        .notify_message_usecase
        .broadcast(outcome.message_targets, &payload)
        .await;

    for update in outcome.seen_updates {
        let event = SeenUpdateEvent::new(
            request.conversation_id.clone(),
            update.user_id.into_string(),
        );
        let payload = serde_json::to_string(&event).unwrap();
        state
            .notify_message_usecase
            .broadcast(update.targets, &payload)
            .await;
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(NewMessageResponse { delivered_to }),
    ))
}

/// Re-derive room membership after the participant list of a conversation changed.
pub async fn notify_membership_changed(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MembershipChangedRequest>,
) -> Result<Json<MembershipChangedResponse>, StatusCode> {
    let conversation_id = match ConversationId::new(request.conversation_id.clone()) {
        Ok(id) => id,
        Err(_) => {
            tracing::warn!("Invalid conversationId format: '{}'", request.conversation_id);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    match state
        .membership_changed_usecase
        .execute(&conversation_id)
        .await
    {
        Ok(member_count) => Ok(Json(MembershipChangedResponse { member_count })),
        Err(e) => {
            tracing::error!(
                "Failed to re-derive membership for '{}': {}",
                request.conversation_id,
                e
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Debug endpoint to get current presence state (for testing purposes)
pub async fn debug_presence_state(
    State(state): State<Arc<AppState>>,
) -> Json<PresenceStateResponse> {
    let snapshot = state.get_presence_state_usecase.execute().await;

    // Domain Model から DTO への変換
    let response = PresenceStateResponse {
        generated_at: timestamp_to_rfc3339(snapshot.generated_at_millis),
        online_user_ids: snapshot
            .online_user_ids
            .into_iter()
            .map(|user_id| user_id.into_string())
            .collect(),
        rooms: snapshot
            .rooms
            .into_iter()
            .map(|(conversation_id, member_count)| RoomStateResponse {
                conversation_id: conversation_id.into_string(),
                member_count,
            })
            .collect(),
        typing: snapshot
            .typing
            .into_iter()
            .map(|(conversation_id, user_ids)| TypingStateResponse {
                conversation_id: conversation_id.into_string(),
                user_ids: user_ids
                    .into_iter()
                    .map(|user_id| user_id.into_string())
                    .collect(),
            })
            .collect(),
    };
    Json(response)
}
