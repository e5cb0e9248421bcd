//! Router for the push API

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use axum_extra::extract::Query;

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::notify;

type SharedState = Arc<AppState>;

// Subscribe a device token to a topic upstream and remember it locally
async fn subscribe(
    State(state): State<SharedState>,
    payload: Result<Json<public::SubscribeRequest>, JsonRejection>,
) -> Result<Json<public::SubscribeResponse>, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::bad_request(&e.body_text()))?;
    let token = payload.token.unwrap_or_default();
    let topic = payload.topic.unwrap_or_default();

    notify::subscribe(
        &*state.transport,
        &state.registry,
        &token,
        &topic,
        state.config.request_timeout,
    )
    .await?;

    Ok(Json(public::SubscribeResponse {
        success: true,
        message: format!("Subscribed to {}", topic),
    }))
}

// Answers from local bookkeeping only, the provider is not consulted
async fn is_subscribed(
    State(state): State<SharedState>,
    Query(params): Query<public::IsSubscribedQuery>,
) -> Result<Json<public::IsSubscribedResponse>, ApiError> {
    let (Some(token), Some(topic)) = (
        params.token.filter(|t| !t.is_empty()),
        params.topic.filter(|t| !t.is_empty()),
    ) else {
        return Err(ApiError::bad_request("Missing token or topic"));
    };

    Ok(Json(public::IsSubscribedResponse {
        subscribed: state.registry.is_subscribed(&token, &topic),
    }))
}

// Send a notification to a topic or a single device
async fn send(
    State(state): State<SharedState>,
    payload: Result<Json<public::SendRequest>, JsonRejection>,
) -> Result<Json<public::SendResponse>, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::bad_request(&e.body_text()))?;

    let message_id = notify::dispatch(
        &*state.transport,
        &payload,
        &state.config.send_policy,
        state.config.request_timeout,
    )
    .await?;

    Ok(Json(public::SendResponse {
        success: true,
        message_id,
    }))
}

/// Create the push router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/subscribe", post(subscribe))
        .route("/isSubscribed", get(is_subscribed))
        .route("/send", post(send))
}
