//! Telegram webhook and account-link setup handlers.

use axum::{body::Bytes, extract::State, Json};
use leave_models::ChatIdentity;
use leave_telegram::Update;
use tracing::{info, warn};

use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::{AckResponse, EndpointInfo, SetupUserRequest, SetupUserResponse, SetupUserUsage};

/// POST /telegram/webhook - Handle one Bot API update.
///
/// Answers `{ok: true}` for every handled message, including ones that
/// could not be understood, so the Bot API does not redeliver them. Only a
/// failed leave-request write becomes a 500. The body is read raw so that
/// payloads which are not JSON are acknowledged too.
pub async fn telegram_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AckResponse>> {
    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!(error = %e, "Ignoring malformed update");
            return Ok(Json(AckResponse { ok: true }));
        }
    };

    state.dispatcher.dispatch(&update).await?;
    Ok(Json(AckResponse { ok: true }))
}

/// GET /telegram/webhook - Liveness check for the webhook route.
pub async fn telegram_webhook_info() -> Json<EndpointInfo> {
    Json(EndpointInfo {
        message: "Telegram webhook endpoint".to_string(),
        status: "active".to_string(),
    })
}

/// POST /telegram/setup-user - Create or replace an account link.
pub async fn setup_user(
    State(state): State<AppState>,
    Json(req): Json<SetupUserRequest>,
) -> Result<Json<SetupUserResponse>> {
    let email = req.user_email.as_deref().map(str::trim).unwrap_or_default();
    let (Some(telegram_user_id), false) = (req.telegram_user_id, email.is_empty()) else {
        return Err(ApiError::BadRequest(
            "telegram_user_id and user_email are required".to_string(),
        ));
    };

    let identity = ChatIdentity {
        id: telegram_user_id,
        username: req.telegram_username.clone(),
        first_name: req.telegram_first_name.clone(),
        last_name: req.telegram_last_name.clone(),
    };

    let link = state.linker().bootstrap(&identity, email).await?;
    info!(
        telegram_user_id = telegram_user_id,
        mapping_id = %link.id,
        "Telegram user mapping saved"
    );

    Ok(Json(SetupUserResponse {
        success: true,
        mapping_id: link.id.as_str().to_string(),
        message: "Telegram user mapping created/updated successfully".to_string(),
    }))
}

/// GET /telegram/setup-user - Usage text.
pub async fn setup_user_usage() -> Json<SetupUserUsage> {
    Json(SetupUserUsage {
        message: "Telegram user setup endpoint".to_string(),
        usage: "POST a JSON body to link a Telegram user to an existing profile".to_string(),
        required_fields: vec!["telegram_user_id", "user_email"],
        optional_fields: vec![
            "telegram_username",
            "telegram_first_name",
            "telegram_last_name",
        ],
    })
}
