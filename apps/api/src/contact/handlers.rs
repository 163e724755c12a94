use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;
use tracing::{info, warn};

use crate::contact::mailer::EmailMessage;
use crate::contact::validation::{validate_submission, ContactSubmission};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub message: String,
}

/// POST /api/v1/contact
///
/// Every submission counts against the caller's window, valid or not.
pub async fn handle_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(submission): Json<ContactSubmission>,
) -> Result<Json<ContactResponse>, AppError> {
    let caller = caller_identity(&headers);

    match state.rate_limiter.check(&caller).await {
        Ok(true) => {}
        Ok(false) => {
            warn!("Contact submission from {caller} rejected by rate limit");
            return Err(AppError::RateLimited);
        }
        // Best-effort limiter: an unavailable counter store does not block mail.
        Err(e) => warn!("Rate limit check failed, allowing request: {e}"),
    }

    validate_submission(&submission).map_err(AppError::Validation)?;

    let mailer = state
        .mailer
        .as_ref()
        .ok_or_else(|| AppError::Configuration("RESEND_API_KEY is not set".to_string()))?;
    let recipient = state
        .config
        .contact_email
        .as_deref()
        .ok_or_else(|| AppError::Configuration("CONTACT_EMAIL is not set".to_string()))?;

    let message = EmailMessage::for_submission(&submission, &state.config.from_email, recipient);
    mailer.send(&message).await?;

    info!("Contact message from {caller} forwarded");
    Ok(Json(ContactResponse {
        message: "Message sent successfully! I'll get back to you soon.".to_string(),
    }))
}

/// Caller key for rate limiting: first `X-Forwarded-For` hop, then `X-Real-IP`.
fn caller_identity(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .unwrap_or("unknown")
        .to_string()
}
