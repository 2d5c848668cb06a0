use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use botgate_core::{AppError, UserIdentity};
use subtle::ConstantTimeEq;
use tower_sessions::Session;

use crate::dto::{CreateSessionRequest, UserResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// Session key holding the authenticated [`UserIdentity`].
pub const SESSION_USER_KEY: &str = "botgate.user";

/// Establishes a session from an identity-provider hand-off.
///
/// The provider token is compared in constant time so the comparison leaks
/// nothing about the expected value.
pub async fn create_session(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CreateSessionRequest>,
) -> ApiResult<StatusCode> {
    let presented = request.provider_token.as_bytes();
    let expected = state.provider_token.as_bytes();
    let token_matches: bool = presented.ct_eq(expected).into();
    if !token_matches {
        return Err(AppError::Unauthorized("invalid provider token".to_owned()).into());
    }

    let subject = request.subject.trim();
    if subject.is_empty() {
        return Err(AppError::Validation("subject must not be empty".to_owned()).into());
    }

    let identity = UserIdentity::new(
        subject,
        request.display_name,
        request.email,
        request.avatar_url,
    );

    session
        .insert(SESSION_USER_KEY, &identity)
        .await
        .map_err(|error| AppError::Internal(format!("failed to persist session: {error}")))?;

    tracing::info!(subject = identity.subject(), "session established");
    Ok(StatusCode::CREATED)
}

/// Returns the identity bound to the current session.
pub async fn current_user(
    Extension(identity): Extension<UserIdentity>,
) -> Json<UserResponse> {
    Json(UserResponse::from(&identity))
}

/// Destroys the current session.
pub async fn logout(session: Session) -> ApiResult<StatusCode> {
    session
        .flush()
        .await
        .map_err(|error| AppError::Internal(format!("failed to destroy session: {error}")))?;
    Ok(StatusCode::NO_CONTENT)
}
