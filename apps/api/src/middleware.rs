use axum::extract::{Request, State};
use axum::http::{HeaderMap, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use botgate_core::{AppError, UserIdentity};
use tower_sessions::Session;

use crate::auth::SESSION_USER_KEY;
use crate::error::ApiResult;
use crate::state::AppState;

/// Paths the browser origin check does not apply to.
///
/// The identity provider hand-off is a server to server call; it carries the
/// shared provider token instead of browser fetch metadata.
const ORIGIN_CHECK_EXEMPT_PATHS: &[&str] = &["/auth/session"];

/// Loads the session identity and attaches it to the request, rejecting
/// requests without an authenticated session.
pub async fn require_auth(
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Rejects state-changing browser requests from outside the configured
/// frontend origin. The hand-off path is exempt.
pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let needs_check = is_state_changing_method(request.method())
        && !is_origin_check_exempt(request.uri().path());

    if needs_check && !origin_allowed(request.headers(), state.frontend_url.as_str()) {
        return Err(AppError::Unauthorized("origin validation failed".to_owned()).into());
    }

    Ok(next.run(request).await)
}

fn is_origin_check_exempt(path: &str) -> bool {
    ORIGIN_CHECK_EXEMPT_PATHS.contains(&path)
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// `Sec-Fetch-Site` wins when present; otherwise `Origin` or `Referer` must
/// match the frontend.
fn origin_allowed(headers: &HeaderMap, frontend_url: &str) -> bool {
    if headers
        .get("sec-fetch-site")
        .is_some_and(|site| site.as_bytes() == b"cross-site")
    {
        return false;
    }

    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let referer = headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    origin == frontend_url || referer.starts_with(frontend_url)
}
