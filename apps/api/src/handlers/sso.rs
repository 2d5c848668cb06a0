use axum::Json;
use axum::extract::{Extension, State};
use botgate_application::{
    AccessContext, AccessDecision, AccessGate, ResolutionCondition, ResolvedAccess,
};
use botgate_core::{AppError, ChatbotId, UserIdentity};
use botgate_domain::SsoClaims;
use tracing::info;

use crate::dto::{SsoTokenRequest, SsoTokenResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// Issues a signed dashboard session token for one chatbot.
///
/// The request names only the chatbot; role and permissions are resolved
/// server side at issuance time, so the client cannot influence the claim
/// set. Anything short of a full-access decision refuses issuance.
pub async fn issue_sso_token_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(request): Json<SsoTokenRequest>,
) -> ApiResult<Json<SsoTokenResponse>> {
    let chatbot_id = ChatbotId::new(request.chatbot_id)?;

    let context = AccessContext::new(state.resolver.clone(), Some(&user));
    let condition = context.refresh().await;

    if condition == ResolutionCondition::DirectoryUnavailable {
        return Err(AppError::Unavailable(
            "access could not be resolved for issuance".to_owned(),
        )
        .into());
    }

    match AccessGate::decide(&context, &chatbot_id) {
        AccessDecision::Full => {}
        AccessDecision::SignInRequired => {
            return Err(
                AppError::Unauthorized("authentication required".to_owned()).into(),
            );
        }
        AccessDecision::Denied | AccessDecision::Degraded(_) => {
            return Err(AppError::Forbidden(format!(
                "full access required on chatbot '{chatbot_id}'"
            ))
            .into());
        }
    }

    let entry = context.entry_for(&chatbot_id).ok_or_else(|| {
        AppError::Forbidden(format!("no access entry for chatbot '{chatbot_id}'"))
    })?;

    let claims = build_claims(entry, &user);
    let token = state.sso_token_service.issue(&claims)?;
    let sso_url = state.sso_redirect.url_for(token.as_str());

    info!(
        subject = user.subject(),
        chatbot = %chatbot_id,
        "sso token issued"
    );

    Ok(Json(SsoTokenResponse { token, sso_url }))
}

/// Builds the claim set from the server-resolved entry and session identity.
fn build_claims(entry: ResolvedAccess, identity: &UserIdentity) -> SsoClaims {
    SsoClaims {
        chatbot_id: entry.chatbot_id,
        name: identity
            .display_name()
            .unwrap_or("User")
            .to_owned(),
        email: identity.email().unwrap_or_default().to_owned(),
        avatar: identity.avatar_url().unwrap_or_default().to_owned(),
        role: entry.role,
        permissions: entry.permissions,
    }
}
