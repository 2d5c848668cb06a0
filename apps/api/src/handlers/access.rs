use axum::Json;
use axum::extract::{Extension, Path, State};
use botgate_application::{AccessContext, AccessGate};
use botgate_core::{ChatbotId, UserIdentity};
use botgate_domain::Visibility;

use crate::dto::{AccessOverviewResponse, ChatbotResponse, DecisionResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// Lists the registered chatbots visible to the caller.
///
/// Public chatbots are always listed; private ones only when the caller
/// holds an access entry for them.
pub async fn list_chatbots_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<ChatbotResponse>>> {
    let context = AccessContext::new(state.resolver.clone(), Some(&user));
    context.refresh().await;

    let chatbots = state
        .registry
        .profiles()
        .into_iter()
        .filter(|profile| {
            profile.visibility == Visibility::Public || context.entry_for(&profile.id).is_some()
        })
        .map(ChatbotResponse::from)
        .collect();

    Ok(Json(chatbots))
}

/// Resolves the caller's access across all registered chatbots.
pub async fn access_overview_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<AccessOverviewResponse>> {
    let context = AccessContext::new(state.resolver.clone(), Some(&user));
    let condition = context.refresh().await;

    Ok(Json(AccessOverviewResponse::new(
        condition,
        context.entries(),
    )))
}

/// Decides the caller's entry point for one chatbot.
pub async fn access_decision_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(chatbot_id): Path<String>,
) -> ApiResult<Json<DecisionResponse>> {
    let chatbot_id = ChatbotId::new(chatbot_id)?;

    let context = AccessContext::new(state.resolver.clone(), Some(&user));
    context.refresh().await;

    let decision = AccessGate::decide(&context, &chatbot_id);
    Ok(Json(DecisionResponse::from(decision)))
}
