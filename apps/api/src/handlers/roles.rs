use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use botgate_application::AccessContext;
use botgate_core::{ChatbotId, UserIdentity};
use botgate_domain::{RoleName, catalog_roles};

use crate::dto::{AssignRoleRequest, AssignmentResponse, RoleResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// Lists the canonical role catalog.
pub async fn list_roles_handler() -> Json<Vec<RoleResponse>> {
    let roles = catalog_roles().into_iter().map(RoleResponse::from).collect();
    Json(roles)
}

/// Lists a subject's assignments on chatbots the caller manages.
pub async fn list_assignments_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(subject): Path<String>,
) -> ApiResult<Json<Vec<AssignmentResponse>>> {
    let context = AccessContext::new(state.resolver.clone(), Some(&user));
    context.refresh().await;

    let assignments = state
        .role_admin_service
        .list_assignments_for(&context, subject.as_str())
        .await?
        .into_iter()
        .map(AssignmentResponse::from)
        .collect();

    Ok(Json(assignments))
}

/// Assigns a catalog role to a subject for one chatbot.
pub async fn assign_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(chatbot_id): Path<String>,
    Json(payload): Json<AssignRoleRequest>,
) -> ApiResult<StatusCode> {
    let chatbot_id = ChatbotId::new(chatbot_id)?;
    let role = RoleName::from_str(payload.role_name.as_str())?;

    let context = AccessContext::new(state.resolver.clone(), Some(&user));
    context.refresh().await;

    state
        .role_admin_service
        .assign_role(&user, &context, payload.subject.as_str(), &chatbot_id, role)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Revokes a subject's assignment for one chatbot.
pub async fn revoke_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((chatbot_id, subject)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let chatbot_id = ChatbotId::new(chatbot_id)?;

    let context = AccessContext::new(state.resolver.clone(), Some(&user));
    context.refresh().await;

    state
        .role_admin_service
        .revoke_role(&user, &context, subject.as_str(), &chatbot_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
