use std::str::FromStr;

use botgate_application::{
    AccessDecision, DegradedTarget, DirectoryAssignment, ResolutionCondition, ResolvedAccess,
};
use botgate_core::UserIdentity;
use botgate_domain::{
    Capability, ChatbotProfile, PermissionSet, RoleDefinition, RoleName, Visibility,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Incoming identity-provider hand-off establishing a session.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-session-request.ts"
)]
pub struct CreateSessionRequest {
    pub provider_token: String,
    pub subject: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

/// API representation of the authenticated user.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-response.ts"
)]
pub struct UserResponse {
    pub subject: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<&UserIdentity> for UserResponse {
    fn from(identity: &UserIdentity) -> Self {
        Self {
            subject: identity.subject().to_owned(),
            display_name: identity.display_name().map(str::to_owned),
            email: identity.email().map(str::to_owned),
            avatar_url: identity.avatar_url().map(str::to_owned),
        }
    }
}

/// API representation of a registered chatbot.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/chatbot-response.ts"
)]
pub struct ChatbotResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub visibility: String,
}

impl From<ChatbotProfile> for ChatbotResponse {
    fn from(profile: ChatbotProfile) -> Self {
        let visibility = match profile.visibility {
            Visibility::Public => "public",
            Visibility::Private => "private",
        };

        Self {
            id: profile.id.as_str().to_owned(),
            name: profile.name,
            description: profile.description,
            image_url: profile.image_url,
            visibility: visibility.to_owned(),
        }
    }
}

/// API representation of one resolved access entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/access-entry-response.ts"
)]
pub struct AccessEntryResponse {
    pub chatbot_id: String,
    pub chatbot_name: String,
    pub role: String,
    pub settings: bool,
    pub analytics: bool,
    pub chatbot_config: bool,
    pub user_management: bool,
}

impl From<ResolvedAccess> for AccessEntryResponse {
    fn from(entry: ResolvedAccess) -> Self {
        Self {
            chatbot_id: entry.chatbot_id.as_str().to_owned(),
            chatbot_name: entry.chatbot_name,
            role: entry.role,
            settings: entry.permissions.settings,
            analytics: entry.permissions.analytics,
            chatbot_config: entry.permissions.chatbot_config,
            user_management: entry.permissions.user_management,
        }
    }
}

/// API representation of the full resolved access view.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/access-overview-response.ts"
)]
pub struct AccessOverviewResponse {
    pub condition: String,
    pub entries: Vec<AccessEntryResponse>,
}

impl AccessOverviewResponse {
    pub fn new(condition: ResolutionCondition, entries: Vec<ResolvedAccess>) -> Self {
        let condition = match condition {
            ResolutionCondition::Unresolved => "unresolved",
            ResolutionCondition::Resolved => "resolved",
            ResolutionCondition::DirectoryUnavailable => "directory_unavailable",
        };

        Self {
            condition: condition.to_owned(),
            entries: entries.into_iter().map(AccessEntryResponse::from).collect(),
        }
    }
}

/// API representation of a gate decision.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/decision-response.ts"
)]
pub struct DecisionResponse {
    pub decision: String,
    pub view: Option<String>,
    pub config_tab: Option<bool>,
}

impl From<AccessDecision> for DecisionResponse {
    fn from(decision: AccessDecision) -> Self {
        match decision {
            AccessDecision::SignInRequired => Self {
                decision: "sign_in_required".to_owned(),
                view: None,
                config_tab: None,
            },
            AccessDecision::Denied => Self {
                decision: "denied".to_owned(),
                view: None,
                config_tab: None,
            },
            AccessDecision::Degraded(DegradedTarget::Analytics) => Self {
                decision: "degraded".to_owned(),
                view: Some("analytics".to_owned()),
                config_tab: None,
            },
            AccessDecision::Degraded(DegradedTarget::Management { config_tab }) => Self {
                decision: "degraded".to_owned(),
                view: Some("management".to_owned()),
                config_tab: Some(config_tab),
            },
            AccessDecision::Full => Self {
                decision: "full".to_owned(),
                view: None,
                config_tab: None,
            },
        }
    }
}

/// Incoming payload for SSO token issuance.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/sso-token-request.ts"
)]
pub struct SsoTokenRequest {
    pub chatbot_id: String,
}

/// Issued token and the dashboard entry URL carrying it.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/sso-token-response.ts"
)]
pub struct SsoTokenResponse {
    pub token: String,
    pub sso_url: String,
}

/// API representation of a catalog role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub name: String,
    pub label: String,
    pub description: String,
    pub permissions: Vec<String>,
    pub permission_labels: Vec<String>,
}

impl From<RoleDefinition> for RoleResponse {
    fn from(definition: RoleDefinition) -> Self {
        let label = RoleName::from_str(definition.name.as_str())
            .map(|role| role.label().to_owned())
            .unwrap_or_else(|_| definition.name.clone());

        Self {
            label,
            permissions: granted_capabilities(definition.permissions, Capability::as_str),
            permission_labels: granted_capabilities(definition.permissions, Capability::label),
            name: definition.name,
            description: definition.description,
        }
    }
}

/// API representation of a role assignment.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assignment-response.ts"
)]
pub struct AssignmentResponse {
    pub chatbot_id: String,
    pub role_name: String,
    pub assigned_at: String,
    pub assigned_by: String,
}

impl From<DirectoryAssignment> for AssignmentResponse {
    fn from(assignment: DirectoryAssignment) -> Self {
        Self {
            chatbot_id: assignment.chatbot_id.as_str().to_owned(),
            role_name: assignment.role_name,
            assigned_at: assignment.assigned_at.to_rfc3339(),
            assigned_by: assignment.assigned_by,
        }
    }
}

/// Incoming payload for role assignment.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assign-role-request.ts"
)]
pub struct AssignRoleRequest {
    pub subject: String,
    pub role_name: String,
}

fn granted_capabilities(
    permissions: PermissionSet,
    render: fn(&Capability) -> &'static str,
) -> Vec<String> {
    Capability::all()
        .iter()
        .filter(|capability| permissions.allows(**capability))
        .map(|capability| render(capability).to_owned())
        .collect()
}
