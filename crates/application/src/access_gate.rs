use std::str::FromStr;

use botgate_core::{AppError, AppResult, ChatbotId};
use botgate_domain::{Capability, RoleName};
use serde::Serialize;

use crate::access_context::{AccessContext, ResolutionCondition};

/// Degraded entry point granted to non-admin roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "view")]
pub enum DegradedTarget {
    /// Analytics-only view for the chatbot.
    Analytics,
    /// Management view; the configuration tab is present only when the
    /// chatbot configuration capability holds.
    Management {
        /// Whether the configuration tab is shown.
        config_tab: bool,
    },
}

/// Routing decision for one (identity, chatbot) interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "decision")]
pub enum AccessDecision {
    /// No authenticated identity; redirect to sign-in.
    SignInRequired,
    /// Identity present but the analytics floor capability is absent.
    /// Surfaced explicitly, never as a silent redirect.
    Denied,
    /// Role-limited entry into a reduced view.
    Degraded(DegradedTarget),
    /// Full access to the external dashboard via token issuance.
    Full,
}

/// Policy layer translating permission checks into routing decisions.
///
/// Evaluation order is significant: the analytics capability is the floor
/// gating any interaction; the resolved role then sets the ceiling.
pub struct AccessGate;

impl AccessGate {
    /// Decides the entry point for the identity behind `context` on one
    /// chatbot.
    #[must_use]
    pub fn decide(context: &AccessContext, chatbot_id: &ChatbotId) -> AccessDecision {
        if !context.is_authenticated() {
            return AccessDecision::SignInRequired;
        }

        let Some(entry) = context.entry_for(chatbot_id) else {
            return AccessDecision::Denied;
        };

        if !entry.permissions.allows(Capability::Analytics) {
            return AccessDecision::Denied;
        }

        match RoleName::from_str(entry.role.as_str()) {
            Ok(RoleName::Viewer) => AccessDecision::Degraded(DegradedTarget::Analytics),
            Ok(RoleName::Editor) => AccessDecision::Degraded(DegradedTarget::Management {
                config_tab: entry.permissions.chatbot_config,
            }),
            Ok(RoleName::Admin) => AccessDecision::Full,
            // Roles outside the catalog get the floor view only.
            Err(_) => AccessDecision::Degraded(DegradedTarget::Analytics),
        }
    }

    /// Requires the identity to hold a capability on the chatbot.
    ///
    /// Used to guard mutations such as role administration. A directory
    /// outage is reported as `Unavailable` so diagnostics can distinguish
    /// it from a policy denial; both are presented identically to users.
    pub fn require_capability(
        context: &AccessContext,
        chatbot_id: &ChatbotId,
        capability: Capability,
    ) -> AppResult<()> {
        if !context.is_authenticated() {
            return Err(AppError::Unauthorized(
                "authentication required".to_owned(),
            ));
        }

        if context.has_permission(chatbot_id, capability) {
            return Ok(());
        }

        if context.condition() == ResolutionCondition::DirectoryUnavailable {
            return Err(AppError::Unavailable(
                "access could not be resolved".to_owned(),
            ));
        }

        Err(AppError::Forbidden(format!(
            "missing capability '{}' on chatbot '{chatbot_id}'",
            capability.as_str()
        )))
    }
}
