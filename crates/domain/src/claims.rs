use botgate_core::ChatbotId;
use serde::{Deserialize, Serialize};

use crate::PermissionSet;

/// Claim set signed into a bearer token for the external dashboard.
///
/// Constructed fresh per issuance from a resolved access entry and the
/// session identity, and never persisted. Field names follow the wire shape
/// the dashboard verifies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsoClaims {
    /// Chatbot the session is scoped to.
    pub chatbot_id: ChatbotId,
    /// Display name of the authenticated user.
    pub name: String,
    /// Email of the authenticated user, empty when the provider has none.
    pub email: String,
    /// Avatar URL shown inside the dashboard.
    pub avatar: String,
    /// Role name resolved at issuance time.
    pub role: String,
    /// Resolved permissions at issuance time.
    pub permissions: PermissionSet,
}
