use botgate_core::ChatbotId;
use serde::{Deserialize, Serialize};

/// Listing visibility of a hosted chatbot instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Listed for every authenticated user.
    Public,
    /// Listed only for users with an assignment.
    Private,
}

/// Display metadata for an externally hosted chatbot instance.
///
/// Owned by the hosting platform; the core only references the id when
/// resolving access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatbotProfile {
    /// Opaque identifier on the hosting platform.
    pub id: ChatbotId,
    /// Display name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Avatar or logo URL.
    pub image_url: String,
    /// Listing visibility.
    pub visibility: Visibility,
}
