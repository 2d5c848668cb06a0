use async_trait::async_trait;
use botgate_core::{AppResult, ChatbotId};
use botgate_domain::{RoleDefinition, RoleName};
use chrono::{DateTime, Utc};

/// Role assignment row as stored in the access directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryAssignment {
    /// Chatbot the assignment grants access to.
    pub chatbot_id: ChatbotId,
    /// Stored role name. Usually one of the catalog roles, but the directory
    /// may hold names the catalog does not know.
    pub role_name: String,
    /// Assignment timestamp.
    pub assigned_at: DateTime<Utc>,
    /// Subject that created the assignment.
    pub assigned_by: String,
}

/// Client contract for the externally owned access directory.
///
/// Operations carry no built-in retry; callers decide retry policy. Store
/// failures surface as [`botgate_core::AppError::Unavailable`].
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    /// Fetches the denormalized role document for a role name.
    async fn get_role_definition(&self, role_name: &str) -> AppResult<Option<RoleDefinition>>;

    /// Lists all role assignments for a subject. Unordered, may be empty.
    async fn list_assignments(&self, subject: &str) -> AppResult<Vec<DirectoryAssignment>>;

    /// Creates or replaces the single assignment for (subject, chatbot).
    async fn upsert_assignment(
        &self,
        subject: &str,
        chatbot_id: &ChatbotId,
        role: RoleName,
        assigned_by: &str,
    ) -> AppResult<()>;

    /// Deletes the assignment for (subject, chatbot) if present.
    async fn delete_assignment(&self, subject: &str, chatbot_id: &ChatbotId) -> AppResult<()>;

    /// Replaces the directory's denormalized role documents with the given
    /// definitions.
    async fn replace_role_definitions(&self, roles: &[RoleDefinition]) -> AppResult<()>;
}
