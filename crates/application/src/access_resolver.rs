use std::str::FromStr;
use std::sync::Arc;

use botgate_core::{AppError, AppResult, ChatbotId};
use botgate_domain::{PermissionSet, RoleName};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::warn;

use crate::chatbot_registry::ChatbotRegistry;
use crate::directory_ports::{DirectoryAssignment, DirectoryRepository};

/// Derived, read-only projection of one (identity, chatbot) grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAccess {
    /// Chatbot the entry grants access to.
    pub chatbot_id: ChatbotId,
    /// Display name from the chatbot registry.
    pub chatbot_name: String,
    /// Stored role name for the assignment.
    pub role: String,
    /// Effective capabilities for the assignment.
    pub permissions: PermissionSet,
}

/// Resolves the full set of access entries for one identity.
///
/// The canonical role catalog is consulted first; the directory's role
/// document is a fallback for role names the catalog does not know. A
/// role unknown to both resolves to the empty permission set.
#[derive(Clone)]
pub struct AccessResolver {
    directory: Arc<dyn DirectoryRepository>,
    registry: ChatbotRegistry,
}

impl AccessResolver {
    /// Creates a resolver over a directory client and chatbot registry.
    #[must_use]
    pub fn new(directory: Arc<dyn DirectoryRepository>, registry: ChatbotRegistry) -> Self {
        Self {
            directory,
            registry,
        }
    }

    /// Resolves every assignment for the subject into access entries.
    ///
    /// Per-assignment lookups fan out concurrently but only the fully
    /// assembled result is returned. Any directory failure fails the whole
    /// resolution; partial results are never surfaced.
    pub async fn resolve(&self, subject: &str) -> AppResult<Vec<ResolvedAccess>> {
        let assignments = self.directory.list_assignments(subject).await?;

        let mut join_set = JoinSet::new();
        for assignment in assignments {
            let directory = self.directory.clone();
            let chatbot_name = self.registry.display_name(&assignment.chatbot_id);
            join_set
                .spawn(async move { resolve_entry(directory, assignment, chatbot_name).await });
        }

        let mut entries = Vec::with_capacity(join_set.len());
        while let Some(joined) = join_set.join_next().await {
            let entry = joined
                .map_err(|error| AppError::Internal(format!("resolution task failed: {error}")))??;
            entries.push(entry);
        }

        entries.sort_by(|left, right| left.chatbot_id.as_str().cmp(right.chatbot_id.as_str()));
        Ok(entries)
    }
}

async fn resolve_entry(
    directory: Arc<dyn DirectoryRepository>,
    assignment: DirectoryAssignment,
    chatbot_name: String,
) -> AppResult<ResolvedAccess> {
    let permissions = match RoleName::from_str(assignment.role_name.as_str()) {
        Ok(role) => role.permissions(),
        Err(_) => match directory
            .get_role_definition(assignment.role_name.as_str())
            .await?
        {
            Some(definition) => definition.permissions,
            None => {
                warn!(
                    role = assignment.role_name.as_str(),
                    chatbot = %assignment.chatbot_id,
                    "assignment references a role unknown to catalog and directory"
                );
                PermissionSet::none()
            }
        },
    };

    Ok(ResolvedAccess {
        chatbot_id: assignment.chatbot_id,
        chatbot_name,
        role: assignment.role_name,
        permissions,
    })
}
