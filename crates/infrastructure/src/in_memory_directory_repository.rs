use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use botgate_application::{DirectoryAssignment, DirectoryRepository};
use botgate_core::{AppError, AppResult, ChatbotId};
use botgate_domain::{RoleDefinition, RoleName};
use chrono::Utc;
use tokio::sync::RwLock;

/// In-memory access directory for tests and local development.
///
/// Supports taking the store offline so directory-outage behavior can be
/// exercised without a real backend.
#[derive(Default)]
pub struct InMemoryDirectoryRepository {
    roles: RwLock<HashMap<String, RoleDefinition>>,
    assignments: RwLock<HashMap<String, Vec<DirectoryAssignment>>>,
    offline: AtomicBool,
}

impl InMemoryDirectoryRepository {
    /// Creates an empty online directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches the directory between online and offline. While offline,
    /// every operation fails with `Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> AppResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::Unavailable(
                "in-memory directory is offline".to_owned(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl DirectoryRepository for InMemoryDirectoryRepository {
    async fn get_role_definition(&self, role_name: &str) -> AppResult<Option<RoleDefinition>> {
        self.check_online()?;
        Ok(self.roles.read().await.get(role_name).cloned())
    }

    async fn list_assignments(&self, subject: &str) -> AppResult<Vec<DirectoryAssignment>> {
        self.check_online()?;
        Ok(self
            .assignments
            .read()
            .await
            .get(subject)
            .cloned()
            .unwrap_or_default())
    }

    async fn upsert_assignment(
        &self,
        subject: &str,
        chatbot_id: &ChatbotId,
        role: RoleName,
        assigned_by: &str,
    ) -> AppResult<()> {
        self.check_online()?;
        let mut assignments = self.assignments.write().await;
        let entries = assignments.entry(subject.to_owned()).or_default();
        entries.retain(|entry| entry.chatbot_id != *chatbot_id);
        entries.push(DirectoryAssignment {
            chatbot_id: chatbot_id.clone(),
            role_name: role.as_str().to_owned(),
            assigned_at: Utc::now(),
            assigned_by: assigned_by.to_owned(),
        });
        Ok(())
    }

    async fn delete_assignment(&self, subject: &str, chatbot_id: &ChatbotId) -> AppResult<()> {
        self.check_online()?;
        let mut assignments = self.assignments.write().await;
        if let Some(entries) = assignments.get_mut(subject) {
            entries.retain(|entry| entry.chatbot_id != *chatbot_id);
            if entries.is_empty() {
                assignments.remove(subject);
            }
        }
        Ok(())
    }

    async fn replace_role_definitions(&self, roles: &[RoleDefinition]) -> AppResult<()> {
        self.check_online()?;
        let mut stored = self.roles.write().await;
        stored.clear();
        for role in roles {
            stored.insert(role.name.clone(), role.clone());
        }
        Ok(())
    }
}
