//! Shared fakes for application service tests.

use std::collections::HashMap;

use async_trait::async_trait;
use botgate_core::{AppError, AppResult, ChatbotId, UserIdentity};
use botgate_domain::{RoleDefinition, RoleName};
use chrono::Utc;
use tokio::sync::Mutex;

use crate::directory_ports::{DirectoryAssignment, DirectoryRepository};

/// In-test directory fake with mutable state and an offline toggle.
pub(crate) struct FakeDirectory {
    pub assignments: Mutex<HashMap<String, Vec<DirectoryAssignment>>>,
    pub role_documents: Mutex<HashMap<String, RoleDefinition>>,
    pub offline: bool,
}

impl FakeDirectory {
    pub(crate) fn empty() -> Self {
        Self {
            assignments: Mutex::new(HashMap::new()),
            role_documents: Mutex::new(HashMap::new()),
            offline: false,
        }
    }

    pub(crate) fn with_assignment(subject: &str, chatbot: &str, role_name: &str) -> Self {
        let directory = Self::empty();
        if let Ok(mut assignments) = directory.assignments.try_lock() {
            assignments.insert(subject.to_owned(), vec![assignment(chatbot, role_name)]);
        }
        directory
    }

    fn check_online(&self) -> AppResult<()> {
        if self.offline {
            return Err(AppError::Unavailable("store offline".to_owned()));
        }
        Ok(())
    }
}

pub(crate) fn assignment(chatbot: &str, role_name: &str) -> DirectoryAssignment {
    DirectoryAssignment {
        chatbot_id: chatbot_id(chatbot),
        role_name: role_name.to_owned(),
        assigned_at: Utc::now(),
        assigned_by: "admin-1".to_owned(),
    }
}

pub(crate) fn chatbot_id(value: &str) -> ChatbotId {
    let Ok(id) = ChatbotId::new(value) else {
        panic!("valid chatbot id");
    };
    id
}

pub(crate) fn identity(subject: &str) -> UserIdentity {
    UserIdentity::new(
        subject,
        Some(format!("{subject} name")),
        Some(format!("{subject}@example.com")),
        None,
    )
}

#[async_trait]
impl DirectoryRepository for FakeDirectory {
    async fn get_role_definition(&self, role_name: &str) -> AppResult<Option<RoleDefinition>> {
        self.check_online()?;
        Ok(self.role_documents.lock().await.get(role_name).cloned())
    }

    async fn list_assignments(&self, subject: &str) -> AppResult<Vec<DirectoryAssignment>> {
        self.check_online()?;
        Ok(self
            .assignments
            .lock()
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
        let mut assignments = self.assignments.lock().await;
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
        let mut assignments = self.assignments.lock().await;
        if let Some(entries) = assignments.get_mut(subject) {
            entries.retain(|entry| entry.chatbot_id != *chatbot_id);
        }
        Ok(())
    }

    async fn replace_role_definitions(&self, roles: &[RoleDefinition]) -> AppResult<()> {
        self.check_online()?;
        let mut documents = self.role_documents.lock().await;
        documents.clear();
        for role in roles {
            documents.insert(role.name.clone(), role.clone());
        }
        Ok(())
    }
}
