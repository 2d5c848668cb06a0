use std::sync::Arc;

use botgate_core::{AppError, AppResult, ChatbotId, UserIdentity};
use botgate_domain::{Capability, RoleName};
use tracing::info;

use crate::access_context::AccessContext;
use crate::access_gate::AccessGate;
use crate::directory_ports::{DirectoryAssignment, DirectoryRepository};

/// Role administration surface over the access directory.
///
/// Every mutation is guarded by the access gate: the actor must hold the
/// user management capability on the target chatbot. Mutations never touch
/// a resolution cache; callers observe them only after an explicit refresh.
#[derive(Clone)]
pub struct RoleAdminService {
    directory: Arc<dyn DirectoryRepository>,
}

impl RoleAdminService {
    /// Creates the service over a directory client.
    #[must_use]
    pub fn new(directory: Arc<dyn DirectoryRepository>) -> Self {
        Self { directory }
    }

    /// Assigns a role to a subject for one chatbot.
    pub async fn assign_role(
        &self,
        actor: &UserIdentity,
        context: &AccessContext,
        subject: &str,
        chatbot_id: &ChatbotId,
        role: RoleName,
    ) -> AppResult<()> {
        AccessGate::require_capability(context, chatbot_id, Capability::UserManagement)?;

        if subject.trim().is_empty() {
            return Err(AppError::Validation("subject must not be empty".to_owned()));
        }

        self.directory
            .upsert_assignment(subject, chatbot_id, role, actor.subject())
            .await?;

        info!(
            actor = actor.subject(),
            subject,
            chatbot = %chatbot_id,
            role = role.as_str(),
            "role assigned"
        );
        Ok(())
    }

    /// Revokes the subject's assignment for one chatbot.
    pub async fn revoke_role(
        &self,
        actor: &UserIdentity,
        context: &AccessContext,
        subject: &str,
        chatbot_id: &ChatbotId,
    ) -> AppResult<()> {
        AccessGate::require_capability(context, chatbot_id, Capability::UserManagement)?;

        self.directory.delete_assignment(subject, chatbot_id).await?;

        info!(
            actor = actor.subject(),
            subject,
            chatbot = %chatbot_id,
            "role assignment revoked"
        );
        Ok(())
    }

    /// Lists another subject's assignments, limited to chatbots the actor
    /// manages.
    pub async fn list_assignments_for(
        &self,
        context: &AccessContext,
        subject: &str,
    ) -> AppResult<Vec<DirectoryAssignment>> {
        if !context.is_authenticated() {
            return Err(AppError::Unauthorized(
                "authentication required".to_owned(),
            ));
        }

        let managed: Vec<ChatbotId> = context
            .entries()
            .into_iter()
            .filter(|entry| entry.permissions.user_management)
            .map(|entry| entry.chatbot_id)
            .collect();

        if managed.is_empty() {
            return Err(AppError::Forbidden(
                "user management capability required".to_owned(),
            ));
        }

        let mut assignments = self.directory.list_assignments(subject).await?;
        assignments.retain(|assignment| managed.contains(&assignment.chatbot_id));
        Ok(assignments)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use botgate_core::AppError;
    use botgate_domain::RoleName;

    use super::RoleAdminService;
    use crate::access_context::AccessContext;
    use crate::directory_ports::DirectoryRepository;
    use crate::access_resolver::AccessResolver;
    use crate::chatbot_registry::ChatbotRegistry;
    use crate::test_support::{FakeDirectory, chatbot_id, identity};

    async fn admin_setup(
        actor_role: &str,
    ) -> (Arc<FakeDirectory>, RoleAdminService, AccessContext) {
        let directory = Arc::new(FakeDirectory::with_assignment(
            "admin-1", "bot-1", actor_role,
        ));
        let resolver =
            AccessResolver::new(directory.clone(), ChatbotRegistry::default());
        let actor = identity("admin-1");
        let context = AccessContext::new(resolver, Some(&actor));
        context.refresh().await;
        (directory.clone(), RoleAdminService::new(directory), context)
    }

    #[tokio::test]
    async fn admin_can_assign_and_change_becomes_visible_after_refresh() {
        let (directory, service, context) = admin_setup("admin").await;
        let actor = identity("admin-1");

        let outcome = service
            .assign_role(
                &actor,
                &context,
                "ursula",
                &chatbot_id("bot-1"),
                RoleName::Editor,
            )
            .await;
        assert!(outcome.is_ok());

        // The mutation is not visible through any cache until refresh.
        let resolver =
            AccessResolver::new(directory, ChatbotRegistry::default());
        let target = identity("ursula");
        let target_context = AccessContext::new(resolver, Some(&target));
        assert!(target_context.permissions_for(&chatbot_id("bot-1")).is_none());

        target_context.refresh().await;
        assert_eq!(
            target_context.permissions_for(&chatbot_id("bot-1")),
            Some(RoleName::Editor.permissions())
        );
    }

    #[tokio::test]
    async fn editor_cannot_administer_roles() {
        let (_, service, context) = admin_setup("editor").await;
        let actor = identity("admin-1");

        let outcome = service
            .assign_role(
                &actor,
                &context,
                "ursula",
                &chatbot_id("bot-1"),
                RoleName::Viewer,
            )
            .await;
        assert!(matches!(outcome, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn revoke_removes_the_assignment() {
        let (directory, service, context) = admin_setup("admin").await;
        let actor = identity("admin-1");

        let assigned = service
            .assign_role(
                &actor,
                &context,
                "ursula",
                &chatbot_id("bot-1"),
                RoleName::Viewer,
            )
            .await;
        assert!(assigned.is_ok());

        let revoked = service
            .revoke_role(&actor, &context, "ursula", &chatbot_id("bot-1"))
            .await;
        assert!(revoked.is_ok());

        let resolver =
            AccessResolver::new(directory, ChatbotRegistry::default());
        let target = identity("ursula");
        let target_context = AccessContext::new(resolver, Some(&target));
        target_context.refresh().await;
        assert!(target_context.entries().is_empty());
    }

    #[tokio::test]
    async fn listing_is_scoped_to_managed_chatbots() {
        let (directory, service, context) = admin_setup("admin").await;
        let actor = identity("admin-1");

        let assigned = service
            .assign_role(
                &actor,
                &context,
                "ursula",
                &chatbot_id("bot-1"),
                RoleName::Viewer,
            )
            .await;
        assert!(assigned.is_ok());

        // An assignment on a chatbot the actor does not manage.
        let other = directory
            .upsert_assignment("ursula", &chatbot_id("bot-2"), RoleName::Admin, "someone")
            .await;
        assert!(other.is_ok());

        let listed = service.list_assignments_for(&context, "ursula").await;
        let Ok(listed) = listed else {
            panic!("listing succeeds");
        };
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].chatbot_id, chatbot_id("bot-1"));
    }

    #[tokio::test]
    async fn listing_requires_a_managed_chatbot() {
        let (_, service, context) = admin_setup("viewer").await;

        let outcome = service.list_assignments_for(&context, "ursula").await;
        assert!(matches!(outcome, Err(AppError::Forbidden(_))));
    }
}
