use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use botgate_core::{ChatbotId, UserIdentity};
use botgate_domain::{Capability, PermissionSet};
use serde::Serialize;
use tracing::warn;

use crate::access_resolver::{AccessResolver, ResolvedAccess};

/// Outcome of the most recent resolution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionCondition {
    /// No resolution has completed yet. Distinguishable from a denial so
    /// callers can render a loading state instead of a refusal.
    Unresolved,
    /// The cache reflects directory state at fetch time.
    Resolved,
    /// The directory could not be reached; the cache is empty and every
    /// permission check fails closed.
    DirectoryUnavailable,
}

struct CacheSlot {
    generation: u64,
    entries: HashMap<ChatbotId, ResolvedAccess>,
    condition: ResolutionCondition,
}

/// Identity-scoped authorization view.
///
/// Owns the permission cache for exactly one session; it is never shared
/// across identities, so concurrent sessions cannot cross-contaminate. The
/// cache is a pure function of (identity, directory state at fetch time):
/// assignment mutations elsewhere become visible only through an explicit
/// [`AccessContext::refresh`].
pub struct AccessContext {
    subject: Option<String>,
    resolver: AccessResolver,
    ticket: AtomicU64,
    slot: RwLock<CacheSlot>,
}

impl AccessContext {
    /// Creates a context for the given identity, or an unauthenticated
    /// context when no identity is present.
    #[must_use]
    pub fn new(resolver: AccessResolver, identity: Option<&UserIdentity>) -> Self {
        Self {
            subject: identity.map(|identity| identity.subject().to_owned()),
            resolver,
            ticket: AtomicU64::new(0),
            slot: RwLock::new(CacheSlot {
                generation: 0,
                entries: HashMap::new(),
                condition: ResolutionCondition::Unresolved,
            }),
        }
    }

    /// Returns whether the context carries an authenticated identity.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.subject.is_some()
    }

    /// Re-resolves access entries and atomically replaces the cache.
    ///
    /// Concurrent refreshes race on a monotonic ticket taken at call start;
    /// a superseded refresh never overwrites the result of a newer one. On
    /// directory failure the cache commits empty (fail closed) with the
    /// `DirectoryUnavailable` condition.
    pub async fn refresh(&self) -> ResolutionCondition {
        let Some(subject) = self.subject.as_deref() else {
            return ResolutionCondition::Unresolved;
        };

        let ticket = self.ticket.fetch_add(1, Ordering::SeqCst) + 1;

        let (entries, condition) = match self.resolver.resolve(subject).await {
            Ok(resolved) => {
                let entries = resolved
                    .into_iter()
                    .map(|entry| (entry.chatbot_id.clone(), entry))
                    .collect();
                (entries, ResolutionCondition::Resolved)
            }
            Err(error) => {
                warn!(subject, %error, "access resolution failed; committing empty cache");
                (HashMap::new(), ResolutionCondition::DirectoryUnavailable)
            }
        };

        let mut slot = self
            .slot
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if ticket > slot.generation {
            slot.generation = ticket;
            slot.entries = entries;
            slot.condition = condition;
        }

        slot.condition
    }

    /// Returns whether the identity holds the capability on the chatbot.
    ///
    /// Never fails: unauthenticated, unresolved, and absent entries all
    /// answer `false`.
    #[must_use]
    pub fn has_permission(&self, chatbot_id: &ChatbotId, capability: Capability) -> bool {
        if self.subject.is_none() {
            return false;
        }

        self.read_slot()
            .entries
            .get(chatbot_id)
            .is_some_and(|entry| entry.permissions.allows(capability))
    }

    /// Returns the resolved permission set for the chatbot, if any.
    #[must_use]
    pub fn permissions_for(&self, chatbot_id: &ChatbotId) -> Option<PermissionSet> {
        self.read_slot()
            .entries
            .get(chatbot_id)
            .map(|entry| entry.permissions)
    }

    /// Returns the resolved access entry for the chatbot, if any.
    #[must_use]
    pub fn entry_for(&self, chatbot_id: &ChatbotId) -> Option<ResolvedAccess> {
        self.read_slot().entries.get(chatbot_id).cloned()
    }

    /// Returns all resolved access entries, ordered by chatbot id.
    #[must_use]
    pub fn entries(&self) -> Vec<ResolvedAccess> {
        let mut entries: Vec<ResolvedAccess> =
            self.read_slot().entries.values().cloned().collect();
        entries.sort_by(|left, right| left.chatbot_id.as_str().cmp(right.chatbot_id.as_str()));
        entries
    }

    /// Returns the condition of the most recent resolution.
    #[must_use]
    pub fn condition(&self) -> ResolutionCondition {
        self.read_slot().condition
    }

    fn read_slot(&self) -> RwLockReadGuard<'_, CacheSlot> {
        self.slot.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use botgate_domain::{Capability, RoleName};

    use super::{AccessContext, ResolutionCondition};
    use crate::access_resolver::AccessResolver;
    use crate::chatbot_registry::ChatbotRegistry;
    use crate::test_support::{FakeDirectory, chatbot_id, identity};

    fn context(directory: FakeDirectory, subject: Option<&str>) -> AccessContext {
        let resolver = AccessResolver::new(Arc::new(directory), ChatbotRegistry::default());
        let identity = subject.map(identity);
        AccessContext::new(resolver, identity.as_ref())
    }

    #[tokio::test]
    async fn refresh_populates_cache_from_directory() {
        let context = context(
            FakeDirectory::with_assignment("alice", "bot-1", "editor"),
            Some("alice"),
        );

        let condition = context.refresh().await;
        assert_eq!(condition, ResolutionCondition::Resolved);
        assert_eq!(
            context.permissions_for(&chatbot_id("bot-1")),
            Some(RoleName::Editor.permissions())
        );
    }

    #[tokio::test]
    async fn missing_assignment_fails_closed() {
        let context = context(
            FakeDirectory::with_assignment("alice", "bot-1", "editor"),
            Some("alice"),
        );
        context.refresh().await;

        let other = chatbot_id("bot-2");
        for capability in Capability::all() {
            assert!(!context.has_permission(&other, *capability));
        }
        assert_eq!(context.permissions_for(&other), None);
    }

    #[tokio::test]
    async fn unauthenticated_context_denies_everything() {
        let context = context(
            FakeDirectory::with_assignment("alice", "bot-1", "admin"),
            None,
        );

        assert_eq!(context.refresh().await, ResolutionCondition::Unresolved);
        assert!(!context.has_permission(&chatbot_id("bot-1"), Capability::Analytics));
    }

    #[tokio::test]
    async fn directory_outage_commits_empty_cache_with_condition() {
        let mut directory = FakeDirectory::with_assignment("alice", "bot-1", "admin");
        directory.offline = true;
        let context = context(directory, Some("alice"));

        let condition = context.refresh().await;
        assert_eq!(condition, ResolutionCondition::DirectoryUnavailable);
        assert!(context.entries().is_empty());
        for capability in Capability::all() {
            assert!(!context.has_permission(&chatbot_id("bot-1"), *capability));
        }
    }

    #[tokio::test]
    async fn unresolved_context_answers_false_without_failing() {
        let context = context(
            FakeDirectory::with_assignment("alice", "bot-1", "admin"),
            Some("alice"),
        );

        assert_eq!(context.condition(), ResolutionCondition::Unresolved);
        assert!(!context.has_permission(&chatbot_id("bot-1"), Capability::Analytics));
    }

    #[tokio::test]
    async fn superseded_refresh_never_overwrites_newer_result() {
        use std::sync::Arc;

        use async_trait::async_trait;
        use botgate_core::{AppResult, ChatbotId};
        use botgate_domain::RoleDefinition;
        use tokio::sync::Notify;

        use crate::directory_ports::{DirectoryAssignment, DirectoryRepository};
        use crate::test_support::assignment;

        struct GatedDirectory {
            release_first: Arc<Notify>,
            first_entered: Arc<Notify>,
            calls: std::sync::atomic::AtomicU64,
        }

        #[async_trait]
        impl DirectoryRepository for GatedDirectory {
            async fn get_role_definition(
                &self,
                _role_name: &str,
            ) -> AppResult<Option<RoleDefinition>> {
                Ok(None)
            }

            async fn list_assignments(
                &self,
                _subject: &str,
            ) -> AppResult<Vec<DirectoryAssignment>> {
                let call = self
                    .calls
                    .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                if call == 0 {
                    // First refresh: park until the second one has committed.
                    self.first_entered.notify_one();
                    self.release_first.notified().await;
                    Ok(vec![assignment("bot-1", "viewer")])
                } else {
                    Ok(vec![assignment("bot-1", "admin")])
                }
            }

            async fn upsert_assignment(
                &self,
                _subject: &str,
                _chatbot_id: &ChatbotId,
                _role: botgate_domain::RoleName,
                _assigned_by: &str,
            ) -> AppResult<()> {
                Ok(())
            }

            async fn delete_assignment(
                &self,
                _subject: &str,
                _chatbot_id: &ChatbotId,
            ) -> AppResult<()> {
                Ok(())
            }

            async fn replace_role_definitions(
                &self,
                _roles: &[RoleDefinition],
            ) -> AppResult<()> {
                Ok(())
            }
        }

        let release_first = Arc::new(Notify::new());
        let first_entered = Arc::new(Notify::new());
        let directory = GatedDirectory {
            release_first: release_first.clone(),
            first_entered: first_entered.clone(),
            calls: std::sync::atomic::AtomicU64::new(0),
        };
        let resolver = AccessResolver::new(Arc::new(directory), ChatbotRegistry::default());
        let actor = identity("alice");
        let context = Arc::new(AccessContext::new(resolver, Some(&actor)));

        let first = {
            let context = context.clone();
            tokio::spawn(async move { context.refresh().await })
        };
        first_entered.notified().await;

        // The newer refresh commits while the first is still in flight.
        context.refresh().await;
        let newer = context.entry_for(&chatbot_id("bot-1"));
        assert_eq!(newer.map(|entry| entry.role), Some("admin".to_owned()));

        release_first.notify_one();
        let _ = first.await;

        let after = context.entry_for(&chatbot_id("bot-1"));
        assert_eq!(after.map(|entry| entry.role), Some("admin".to_owned()));
    }
}
