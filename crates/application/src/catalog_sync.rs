use botgate_core::AppResult;
use botgate_domain::catalog_roles;
use tracing::{info, warn};

use crate::directory_ports::DirectoryRepository;

/// Reconciles the directory's denormalized role documents with the
/// canonical role catalog.
///
/// The catalog is the single source of truth; drifted or missing directory
/// documents are reported and then rewritten from the catalog. Run at
/// startup and whenever the catalog changes.
pub async fn reconcile_role_catalog(directory: &dyn DirectoryRepository) -> AppResult<()> {
    let canonical = catalog_roles();

    for role in &canonical {
        match directory.get_role_definition(role.name.as_str()).await? {
            Some(stored) if stored.permissions == role.permissions => {}
            Some(_) => warn!(
                role = role.name.as_str(),
                "directory role document drifted from catalog; rewriting"
            ),
            None => info!(
                role = role.name.as_str(),
                "directory role document missing; writing catalog copy"
            ),
        }
    }

    directory.replace_role_definitions(&canonical).await
}

#[cfg(test)]
mod tests {
    use botgate_domain::{PermissionSet, RoleDefinition, RoleName};

    use super::reconcile_role_catalog;
    use crate::directory_ports::DirectoryRepository;
    use crate::test_support::FakeDirectory;

    #[tokio::test]
    async fn drifted_document_is_rewritten_from_catalog() {
        let directory = FakeDirectory::empty();
        if let Ok(mut documents) = directory.role_documents.try_lock() {
            documents.insert(
                "viewer".to_owned(),
                RoleDefinition {
                    name: "viewer".to_owned(),
                    description: "Read-only access".to_owned(),
                    // Drifted: viewer must never hold settings.
                    permissions: PermissionSet {
                        settings: true,
                        analytics: true,
                        chatbot_config: false,
                        user_management: false,
                    },
                },
            );
        }

        let outcome = reconcile_role_catalog(&directory).await;
        assert!(outcome.is_ok());

        let stored = directory.get_role_definition("viewer").await;
        let Ok(Some(stored)) = stored else {
            panic!("viewer document present after reconcile");
        };
        assert_eq!(stored.permissions, RoleName::Viewer.permissions());
    }

    #[tokio::test]
    async fn reconcile_writes_every_catalog_role() {
        let directory = FakeDirectory::empty();

        let outcome = reconcile_role_catalog(&directory).await;
        assert!(outcome.is_ok());

        for role in RoleName::all() {
            let stored = directory.get_role_definition(role.as_str()).await;
            let Ok(Some(stored)) = stored else {
                panic!("catalog role persisted");
            };
            assert_eq!(stored.permissions, role.permissions());
        }
    }
}
