use async_trait::async_trait;
use botgate_application::{DirectoryAssignment, DirectoryRepository};
use botgate_core::{AppError, AppResult, ChatbotId};
use botgate_domain::{PermissionSet, RoleDefinition, RoleName};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Postgres-backed access directory.
///
/// Store failures map to `Unavailable`: an unreachable directory must read
/// as zero access, never as a partial grant.
#[derive(Clone)]
pub struct PostgresDirectoryRepository {
    pool: PgPool,
}

impl PostgresDirectoryRepository {
    /// Creates the repository over a connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RoleRow {
    name: String,
    description: String,
    settings: bool,
    analytics: bool,
    chatbot_config: bool,
    user_management: bool,
}

impl From<RoleRow> for RoleDefinition {
    fn from(row: RoleRow) -> Self {
        Self {
            name: row.name,
            description: row.description,
            permissions: PermissionSet {
                settings: row.settings,
                analytics: row.analytics,
                chatbot_config: row.chatbot_config,
                user_management: row.user_management,
            },
        }
    }
}

#[derive(sqlx::FromRow)]
struct AssignmentRow {
    chatbot_id: String,
    role_name: String,
    assigned_at: DateTime<Utc>,
    assigned_by: String,
}

impl TryFrom<AssignmentRow> for DirectoryAssignment {
    type Error = AppError;

    fn try_from(row: AssignmentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            chatbot_id: ChatbotId::new(row.chatbot_id)?,
            role_name: row.role_name,
            assigned_at: row.assigned_at,
            assigned_by: row.assigned_by,
        })
    }
}

fn unavailable(operation: &str) -> impl FnOnce(sqlx::Error) -> AppError + '_ {
    move |error| AppError::Unavailable(format!("directory {operation} failed: {error}"))
}

#[async_trait]
impl DirectoryRepository for PostgresDirectoryRepository {
    async fn get_role_definition(&self, role_name: &str) -> AppResult<Option<RoleDefinition>> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT name, description, settings, analytics, chatbot_config, user_management
            FROM directory_roles
            WHERE name = $1
            "#,
        )
        .bind(role_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable("role read"))?;

        Ok(row.map(RoleDefinition::from))
    }

    async fn list_assignments(&self, subject: &str) -> AppResult<Vec<DirectoryAssignment>> {
        let rows = sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT chatbot_id, role_name, assigned_at, assigned_by
            FROM directory_role_assignments
            WHERE subject = $1
            "#,
        )
        .bind(subject)
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable("assignment read"))?;

        rows.into_iter().map(DirectoryAssignment::try_from).collect()
    }

    async fn upsert_assignment(
        &self,
        subject: &str,
        chatbot_id: &ChatbotId,
        role: RoleName,
        assigned_by: &str,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO directory_role_assignments
                (subject, chatbot_id, role_name, assigned_at, assigned_by)
            VALUES ($1, $2, $3, now(), $4)
            ON CONFLICT (subject, chatbot_id) DO UPDATE
                SET role_name = EXCLUDED.role_name,
                    assigned_at = EXCLUDED.assigned_at,
                    assigned_by = EXCLUDED.assigned_by
            "#,
        )
        .bind(subject)
        .bind(chatbot_id.as_str())
        .bind(role.as_str())
        .bind(assigned_by)
        .execute(&self.pool)
        .await
        .map_err(unavailable("assignment write"))?;

        Ok(())
    }

    async fn delete_assignment(&self, subject: &str, chatbot_id: &ChatbotId) -> AppResult<()> {
        sqlx::query(
            r#"
            DELETE FROM directory_role_assignments
            WHERE subject = $1 AND chatbot_id = $2
            "#,
        )
        .bind(subject)
        .bind(chatbot_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(unavailable("assignment delete"))?;

        Ok(())
    }

    async fn replace_role_definitions(&self, roles: &[RoleDefinition]) -> AppResult<()> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(unavailable("transaction begin"))?;

        let names: Vec<String> = roles.iter().map(|role| role.name.clone()).collect();
        sqlx::query("DELETE FROM directory_roles WHERE name <> ALL($1)")
            .bind(&names)
            .execute(&mut *transaction)
            .await
            .map_err(unavailable("role prune"))?;

        for role in roles {
            sqlx::query(
                r#"
                INSERT INTO directory_roles
                    (name, description, settings, analytics, chatbot_config, user_management)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (name) DO UPDATE
                    SET description = EXCLUDED.description,
                        settings = EXCLUDED.settings,
                        analytics = EXCLUDED.analytics,
                        chatbot_config = EXCLUDED.chatbot_config,
                        user_management = EXCLUDED.user_management
                "#,
            )
            .bind(role.name.as_str())
            .bind(role.description.as_str())
            .bind(role.permissions.settings)
            .bind(role.permissions.analytics)
            .bind(role.permissions.chatbot_config)
            .bind(role.permissions.user_management)
            .execute(&mut *transaction)
            .await
            .map_err(unavailable("role write"))?;
        }

        transaction
            .commit()
            .await
            .map_err(unavailable("transaction commit"))?;

        Ok(())
    }
}
