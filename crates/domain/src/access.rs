use std::str::FromStr;

use botgate_core::AppError;
use serde::{Deserialize, Serialize};

/// Capabilities enforced by access policy checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Allows changing chatbot settings.
    Settings,
    /// Allows viewing analytics and reports. The floor capability for any
    /// interaction with a chatbot.
    Analytics,
    /// Allows editing chatbot configuration.
    ChatbotConfig,
    /// Allows managing role assignments for a chatbot.
    UserManagement,
}

impl Capability {
    /// Returns a stable storage value for this capability.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Settings => "settings",
            Self::Analytics => "analytics",
            Self::ChatbotConfig => "chatbot_config",
            Self::UserManagement => "user_management",
        }
    }

    /// Returns a human-readable label for administrative views.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Settings => "Settings",
            Self::Analytics => "Analytics & Reports",
            Self::ChatbotConfig => "Chatbot Configuration",
            Self::UserManagement => "User Management",
        }
    }

    /// Returns all known capabilities.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Capability] = &[
            Capability::Settings,
            Capability::Analytics,
            Capability::ChatbotConfig,
            Capability::UserManagement,
        ];

        ALL
    }
}

impl FromStr for Capability {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "settings" => Ok(Self::Settings),
            "analytics" => Ok(Self::Analytics),
            "chatbot_config" => Ok(Self::ChatbotConfig),
            "user_management" => Ok(Self::UserManagement),
            _ => Err(AppError::Validation(format!(
                "unknown capability value '{value}'"
            ))),
        }
    }
}

/// Four independent boolean capabilities granted by a role.
///
/// Serialized camelCase because the external dashboard consumes this shape
/// inside the signed claim set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionSet {
    /// Grants the settings capability.
    pub settings: bool,
    /// Grants the analytics capability.
    pub analytics: bool,
    /// Grants the chatbot configuration capability.
    pub chatbot_config: bool,
    /// Grants the user management capability.
    pub user_management: bool,
}

impl PermissionSet {
    /// Returns the empty permission set. Absence of an explicit grant is
    /// always treated as denial.
    #[must_use]
    pub fn none() -> Self {
        Self {
            settings: false,
            analytics: false,
            chatbot_config: false,
            user_management: false,
        }
    }

    /// Returns whether this set grants the given capability.
    #[must_use]
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::Settings => self.settings,
            Capability::Analytics => self.analytics,
            Capability::ChatbotConfig => self.chatbot_config,
            Capability::UserManagement => self.user_management,
        }
    }
}

/// Named access tier assignable to an identity for one chatbot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleName {
    /// Full access, including user management and dashboard entry.
    Admin,
    /// Content and configuration access without user management.
    Editor,
    /// Read-only analytics access.
    Viewer,
}

impl RoleName {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        }
    }

    /// Returns a human-readable label for administrative views.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Admin => "Administrator",
            Self::Editor => "Editor",
            Self::Viewer => "Viewer",
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[RoleName] = &[RoleName::Admin, RoleName::Editor, RoleName::Viewer];

        ALL
    }

    /// Returns the canonical permission set for this role.
    ///
    /// This table is the single source of truth for role capabilities. The
    /// access directory persists a denormalized copy per role; that copy is
    /// a cache of this table and is reconciled against it, never the other
    /// way around.
    #[must_use]
    pub fn permissions(&self) -> PermissionSet {
        match self {
            Self::Admin => PermissionSet {
                settings: true,
                analytics: true,
                chatbot_config: true,
                user_management: true,
            },
            Self::Editor => PermissionSet {
                settings: true,
                analytics: true,
                chatbot_config: true,
                user_management: false,
            },
            Self::Viewer => PermissionSet {
                settings: false,
                analytics: true,
                chatbot_config: false,
                user_management: false,
            },
        }
    }
}

impl FromStr for RoleName {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(Self::Admin),
            "editor" => Ok(Self::Editor),
            "viewer" => Ok(Self::Viewer),
            _ => Err(AppError::Validation(format!("unknown role value '{value}'"))),
        }
    }
}

/// Role document shape persisted in the access directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    /// Stable role name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Capabilities granted by the role.
    pub permissions: PermissionSet,
}

/// Returns the canonical role definitions for directory synchronization.
#[must_use]
pub fn catalog_roles() -> Vec<RoleDefinition> {
    RoleName::all()
        .iter()
        .map(|role| RoleDefinition {
            name: role.as_str().to_owned(),
            description: match role {
                RoleName::Admin => "Full access to all features".to_owned(),
                RoleName::Editor => {
                    "Can modify chatbot content and view analytics".to_owned()
                }
                RoleName::Viewer => "Read-only access".to_owned(),
            },
            permissions: role.permissions(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{Capability, PermissionSet, RoleName, catalog_roles};

    #[test]
    fn role_roundtrip_storage_value() {
        for role in RoleName::all() {
            let restored = RoleName::from_str(role.as_str());
            assert_eq!(restored.ok(), Some(*role));
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(RoleName::from_str("owner").is_err());
    }

    #[test]
    fn capability_roundtrip_storage_value() {
        for capability in Capability::all() {
            let restored = Capability::from_str(capability.as_str());
            assert_eq!(restored.ok(), Some(*capability));
        }
    }

    #[test]
    fn editor_matches_canonical_table() {
        let permissions = RoleName::Editor.permissions();
        assert!(permissions.settings);
        assert!(permissions.analytics);
        assert!(permissions.chatbot_config);
        assert!(!permissions.user_management);
    }

    #[test]
    fn viewer_holds_only_analytics() {
        let permissions = RoleName::Viewer.permissions();
        assert!(!permissions.settings);
        assert!(permissions.analytics);
        assert!(!permissions.chatbot_config);
        assert!(!permissions.user_management);
    }

    #[test]
    fn admin_holds_every_capability() {
        let permissions = RoleName::Admin.permissions();
        for capability in Capability::all() {
            assert!(permissions.allows(*capability));
        }
    }

    #[test]
    fn empty_set_denies_every_capability() {
        let permissions = PermissionSet::none();
        for capability in Capability::all() {
            assert!(!permissions.allows(*capability));
        }
    }

    #[test]
    fn catalog_covers_every_role() {
        let roles = catalog_roles();
        assert_eq!(roles.len(), RoleName::all().len());
        for role in RoleName::all() {
            assert!(roles.iter().any(|definition| {
                definition.name == role.as_str() && definition.permissions == role.permissions()
            }));
        }
    }

    #[test]
    fn permission_set_serializes_camel_case() {
        let json = serde_json::to_value(RoleName::Editor.permissions());
        assert_eq!(
            json.ok(),
            Some(serde_json::json!({
                "settings": true,
                "analytics": true,
                "chatbotConfig": true,
                "userManagement": false,
            }))
        );
    }
}
