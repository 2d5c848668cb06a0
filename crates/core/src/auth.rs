use serde::{Deserialize, Serialize};

/// User information persisted in the authenticated session.
///
/// Minted by the external identity provider on successful authentication and
/// immutable for the lifetime of the session. The core only references it;
/// identity attributes are never mutated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    subject: String,
    display_name: Option<String>,
    email: Option<String>,
    avatar_url: Option<String>,
}

impl UserIdentity {
    /// Creates a user identity from identity-provider attributes.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        display_name: Option<String>,
        email: Option<String>,
        avatar_url: Option<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            display_name,
            email,
            avatar_url,
        }
    }

    /// Returns the stable subject claim from the identity provider.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the display name, if the provider returned one.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Returns the email, if the provider returned one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the avatar URL, if the provider returned one.
    #[must_use]
    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }
}
