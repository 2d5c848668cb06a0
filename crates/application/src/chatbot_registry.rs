use std::collections::HashMap;

use botgate_core::{AppError, AppResult, ChatbotId};
use botgate_domain::{ChatbotProfile, Visibility};

const UNNAMED_CHATBOT: &str = "Unnamed Chatbot";

/// Deployment-configured registry of the chatbot instances this system
/// fronts.
///
/// Chatbot metadata is owned by the hosting platform; this registry carries
/// the profiles the deployment knows about so resolution can stamp display
/// names onto access entries and listings can honor visibility.
#[derive(Debug, Clone, Default)]
pub struct ChatbotRegistry {
    profiles: HashMap<ChatbotId, ChatbotProfile>,
}

impl ChatbotRegistry {
    /// Creates a registry from explicit profiles.
    #[must_use]
    pub fn new(profiles: impl IntoIterator<Item = ChatbotProfile>) -> Self {
        Self {
            profiles: profiles
                .into_iter()
                .map(|profile| (profile.id.clone(), profile))
                .collect(),
        }
    }

    /// Parses a registry from a `id=name,id=name` configuration value.
    ///
    /// An entry may carry a third `=public` or `=private` segment; entries
    /// without one are publicly listed.
    pub fn from_spec(spec: &str) -> AppResult<Self> {
        let mut profiles = Vec::new();
        for pair in spec.split(',').filter(|pair| !pair.trim().is_empty()) {
            let mut segments = pair.splitn(3, '=');
            let (Some(id), Some(name)) = (segments.next(), segments.next()) else {
                return Err(AppError::Validation(format!(
                    "chatbot registry entry '{pair}' must use the id=name form"
                )));
            };
            let visibility = match segments.next().map(str::trim) {
                None | Some("public") => Visibility::Public,
                Some("private") => Visibility::Private,
                Some(other) => {
                    return Err(AppError::Validation(format!(
                        "chatbot registry entry '{pair}' has unknown visibility '{other}'"
                    )));
                }
            };
            profiles.push(ChatbotProfile {
                id: ChatbotId::new(id.trim())?,
                name: name.trim().to_owned(),
                description: String::new(),
                image_url: String::new(),
                visibility,
            });
        }

        Ok(Self::new(profiles))
    }

    /// Returns the display name for a chatbot id.
    #[must_use]
    pub fn display_name(&self, chatbot_id: &ChatbotId) -> String {
        self.profiles
            .get(chatbot_id)
            .map(|profile| profile.name.clone())
            .unwrap_or_else(|| UNNAMED_CHATBOT.to_owned())
    }

    /// Returns the profile for a chatbot id.
    #[must_use]
    pub fn profile(&self, chatbot_id: &ChatbotId) -> Option<&ChatbotProfile> {
        self.profiles.get(chatbot_id)
    }

    /// Returns the registered profiles, ordered by chatbot id.
    #[must_use]
    pub fn profiles(&self) -> Vec<ChatbotProfile> {
        let mut profiles: Vec<ChatbotProfile> = self.profiles.values().cloned().collect();
        profiles.sort_by(|left, right| left.id.as_str().cmp(right.id.as_str()));
        profiles
    }
}

#[cfg(test)]
mod tests {
    use botgate_core::ChatbotId;
    use botgate_domain::Visibility;

    use super::ChatbotRegistry;

    #[test]
    fn parses_spec_pairs() {
        let registry = ChatbotRegistry::from_spec("bot-1=Assistant, bot-2=Support");
        let Ok(registry) = registry else {
            panic!("valid spec");
        };
        let Ok(id) = ChatbotId::new("bot-2") else {
            panic!("valid id");
        };
        assert_eq!(registry.display_name(&id), "Support");
        let Some(profile) = registry.profile(&id) else {
            panic!("registered profile");
        };
        assert_eq!(profile.visibility, Visibility::Public);
    }

    #[test]
    fn unknown_chatbot_gets_placeholder_name() {
        let registry = ChatbotRegistry::default();
        let Ok(id) = ChatbotId::new("bot-9") else {
            panic!("valid id");
        };
        assert_eq!(registry.display_name(&id), "Unnamed Chatbot");
        assert!(registry.profile(&id).is_none());
    }

    #[test]
    fn visibility_marker_sets_private_profiles() {
        let registry = ChatbotRegistry::from_spec("bot-1=Assistant,bot-2=Internal=private");
        let Ok(registry) = registry else {
            panic!("valid spec");
        };
        let Ok(public_id) = ChatbotId::new("bot-1") else {
            panic!("valid id");
        };
        let Ok(private_id) = ChatbotId::new("bot-2") else {
            panic!("valid id");
        };
        assert_eq!(
            registry.profile(&public_id).map(|profile| profile.visibility),
            Some(Visibility::Public)
        );
        assert_eq!(
            registry
                .profile(&private_id)
                .map(|profile| profile.visibility),
            Some(Visibility::Private)
        );
    }

    #[test]
    fn rejects_unknown_visibility_marker() {
        assert!(ChatbotRegistry::from_spec("bot-1=Assistant=hidden").is_err());
    }

    #[test]
    fn rejects_malformed_spec_entry() {
        assert!(ChatbotRegistry::from_spec("bot-1").is_err());
    }

    #[test]
    fn profiles_are_ordered_by_id() {
        let registry = ChatbotRegistry::from_spec("bot-2=B,bot-1=A");
        let Ok(registry) = registry else {
            panic!("valid spec");
        };
        let ids: Vec<String> = registry
            .profiles()
            .into_iter()
            .map(|profile| profile.id.as_str().to_owned())
            .collect();
        assert_eq!(ids, vec!["bot-1".to_owned(), "bot-2".to_owned()]);
    }
}
