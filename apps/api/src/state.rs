use botgate_application::{
    AccessResolver, ChatbotRegistry, RoleAdminService, SsoRedirect, SsoTokenService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub registry: ChatbotRegistry,
    pub resolver: AccessResolver,
    pub role_admin_service: RoleAdminService,
    pub sso_token_service: SsoTokenService,
    pub sso_redirect: SsoRedirect,
    pub frontend_url: String,
    pub provider_token: String,
}
