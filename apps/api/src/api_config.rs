use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use botgate_core::AppError;
use tracing_subscriber::EnvFilter;

/// Runtime configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    pub provider_token: String,
    pub sso_secret: Option<String>,
    pub sso_base_url: String,
    pub sso_company_id: String,
    pub sso_redirect_url: String,
    pub chatbots: String,
}

impl ApiConfig {
    /// Loads and validates configuration from the process environment.
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_env("DATABASE_URL")?;
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

        let session_secret = required_env("SESSION_SECRET")?;
        if session_secret.len() < 32 {
            return Err(AppError::Validation(
                "SESSION_SECRET must be at least 32 characters".to_owned(),
            ));
        }

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|_| "false".to_owned())
            .eq_ignore_ascii_case("true");

        let provider_token = required_non_empty_env("AUTH_PROVIDER_TOKEN")?;

        // An absent signing secret is not a startup error: issuance then
        // fails per request with a signing error, never with a token.
        let sso_secret = env::var("SSO_JWT_SECRET")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let sso_base_url = required_non_empty_env("SSO_BASE_URL")?;
        let sso_company_id = required_non_empty_env("SSO_COMPANY_ID")?;
        let sso_redirect_url =
            env::var("SSO_REDIRECT_URL").unwrap_or_else(|_| frontend_url.clone());

        let chatbots = env::var("CHATBOTS").unwrap_or_default();

        Ok(Self {
            migrate_only,
            database_url,
            frontend_url,
            api_host,
            api_port,
            cookie_secure,
            provider_token,
            sso_secret,
            sso_base_url,
            sso_company_id,
            sso_redirect_url,
            chatbots,
        })
    }

    /// Returns the socket address the listener binds to.
    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(self.api_host.as_str()).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

/// Initializes the tracing subscriber for the process.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}
