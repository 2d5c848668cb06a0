//! Botgate API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod auth;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::http::header::CONTENT_TYPE;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, post, put};
use botgate_application::{
    AccessResolver, ChatbotRegistry, DirectoryRepository, RoleAdminService, SsoRedirect,
    SsoTokenService, reconcile_role_catalog,
};
use botgate_core::AppError;
use botgate_infrastructure::PostgresDirectoryRepository;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;
use tracing::info;

use crate::api_config::ApiConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    api_config::init_tracing();

    let config = ApiConfig::load()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let session_store = PostgresStore::new(pool.clone())
        .with_table_name("tower_sessions")
        .map_err(|error| {
            AppError::Validation(format!("invalid session table name configuration: {error}"))
        })?;
    session_store.migrate().await.map_err(|error| {
        AppError::Internal(format!("failed to initialize session store: {error}"))
    })?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(config.cookie_secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(30)));

    let directory: Arc<dyn DirectoryRepository> =
        Arc::new(PostgresDirectoryRepository::new(pool.clone()));

    // Push the canonical catalog into the directory before serving so its
    // denormalized role documents match this build.
    reconcile_role_catalog(directory.as_ref()).await?;

    let registry = ChatbotRegistry::from_spec(config.chatbots.as_str())?;
    let resolver = AccessResolver::new(directory.clone(), registry.clone());

    let sso_redirect = SsoRedirect::new(
        config.sso_base_url.as_str(),
        config.sso_company_id.clone(),
        config.sso_redirect_url.clone(),
    )?;

    let app_state = AppState {
        registry,
        resolver,
        role_admin_service: RoleAdminService::new(directory),
        sso_token_service: SsoTokenService::new(config.sso_secret.clone()),
        sso_redirect,
        frontend_url: config.frontend_url.clone(),
        provider_token: config.provider_token.clone(),
    };

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::current_user))
        .route(
            "/api/chatbots",
            get(handlers::access::list_chatbots_handler),
        )
        .route("/api/access", get(handlers::access::access_overview_handler))
        .route(
            "/api/access/{chatbot_id}/decision",
            get(handlers::access::access_decision_handler),
        )
        .route("/api/sso-token", post(handlers::sso::issue_sso_token_handler))
        .route("/api/roles", get(handlers::roles::list_roles_handler))
        .route(
            "/api/assignments/{subject}",
            get(handlers::roles::list_assignments_handler),
        )
        .route(
            "/api/chatbots/{chatbot_id}/assignments",
            put(handlers::roles::assign_role_handler),
        )
        .route(
            "/api/chatbots/{chatbot_id}/assignments/{subject}",
            delete(handlers::roles::revoke_role_handler),
        )
        .route_layer(from_fn(middleware::require_auth));

    let cors_layer = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(&config.frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_credentials(true)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE]);

    let app = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/session", post(auth::create_session))
        .route("/auth/logout", post(auth::logout))
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state);

    let address = config.socket_address()?;

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "botgate-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
