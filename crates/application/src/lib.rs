//! Application services and ports.

#![forbid(unsafe_code)]

mod access_context;
mod access_gate;
mod access_resolver;
mod catalog_sync;
mod chatbot_registry;
mod directory_ports;
mod role_admin_service;
mod sso_token_service;
#[cfg(test)]
pub(crate) mod test_support;

pub use access_context::{AccessContext, ResolutionCondition};
pub use access_gate::{AccessDecision, AccessGate, DegradedTarget};
pub use access_resolver::{AccessResolver, ResolvedAccess};
pub use catalog_sync::reconcile_role_catalog;
pub use chatbot_registry::ChatbotRegistry;
pub use directory_ports::{DirectoryAssignment, DirectoryRepository};
pub use role_admin_service::RoleAdminService;
pub use sso_token_service::{SsoRedirect, SsoTokenService};
