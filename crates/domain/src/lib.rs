//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod access;
mod chatbot;
mod claims;

pub use access::{Capability, PermissionSet, RoleDefinition, RoleName, catalog_roles};
pub use chatbot::{ChatbotProfile, Visibility};
pub use claims::SsoClaims;
