#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(deprecated)]

//!
//! Hat-Roles is a hierarchical role manager on top of an external
//! capability-token (hat) registry.
//!
//! The registry does the bookkeeping of who wears which token. This crate
//! decides which roles exist, who may grant and revoke them, and whether the
//! whole branch of role tokens is currently active. The manager is both a
//! client of the registry and the eligibility/activity oracle the registry
//! calls back into for every token it creates.

// Identifiers (Address, RoleId, HatId).
pub mod primitives;

pub use primitives::*;

// Value types exchanged with the registry.
pub mod types;

// Holder vs admin authorization predicates.
pub mod rights;

// Keccak-256 label hashing.
pub mod crypto;

pub mod error;

pub mod config;

pub mod events;

// Consumed registry interface and exposed oracle interfaces.
pub mod registry;
pub mod oracle;

// The role manager itself.
pub mod manager;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use config::ManagerConfig;
pub use error::{AuthorizationError, RegistryError, RoleManagerError};
pub use events::RoleEvent;
pub use manager::{RoleManager, RoleTableSnapshot};
pub use oracle::{ActivityOracle, AllowList, EligibilityOracle, EligibilityPolicy, RegisteredRoles};
pub use registry::CapabilityRegistry;
pub use types::{HolderStatus, TokenRequest};
