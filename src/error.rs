//!
//! Defines error types for the role manager and for the registry it drives.

use crate::primitives::{Address, HatId, RoleId};

/// The caller lacks the registry relation an operation requires.
///
/// The two kinds are different trust relationships and are never merged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorizationError {
    /// The caller does not currently wear the token.
    #[error("{caller} does not wear hat {hat}")]
    NotWearer { caller: Address, hat: HatId },
    /// The registry does not list the caller as an admin of the token.
    #[error("{caller} is not an admin of hat {hat}")]
    NotAdmin { caller: Address, hat: HatId },
}

/// Failures reported by the capability registry itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The registry does not know the token.
    #[error("Registry has no hat {0}")]
    UnknownToken(HatId),
    /// Minting would exceed the token's max supply.
    #[error("Hat {0} has no remaining supply")]
    SupplyExhausted(HatId),
    /// The eligibility oracle refused the wearer.
    #[error("{wearer} is not eligible for hat {hat}")]
    Ineligible { hat: HatId, wearer: Address },
    /// Any other refusal.
    #[error("Registry rejected call: {0}")]
    Rejected(String),
}

/// Errors surfaced by `RoleManager` operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoleManagerError {
    /// Bad construction inputs.
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(#[from] AuthorizationError),
    #[error("Role {0} already exists")]
    RoleAlreadyExists(RoleId),
    #[error("Role {0} not found")]
    RoleNotFound(RoleId),
    /// `revoke_role` target does not wear the role's token.
    #[error("{account} does not hold role {role}")]
    NotAHolder { role: RoleId, account: Address },
    #[error("{count} initial holders exceed max supply {max_supply}")]
    TooManyInitialHolders { count: usize, max_supply: u32 },
    /// A required account argument was the zero address.
    #[error("Invalid (zero) address")]
    InvalidAddress,
    /// An oracle was asked about a token outside this manager's branch.
    #[error("Hat {0} is not managed here")]
    UnknownToken(HatId),
    /// A mutating call arrived while another one was still in progress.
    #[error("Reentrant call rejected")]
    Reentrancy,
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

pub type Result<T> = std::result::Result<T, RoleManagerError>;
