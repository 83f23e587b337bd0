//! The capability registry as seen from the role manager.
//!
//! The manager only ever consumes this interface. The reverse direction (the
//! registry asking the manager about eligibility and activity) is modelled by
//! the separate traits in `crate::oracle`, so the two call directions never
//! share a type.

use std::sync::Arc;

use crate::error::RegistryError;
use crate::primitives::{Address, HatId};
use crate::types::TokenRequest;

/// Operations the manager requires of the external token registry.
///
/// Implementations take `&self` and are expected to use interior mutability:
/// the registry may call back into the manager while one of these methods is
/// on the stack, so neither side can hold an exclusive borrow of the other.
pub trait CapabilityRegistry: Send + Sync {
    /// Whether `account` currently wears `hat`.
    fn holds_token(&self, account: Address, hat: HatId) -> Result<bool, RegistryError>;

    /// Whether the registry's hierarchy makes `account` an admin of `hat`.
    fn is_admin_of(&self, account: Address, hat: HatId) -> Result<bool, RegistryError>;

    /// Creates a new token and returns its id.
    fn create_token(&self, request: TokenRequest) -> Result<HatId, RegistryError>;

    /// Mints `hat` to `to`.
    fn mint_token(&self, hat: HatId, to: Address) -> Result<(), RegistryError>;

    /// Records a wearer's eligibility and standing for `hat`. An ineligible
    /// wearer loses the token.
    fn set_holder_status(
        &self,
        hat: HatId,
        account: Address,
        eligible: bool,
        standing: bool,
    ) -> Result<(), RegistryError>;
}

impl<T: CapabilityRegistry + ?Sized> CapabilityRegistry for Arc<T> {
    fn holds_token(&self, account: Address, hat: HatId) -> Result<bool, RegistryError> {
        (**self).holds_token(account, hat)
    }

    fn is_admin_of(&self, account: Address, hat: HatId) -> Result<bool, RegistryError> {
        (**self).is_admin_of(account, hat)
    }

    fn create_token(&self, request: TokenRequest) -> Result<HatId, RegistryError> {
        (**self).create_token(request)
    }

    fn mint_token(&self, hat: HatId, to: Address) -> Result<(), RegistryError> {
        (**self).mint_token(hat, to)
    }

    fn set_holder_status(
        &self,
        hat: HatId,
        account: Address,
        eligible: bool,
        standing: bool,
    ) -> Result<(), RegistryError> {
        (**self).set_holder_status(hat, account, eligible, standing)
    }
}
