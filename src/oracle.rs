//! Callbacks the registry makes into the role manager, and the eligibility
//! policy a concrete deployment plugs in.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use crate::error::RoleManagerError;
use crate::primitives::{Address, HatId, RoleId};
use crate::types::HolderStatus;

/// Asked by the registry whether a wearer may keep a token.
pub trait EligibilityOracle: Send + Sync {
    fn wearer_status(&self, wearer: Address, hat: HatId) -> HolderStatus;
}

/// Asked by the registry whether a token is currently active.
pub trait ActivityOracle: Send + Sync {
    /// # Errors
    /// `UnknownToken` when `hat` is neither the branch hat nor a role hat.
    fn hat_status(&self, hat: HatId) -> Result<bool, RoleManagerError>;
}

/// Eligibility policy supplied by the deployment.
///
/// The manager resolves `role` from its own table before calling in (`None`
/// when the token does not belong to a registered role). There is no default
/// body: every deployment decides for itself.
pub trait EligibilityPolicy: Send + Sync {
    fn evaluate(&self, wearer: Address, hat: HatId, role: Option<RoleId>) -> HolderStatus;
}

/// Eligible for as long as the token maps to a registered role.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegisteredRoles;

impl EligibilityPolicy for RegisteredRoles {
    fn evaluate(&self, _wearer: Address, _hat: HatId, role: Option<RoleId>) -> HolderStatus {
        if role.is_some() {
            HolderStatus::good()
        } else {
            HolderStatus::ineligible()
        }
    }
}

/// Eligible iff the wearer is on the allow-list and the token is a role token.
/// Accounts on the deny set are reported in bad standing for every role.
#[derive(Debug, Default)]
pub struct AllowList {
    allowed: RwLock<HashSet<Address>>,
    denied: RwLock<HashSet<Address>>,
}

impl AllowList {
    pub fn new<I: IntoIterator<Item = Address>>(allowed: I) -> Self {
        AllowList {
            allowed: RwLock::new(allowed.into_iter().collect()),
            denied: RwLock::new(HashSet::new()),
        }
    }

    pub fn allow(&self, account: Address) {
        self.allowed.write().unwrap_or_else(PoisonError::into_inner).insert(account);
    }

    pub fn disallow(&self, account: Address) {
        self.allowed.write().unwrap_or_else(PoisonError::into_inner).remove(&account);
    }

    /// Puts `account` in bad standing.
    pub fn deny(&self, account: Address) {
        self.denied.write().unwrap_or_else(PoisonError::into_inner).insert(account);
    }

    pub fn pardon(&self, account: Address) {
        self.denied.write().unwrap_or_else(PoisonError::into_inner).remove(&account);
    }
}

impl EligibilityPolicy for AllowList {
    fn evaluate(&self, wearer: Address, _hat: HatId, role: Option<RoleId>) -> HolderStatus {
        if self.denied.read().unwrap_or_else(PoisonError::into_inner).contains(&wearer) {
            return HolderStatus::bad_standing();
        }
        let listed = self.allowed.read().unwrap_or_else(PoisonError::into_inner).contains(&wearer);
        if role.is_some() && listed {
            HolderStatus::good()
        } else {
            HolderStatus::ineligible()
        }
    }
}
