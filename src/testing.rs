//! Test support: an in-memory capability registry.
//!
//! `InMemoryRegistry` models the parts of a hat tree the role manager relies
//! on. Tokens get sequential ids starting at 1. An account is admin of a
//! token if it wears any ancestor of it (or the token itself, for a top
//! hat). Eligibility and activity are resolved by calling back into oracles
//! registered under the token's `eligibility` / `toggle` addresses, so a
//! manager installed there is re-entered on every holder query and mint.
//!
//! Available under `cfg(test)` and the `test-utils` feature.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use crate::error::RegistryError;
use crate::oracle::{ActivityOracle, EligibilityOracle};
use crate::primitives::{Address, HatId};
use crate::registry::CapabilityRegistry;
use crate::types::{HolderStatus, TokenRequest};

/// Installs a `tracing` subscriber that writes through the test harness.
#[cfg(feature = "test-utils")]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// One recorded registry invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryCall {
    HoldsToken(Address, HatId),
    IsAdminOf(Address, HatId),
    CreateToken(HatId),
    MintToken(HatId, Address),
    SetHolderStatus(HatId, Address, bool, bool),
}

impl RegistryCall {
    /// Calls that change registry state.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            RegistryCall::CreateToken(_) | RegistryCall::MintToken(..) | RegistryCall::SetHolderStatus(..)
        )
    }
}

#[derive(Debug, Clone)]
struct HatRecord {
    parent: Option<HatId>,
    request: TokenRequest,
    wearers: BTreeSet<Address>,
    bad_standing: HashSet<Address>,
}

type Hook = Box<dyn Fn(HatId) + Send + Sync>;

#[derive(Default)]
pub struct InMemoryRegistry {
    hats: RwLock<BTreeMap<HatId, HatRecord>>,
    eligibility_oracles: RwLock<HashMap<Address, Weak<dyn EligibilityOracle>>>,
    activity_oracles: RwLock<HashMap<Address, Weak<dyn ActivityOracle>>>,
    calls: RwLock<Vec<RegistryCall>>,
    failing_mints: RwLock<HashSet<Address>>,
    on_create: RwLock<Option<Hook>>,
    uncapped: bool,
}

impl std::fmt::Debug for InMemoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRegistry")
            .field("hats", &self.hats.read().unwrap_or_else(PoisonError::into_inner).len())
            .field("uncapped", &self.uncapped)
            .finish()
    }
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry that does not enforce `max_supply` on mints.
    pub fn uncapped() -> Self {
        InMemoryRegistry { uncapped: true, ..Self::default() }
    }

    fn record(&self, call: RegistryCall) {
        self.calls.write().unwrap_or_else(PoisonError::into_inner).push(call);
    }

    pub fn calls(&self) -> Vec<RegistryCall> {
        self.calls.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn clear_calls(&self) {
        self.calls.write().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /// Creates a top hat (no parent, supply 1) worn by `wearer`.
    pub fn mint_top_hat(&self, wearer: Address, details: &str) -> HatId {
        let mut hats = self.hats.write().unwrap_or_else(PoisonError::into_inner);
        let id = HatId(hats.len() as u64 + 1);
        let request = TokenRequest {
            parent: HatId::NONE,
            details: details.to_owned(),
            max_supply: 1,
            eligibility: Address::ZERO,
            toggle: Address::ZERO,
            mutable: false,
            image_uri: String::new(),
        };
        hats.insert(
            id,
            HatRecord { parent: None, request, wearers: BTreeSet::from([wearer]), bad_standing: HashSet::new() },
        );
        id
    }

    pub fn register_eligibility_oracle(&self, at: Address, oracle: Weak<dyn EligibilityOracle>) {
        self.eligibility_oracles.write().unwrap_or_else(PoisonError::into_inner).insert(at, oracle);
    }

    pub fn register_activity_oracle(&self, at: Address, oracle: Weak<dyn ActivityOracle>) {
        self.activity_oracles.write().unwrap_or_else(PoisonError::into_inner).insert(at, oracle);
    }

    /// Registers `oracle` as both eligibility and activity oracle at `at`.
    pub fn install_oracle<O>(&self, at: Address, oracle: &Arc<O>)
    where
        O: EligibilityOracle + ActivityOracle + 'static,
    {
        let weak: Weak<O> = Arc::downgrade(oracle);
        let eligibility: Weak<dyn EligibilityOracle> = weak.clone();
        let activity: Weak<dyn ActivityOracle> = weak;
        self.register_eligibility_oracle(at, eligibility);
        self.register_activity_oracle(at, activity);
    }

    /// Makes every later mint to `account` fail with `Rejected`.
    pub fn fail_mints_to(&self, account: Address) {
        self.failing_mints.write().unwrap_or_else(PoisonError::into_inner).insert(account);
    }

    /// Runs `hook` with the new id at the end of every `create_token`.
    pub fn on_create_token<F: Fn(HatId) + Send + Sync + 'static>(&self, hook: F) {
        *self.on_create.write().unwrap_or_else(PoisonError::into_inner) = Some(Box::new(hook));
    }

    pub fn wearers(&self, hat: HatId) -> Vec<Address> {
        self.hats
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&hat)
            .map(|h| h.wearers.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn token(&self, hat: HatId) -> Option<TokenRequest> {
        self.hats.read().unwrap_or_else(PoisonError::into_inner).get(&hat).map(|h| h.request.clone())
    }

    pub fn parent_of(&self, hat: HatId) -> Option<HatId> {
        self.hats.read().unwrap_or_else(PoisonError::into_inner).get(&hat).and_then(|h| h.parent)
    }

    pub fn token_count(&self) -> usize {
        self.hats.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn in_bad_standing(&self, hat: HatId, account: Address) -> bool {
        self.hats
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&hat)
            .map(|h| h.bad_standing.contains(&account))
            .unwrap_or(false)
    }

    /// Eligibility of `wearer` for `hat`, asking the token's eligibility
    /// oracle when one is set. No registry lock is held during the callback.
    pub fn eligibility(&self, hat: HatId, wearer: Address) -> HolderStatus {
        let (oracle_at, stored_bad) = {
            let hats = self.hats.read().unwrap_or_else(PoisonError::into_inner);
            match hats.get(&hat) {
                Some(h) => (h.request.eligibility, h.bad_standing.contains(&wearer)),
                None => return HolderStatus::ineligible(),
            }
        };
        if stored_bad {
            return HolderStatus::bad_standing();
        }
        if oracle_at.is_zero() {
            return HolderStatus::good();
        }
        let oracle = self
            .eligibility_oracles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&oracle_at)
            .and_then(Weak::upgrade);
        match oracle {
            Some(o) => o.wearer_status(wearer, hat),
            None => HolderStatus::good(),
        }
    }

    /// Activity of `hat`, asking its toggle oracle when one is set. An oracle
    /// error falls back to "active".
    pub fn is_active(&self, hat: HatId) -> bool {
        let toggle_at = match self.hats.read().unwrap_or_else(PoisonError::into_inner).get(&hat) {
            Some(h) => h.request.toggle,
            None => return false,
        };
        if toggle_at.is_zero() {
            return true;
        }
        let oracle = self
            .activity_oracles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&toggle_at)
            .and_then(Weak::upgrade);
        match oracle.map(|o| o.hat_status(hat)) {
            Some(Ok(active)) => active,
            _ => true,
        }
    }

    fn wears(&self, account: Address, hat: HatId) -> bool {
        let present = self
            .hats
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&hat)
            .map(|h| h.wearers.contains(&account))
            .unwrap_or(false);
        present && self.eligibility(hat, account).eligible()
    }
}

impl CapabilityRegistry for InMemoryRegistry {
    fn holds_token(&self, account: Address, hat: HatId) -> Result<bool, RegistryError> {
        self.record(RegistryCall::HoldsToken(account, hat));
        Ok(self.wears(account, hat))
    }

    fn is_admin_of(&self, account: Address, hat: HatId) -> Result<bool, RegistryError> {
        self.record(RegistryCall::IsAdminOf(account, hat));
        let candidates: Vec<HatId> = {
            let hats = self.hats.read().unwrap_or_else(PoisonError::into_inner);
            let record = hats.get(&hat).ok_or(RegistryError::UnknownToken(hat))?;
            match record.parent {
                None => vec![hat],
                Some(first) => {
                    let mut chain = Vec::new();
                    let mut cursor = Some(first);
                    while let Some(id) = cursor {
                        chain.push(id);
                        cursor = hats.get(&id).and_then(|h| h.parent);
                    }
                    chain
                }
            }
        };
        Ok(candidates.into_iter().any(|admin_hat| self.wears(account, admin_hat)))
    }

    fn create_token(&self, request: TokenRequest) -> Result<HatId, RegistryError> {
        self.record(RegistryCall::CreateToken(request.parent));
        let id = {
            let mut hats = self.hats.write().unwrap_or_else(PoisonError::into_inner);
            if !hats.contains_key(&request.parent) {
                return Err(RegistryError::UnknownToken(request.parent));
            }
            let id = HatId(hats.len() as u64 + 1);
            hats.insert(
                id,
                HatRecord {
                    parent: Some(request.parent),
                    request,
                    wearers: BTreeSet::new(),
                    bad_standing: HashSet::new(),
                },
            );
            id
        };
        if let Some(hook) = self.on_create.read().unwrap_or_else(PoisonError::into_inner).as_ref() {
            hook(id);
        }
        Ok(id)
    }

    fn mint_token(&self, hat: HatId, to: Address) -> Result<(), RegistryError> {
        self.record(RegistryCall::MintToken(hat, to));
        if self.failing_mints.read().unwrap_or_else(PoisonError::into_inner).contains(&to) {
            return Err(RegistryError::Rejected(format!("mint to {} refused", to)));
        }
        {
            let hats = self.hats.read().unwrap_or_else(PoisonError::into_inner);
            let record = hats.get(&hat).ok_or(RegistryError::UnknownToken(hat))?;
            if record.wearers.contains(&to) {
                return Err(RegistryError::Rejected(format!("{} already wears hat {}", to, hat)));
            }
            if !self.uncapped && record.wearers.len() >= record.request.max_supply as usize {
                return Err(RegistryError::SupplyExhausted(hat));
            }
        }
        if !self.eligibility(hat, to).eligible() {
            return Err(RegistryError::Ineligible { hat, wearer: to });
        }
        let mut hats = self.hats.write().unwrap_or_else(PoisonError::into_inner);
        let record = hats.get_mut(&hat).ok_or(RegistryError::UnknownToken(hat))?;
        record.wearers.insert(to);
        Ok(())
    }

    fn set_holder_status(
        &self,
        hat: HatId,
        account: Address,
        eligible: bool,
        standing: bool,
    ) -> Result<(), RegistryError> {
        self.record(RegistryCall::SetHolderStatus(hat, account, eligible, standing));
        let mut hats = self.hats.write().unwrap_or_else(PoisonError::into_inner);
        let record = hats.get_mut(&hat).ok_or(RegistryError::UnknownToken(hat))?;
        if !eligible || !standing {
            record.wearers.remove(&account);
        }
        if standing {
            record.bad_standing.remove(&account);
        } else {
            record.bad_standing.insert(account);
        }
        Ok(())
    }
}
