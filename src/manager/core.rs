//!
//! Core role-manager logic: the role table, the branch activity flag and the
//! admin-gated lifecycle operations that drive the capability registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use uuid::Uuid;

use crate::config::ManagerConfig;
use crate::error::{RegistryError, RoleManagerError};
use crate::events::RoleEvent;
use crate::manager::guard::ReentrancyGuard;
use crate::oracle::{ActivityOracle, EligibilityOracle, EligibilityPolicy};
use crate::primitives::{Address, HatId, RoleId};
use crate::registry::CapabilityRegistry;
use crate::rights::{self, Operation};
use crate::types::{HolderStatus, TokenRequest};

/// Two maps kept as strict inverses of each other.
///
/// Invariant: `role_hats[r] == h` iff `hat_roles[h] == r`, and `order` lists
/// exactly the keys of `role_hats` in insertion order.
#[derive(Debug, Clone, Default)]
pub struct RoleTable {
    role_hats: HashMap<RoleId, HatId>,
    hat_roles: HashMap<HatId, RoleId>,
    order: Vec<RoleId>,
}

impl RoleTable {
    pub fn hat_of(&self, role: &RoleId) -> Option<HatId> {
        self.role_hats.get(role).copied()
    }

    pub fn role_of(&self, hat: &HatId) -> Option<RoleId> {
        self.hat_roles.get(hat).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Registered roles in creation order.
    pub fn roles(&self) -> impl Iterator<Item = (RoleId, HatId)> + '_ {
        self.order
            .iter()
            .filter_map(move |r| self.role_hats.get(r).map(|h| (*r, *h)))
    }

    /// Adds a mapping. Refuses a taken role, a taken hat, or `HatId::NONE`,
    /// any of which would break the inverse relation.
    fn insert(&mut self, role: RoleId, hat: HatId) -> Result<(), RoleManagerError> {
        if self.role_hats.contains_key(&role) {
            return Err(RoleManagerError::RoleAlreadyExists(role));
        }
        if hat.is_none() || self.hat_roles.contains_key(&hat) {
            let reason = format!("registry returned unusable hat id {}", hat);
            return Err(RegistryError::Rejected(reason).into());
        }
        self.role_hats.insert(role, hat);
        self.hat_roles.insert(hat, role);
        self.order.push(role);
        Ok(())
    }

    /// Undoes a provisional `insert`. Only used while rolling back a failed
    /// `create_role`; committed roles are never removed.
    fn remove_provisional(&mut self, role: &RoleId) {
        if let Some(hat) = self.role_hats.remove(role) {
            self.hat_roles.remove(&hat);
            self.order.retain(|r| r != role);
        }
    }

    /// Checks the inverse-map invariant.
    pub fn is_consistent(&self) -> bool {
        self.role_hats.len() == self.hat_roles.len()
            && self.order.len() == self.role_hats.len()
            && self
                .role_hats
                .iter()
                .all(|(r, h)| !h.is_none() && self.hat_roles.get(h) == Some(r))
            && self.order.iter().all(|r| self.role_hats.contains_key(r))
    }
}

/// Mutable state owned by the manager. Never locked across a registry call.
#[derive(Debug, Default)]
struct ManagerState {
    table: RoleTable,
    event_log: Vec<RoleEvent>,
    /// Tokens created by a `create_role` that later failed.
    orphans: Vec<HatId>,
}

/// Serializable view of a manager's role table.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RoleTableSnapshot {
    pub admin_hat: HatId,
    pub branch_hat: HatId,
    pub is_active: bool,
    pub roles: Vec<(RoleId, HatId)>,
    pub orphans: Vec<HatId>,
}

/// Hierarchical role manager over a branch of registry tokens.
///
/// `R` is the registry the manager drives, `P` the eligibility policy the
/// deployment supplies. The manager answers the registry's oracle callbacks
/// (`EligibilityOracle`, `ActivityOracle`) for every token it creates.
pub struct RoleManager<R: CapabilityRegistry, P: EligibilityPolicy> {
    registry: R,
    policy: P,
    config: ManagerConfig,
    instance_id: Uuid,
    is_active: AtomicBool,
    guard: ReentrancyGuard,
    state: RwLock<ManagerState>,
}

impl<R: CapabilityRegistry, P: EligibilityPolicy> fmt::Debug for RoleManager<R, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoleManager")
            .field("instance_id", &self.instance_id)
            .field("config", &self.config)
            .field("is_active", &self.is_active())
            .field("roles", &self.read_state().table.len())
            .finish()
    }
}

impl<R, P> RoleManager<R, P>
where
    R: CapabilityRegistry,
    P: EligibilityPolicy,
{
    /// Stands up a manager over `config.branch_hat`.
    ///
    /// `deployer` must currently wear `config.admin_hat`. The branch starts
    /// out active.
    pub fn new(
        registry: R,
        config: ManagerConfig,
        policy: P,
        deployer: Address,
    ) -> Result<Self, RoleManagerError> {
        config.validate()?;
        rights::check(&registry, deployer, config.admin_hat, Operation::Deploy)?;

        let instance_id = Uuid::new_v4();
        tracing::info!(
            manager = %instance_id,
            "RoleManager deployed by {} against registry {} (admin hat {}, branch hat {})",
            deployer,
            config.registry,
            config.admin_hat,
            config.branch_hat
        );

        Ok(RoleManager {
            registry,
            policy,
            config,
            instance_id,
            is_active: AtomicBool::new(true),
            guard: ReentrancyGuard::new(),
            state: RwLock::new(ManagerState::default()),
        })
    }

    fn read_state(&self) -> RwLockReadGuard<'_, ManagerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, ManagerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn resolve(&self, role: RoleId) -> Result<HatId, RoleManagerError> {
        self.read_state().table.hat_of(&role).ok_or(RoleManagerError::RoleNotFound(role))
    }

    /// Flips the branch-wide activity flag and returns its new value.
    ///
    /// Caller must wear the admin hat. Every role token under the branch
    /// changes its observed activity at once.
    pub fn toggle_branch(&self, caller: Address) -> Result<bool, RoleManagerError> {
        let _scope = self.guard.enter()?;
        rights::check(&self.registry, caller, self.config.admin_hat, Operation::ToggleBranch)?;

        let is_active = !self.is_active.fetch_xor(true, Ordering::AcqRel);
        self.write_state()
            .event_log
            .push(RoleEvent::BranchToggled { caller, is_active });
        tracing::info!(
            manager = %self.instance_id,
            "Branch {} toggled to active={} by {}",
            self.config.branch_hat,
            is_active,
            caller
        );
        Ok(is_active)
    }

    /// Creates a role token under the branch and mints it to `initial_holders`.
    ///
    /// Caller must be an admin of the admin hat. Runs entirely under the
    /// reentrancy guard. If a mint fails the role is rolled back: the table
    /// entry is removed, holders minted so far are stripped of the token, and
    /// the token id is recorded in `orphaned_tokens()`.
    pub fn create_role(
        &self,
        caller: Address,
        role: RoleId,
        details: &str,
        max_supply: u32,
        initial_holders: &[Address],
    ) -> Result<HatId, RoleManagerError> {
        let _scope = self.guard.enter()?;
        rights::check(&self.registry, caller, self.config.admin_hat, Operation::CreateRole)?;

        if self.read_state().table.hat_of(&role).is_some() {
            return Err(RoleManagerError::RoleAlreadyExists(role));
        }
        if initial_holders.len() > max_supply as usize {
            return Err(RoleManagerError::TooManyInitialHolders {
                count: initial_holders.len(),
                max_supply,
            });
        }
        if initial_holders.iter().any(Address::is_zero) {
            return Err(RoleManagerError::InvalidAddress);
        }

        let hat = self.registry.create_token(TokenRequest {
            parent: self.config.branch_hat,
            details: details.to_owned(),
            max_supply,
            eligibility: self.config.oracle,
            toggle: self.config.oracle,
            mutable: true,
            image_uri: self.config.image_uri.clone(),
        })?;

        // Provisional: visible to oracle callbacks during the mints below.
        let inserted = self.write_state().table.insert(role, hat);
        if let Err(e) = inserted {
            self.abandon(role, hat, &[]);
            return Err(e);
        }

        for (minted, holder) in initial_holders.iter().enumerate() {
            if let Err(e) = self.registry.mint_token(hat, *holder) {
                tracing::warn!(
                    manager = %self.instance_id,
                    "Minting role {} (hat {}) to {} failed: {}",
                    role,
                    hat,
                    holder,
                    e
                );
                self.abandon(role, hat, &initial_holders[..minted]);
                return Err(e.into());
            }
        }

        self.write_state().event_log.push(RoleEvent::RoleCreated { role, hat });
        tracing::info!(
            manager = %self.instance_id,
            "Role {} created as hat {} with {} initial holder(s)",
            role,
            hat,
            initial_holders.len()
        );
        Ok(hat)
    }

    /// Compensates a failed `create_role`.
    fn abandon(&self, role: RoleId, hat: HatId, minted: &[Address]) {
        {
            let mut state = self.write_state();
            if state.table.hat_of(&role) == Some(hat) {
                state.table.remove_provisional(&role);
            }
            // An id the table refused may be NONE or belong to a live role.
            if !hat.is_none() && state.table.role_of(&hat).is_none() {
                state.orphans.push(hat);
            }
        }
        for holder in minted {
            if let Err(e) = self.registry.set_holder_status(hat, *holder, false, false) {
                tracing::warn!(
                    manager = %self.instance_id,
                    "Could not strip orphan hat {} from {}: {}",
                    hat,
                    holder,
                    e
                );
            }
        }
        tracing::warn!(
            manager = %self.instance_id,
            "Hat {} orphaned after failed creation of role {}",
            hat,
            role
        );
    }

    /// Mints the role's token to `account`. Caller must wear the admin hat.
    pub fn grant_role(
        &self,
        caller: Address,
        role: RoleId,
        account: Address,
    ) -> Result<(), RoleManagerError> {
        let _scope = self.guard.enter()?;
        rights::check(&self.registry, caller, self.config.admin_hat, Operation::GrantRole)?;
        if account.is_zero() {
            return Err(RoleManagerError::InvalidAddress);
        }
        let hat = self.resolve(role)?;

        self.registry.mint_token(hat, account)?;

        self.write_state().event_log.push(RoleEvent::RoleGranted { role, account, hat });
        tracing::info!(manager = %self.instance_id, "Role {} (hat {}) granted to {}", role, hat, account);
        Ok(())
    }

    /// Takes the role's token away from `account`, clearing its standing.
    /// Caller must wear the admin hat.
    pub fn revoke_role(
        &self,
        caller: Address,
        role: RoleId,
        account: Address,
    ) -> Result<(), RoleManagerError> {
        let _scope = self.guard.enter()?;
        rights::check(&self.registry, caller, self.config.admin_hat, Operation::RevokeRole)?;
        let hat = self.resolve(role)?;
        if !self.registry.holds_token(account, hat)? {
            return Err(RoleManagerError::NotAHolder { role, account });
        }

        self.registry.set_holder_status(hat, account, false, false)?;

        self.write_state().event_log.push(RoleEvent::RoleRevoked { role, account, hat });
        tracing::info!(manager = %self.instance_id, "Role {} (hat {}) revoked from {}", role, hat, account);
        Ok(())
    }

    // --- Queries -----------------------------------------------------------

    pub fn role_hat(&self, role: RoleId) -> Option<HatId> {
        self.read_state().table.hat_of(&role)
    }

    pub fn hat_role(&self, hat: HatId) -> Option<RoleId> {
        self.read_state().table.role_of(&hat)
    }

    pub fn role_exists(&self, role: RoleId) -> bool {
        self.role_hat(role).is_some()
    }

    /// Whether the registry reports `account` as wearing the role's token.
    pub fn has_role(&self, role: RoleId, account: Address) -> Result<bool, RoleManagerError> {
        let hat = self.resolve(role)?;
        Ok(self.registry.holds_token(account, hat)?)
    }

    pub fn is_active(&self) -> bool {
        self.is_active.load(Ordering::Acquire)
    }

    pub fn admin_hat(&self) -> HatId {
        self.config.admin_hat
    }

    pub fn branch_hat(&self) -> HatId {
        self.config.branch_hat
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Registered role ids in creation order.
    pub fn roles(&self) -> Vec<RoleId> {
        self.read_state().table.roles().map(|(r, _)| r).collect()
    }

    /// Tokens left behind by failed `create_role` calls.
    pub fn orphaned_tokens(&self) -> Vec<HatId> {
        self.read_state().orphans.clone()
    }

    pub fn events(&self) -> Vec<RoleEvent> {
        self.read_state().event_log.clone()
    }

    pub fn drain_events(&self) -> Vec<RoleEvent> {
        std::mem::take(&mut self.write_state().event_log)
    }

    pub fn snapshot(&self) -> RoleTableSnapshot {
        let state = self.read_state();
        RoleTableSnapshot {
            admin_hat: self.config.admin_hat,
            branch_hat: self.config.branch_hat,
            is_active: self.is_active(),
            roles: state.table.roles().collect(),
            orphans: state.orphans.clone(),
        }
    }

    #[doc(hidden)] // Invariant probe for tests and fuzzing
    pub fn table_is_consistent(&self) -> bool {
        self.read_state().table.is_consistent()
    }
}

impl<R, P> EligibilityOracle for RoleManager<R, P>
where
    R: CapabilityRegistry,
    P: EligibilityPolicy,
{
    fn wearer_status(&self, wearer: Address, hat: HatId) -> HolderStatus {
        let role = self.hat_role(hat);
        let status = self.policy.evaluate(wearer, hat, role);
        tracing::debug!(
            manager = %self.instance_id,
            "wearer_status({}, {}) -> eligible={} standing={}",
            wearer,
            hat,
            status.eligible(),
            status.standing()
        );
        status
    }
}

impl<R, P> ActivityOracle for RoleManager<R, P>
where
    R: CapabilityRegistry,
    P: EligibilityPolicy,
{
    fn hat_status(&self, hat: HatId) -> Result<bool, RoleManagerError> {
        if hat != self.config.branch_hat && self.hat_role(hat).is_none() {
            tracing::debug!(manager = %self.instance_id, "hat_status asked about foreign hat {}", hat);
            return Err(RoleManagerError::UnknownToken(hat));
        }
        Ok(self.is_active())
    }
}
