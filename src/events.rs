//!
//! Audit events emitted by the role manager.
//!
//! Events are appended to the manager's log only once an operation has fully
//! succeeded, so a failed call never leaves a trace here.

use crate::primitives::{Address, HatId, RoleId};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RoleEvent {
    RoleCreated { role: RoleId, hat: HatId },
    RoleGranted { role: RoleId, account: Address, hat: HatId },
    RoleRevoked { role: RoleId, account: Address, hat: HatId },
    /// The branch activity flag changed; `is_active` is the new value.
    BranchToggled { caller: Address, is_active: bool },
}

impl RoleEvent {
    /// The role an event concerns, if any.
    pub fn role(&self) -> Option<RoleId> {
        match self {
            RoleEvent::RoleCreated { role, .. }
            | RoleEvent::RoleGranted { role, .. }
            | RoleEvent::RoleRevoked { role, .. } => Some(*role),
            RoleEvent::BranchToggled { .. } => None,
        }
    }
}
