// Value types that cross the boundary between the manager and the registry.
// Identifiers themselves live in `primitives.rs`.

use crate::primitives::{Address, HatId};

/// Answer of the eligibility oracle for a `(wearer, hat)` pair.
///
/// Bad standing always implies ineligible. The constructor enforces this, so
/// a `HolderStatus` with `standing == false` and `eligible == true` cannot be
/// built, and there is no `Deserialize` impl that could bypass it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct HolderStatus {
    eligible: bool,
    standing: bool,
}

impl HolderStatus {
    pub fn new(eligible: bool, standing: bool) -> Self {
        HolderStatus { eligible: eligible && standing, standing }
    }

    /// Eligible and in good standing.
    pub fn good() -> Self {
        Self::new(true, true)
    }

    /// Not eligible, but still in good standing.
    pub fn ineligible() -> Self {
        Self::new(false, true)
    }

    /// Bad standing (and therefore ineligible).
    pub fn bad_standing() -> Self {
        Self::new(false, false)
    }

    pub fn eligible(&self) -> bool {
        self.eligible
    }

    pub fn standing(&self) -> bool {
        self.standing
    }
}

/// Arguments of the registry's `create_token` call.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TokenRequest {
    /// Token the new one is created under.
    pub parent: HatId,
    /// Opaque metadata.
    pub details: String,
    pub max_supply: u32,
    /// Address the registry asks for wearer eligibility.
    pub eligibility: Address,
    /// Address the registry asks whether the token is active.
    pub toggle: Address,
    /// Whether the token's admin may later change its properties.
    pub mutable: bool,
    pub image_uri: String,
}
