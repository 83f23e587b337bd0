//!
//! Authorization predicates for role-manager operations.
//!
//! Two registry relations gate the manager: *wearing* the admin hat, and
//! being an *admin of* the admin hat. `create_role` uses the latter; deploying
//! a manager and every other mutating operation use the former. Keep the two
//! checks separate.

use crate::error::{AuthorizationError, RoleManagerError};
use crate::primitives::{Address, HatId};
use crate::registry::CapabilityRegistry;

/// Registry relation between an account and a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// The account currently wears the token.
    Wearer,
    /// The registry hierarchy designates the account as an admin of the token.
    Admin,
}

/// Mutating operations exposed by the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Standing up a manager over the admin hat's branch.
    Deploy,
    CreateRole,
    GrantRole,
    RevokeRole,
    ToggleBranch,
}

/// The relation to the admin hat a caller needs for `op`.
#[inline]
pub fn required_relation(op: Operation) -> Relation {
    match op {
        Operation::CreateRole => Relation::Admin,
        Operation::Deploy
        | Operation::GrantRole
        | Operation::RevokeRole
        | Operation::ToggleBranch => Relation::Wearer,
    }
}

/// Checks that `caller` stands in the relation `op` requires to `hat`.
///
/// # Errors
/// `Unauthorized(NotWearer | NotAdmin)` when the registry answers `false`,
/// `Registry(_)` when the query itself fails.
pub fn check<R: CapabilityRegistry + ?Sized>(
    registry: &R,
    caller: Address,
    hat: HatId,
    op: Operation,
) -> Result<(), RoleManagerError> {
    match required_relation(op) {
        Relation::Wearer => {
            if registry.holds_token(caller, hat)? {
                Ok(())
            } else {
                Err(AuthorizationError::NotWearer { caller, hat }.into())
            }
        }
        Relation::Admin => {
            if registry.is_admin_of(caller, hat)? {
                Ok(())
            } else {
                Err(AuthorizationError::NotAdmin { caller, hat }.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;
    use crate::types::TokenRequest;

    /// Registry that answers the two relation queries from fixed flags.
    struct FixedRelations {
        wears: bool,
        admin: bool,
    }

    impl CapabilityRegistry for FixedRelations {
        fn holds_token(&self, _: Address, _: HatId) -> Result<bool, RegistryError> {
            Ok(self.wears)
        }
        fn is_admin_of(&self, _: Address, _: HatId) -> Result<bool, RegistryError> {
            Ok(self.admin)
        }
        fn create_token(&self, _: TokenRequest) -> Result<HatId, RegistryError> {
            Err(RegistryError::Rejected("unused".into()))
        }
        fn mint_token(&self, _: HatId, _: Address) -> Result<(), RegistryError> {
            Err(RegistryError::Rejected("unused".into()))
        }
        fn set_holder_status(&self, _: HatId, _: Address, _: bool, _: bool) -> Result<(), RegistryError> {
            Err(RegistryError::Rejected("unused".into()))
        }
    }

    #[test]
    fn test_create_role_requires_admin_relation() {
        assert_eq!(required_relation(Operation::CreateRole), Relation::Admin);
        for op in [Operation::Deploy, Operation::GrantRole, Operation::RevokeRole, Operation::ToggleBranch] {
            assert_eq!(required_relation(op), Relation::Wearer);
        }
    }

    #[test]
    fn test_wearer_without_admin_cannot_create() {
        let reg = FixedRelations { wears: true, admin: false };
        let caller = Address::repeat_byte(1);
        let err = check(&reg, caller, HatId(1), Operation::CreateRole).unwrap_err();
        assert_eq!(err, AuthorizationError::NotAdmin { caller, hat: HatId(1) }.into());
        assert!(check(&reg, caller, HatId(1), Operation::GrantRole).is_ok());
    }

    #[test]
    fn test_admin_without_wearing_cannot_grant() {
        let reg = FixedRelations { wears: false, admin: true };
        let caller = Address::repeat_byte(2);
        assert!(check(&reg, caller, HatId(1), Operation::CreateRole).is_ok());
        for op in [Operation::GrantRole, Operation::RevokeRole, Operation::ToggleBranch] {
            let err = check(&reg, caller, HatId(1), op).unwrap_err();
            assert_eq!(err, AuthorizationError::NotWearer { caller, hat: HatId(1) }.into());
        }
    }
}
