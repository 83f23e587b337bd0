use std::sync::Arc;

use hat_roles::testing::InMemoryRegistry;
use hat_roles::{
    Address, AuthorizationError, CapabilityRegistry, HatId, ManagerConfig, RegisteredRoles, RoleId, RoleManager,
    RoleManagerError, TokenRequest,
};

const ROOT: Address = Address::repeat_byte(0x01);
const ADMIN_WEARER: Address = Address::repeat_byte(0x02);
const ORACLE: Address = Address::repeat_byte(0x0c);
const ALICE: Address = Address::repeat_byte(0xa1);

fn child(parent: HatId) -> TokenRequest {
    TokenRequest {
        parent,
        details: String::new(),
        max_supply: 4,
        eligibility: Address::ZERO,
        toggle: Address::ZERO,
        mutable: true,
        image_uri: String::new(),
    }
}

/// Top hat 1 (ROOT) -> admin hat 2 (ADMIN_WEARER) -> branch hat 3.
///
/// ROOT is admin of hat 2 without wearing it; ADMIN_WEARER wears hat 2 but,
/// wearing no ancestor, is not its admin.
fn deploy() -> (Arc<InMemoryRegistry>, Arc<RoleManager<Arc<InMemoryRegistry>, RegisteredRoles>>) {
    let registry = Arc::new(InMemoryRegistry::new());
    let top = registry.mint_top_hat(ROOT, "root");
    let admin = registry.create_token(child(top)).unwrap();
    registry.mint_token(admin, ADMIN_WEARER).unwrap();
    let branch = registry.create_token(child(admin)).unwrap();

    let config = ManagerConfig::new(Address::repeat_byte(0xee), ORACLE, admin, branch);
    let manager = Arc::new(RoleManager::new(registry.clone(), config, RegisteredRoles, ADMIN_WEARER).unwrap());
    registry.install_oracle(ORACLE, &manager);
    (registry, manager)
}

#[test]
fn admin_of_is_not_wearing() {
    let (registry, manager) = deploy();
    assert!(registry.is_admin_of(ROOT, HatId(2)).unwrap());
    assert!(!registry.holds_token(ROOT, HatId(2)).unwrap());
    assert!(registry.holds_token(ADMIN_WEARER, HatId(2)).unwrap());
    assert!(!registry.is_admin_of(ADMIN_WEARER, HatId(2)).unwrap());
    assert_eq!(manager.admin_hat(), HatId(2));
}

#[test]
fn root_cannot_deploy_without_wearing_admin_hat() {
    let registry = Arc::new(InMemoryRegistry::new());
    let top = registry.mint_top_hat(ROOT, "root");
    let admin = registry.create_token(child(top)).unwrap();
    let branch = registry.create_token(child(admin)).unwrap();
    let config = ManagerConfig::new(Address::repeat_byte(0xee), ORACLE, admin, branch);

    let err = RoleManager::new(registry, config, RegisteredRoles, ROOT).unwrap_err();
    assert_eq!(err, AuthorizationError::NotWearer { caller: ROOT, hat: admin }.into());
}

#[test]
fn create_role_follows_admin_relation() {
    let (_registry, manager) = deploy();
    let role = RoleId::from_label("OPERATOR");

    assert_eq!(
        manager.create_role(ADMIN_WEARER, role, "ops", 1, &[]).unwrap_err(),
        RoleManagerError::Unauthorized(AuthorizationError::NotAdmin { caller: ADMIN_WEARER, hat: HatId(2) })
    );
    assert!(!manager.role_exists(role));

    let hat = manager.create_role(ROOT, role, "ops", 1, &[]).unwrap();
    assert_eq!(manager.role_hat(role), Some(hat));
}

#[test]
fn grant_revoke_toggle_follow_wearer_relation() {
    let (_registry, manager) = deploy();
    let role = RoleId::from_label("OPERATOR");
    manager.create_role(ROOT, role, "ops", 2, &[]).unwrap();
    let events_before = manager.events();
    let not_wearer = RoleManagerError::Unauthorized(AuthorizationError::NotWearer { caller: ROOT, hat: HatId(2) });

    assert_eq!(manager.grant_role(ROOT, role, ALICE).unwrap_err(), not_wearer);
    assert_eq!(manager.toggle_branch(ROOT).unwrap_err(), not_wearer);
    assert!(manager.is_active());

    manager.grant_role(ADMIN_WEARER, role, ALICE).unwrap();
    assert_eq!(manager.revoke_role(ROOT, role, ALICE).unwrap_err(), not_wearer);
    assert!(manager.has_role(role, ALICE).unwrap());

    manager.revoke_role(ADMIN_WEARER, role, ALICE).unwrap();
    assert!(!manager.has_role(role, ALICE).unwrap());
    assert_eq!(manager.toggle_branch(ADMIN_WEARER), Ok(false));

    // Only the three authorized calls left events behind.
    assert_eq!(manager.events().len(), events_before.len() + 3);
}
