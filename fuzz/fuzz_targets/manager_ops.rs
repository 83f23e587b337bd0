#![no_main]

use std::sync::Arc;

use hat_roles::testing::InMemoryRegistry;
use hat_roles::{ActivityOracle, Address, CapabilityRegistry, ManagerConfig, RegisteredRoles, RoleId, RoleManager, TokenRequest};
use libfuzzer_sys::fuzz_target;

const DEPLOYER: Address = Address::repeat_byte(0xd0);
const ORACLE: Address = Address::repeat_byte(0x0c);

#[derive(Debug, Clone, arbitrary::Arbitrary)]
enum FuzzOp {
    Create { role: u8, max_supply: u8, holders: Vec<u8>, fail_on: Option<u8> },
    Grant { as_admin: bool, role: u8, account: u8 },
    Revoke { as_admin: bool, role: u8, account: u8 },
    Toggle { as_admin: bool },
}

fn account(n: u8) -> Address {
    // Byte 0 maps to the zero address on purpose.
    Address::repeat_byte(n % 8)
}

fn role(n: u8) -> RoleId {
    RoleId::from_label(&format!("FUZZ-{}", n % 5))
}

fn caller(as_admin: bool) -> Address {
    if as_admin { DEPLOYER } else { Address::repeat_byte(0x99) }
}

fuzz_target!(|ops: Vec<FuzzOp>| {
    let registry = Arc::new(InMemoryRegistry::new());
    let admin = registry.mint_top_hat(DEPLOYER, "admin");
    let Ok(branch) = registry.create_token(TokenRequest {
        parent: admin,
        details: "branch".into(),
        max_supply: 1,
        eligibility: Address::ZERO,
        toggle: Address::ZERO,
        mutable: true,
        image_uri: String::new(),
    }) else {
        return;
    };
    let config = ManagerConfig::new(Address::repeat_byte(0xee), ORACLE, admin, branch);
    let Ok(manager) = RoleManager::new(registry.clone(), config, RegisteredRoles, DEPLOYER) else {
        return;
    };
    let manager = Arc::new(manager);
    registry.install_oracle(ORACLE, &manager);

    for op in ops.into_iter().take(64) {
        let events_before = manager.events().len();
        let ok = match op {
            FuzzOp::Create { role: r, max_supply, holders, fail_on } => {
                if let Some(n) = fail_on {
                    registry.fail_mints_to(account(n));
                }
                let holders: Vec<Address> = holders.into_iter().take(8).map(account).collect();
                manager.create_role(DEPLOYER, role(r), "fuzz", u32::from(max_supply % 6), &holders).is_ok()
            }
            FuzzOp::Grant { as_admin, role: r, account: a } => {
                manager.grant_role(caller(as_admin), role(r), account(a)).is_ok()
            }
            FuzzOp::Revoke { as_admin, role: r, account: a } => {
                manager.revoke_role(caller(as_admin), role(r), account(a)).is_ok()
            }
            FuzzOp::Toggle { as_admin } => manager.toggle_branch(caller(as_admin)).is_ok(),
        };

        assert!(manager.table_is_consistent());
        assert_eq!(manager.events().len(), events_before + usize::from(ok));
        for r in manager.roles() {
            let hat = manager.role_hat(r).expect("listed role has a hat");
            assert_eq!(manager.hat_role(hat), Some(r));
            assert_eq!(manager.hat_status(hat), Ok(manager.is_active()));
        }
        for orphan in manager.orphaned_tokens() {
            assert_eq!(manager.hat_role(orphan), None);
        }
    }
});
