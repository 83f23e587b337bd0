use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use hat_roles::testing::InMemoryRegistry;
use hat_roles::{ActivityOracle, Address, CapabilityRegistry, ManagerConfig, RegisteredRoles, RoleId, RoleManager, TokenRequest};

const DEPLOYER: Address = Address::repeat_byte(0xd0);
const ORACLE: Address = Address::repeat_byte(0x0c);

fn deploy() -> Arc<RoleManager<Arc<InMemoryRegistry>, RegisteredRoles>> {
    let registry = Arc::new(InMemoryRegistry::uncapped());
    let admin = registry.mint_top_hat(DEPLOYER, "admin");
    let branch = registry
        .create_token(TokenRequest {
            parent: admin,
            details: "branch".into(),
            max_supply: 1,
            eligibility: Address::ZERO,
            toggle: Address::ZERO,
            mutable: true,
            image_uri: String::new(),
        })
        .expect("branch hat");
    let config = ManagerConfig::new(Address::repeat_byte(0xee), ORACLE, admin, branch);
    let manager = Arc::new(RoleManager::new(registry.clone(), config, RegisteredRoles, DEPLOYER).expect("deploy"));
    registry.install_oracle(ORACLE, &manager);
    manager
}

fn role_benchmarks(c: &mut Criterion) {
    let holders = [Address::repeat_byte(0x0a), Address::repeat_byte(0x0b)];

    c.bench_function("create_role_two_holders", |b| {
        b.iter_batched(
            deploy,
            |manager| {
                let _hat = manager.create_role(DEPLOYER, RoleId::from_label("OPERATOR"), "ops", 2, &holders);
            },
            BatchSize::SmallInput,
        )
    });

    let manager = deploy();
    let hat = manager
        .create_role(DEPLOYER, RoleId::from_label("OPERATOR"), "ops", 2, &holders)
        .expect("create_role");
    c.bench_function("hat_status", |b| b.iter(|| manager.hat_status(hat)));
    c.bench_function("has_role", |b| b.iter(|| manager.has_role(RoleId::from_label("OPERATOR"), holders[0])));
}

criterion_group!(benches, role_benchmarks);
criterion_main!(benches);
