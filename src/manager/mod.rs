pub mod core;
pub mod guard;

pub use core::{RoleManager, RoleTable, RoleTableSnapshot};
pub use guard::{GuardScope, ReentrancyGuard};
