//! Non-reentrant execution guard.
//!
//! Every mutating entry point of the manager holds a `GuardScope` for its
//! whole body. A second `enter` while a scope is alive fails fast instead of
//! blocking, and dropping the scope (including on `?` early returns) releases
//! the guard.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::RoleManagerError;

#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    entered: AtomicBool,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// `RoleManagerError::Reentrancy` if a scope is already alive.
    pub fn enter(&self) -> Result<GuardScope<'_>, RoleManagerError> {
        self.entered
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map_err(|_| RoleManagerError::Reentrancy)?;
        Ok(GuardScope { guard: self })
    }

    pub fn is_entered(&self) -> bool {
        self.entered.load(Ordering::Acquire)
    }
}

/// Releases the guard on drop.
#[must_use = "the guard is released as soon as the scope is dropped"]
#[derive(Debug)]
pub struct GuardScope<'a> {
    guard: &'a ReentrancyGuard,
}

impl Drop for GuardScope<'_> {
    fn drop(&mut self) {
        self.guard.entered.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_enter_is_rejected() {
        let guard = ReentrancyGuard::new();
        let scope = guard.enter().expect("first enter");
        assert!(guard.is_entered());
        assert_eq!(guard.enter().unwrap_err(), RoleManagerError::Reentrancy);
        drop(scope);
        assert!(!guard.is_entered());
        assert!(guard.enter().is_ok());
    }

    #[test]
    fn test_released_on_early_return() {
        fn failing(guard: &ReentrancyGuard) -> Result<(), RoleManagerError> {
            let _scope = guard.enter()?;
            Err(RoleManagerError::InvalidAddress)
        }

        let guard = ReentrancyGuard::new();
        assert_eq!(failing(&guard), Err(RoleManagerError::InvalidAddress));
        assert!(!guard.is_entered());
    }
}
