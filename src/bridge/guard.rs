//! Re-entrancy suppression for remote-origin edits.
//!
//! While the bridge writes a remote edit into the buffer, the buffer reports
//! that write back through its change listeners. [`SyncGuard`] marks that
//! window so the listener can tell an echo from a user edit.
//!
//! The guard is only entered through [`SyncGuard::suppress`], whose token
//! restores the previous state on drop. Early returns, `?` and unwinding all
//! release it.

use std::cell::Cell;

/// Suppression flag for one bridge. Not a lock: valid only on the thread that
/// owns the buffer.
#[derive(Debug, Default)]
pub struct SyncGuard {
    active: Cell<bool>,
}

impl SyncGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a remote-origin edit is being applied.
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Enter suppression until the returned token is dropped.
    #[must_use = "suppression ends as soon as the token is dropped"]
    pub fn suppress(&self) -> Suppressed<'_> {
        let previous = self.active.replace(true);
        Suppressed {
            guard: self,
            previous,
        }
    }
}

/// Scoped suppression token from [`SyncGuard::suppress`].
#[derive(Debug)]
pub struct Suppressed<'a> {
    guard: &'a SyncGuard,
    previous: bool,
}

impl Drop for Suppressed<'_> {
    fn drop(&mut self) {
        self.guard.active.set(self.previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn test_scoped() {
        let guard = SyncGuard::new();
        assert!(!guard.is_active());
        {
            let _token = guard.suppress();
            assert!(guard.is_active());
        }
        assert!(!guard.is_active());
    }

    #[test]
    fn test_nested_restores_outer_state() {
        let guard = SyncGuard::new();
        let outer = guard.suppress();
        {
            let _inner = guard.suppress();
            assert!(guard.is_active());
        }
        assert!(guard.is_active());
        drop(outer);
        assert!(!guard.is_active());
    }

    #[test]
    fn test_released_on_error_path() {
        fn failing(guard: &SyncGuard) -> Result<u32, std::num::ParseIntError> {
            let _token = guard.suppress();
            let offset: u32 = "not an offset".parse()?;
            Ok(offset)
        }

        let guard = SyncGuard::new();
        assert!(failing(&guard).is_err());
        assert!(!guard.is_active());
    }

    #[test]
    fn test_released_on_panic() {
        let guard = SyncGuard::new();
        let result = catch_unwind(AssertUnwindSafe(|| {
            let _token = guard.suppress();
            panic!("buffer exploded");
        }));
        assert!(result.is_err());
        assert!(!guard.is_active());
    }
}
