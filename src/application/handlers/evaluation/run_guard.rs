//! Re-entrancy guard for lifecycle runs.

use std::sync::atomic::{AtomicBool, Ordering};

/// Allows at most one run at a time.
///
/// Overlapping triggers (a slow scheduled tick, a manual call during a
/// scheduled run) do not wait; they are refused and the caller decides
/// whether to log or report it.
#[derive(Debug, Default)]
pub struct RunGuard {
    busy: AtomicBool,
}

impl RunGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the guard, or returns `None` if a run is in progress.
    ///
    /// The guard is released when the returned permit is dropped.
    pub fn try_acquire(&self) -> Option<RunPermit<'_>> {
        if self.busy.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(RunPermit { guard: self })
        }
    }
}

/// Proof of a claimed [`RunGuard`].
#[derive(Debug)]
pub struct RunPermit<'a> {
    guard: &'a RunGuard,
}

impl Drop for RunPermit<'_> {
    fn drop(&mut self) {
        self.guard.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_is_refused_while_held() {
        let guard = RunGuard::new();
        let permit = guard.try_acquire();
        assert!(permit.is_some());
        assert!(guard.try_acquire().is_none());
    }

    #[test]
    fn dropping_permit_releases_guard() {
        let guard = RunGuard::new();
        {
            let _permit = guard.try_acquire().unwrap();
        }
        assert!(guard.try_acquire().is_some());
    }
}
