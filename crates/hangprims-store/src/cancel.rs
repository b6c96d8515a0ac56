use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag that interrupts lock waits.
///
/// Clones share the same flag. Raising it makes every handle carrying it
/// fail with `Cancelled` instead of waiting for a busy session; operations
/// that get the lock without waiting are unaffected.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Lower the flag so the handles carrying it wait normally again.
    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let flag = CancelFlag::new();
        let other = flag.clone();
        assert!(!other.is_cancelled());

        flag.cancel();
        assert!(other.is_cancelled());

        other.clear();
        assert!(!flag.is_cancelled());
    }
}
