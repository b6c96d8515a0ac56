use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use hangprims_game::{Session, SessionSnapshot};
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::cancel::CancelFlag;
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::handle::SessionHandle;

struct Slot {
    id: usize,
    session: Mutex<Session>,
}

struct StoreInner {
    slots: Box<[Slot]>,
    lock_poll_interval: Duration,
}

/// Owns a fixed number of sessions, each behind its own lock.
///
/// Cloning is cheap and every clone refers to the same sessions, so a store
/// can be shared across threads and handles can outlive the value they
/// were opened from.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

impl SessionStore {
    /// Create a store with every session in the choosing phase.
    pub fn new(config: StoreConfig) -> Result<Self> {
        if config.session_count == 0 {
            return Err(StoreError::InvalidConfig(
                "session_count must be at least 1".to_string(),
            ));
        }
        if config.lock_poll_interval.is_zero() {
            return Err(StoreError::InvalidConfig(
                "lock_poll_interval must be non-zero".to_string(),
            ));
        }

        let slots = (0..config.session_count)
            .map(|id| Slot {
                id,
                session: Mutex::new(Session::new()),
            })
            .collect();

        info!(sessions = config.session_count, "session store initialized");
        Ok(Self {
            inner: Arc::new(StoreInner {
                slots,
                lock_poll_interval: config.lock_poll_interval,
            }),
        })
    }

    /// Number of sessions.
    pub fn len(&self) -> usize {
        self.inner.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.slots.is_empty()
    }

    /// Get a handle to session `id`.
    pub fn open(&self, id: usize) -> Result<SessionHandle> {
        self.slot(id)?;
        debug!(session = id, "session opened");
        Ok(SessionHandle::new(self.clone(), id))
    }

    /// Current state of session `id`, taken under its lock.
    pub fn snapshot(&self, id: usize) -> Result<SessionSnapshot> {
        Ok(self.lock(id, None)?.snapshot())
    }

    /// Clear every session back to the choosing phase.
    ///
    /// Sessions are cleared one at a time; each waits for its own lock.
    pub fn teardown(&self) {
        for slot in self.inner.slots.iter() {
            slot.session.lock().reset();
        }
        info!(sessions = self.len(), "session store cleared");
    }

    /// Lock session `id` for the duration of one operation.
    ///
    /// Without a cancel flag this blocks until the lock is free. With one,
    /// an uncontended lock is taken immediately; otherwise the wait is
    /// sliced by the poll interval and abandoned once the flag is raised.
    pub(crate) fn lock(
        &self,
        id: usize,
        cancel: Option<&CancelFlag>,
    ) -> Result<MutexGuard<'_, Session>> {
        let slot = self.slot(id)?;
        let Some(cancel) = cancel else {
            return Ok(slot.session.lock());
        };

        if let Some(guard) = slot.session.try_lock() {
            return Ok(guard);
        }
        loop {
            if cancel.is_cancelled() {
                debug!(session = slot.id, "lock wait cancelled");
                return Err(StoreError::Cancelled(slot.id));
            }
            if let Some(guard) = slot.session.try_lock_for(self.inner.lock_poll_interval) {
                return Ok(guard);
            }
        }
    }

    fn slot(&self, id: usize) -> Result<&Slot> {
        self.inner.slots.get(id).ok_or(StoreError::NotFound {
            id,
            count: self.inner.slots.len(),
        })
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("sessions", &self.len())
            .field("lock_poll_interval", &self.inner.lock_poll_interval)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use hangprims_game::{Phase, PROMPT};

    use super::*;
    use crate::error::ErrorKind;

    fn store(count: usize) -> SessionStore {
        SessionStore::new(StoreConfig::default().with_session_count(count))
            .expect("store should build")
    }

    #[test]
    fn rejects_empty_store() {
        let err = SessionStore::new(StoreConfig::default().with_session_count(0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn rejects_zero_poll_interval() {
        let config = StoreConfig::default().with_lock_poll_interval(Duration::ZERO);
        assert!(matches!(
            SessionStore::new(config),
            Err(StoreError::InvalidConfig(_))
        ));
    }

    #[test]
    fn open_unknown_id_is_not_found() {
        let store = store(2);
        assert_eq!(store.len(), 2);
        assert!(store.open(1).is_ok());

        let err = store.open(2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn clones_share_sessions() {
        let store = store(1);
        let other = store.clone();
        store.open(0).unwrap().write_bytes(b"apple").unwrap();

        assert_eq!(other.snapshot(0).unwrap().phase, Phase::Guessing);
    }

    #[test]
    fn teardown_clears_every_session() {
        let store = store(3);
        for id in 0..3 {
            store.open(id).unwrap().write_bytes(b"word").unwrap();
        }

        store.teardown();

        for id in 0..3 {
            let handle = store.open(id).unwrap();
            assert_eq!(handle.read_bytes(100).unwrap().as_ref(), PROMPT);
        }
    }

    #[test]
    fn cancelled_wait_fails_without_mutating() {
        let store = store(1);
        let cancel = CancelFlag::new();
        cancel.cancel();
        let handle = store.open(0).unwrap().with_cancel(cancel);

        let guard = store.inner.slots[0].session.lock();
        let err = handle.write_bytes(b"apple").unwrap_err();
        assert!(matches!(err, StoreError::Cancelled(0)));
        drop(guard);

        assert_eq!(store.snapshot(0).unwrap().phase, Phase::Choosing);
    }

    #[test]
    fn raised_flag_does_not_block_uncontended_lock() {
        let store = store(1);
        let cancel = CancelFlag::new();
        cancel.cancel();
        let handle = store.open(0).unwrap().with_cancel(cancel);

        assert_eq!(handle.write_bytes(b"apple").unwrap(), 5);
    }

    #[test]
    fn cancel_interrupts_a_waiting_caller() {
        let store = store(1);
        let cancel = CancelFlag::new();
        let handle = store.open(0).unwrap().with_cancel(cancel.clone());

        let guard = store.inner.slots[0].session.lock();
        let waiter = thread::spawn(move || handle.write_bytes(b"apple"));
        thread::sleep(Duration::from_millis(30));
        cancel.cancel();

        let result = waiter.join().expect("waiter should not panic");
        assert!(matches!(result, Err(StoreError::Cancelled(0))));
        drop(guard);
        assert_eq!(store.snapshot(0).unwrap().phase, Phase::Choosing);
    }

    #[test]
    fn debug_does_not_lock_sessions() {
        let store = store(2);
        let _guard = store.inner.slots[0].session.lock();
        let text = format!("{store:?}");
        assert!(text.contains("sessions: 2"));
    }
}
