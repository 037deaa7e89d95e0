use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = DashMap<i64, Arc<Mutex<()>>>;

/// Per-user turn locks
///
/// A turn holds the user's lock until it finishes, including the pauses
/// between messages. Updates arriving meanwhile are turned away instead of
/// queued, so a learner cannot start a second video while one is playing out.
#[derive(Default)]
pub struct SessionLocks {
    locks: Arc<LockMap>,
}

/// Held for the duration of one turn
///
/// Dropping the last guard of a user removes the user's lock entry.
pub struct TurnGuard {
    user_id: i64,
    locks: Arc<LockMap>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the user's lock, or returns `None` if a turn is already running
    pub fn try_acquire(&self, user_id: i64) -> Option<TurnGuard> {
        let lock = self.locks.entry(user_id).or_default().clone();
        let guard = lock.try_lock_owned().ok()?;
        Some(TurnGuard {
            user_id,
            locks: Arc::clone(&self.locks),
            guard: Some(guard),
        })
    }
}

impl Drop for TurnGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // clones are only taken under the shard lock, so a count of one means nobody is waiting
        self.locks
            .remove_if(&self.user_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
