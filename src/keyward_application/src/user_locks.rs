use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockTable = DashMap<String, Arc<Mutex<()>>>;

/// Per-user async mutexes serialising load, mutate and save of one aggregate.
///
/// Entries are created on demand and removed once nobody holds or waits on them, including
/// waiters whose future is dropped before the lock is granted.
#[derive(Debug, Clone, Default)]
pub struct UserLocks {
    locks: Arc<LockTable>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, user_id: &str) -> UserLockGuard {
        let entry = LockEntry {
            lock: Arc::clone(self.locks.entry(user_id.to_owned()).or_default().value()),
            user_id: user_id.to_owned(),
            locks: Arc::clone(&self.locks),
        };
        let guard = Arc::clone(&entry.lock).lock_owned().await;

        UserLockGuard {
            _guard: guard,
            entry,
        }
    }

    /// Number of users currently holding or waiting on a lock.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Fields drop in order: the mutex is released before the table entry is reconsidered.
#[derive(Debug)]
pub struct UserLockGuard {
    _guard: OwnedMutexGuard<()>,
    entry: LockEntry,
}

impl UserLockGuard {
    pub fn user_id(&self) -> &str {
        &self.entry.user_id
    }
}

/// One interest in a table entry, held from the moment a caller starts waiting.
#[derive(Debug)]
struct LockEntry {
    lock: Arc<Mutex<()>>,
    user_id: String,
    locks: Arc<LockTable>,
}

impl Drop for LockEntry {
    fn drop(&mut self) {
        // One reference in the table, one here: nobody else holds or waits.
        self.locks.remove_if(&self.user_id, |_, lock| {
            Arc::ptr_eq(lock, &self.lock) && Arc::strong_count(lock) == 2
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_entry_is_removed_after_release() {
        let locks = UserLocks::new();

        let guard = locks.acquire("user-1").await;
        assert_eq!(locks.len(), 1);
        assert_eq!(guard.user_id(), "user-1");

        drop(guard);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_different_users_do_not_block_each_other() {
        let locks = UserLocks::new();

        let _first = locks.acquire("user-1").await;
        let second =
            tokio::time::timeout(Duration::from_millis(100), locks.acquire("user-2")).await;

        assert!(second.is_ok());
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_same_user_waits_for_release() {
        let locks = UserLocks::new();
        let first = locks.acquire("user-1").await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire("user-1").await;
            })
        };

        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        drop(first);
        waiter.await.unwrap();
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_abandoned_waiter_does_not_leak_entry() {
        let locks = UserLocks::new();
        let holder = locks.acquire("user-1").await;

        let mut waiting = Box::pin(locks.acquire("user-1"));
        let polled = tokio::time::timeout(Duration::from_millis(10), waiting.as_mut()).await;
        assert!(polled.is_err());

        drop(holder);
        assert_eq!(locks.len(), 1);

        drop(waiting);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_abandoned_waiter_keeps_entry_for_holder() {
        let locks = UserLocks::new();
        let holder = locks.acquire("user-1").await;

        let mut waiting = Box::pin(locks.acquire("user-1"));
        let polled = tokio::time::timeout(Duration::from_millis(10), waiting.as_mut()).await;
        assert!(polled.is_err());

        drop(waiting);
        assert_eq!(locks.len(), 1);

        drop(holder);
        assert!(locks.is_empty());
    }
}
