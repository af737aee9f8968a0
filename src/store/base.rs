use crate::{
    error::{Result, TaskboardError},
    store::observable::Observable,
};
use std::future::Future;
use tokio::sync::watch;
use tracing::{debug, error};

/// Busy/error state shared by every store
///
/// `loading` is derived from a counter of in-flight operations so that
/// overlapping operations never flip it to `false` while one is pending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStatus {
    pending: usize,
    error: Option<String>,
}

impl StoreStatus {
    pub fn loading(&self) -> bool {
        self.pending > 0
    }

    /// Number of operations currently holding the lock
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Reentrant busy tracking, error normalization and the async operation
/// wrapper every domain store is built on.
#[derive(Debug)]
pub struct BaseStore {
    name: &'static str,
    status: Observable<StoreStatus>,
}

impl BaseStore {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            status: Observable::default(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn loading(&self) -> bool {
        self.status.with(StoreStatus::loading)
    }

    pub fn error(&self) -> Option<String> {
        self.status.with(|s| s.error.clone())
    }

    pub fn status(&self) -> StoreStatus {
        self.status.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreStatus> {
        self.status.subscribe()
    }

    /// Registers one more in-flight operation
    pub fn lock(&self) {
        self.status.modify(|s| s.pending += 1);
    }

    /// Releases one in-flight operation. The counter never goes below zero.
    pub fn unlock(&self) {
        self.status.modify(|s| s.pending = s.pending.saturating_sub(1));
    }

    pub(crate) fn set_error(&self, message: Option<String>) {
        self.status.modify(|s| s.error = message);
    }

    pub(crate) fn clear_error(&self) {
        self.set_error(None);
    }

    /// Records a failure as the store's error
    ///
    /// `fallback`, when given, replaces the extracted message.
    pub(crate) fn fail(&self, err: &TaskboardError, fallback: Option<&str>) {
        error!(store = self.name, error = %err, "Store error");
        let message = match fallback {
            Some(fallback) => fallback.to_string(),
            None => err.user_message(),
        };
        self.set_error(Some(message));
    }

    /// Reports an error detected before any request was issued
    ///
    /// The lock counter is not touched; the message is shown as is.
    pub(crate) fn reject(&self, err: TaskboardError) {
        debug!(store = self.name, error = %err, "Rejected before request");
        self.set_error(Some(err.user_message()));
    }

    /// Runs `operation` under the store lock
    ///
    /// Clears the previous error first. On failure the error is recorded
    /// (see [`BaseStore::fail`]) and `None` is returned; errors never
    /// propagate to the caller. The lock is released exactly once, also
    /// when the returned future is dropped before completion.
    pub async fn execute<T>(
        &self,
        fallback: Option<&str>,
        operation: impl Future<Output = Result<T>>,
    ) -> Option<T> {
        let _lock = OperationLock::acquire(self);
        self.clear_error();

        match operation.await {
            Ok(value) => Some(value),
            Err(err) => {
                self.fail(&err, fallback);
                None
            }
        }
    }

    /// Clears loading, error and the lock counter
    pub fn reset(&self) {
        self.status.set(StoreStatus::default());
    }
}

/// Holds one count of the store lock until dropped
struct OperationLock<'a> {
    store: &'a BaseStore,
}

impl<'a> OperationLock<'a> {
    fn acquire(store: &'a BaseStore) -> Self {
        store.lock();
        Self { store }
    }
}

impl Drop for OperationLock<'_> {
    fn drop(&mut self) {
        self.store.unlock();
    }
}
