//! Observable store fields.
//!
//! A single value with push-based change notification over a `watch`
//! channel. Readers take cheap snapshots; only the owning store writes.

use tokio::sync::watch;

#[derive(Debug)]
pub struct Observable<T> {
    sender: watch::Sender<T>,
}

impl<T: Clone> Observable<T> {
    pub fn new(value: T) -> Self {
        let (sender, _) = watch::channel(value);
        Self { sender }
    }

    /// Clones the current value
    pub fn get(&self) -> T {
        self.sender.borrow().clone()
    }

    /// Reads the current value without cloning it
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.sender.borrow())
    }

    /// Subscribe to changes via a `watch::Receiver`.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }

    pub(crate) fn set(&self, value: T) {
        // `send_replace` updates unconditionally, even with zero receivers.
        self.sender.send_replace(value);
    }

    pub(crate) fn modify(&self, f: impl FnOnce(&mut T)) {
        self.sender.send_modify(f);
    }
}

impl<T: Clone + Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
