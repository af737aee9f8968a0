//! Reactive stores mirroring server state.
//!
//! Each domain store owns its slice of remote state, exposes it through
//! [`Observable`] fields, and reports busy/error state through its
//! [`BaseStore`]. Failures never escape as `Err`: callers see a `None` /
//! `false` return value and the store's `error` field.

use async_trait::async_trait;

pub mod auth;
pub mod base;
pub mod board;
pub mod card;
pub mod observable;
pub mod root;
pub mod user;

pub use auth::AuthStore;
pub use base::{BaseStore, StoreStatus};
pub use board::BoardStore;
pub use card::CardStore;
pub use observable::Observable;
pub use root::RootStore;
pub use user::UserStore;

/// Common surface of every domain store
#[async_trait]
pub trait Store: Send + Sync {
    fn base(&self) -> &BaseStore;

    fn loading(&self) -> bool {
        self.base().loading()
    }

    fn error(&self) -> Option<String> {
        self.base().error()
    }

    /// Returns every observable field to its initial value
    async fn reset(&self);
}
