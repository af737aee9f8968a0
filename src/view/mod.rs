//! Page-level view stores.
//!
//! A view owns only page-local state (search term, drag gesture) and
//! forwards everything else to the domain stores of a shared
//! [`RootStore`](crate::store::RootStore). Busy and error state shown on a
//! page is the combination of every store the page depends on.

use crate::store::BaseStore;

pub mod board_detail;
pub mod boards;
pub mod users;

pub use board_detail::BoardDetailView;
pub use boards::BoardsView;
pub use users::UsersView;

/// True while any of the stores is busy
pub(crate) fn any_loading(stores: &[&BaseStore]) -> bool {
    stores.iter().any(|store| store.loading())
}

/// The first error among the stores, in the given order
pub(crate) fn first_error(stores: &[&BaseStore]) -> Option<String> {
    stores.iter().find_map(|store| store.error())
}
