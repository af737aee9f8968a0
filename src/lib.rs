//! # Taskboard Core
//!
//! Client-side state layer for a kanban task board.
//!
//! This crate provides reactive stores mirroring the server's users,
//! boards, cards and session, the async operation wrapper they share, and
//! the pure logic translating drag-and-drop gestures into card moves. The
//! HTTP transport is not part of the crate: anything implementing
//! [`ApiClient`] can be plugged in.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod storage;
pub mod store;
pub mod view;

// Re-export commonly used types
pub use api::{ApiClient, ApiResponse, AuthGuard, SessionEvent, SessionEvents};
pub use config::ClientConfig;
pub use domain::{
    board::{Board, Column, UserBoard},
    card::Card,
    reorder::{plan_move, DragState, DropTarget, MoveCommand},
    session::{Session, SessionUser},
    user::User,
};
pub use error::{Result, TaskboardError};
pub use storage::SessionStorage;
pub use store::{AuthStore, BaseStore, BoardStore, CardStore, RootStore, Store, UserStore};
pub use view::{BoardDetailView, BoardsView, UsersView};
