//! The remote API boundary.
//!
//! Stores talk to the server only through [`ApiClient`]. Transport concerns
//! (HTTP, bearer headers, retries) live behind implementations of this
//! trait; every call resolves to a typed [`ApiResponse`] or a
//! [`TaskboardError`](crate::error::TaskboardError).

use crate::{
    domain::{BoardId, Card, CardId, LoginData, User, UserBoard, UserId},
    error::Result,
};
use async_trait::async_trait;
use std::sync::Arc;

pub mod commands;
pub mod envelope;
pub mod guard;

#[cfg(any(test, feature = "test-support"))]
pub mod stub;

pub use commands::{CreateCardCommand, LoginCommand, MoveCardCommand, UpdateCardCommand};
pub use envelope::{ApiResponse, ApiResult};
pub use guard::{AuthGuard, SessionEvent, SessionEvents};

/// Typed client for the task board API
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Lists users. `None` filters are sent as an explicit "no filter".
    async fn get_users(
        &self,
        name_filter: Option<&str>,
        email_filter: Option<&str>,
        skip: u32,
        take: u32,
    ) -> Result<ApiResponse<Vec<User>>>;

    async fn get_user(&self, id: &UserId) -> Result<ApiResponse<User>>;

    /// Lists the board memberships of `user_id` as seen by `as_user_id`
    async fn get_user_boards(
        &self,
        user_id: &UserId,
        as_user_id: &UserId,
        skip: u32,
        take: u32,
    ) -> Result<ApiResponse<Vec<UserBoard>>>;

    /// Loads one membership with the full board aggregate embedded
    async fn get_user_board(
        &self,
        user_id: &UserId,
        board_id: &BoardId,
    ) -> Result<ApiResponse<UserBoard>>;

    async fn create_card(
        &self,
        user_id: &UserId,
        board_id: &BoardId,
        command: &CreateCardCommand,
    ) -> Result<ApiResponse<Card>>;

    async fn update_card(
        &self,
        user_id: &UserId,
        board_id: &BoardId,
        card_id: &CardId,
        command: &UpdateCardCommand,
    ) -> Result<ApiResponse<Card>>;

    async fn move_card(
        &self,
        user_id: &UserId,
        board_id: &BoardId,
        card_id: &CardId,
        command: &MoveCardCommand,
    ) -> Result<ApiResponse<Card>>;

    async fn login(&self, command: &LoginCommand) -> Result<ApiResponse<LoginData>>;
}

#[async_trait]
impl<T: ApiClient + ?Sized> ApiClient for Arc<T> {
    async fn get_users(
        &self,
        name_filter: Option<&str>,
        email_filter: Option<&str>,
        skip: u32,
        take: u32,
    ) -> Result<ApiResponse<Vec<User>>> {
        (**self).get_users(name_filter, email_filter, skip, take).await
    }

    async fn get_user(&self, id: &UserId) -> Result<ApiResponse<User>> {
        (**self).get_user(id).await
    }

    async fn get_user_boards(
        &self,
        user_id: &UserId,
        as_user_id: &UserId,
        skip: u32,
        take: u32,
    ) -> Result<ApiResponse<Vec<UserBoard>>> {
        (**self)
            .get_user_boards(user_id, as_user_id, skip, take)
            .await
    }

    async fn get_user_board(
        &self,
        user_id: &UserId,
        board_id: &BoardId,
    ) -> Result<ApiResponse<UserBoard>> {
        (**self).get_user_board(user_id, board_id).await
    }

    async fn create_card(
        &self,
        user_id: &UserId,
        board_id: &BoardId,
        command: &CreateCardCommand,
    ) -> Result<ApiResponse<Card>> {
        (**self).create_card(user_id, board_id, command).await
    }

    async fn update_card(
        &self,
        user_id: &UserId,
        board_id: &BoardId,
        card_id: &CardId,
        command: &UpdateCardCommand,
    ) -> Result<ApiResponse<Card>> {
        (**self)
            .update_card(user_id, board_id, card_id, command)
            .await
    }

    async fn move_card(
        &self,
        user_id: &UserId,
        board_id: &BoardId,
        card_id: &CardId,
        command: &MoveCardCommand,
    ) -> Result<ApiResponse<Card>> {
        (**self)
            .move_card(user_id, board_id, card_id, command)
            .await
    }

    async fn login(&self, command: &LoginCommand) -> Result<ApiResponse<LoginData>> {
        (**self).login(command).await
    }
}
