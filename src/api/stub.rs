//! In-memory [`ApiClient`] with canned responses, for tests.

use crate::{
    api::{
        ApiClient, ApiResponse, CreateCardCommand, LoginCommand, MoveCardCommand,
        UpdateCardCommand,
    },
    domain::{BoardId, Card, CardId, LoginData, User, UserBoard, UserId},
    error::{Result, TaskboardError},
};
use async_trait::async_trait;
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, PoisonError},
};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// A call received by [`StubApi`], with its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    GetUsers {
        name_filter: Option<String>,
        email_filter: Option<String>,
        skip: u32,
        take: u32,
    },
    GetUser {
        id: UserId,
    },
    GetUserBoards {
        user_id: UserId,
        as_user_id: UserId,
        skip: u32,
        take: u32,
    },
    GetUserBoard {
        user_id: UserId,
        board_id: BoardId,
    },
    CreateCard {
        user_id: UserId,
        board_id: BoardId,
        command: CreateCardCommand,
    },
    UpdateCard {
        user_id: UserId,
        board_id: BoardId,
        card_id: CardId,
        command: UpdateCardCommand,
    },
    MoveCard {
        user_id: UserId,
        board_id: BoardId,
        card_id: CardId,
        command: MoveCardCommand,
    },
    Login {
        username: String,
    },
}

type Replies<T> = Mutex<VecDeque<Result<ApiResponse<T>>>>;

/// Scripted API client
///
/// Each endpoint pops its next queued reply; an endpoint with nothing queued
/// fails with [`TaskboardError::Unknown`]. Every call is logged before it
/// waits on the gate, so a held call is already visible in [`StubApi::calls`].
#[derive(Debug, Default)]
pub struct StubApi {
    users: Replies<Vec<User>>,
    user: Replies<User>,
    user_boards: Replies<Vec<UserBoard>>,
    user_board: Replies<UserBoard>,
    created_cards: Replies<Card>,
    updated_cards: Replies<Card>,
    moved_cards: Replies<Card>,
    logins: Replies<LoginData>,
    calls: Mutex<Vec<ApiCall>>,
    gate: Arc<AsyncMutex<()>>,
}

impl StubApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_get_users(&self, reply: Result<ApiResponse<Vec<User>>>) {
        queue(&self.users, reply);
    }

    pub fn on_get_user(&self, reply: Result<ApiResponse<User>>) {
        queue(&self.user, reply);
    }

    pub fn on_get_user_boards(&self, reply: Result<ApiResponse<Vec<UserBoard>>>) {
        queue(&self.user_boards, reply);
    }

    pub fn on_get_user_board(&self, reply: Result<ApiResponse<UserBoard>>) {
        queue(&self.user_board, reply);
    }

    pub fn on_create_card(&self, reply: Result<ApiResponse<Card>>) {
        queue(&self.created_cards, reply);
    }

    pub fn on_update_card(&self, reply: Result<ApiResponse<Card>>) {
        queue(&self.updated_cards, reply);
    }

    pub fn on_move_card(&self, reply: Result<ApiResponse<Card>>) {
        queue(&self.moved_cards, reply);
    }

    pub fn on_login(&self, reply: Result<ApiResponse<LoginData>>) {
        queue(&self.logins, reply);
    }

    /// Holds every call open until the returned guard is dropped
    pub async fn hold(&self) -> OwnedMutexGuard<()> {
        Arc::clone(&self.gate).lock_owned().await
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    async fn reply<T>(
        &self,
        endpoint: &str,
        call: ApiCall,
        replies: &Replies<T>,
    ) -> Result<ApiResponse<T>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);

        let _open = self.gate.lock().await;

        replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| {
                Err(TaskboardError::unknown(format!(
                    "no stubbed response for {}",
                    endpoint
                )))
            })
    }
}

fn queue<T>(replies: &Replies<T>, reply: Result<ApiResponse<T>>) {
    replies
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push_back(reply);
}

#[async_trait]
impl ApiClient for StubApi {
    async fn get_users(
        &self,
        name_filter: Option<&str>,
        email_filter: Option<&str>,
        skip: u32,
        take: u32,
    ) -> Result<ApiResponse<Vec<User>>> {
        let call = ApiCall::GetUsers {
            name_filter: name_filter.map(str::to_string),
            email_filter: email_filter.map(str::to_string),
            skip,
            take,
        };
        self.reply("get_users", call, &self.users).await
    }

    async fn get_user(&self, id: &UserId) -> Result<ApiResponse<User>> {
        self.reply("get_user", ApiCall::GetUser { id: *id }, &self.user)
            .await
    }

    async fn get_user_boards(
        &self,
        user_id: &UserId,
        as_user_id: &UserId,
        skip: u32,
        take: u32,
    ) -> Result<ApiResponse<Vec<UserBoard>>> {
        let call = ApiCall::GetUserBoards {
            user_id: *user_id,
            as_user_id: *as_user_id,
            skip,
            take,
        };
        self.reply("get_user_boards", call, &self.user_boards).await
    }

    async fn get_user_board(
        &self,
        user_id: &UserId,
        board_id: &BoardId,
    ) -> Result<ApiResponse<UserBoard>> {
        let call = ApiCall::GetUserBoard {
            user_id: *user_id,
            board_id: *board_id,
        };
        self.reply("get_user_board", call, &self.user_board).await
    }

    async fn create_card(
        &self,
        user_id: &UserId,
        board_id: &BoardId,
        command: &CreateCardCommand,
    ) -> Result<ApiResponse<Card>> {
        let call = ApiCall::CreateCard {
            user_id: *user_id,
            board_id: *board_id,
            command: command.clone(),
        };
        self.reply("create_card", call, &self.created_cards).await
    }

    async fn update_card(
        &self,
        user_id: &UserId,
        board_id: &BoardId,
        card_id: &CardId,
        command: &UpdateCardCommand,
    ) -> Result<ApiResponse<Card>> {
        let call = ApiCall::UpdateCard {
            user_id: *user_id,
            board_id: *board_id,
            card_id: *card_id,
            command: command.clone(),
        };
        self.reply("update_card", call, &self.updated_cards).await
    }

    async fn move_card(
        &self,
        user_id: &UserId,
        board_id: &BoardId,
        card_id: &CardId,
        command: &MoveCardCommand,
    ) -> Result<ApiResponse<Card>> {
        let call = ApiCall::MoveCard {
            user_id: *user_id,
            board_id: *board_id,
            card_id: *card_id,
            command: command.clone(),
        };
        self.reply("move_card", call, &self.moved_cards).await
    }

    async fn login(&self, command: &LoginCommand) -> Result<ApiResponse<LoginData>> {
        let call = ApiCall::Login {
            username: command.username.clone(),
        };
        self.reply("login", call, &self.logins).await
    }
}
