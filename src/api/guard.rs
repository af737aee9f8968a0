use crate::{
    api::{
        ApiClient, ApiResponse, CreateCardCommand, LoginCommand, MoveCardCommand,
        UpdateCardCommand,
    },
    domain::{BoardId, Card, CardId, LoginData, User, UserBoard, UserId},
    error::Result,
    storage::{SessionStorage, AUTH_TOKEN_KEY, SESSION_KEYS},
};
use async_trait::async_trait;
use std::{fmt, sync::Arc};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Session lifecycle signals raised below the store layer
#[derive(Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The server rejected `token`; its persisted credentials are gone
    Revoked { token: String },
}

impl fmt::Debug for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEvent::Revoked { .. } => f
                .debug_struct("Revoked")
                .field("token", &"<redacted>")
                .finish(),
        }
    }
}

/// Broadcast bus for [`SessionEvent`]s
#[derive(Debug, Clone)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    const CAPACITY: usize = 16;

    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(Self::CAPACITY);
        Self { sender }
    }

    /// Publishes an event, returning how many subscribers received it
    pub fn publish(&self, event: SessionEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}

/// Wraps an [`ApiClient`] and reacts globally to authorization failures
///
/// A call rejected with HTTP 401 wipes the persisted session and publishes
/// [`SessionEvent::Revoked`], whichever store issued the call. Only the
/// session the call was made under is revoked: nothing happens when no
/// session was stored, or when another login replaced it meanwhile.
/// Rejected logins are plain failures. The error itself always reaches
/// the caller.
pub struct AuthGuard<C> {
    inner: C,
    storage: Arc<dyn SessionStorage>,
    events: SessionEvents,
}

impl<C: ApiClient> AuthGuard<C> {
    pub fn new(inner: C, storage: Arc<dyn SessionStorage>, events: SessionEvents) -> Self {
        Self {
            inner,
            storage,
            events,
        }
    }

    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    async fn stored_token(&self) -> Option<String> {
        match self.storage.get(AUTH_TOKEN_KEY).await {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "Could not read persisted session token");
                None
            }
        }
    }

    async fn check<T>(
        &self,
        endpoint: &'static str,
        sent_with: Option<String>,
        result: Result<T>,
    ) -> Result<T> {
        if let Err(err) = &result {
            debug!(endpoint, error = %err, "API call failed");
            if err.is_unauthorized() {
                if let Some(token) = sent_with {
                    self.revoke(endpoint, token).await;
                }
            }
        }
        result
    }

    async fn revoke(&self, endpoint: &'static str, token: String) {
        if self.stored_token().await.as_deref() != Some(token.as_str()) {
            debug!(endpoint, "Ignoring 401 for a session that is no longer stored");
            return;
        }

        warn!(endpoint, "Session rejected by server, clearing persisted credentials");
        for key in SESSION_KEYS {
            if let Err(err) = self.storage.remove(key).await {
                warn!(key, error = %err, "Failed to remove persisted session entry");
            }
        }
        self.events.publish(SessionEvent::Revoked { token });
    }
}

#[async_trait]
impl<C: ApiClient> ApiClient for AuthGuard<C> {
    async fn get_users(
        &self,
        name_filter: Option<&str>,
        email_filter: Option<&str>,
        skip: u32,
        take: u32,
    ) -> Result<ApiResponse<Vec<User>>> {
        let token = self.stored_token().await;
        let result = self
            .inner
            .get_users(name_filter, email_filter, skip, take)
            .await;
        self.check("get_users", token, result).await
    }

    async fn get_user(&self, id: &UserId) -> Result<ApiResponse<User>> {
        let token = self.stored_token().await;
        let result = self.inner.get_user(id).await;
        self.check("get_user", token, result).await
    }

    async fn get_user_boards(
        &self,
        user_id: &UserId,
        as_user_id: &UserId,
        skip: u32,
        take: u32,
    ) -> Result<ApiResponse<Vec<UserBoard>>> {
        let token = self.stored_token().await;
        let result = self
            .inner
            .get_user_boards(user_id, as_user_id, skip, take)
            .await;
        self.check("get_user_boards", token, result).await
    }

    async fn get_user_board(
        &self,
        user_id: &UserId,
        board_id: &BoardId,
    ) -> Result<ApiResponse<UserBoard>> {
        let token = self.stored_token().await;
        let result = self.inner.get_user_board(user_id, board_id).await;
        self.check("get_user_board", token, result).await
    }

    async fn create_card(
        &self,
        user_id: &UserId,
        board_id: &BoardId,
        command: &CreateCardCommand,
    ) -> Result<ApiResponse<Card>> {
        let token = self.stored_token().await;
        let result = self.inner.create_card(user_id, board_id, command).await;
        self.check("create_card", token, result).await
    }

    async fn update_card(
        &self,
        user_id: &UserId,
        board_id: &BoardId,
        card_id: &CardId,
        command: &UpdateCardCommand,
    ) -> Result<ApiResponse<Card>> {
        let token = self.stored_token().await;
        let result = self
            .inner
            .update_card(user_id, board_id, card_id, command)
            .await;
        self.check("update_card", token, result).await
    }

    async fn move_card(
        &self,
        user_id: &UserId,
        board_id: &BoardId,
        card_id: &CardId,
        command: &MoveCardCommand,
    ) -> Result<ApiResponse<Card>> {
        let token = self.stored_token().await;
        let result = self
            .inner
            .move_card(user_id, board_id, card_id, command)
            .await;
        self.check("move_card", token, result).await
    }

    /// Rejected credentials are not a revoked session: passed through as is
    async fn login(&self, command: &LoginCommand) -> Result<ApiResponse<LoginData>> {
        let result = self.inner.login(command).await;
        if let Err(err) = &result {
            debug!(username = %command.username, error = %err, "Login rejected");
        }
        result
    }
}
