use crate::{
    api::{ApiClient, LoginCommand},
    domain::{Session, SessionUser},
    error::{Result, TaskboardError},
    storage::{SessionStorage, AUTH_TOKEN_KEY, CURRENT_USER_KEY, SESSION_KEYS},
    store::{BaseStore, Observable, Store},
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Session lifecycle: login, logout and rehydration from storage
///
/// The session is held as one `Option<Session>` so a token without a user
/// (or the reverse) cannot be represented.
pub struct AuthStore {
    base: BaseStore,
    api: Arc<dyn ApiClient>,
    storage: Arc<dyn SessionStorage>,
    session: Observable<Option<Session>>,
}

impl AuthStore {
    /// Creates the store and restores any persisted session
    pub async fn new(api: Arc<dyn ApiClient>, storage: Arc<dyn SessionStorage>) -> Self {
        let store = Self {
            base: BaseStore::new("auth"),
            api,
            storage,
            session: Observable::default(),
        };
        store.rehydrate().await;
        store
    }

    pub fn session(&self) -> &Observable<Option<Session>> {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.with(Option::is_some)
    }

    pub fn token(&self) -> Option<String> {
        self.session.with(|s| s.as_ref().map(|s| s.token.clone()))
    }

    pub fn current_user(&self) -> Option<SessionUser> {
        self.session.with(|s| s.as_ref().map(|s| s.user.clone()))
    }

    /// Restores the persisted session, if a consistent one exists
    ///
    /// A half-written or unparsable session is wiped. A storage that cannot
    /// be read leaves the store anonymous.
    pub async fn rehydrate(&self) {
        let token = self.storage.get(AUTH_TOKEN_KEY).await;
        let user = self.storage.get(CURRENT_USER_KEY).await;

        let (token, user_json) = match (token, user) {
            (Ok(Some(token)), Ok(Some(user))) => (token, user),
            (Ok(None), Ok(None)) => return,
            (Ok(_), Ok(_)) => {
                warn!("Persisted session is incomplete, clearing it");
                self.logout().await;
                return;
            }
            (Err(err), _) | (_, Err(err)) => {
                warn!(error = %err, "Could not read persisted session");
                return;
            }
        };

        match serde_json::from_str::<SessionUser>(&user_json) {
            Ok(user) => {
                info!(username = %user.username, "Restored persisted session");
                self.session.set(Some(Session { token, user }));
            }
            Err(err) => {
                warn!(error = %err, "Failed to parse stored user data, clearing session");
                self.logout().await;
            }
        }
    }

    /// Signs in and persists the session
    ///
    /// Returns `false` when the credentials are blank, the request fails or
    /// the server returns no login payload.
    pub async fn login(&self, username: &str, password: &str) -> bool {
        if let Err(err) = validate_credentials(username, password) {
            self.base.reject(err);
            return false;
        }

        let command = LoginCommand {
            username: username.to_string(),
            password: password.to_string(),
        };

        let outcome = self
            .base
            .execute(Some("Login failed"), async {
                let Some(data) = self.api.login(&command).await?.into_data() else {
                    return Ok(false);
                };

                let (token, user) = data.into_parts();
                let token = token.ok_or_else(|| {
                    TaskboardError::unknown("Login response did not contain a token")
                })?;

                self.persist(&token, &user).await?;
                info!(username = %user.username, "Logged in");
                self.session.set(Some(Session { token, user }));
                Ok(true)
            })
            .await;

        outcome == Some(true)
    }

    /// Ends the session and removes the persisted credentials
    ///
    /// Never fails; storage errors are logged.
    pub async fn logout(&self) {
        if self.session.with(Option::is_some) {
            info!("Logged out");
        }
        self.session.set(None);

        for key in SESSION_KEYS {
            if let Err(err) = self.storage.remove(key).await {
                warn!(key, error = %err, "Failed to remove persisted session entry");
            }
        }
    }

    /// Whether the live token is still the one in storage
    pub(crate) async fn is_session_persisted(&self) -> bool {
        match self.storage.get(AUTH_TOKEN_KEY).await {
            Ok(stored) => stored.is_some() && stored == self.token(),
            Err(err) => {
                warn!(error = %err, "Could not read persisted session");
                true
            }
        }
    }

    async fn persist(&self, token: &str, user: &SessionUser) -> Result<()> {
        let user_json = serde_json::to_string(user)?;
        self.storage.set(AUTH_TOKEN_KEY, token).await?;
        self.storage.set(CURRENT_USER_KEY, &user_json).await
    }
}

fn validate_credentials(username: &str, password: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(TaskboardError::validation("username", "Username is required"));
    }
    if password.is_empty() {
        return Err(TaskboardError::validation("password", "Password is required"));
    }
    Ok(())
}

#[async_trait]
impl Store for AuthStore {
    fn base(&self) -> &BaseStore {
        &self.base
    }

    async fn reset(&self) {
        self.base.reset();
        self.logout().await;
    }
}
