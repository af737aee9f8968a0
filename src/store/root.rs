use crate::{
    api::{ApiClient, AuthGuard, SessionEvent, SessionEvents},
    config::ClientConfig,
    error::Result,
    storage::{self, SessionStorage},
    store::{AuthStore, BoardStore, CardStore, Store, UserStore},
};
use std::sync::{Arc, Weak};
use tokio::{sync::broadcast::error::RecvError, task::JoinHandle};
use tracing::{debug, info, warn};

/// Composition root owning one instance of every domain store
///
/// Consumers receive the stores through this handle instead of globals,
/// so each test can build an isolated set.
pub struct RootStore {
    users: UserStore,
    boards: BoardStore,
    cards: CardStore,
    auth: AuthStore,
    events: SessionEvents,
    config: ClientConfig,
}

impl RootStore {
    /// Builds the stores over an already wrapped client
    ///
    /// `events` should be the bus the client publishes revocations on.
    pub async fn new(
        api: Arc<dyn ApiClient>,
        storage: Arc<dyn SessionStorage>,
        events: SessionEvents,
        config: ClientConfig,
    ) -> Self {
        Self {
            users: UserStore::new(Arc::clone(&api)),
            boards: BoardStore::new(Arc::clone(&api)),
            cards: CardStore::new(Arc::clone(&api)),
            auth: AuthStore::new(api, storage).await,
            events,
            config,
        }
    }

    /// Wires a transport client into a ready-to-use root
    ///
    /// Opens the configured session storage, puts the client behind an
    /// [`AuthGuard`] and starts [`RootStore::handle_session_events`].
    pub async fn connect<C>(client: C, config: ClientConfig) -> Result<Arc<Self>>
    where
        C: ApiClient + 'static,
    {
        let storage = storage::open(&config)?;
        let events = SessionEvents::new();
        let api: Arc<dyn ApiClient> = Arc::new(AuthGuard::new(
            client,
            Arc::clone(&storage),
            events.clone(),
        ));

        let root = Arc::new(Self::new(api, storage, events, config).await);
        root.handle_session_events();
        debug!(
            authenticated = root.auth.is_authenticated(),
            "Store root connected"
        );
        Ok(root)
    }

    pub fn users(&self) -> &UserStore {
        &self.users
    }

    pub fn boards(&self) -> &BoardStore {
        &self.boards
    }

    pub fn cards(&self) -> &CardStore {
        &self.cards
    }

    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Reinitializes every store, logging out in the process
    pub async fn reset(&self) {
        self.users.reset().await;
        self.boards.reset().await;
        self.cards.reset().await;
        self.auth.reset().await;
    }

    /// Resets every store whenever the current session is revoked
    ///
    /// A revocation naming a token other than the live one is ignored, so
    /// a late 401 from an earlier session cannot log out a newer login.
    /// The task holds only a weak reference and ends once the root is
    /// dropped or the bus closes.
    pub fn handle_session_events(self: &Arc<Self>) -> JoinHandle<()> {
        let mut events = self.events.subscribe();
        let root: Weak<Self> = Arc::downgrade(self);

        tokio::spawn(async move {
            loop {
                let event = match events.recv().await {
                    Ok(event) => Some(event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Session event receiver lagged");
                        None
                    }
                    Err(RecvError::Closed) => break,
                };
                let Some(root) = root.upgrade() else {
                    break;
                };

                // A missed event is detected by the live token no longer
                // being persisted.
                let revoked = match event {
                    Some(SessionEvent::Revoked { token }) => {
                        root.auth.token().as_deref() == Some(token.as_str())
                    }
                    None => {
                        root.auth.is_authenticated() && !root.auth.is_session_persisted().await
                    }
                };

                if revoked {
                    info!("Session revoked, resetting all stores");
                    root.reset().await;
                } else {
                    debug!("Ignoring revocation of a session that is no longer active");
                }
            }
            debug!("Session event handler stopped");
        })
    }
}
