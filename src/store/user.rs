use crate::{
    api::ApiClient,
    domain::{User, UserId},
    store::{BaseStore, Observable, Store},
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Users known to the client and the one currently selected
pub struct UserStore {
    base: BaseStore,
    api: Arc<dyn ApiClient>,
    users: Observable<Vec<User>>,
    selected_user: Observable<Option<User>>,
    total_count: Observable<usize>,
}

impl UserStore {
    pub fn new(api: Arc<dyn ApiClient>) -> Self {
        Self {
            base: BaseStore::new("users"),
            api,
            users: Observable::default(),
            selected_user: Observable::default(),
            total_count: Observable::default(),
        }
    }

    pub fn users(&self) -> &Observable<Vec<User>> {
        &self.users
    }

    pub fn selected_user(&self) -> &Observable<Option<User>> {
        &self.selected_user
    }

    /// Size of the last loaded page (the API does not report a total)
    pub fn total_count(&self) -> &Observable<usize> {
        &self.total_count
    }

    /// Loads one page of users, replacing the cached list
    ///
    /// Missing or empty filters are sent as "no filter".
    pub async fn load_users(
        &self,
        name_filter: Option<&str>,
        email_filter: Option<&str>,
        skip: u32,
        take: u32,
    ) {
        let name_filter = normalize_filter(name_filter);
        let email_filter = normalize_filter(email_filter);

        self.base
            .execute(Some("Failed to load users"), async {
                let response = self
                    .api
                    .get_users(name_filter, email_filter, skip, take)
                    .await?;

                let users = response.into_data().unwrap_or_default();
                debug!(count = users.len(), skip, take, "Loaded users");
                self.total_count.set(users.len());
                self.users.set(users);
                Ok(())
            })
            .await;
    }

    /// Loads one user into the selection
    ///
    /// The selection is cleared when the user does not exist or the
    /// request fails, so a stale user is never left selected.
    pub async fn load_user(&self, user_id: &UserId) {
        let loaded = self
            .base
            .execute(Some("Failed to load user"), async {
                Ok(self.api.get_user(user_id).await?.into_data())
            })
            .await;

        self.selected_user.set(loaded.flatten());
    }

    pub fn select_user(&self, user: Option<User>) {
        self.selected_user.set(user);
    }

    pub fn clear_selected_user(&self) {
        self.select_user(None);
    }
}

/// An empty filter means the same as no filter
fn normalize_filter(filter: Option<&str>) -> Option<&str> {
    filter.filter(|f| !f.is_empty())
}

#[async_trait]
impl Store for UserStore {
    fn base(&self) -> &BaseStore {
        &self.base
    }

    async fn reset(&self) {
        self.base.reset();
        self.users.set(Vec::new());
        self.selected_user.set(None);
        self.total_count.set(0);
    }
}
