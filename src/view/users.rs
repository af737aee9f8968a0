use crate::{
    domain::{User, UserId},
    store::{Observable, RootStore, Store},
    view::{any_loading, first_error},
};
use std::sync::Arc;

/// State behind the user list page
pub struct UsersView {
    root: Arc<RootStore>,
    search_term: Observable<String>,
    selected_user_id: Observable<Option<UserId>>,
}

impl UsersView {
    pub fn new(root: Arc<RootStore>) -> Self {
        Self {
            root,
            search_term: Observable::default(),
            selected_user_id: Observable::default(),
        }
    }

    pub async fn init(&self) {
        self.load_users().await;
    }

    /// Loads the first page of users matching the search term by name
    pub async fn load_users(&self) {
        let term = self.search_term.get();
        let take = self.root.config().page_size;
        self.root
            .users()
            .load_users(Some(term.as_str()), None, 0, take)
            .await;
    }

    pub async fn set_search_term(&self, term: impl Into<String>) {
        self.search_term.set(term.into());
        self.load_users().await;
    }

    pub fn select_user(&self, user: User) {
        self.selected_user_id.set(Some(user.id));
        self.root.users().select_user(Some(user));
    }

    pub fn search_term(&self) -> &Observable<String> {
        &self.search_term
    }

    pub fn selected_user_id(&self) -> Option<UserId> {
        self.selected_user_id.get()
    }

    pub fn users(&self) -> Vec<User> {
        self.root.users().users().get()
    }

    pub fn loading(&self) -> bool {
        any_loading(&[self.root.users().base()])
    }

    pub fn error(&self) -> Option<String> {
        first_error(&[self.root.users().base()])
    }
}
