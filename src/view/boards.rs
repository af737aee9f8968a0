use crate::{
    domain::{Board, UserId},
    store::{RootStore, Store},
    view::{any_loading, first_error},
};
use std::sync::Arc;

/// State behind the board list of one user
pub struct BoardsView {
    root: Arc<RootStore>,
    user_id: UserId,
}

impl BoardsView {
    pub fn new(root: Arc<RootStore>, user_id: UserId) -> Self {
        Self { root, user_id }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub async fn init(&self) {
        self.load_boards().await;
    }

    pub async fn load_boards(&self) {
        let take = self.root.config().page_size;
        self.root
            .boards()
            .load_boards_for_user(&self.user_id, 0, take)
            .await;
    }

    pub fn select_board(&self, board: Board) {
        self.root.boards().select_board(Some(board));
    }

    pub fn boards(&self) -> Vec<Board> {
        self.root.boards().boards().get()
    }

    pub fn loading(&self) -> bool {
        any_loading(&[self.root.boards().base()])
    }

    pub fn error(&self) -> Option<String> {
        first_error(&[self.root.boards().base()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::{
            stub::{ApiCall, StubApi},
            ApiResponse, SessionEvents,
        },
        config::ClientConfig,
        domain::UserBoard,
        error::TaskboardError,
        storage::memory_storage::MemorySessionStorage,
    };

    async fn setup() -> (Arc<StubApi>, BoardsView) {
        let api = Arc::new(StubApi::new());
        let root = RootStore::new(
            api.clone(),
            Arc::new(MemorySessionStorage::new()),
            SessionEvents::new(),
            ClientConfig::default(),
        )
        .await;
        (api, BoardsView::new(Arc::new(root), UserId::new()))
    }

    #[tokio::test]
    async fn test_init_loads_boards_of_the_user() {
        let (api, view) = setup().await;
        let board = Board::new("Board 1");
        api.on_get_user_boards(Ok(ApiResponse::ok(vec![UserBoard::new(
            view.user_id(),
            board.clone(),
        )])));

        view.init().await;

        assert_eq!(
            api.calls(),
            vec![ApiCall::GetUserBoards {
                user_id: view.user_id(),
                as_user_id: view.user_id(),
                skip: 0,
                take: 50,
            }]
        );
        assert_eq!(view.boards(), vec![board]);
        assert!(!view.loading());
        assert!(view.error().is_none());
    }

    #[tokio::test]
    async fn test_select_board() {
        let (_, view) = setup().await;
        let board = Board::new("Board 1");

        view.select_board(board.clone());

        assert_eq!(view.root.boards().selected_board().get(), Some(board));
    }

    #[tokio::test]
    async fn test_failed_load_is_reported() {
        let (api, view) = setup().await;
        api.on_get_user_boards(Err(TaskboardError::unknown("boom")));

        view.init().await;

        assert!(view.boards().is_empty());
        assert_eq!(view.error().as_deref(), Some("Failed to load boards"));
    }
}
