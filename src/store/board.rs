use crate::{
    api::ApiClient,
    domain::{Board, BoardId, UserBoard, UserId},
    store::{BaseStore, Observable, Store},
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Boards of the current user and the board aggregate being viewed
///
/// `selected_board` is the single source of truth for column and card
/// data; card mutations are followed by a reload of it.
pub struct BoardStore {
    base: BaseStore,
    api: Arc<dyn ApiClient>,
    boards: Observable<Vec<Board>>,
    selected_board: Observable<Option<Board>>,
    current_user_id: Observable<Option<UserId>>,
}

impl BoardStore {
    pub fn new(api: Arc<dyn ApiClient>) -> Self {
        Self {
            base: BaseStore::new("boards"),
            api,
            boards: Observable::default(),
            selected_board: Observable::default(),
            current_user_id: Observable::default(),
        }
    }

    pub fn boards(&self) -> &Observable<Vec<Board>> {
        &self.boards
    }

    pub fn selected_board(&self) -> &Observable<Option<Board>> {
        &self.selected_board
    }

    /// The user whose boards are cached in [`BoardStore::boards`]
    pub fn current_user_id(&self) -> &Observable<Option<UserId>> {
        &self.current_user_id
    }

    /// Loads the boards `user_id` is a member of
    ///
    /// Memberships whose board is missing from the response are dropped.
    /// Overlapping calls are not sequenced: whichever response arrives
    /// last wins.
    pub async fn load_boards_for_user(&self, user_id: &UserId, skip: u32, take: u32) {
        self.base
            .execute(Some("Failed to load boards"), async {
                let response = self
                    .api
                    .get_user_boards(user_id, user_id, skip, take)
                    .await?;

                let memberships = response.into_data().unwrap_or_default();
                let boards = project_boards(memberships);
                debug!(user_id = %user_id, count = boards.len(), "Loaded boards");

                self.boards.set(boards);
                self.current_user_id.set(Some(*user_id));
                Ok(())
            })
            .await;
    }

    /// Loads a board aggregate into the selection
    ///
    /// A missing board or a failed request leaves the selection empty
    /// rather than showing the previously selected board.
    pub async fn load_board(&self, user_id: &UserId, board_id: &BoardId) {
        let loaded = self
            .base
            .execute(Some("Failed to load board"), async {
                let response = self.api.get_user_board(user_id, board_id).await?;
                Ok(response.into_data().and_then(|membership| membership.board))
            })
            .await;

        self.selected_board.set(loaded.flatten());
    }

    pub fn select_board(&self, board: Option<Board>) {
        self.selected_board.set(board);
    }

    pub fn clear_selected_board(&self) {
        self.select_board(None);
    }
}

/// Keeps the embedded boards of the memberships that have one
fn project_boards(memberships: Vec<UserBoard>) -> Vec<Board> {
    let total = memberships.len();
    let boards: Vec<Board> = memberships
        .into_iter()
        .filter_map(|membership| membership.board)
        .collect();

    if boards.len() < total {
        warn!(
            dropped = total - boards.len(),
            "Skipping board memberships without an embedded board"
        );
    }
    boards
}

#[async_trait]
impl Store for BoardStore {
    fn base(&self) -> &BaseStore {
        &self.base
    }

    async fn reset(&self) {
        self.base.reset();
        self.boards.set(Vec::new());
        self.selected_board.set(None);
        self.current_user_id.set(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::{
            stub::{ApiCall, StubApi},
            ApiResponse,
        },
        error::TaskboardError,
    };

    fn setup() -> (Arc<StubApi>, BoardStore) {
        let api = Arc::new(StubApi::new());
        let store = BoardStore::new(api.clone());
        (api, store)
    }

    fn detailed_board() -> Board {
        let mut board = Board::new("Test Board");
        board.description = Some("Test Description".to_string());
        board.add_column("To Do").push_card("First");
        board
    }

    #[test]
    fn test_initial_state() {
        let (_, store) = setup();
        assert!(store.boards().get().is_empty());
        assert!(store.selected_board().get().is_none());
        assert!(store.current_user_id().get().is_none());
        assert!(!store.loading());
        assert!(store.error().is_none());
    }

    #[tokio::test]
    async fn test_load_boards_for_user() {
        let (api, store) = setup();
        let user_id = UserId::new();
        let boards = vec![Board::new("Board 1"), Board::new("Board 2")];
        let memberships = boards
            .iter()
            .cloned()
            .map(|board| UserBoard::new(user_id, board))
            .collect();
        api.on_get_user_boards(Ok(ApiResponse::ok(memberships)));

        store.load_boards_for_user(&user_id, 0, 50).await;

        assert_eq!(
            api.calls(),
            vec![ApiCall::GetUserBoards {
                user_id,
                as_user_id: user_id,
                skip: 0,
                take: 50,
            }]
        );
        assert_eq!(store.boards().get(), boards);
        assert_eq!(store.current_user_id().get(), Some(user_id));
        assert!(!store.loading());
        assert!(store.error().is_none());
    }

    #[tokio::test]
    async fn test_memberships_without_board_are_filtered_out() {
        let (api, store) = setup();
        let user_id = UserId::new();
        let board = Board::new("Board 1");
        api.on_get_user_boards(Ok(ApiResponse::ok(vec![
            UserBoard::new(user_id, board.clone()),
            UserBoard::dangling(user_id, BoardId::new()),
            UserBoard::dangling(user_id, BoardId::new()),
        ])));

        store.load_boards_for_user(&user_id, 0, 50).await;

        assert_eq!(store.boards().get(), vec![board]);
    }

    #[tokio::test]
    async fn test_load_boards_failure() {
        let (api, store) = setup();
        api.on_get_user_boards(Err(TaskboardError::unknown("API Error")));

        store.load_boards_for_user(&UserId::new(), 0, 50).await;

        assert!(store.boards().get().is_empty());
        assert!(store.current_user_id().get().is_none());
        assert_eq!(store.error().as_deref(), Some("Failed to load boards"));
        assert!(!store.loading());
    }

    #[tokio::test]
    async fn test_empty_response_still_records_user() {
        let (api, store) = setup();
        let user_id = UserId::new();
        api.on_get_user_boards(Ok(ApiResponse::ok(Vec::new())));

        store.load_boards_for_user(&user_id, 10, 20).await;

        assert!(store.boards().get().is_empty());
        assert_eq!(store.current_user_id().get(), Some(user_id));
        assert!(matches!(
            api.calls().as_slice(),
            [ApiCall::GetUserBoards { skip: 10, take: 20, .. }]
        ));
    }

    #[tokio::test]
    async fn test_load_board() {
        let (api, store) = setup();
        let user_id = UserId::new();
        let board = detailed_board();
        api.on_get_user_board(Ok(ApiResponse::ok(UserBoard::new(user_id, board.clone()))));

        store.load_board(&user_id, &board.id).await;

        assert_eq!(
            api.calls(),
            vec![ApiCall::GetUserBoard {
                user_id,
                board_id: board.id,
            }]
        );
        let selected = store.selected_board().get().unwrap();
        assert_eq!(selected, board);
        assert_eq!(selected.columns.len(), 1);
        assert!(!store.loading());
    }

    #[tokio::test]
    async fn test_load_board_without_embedded_board() {
        let (api, store) = setup();
        let user_id = UserId::new();
        let board_id = BoardId::new();
        store.select_board(Some(detailed_board()));
        api.on_get_user_board(Ok(ApiResponse::ok(UserBoard::dangling(user_id, board_id))));

        store.load_board(&user_id, &board_id).await;

        assert!(store.selected_board().get().is_none());
        assert!(store.error().is_none());
    }

    #[tokio::test]
    async fn test_failed_load_board_does_not_keep_previous_board() {
        let (api, store) = setup();
        let user_id = UserId::new();
        let previous = detailed_board();
        api.on_get_user_board(Ok(ApiResponse::ok(UserBoard::new(user_id, previous.clone()))));
        store.load_board(&user_id, &previous.id).await;
        assert!(store.selected_board().get().is_some());

        api.on_get_user_board(Err(TaskboardError::transport(404, "Board not found")));
        store.load_board(&user_id, &BoardId::new()).await;

        assert!(store.selected_board().get().is_none());
        assert_eq!(store.error().as_deref(), Some("Failed to load board"));
        assert!(!store.loading());
    }

    #[test]
    fn test_select_and_clear_board() {
        let (_, store) = setup();
        store.select_board(Some(Board::new("Test Board")));
        assert!(store.selected_board().get().is_some());

        store.clear_selected_board();
        assert!(store.selected_board().get().is_none());

        store.select_board(Some(Board::new("Test Board")));
        store.select_board(None);
        assert!(store.selected_board().get().is_none());
    }

    #[tokio::test]
    async fn test_reset() {
        let (api, store) = setup();
        let user_id = UserId::new();
        api.on_get_user_boards(Ok(ApiResponse::ok(vec![UserBoard::new(
            user_id,
            Board::new("Board 1"),
        )])));
        store.load_boards_for_user(&user_id, 0, 50).await;
        store.select_board(Some(Board::new("Board 1")));
        api.on_get_user_boards(Err(TaskboardError::unknown("Test error")));
        store.load_boards_for_user(&user_id, 0, 50).await;
        assert!(store.error().is_some());

        store.reset().await;

        assert!(store.boards().get().is_empty());
        assert!(store.selected_board().get().is_none());
        assert!(store.current_user_id().get().is_none());
        assert!(!store.loading());
        assert!(store.error().is_none());
    }

    #[tokio::test]
    async fn test_loading_while_request_is_in_flight() {
        let api = Arc::new(StubApi::new());
        let store = Arc::new(BoardStore::new(api.clone()));
        api.on_get_user_boards(Ok(ApiResponse::ok(Vec::new())));
        let gate = api.hold().await;

        let task = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.load_boards_for_user(&UserId::new(), 0, 50).await }
        });
        while api.call_count() == 0 {
            tokio::task::yield_now().await;
        }
        assert!(store.loading());

        drop(gate);
        task.await.unwrap();
        assert!(!store.loading());
    }

    #[tokio::test]
    async fn test_overlapping_loads_keep_loading_until_both_settle() {
        let api = Arc::new(StubApi::new());
        let store = Arc::new(BoardStore::new(api.clone()));
        let user_id = UserId::new();
        api.on_get_user_boards(Ok(ApiResponse::ok(vec![UserBoard::new(
            user_id,
            Board::new("First"),
        )])));
        api.on_get_user_boards(Ok(ApiResponse::ok(vec![UserBoard::new(
            user_id,
            Board::new("Second"),
        )])));
        let gate = api.hold().await;

        let first = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.load_boards_for_user(&user_id, 0, 50).await }
        });
        let second = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.load_boards_for_user(&user_id, 0, 50).await }
        });
        while api.call_count() < 2 {
            tokio::task::yield_now().await;
        }
        assert_eq!(store.base().status().pending(), 2);

        drop(gate);
        first.await.unwrap();
        second.await.unwrap();

        assert!(!store.loading());
        assert_eq!(store.boards().get().len(), 1);
    }

    #[tokio::test]
    async fn test_error_cleared_by_next_successful_load() {
        let (api, store) = setup();
        let user_id = UserId::new();
        api.on_get_user_boards(Err(TaskboardError::unknown("First error")));
        api.on_get_user_boards(Ok(ApiResponse::ok(Vec::new())));

        store.load_boards_for_user(&user_id, 0, 50).await;
        assert!(store.error().is_some());

        store.load_boards_for_user(&user_id, 0, 50).await;
        assert!(store.error().is_none());
    }
}
