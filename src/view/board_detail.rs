use crate::{
    domain::{
        plan_move, Board, BoardId, Card, CardId, ColumnId, DragState, DropTarget, MoveCommand,
        UserId,
    },
    store::{Observable, RootStore, Store},
    view::{any_loading, first_error},
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tracing::debug;

/// State behind the board detail page: the board aggregate, card dialogs
/// and the drag-and-drop gesture
///
/// Every successful card mutation reloads the board instead of patching
/// it. After [`BoardDetailView::unmount`] those follow-up reloads are
/// skipped; the mutations themselves still complete.
pub struct BoardDetailView {
    root: Arc<RootStore>,
    user_id: UserId,
    board_id: BoardId,
    drag: Observable<DragState>,
    mounted: AtomicBool,
}

impl BoardDetailView {
    pub fn new(root: Arc<RootStore>, user_id: UserId, board_id: BoardId) -> Self {
        Self {
            root,
            user_id,
            board_id,
            drag: Observable::default(),
            mounted: AtomicBool::new(true),
        }
    }

    pub async fn init(&self) {
        self.load_board().await;
    }

    pub async fn load_board(&self) {
        self.root
            .boards()
            .load_board(&self.user_id, &self.board_id)
            .await;
    }

    pub fn board(&self) -> Option<Board> {
        self.root.boards().selected_board().get()
    }

    pub fn drag(&self) -> &Observable<DragState> {
        &self.drag
    }

    pub fn loading(&self) -> bool {
        any_loading(&[self.root.boards().base(), self.root.cards().base()])
    }

    pub fn error(&self) -> Option<String> {
        first_error(&[self.root.boards().base(), self.root.cards().base()])
    }

    /// Stops follow-up reloads of operations still in flight
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
        self.drag.set(DragState::default());
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// Adds a card to the end of a column; `true` once the server accepted it
    pub async fn create_card(&self, column_id: &ColumnId, description: &str) -> bool {
        let created = self
            .root
            .cards()
            .create_card(&self.user_id, &self.board_id, column_id, description, None)
            .await;

        self.settle(created.is_some()).await
    }

    pub async fn update_card(
        &self,
        card_id: &CardId,
        description: &str,
        assigned_user_id: Option<UserId>,
    ) -> bool {
        let updated = self
            .root
            .cards()
            .update_card(
                &self.user_id,
                &self.board_id,
                card_id,
                description,
                assigned_user_id,
            )
            .await;

        self.settle(updated.is_some()).await
    }

    pub fn begin_drag(&self, card: Card) {
        self.drag.modify(|drag| drag.begin(card));
    }

    pub fn enter_column(&self, column_id: ColumnId) {
        self.drag.modify(|drag| drag.enter_column(column_id));
    }

    pub fn leave_column(&self) {
        self.drag.modify(DragState::leave_column);
    }

    /// Abandons the gesture without moving anything
    pub fn end_drag(&self) {
        self.drag.modify(DragState::clear);
    }

    /// Drops the dragged card onto a column body
    ///
    /// `index` is the 0-based slot the card was released at, `None` to
    /// append. Returns `true` when a move was sent and accepted.
    pub async fn drop_on_column(&self, column_id: ColumnId, index: Option<usize>) -> bool {
        self.drop_card(|board, dragged| {
            plan_move(board, dragged, DropTarget::Column { column_id, index })
        })
        .await
    }

    /// Drops the dragged card onto another card, taking its position
    pub async fn drop_on_card(&self, target: &Card) -> bool {
        self.drop_card(|board, dragged| plan_move(board, dragged, DropTarget::Card(target)))
            .await
    }

    async fn drop_card(
        &self,
        plan: impl FnOnce(&Board, &Card) -> Option<MoveCommand>,
    ) -> bool {
        let mut dragged = None;
        self.drag.modify(|drag| dragged = drag.finish());

        let Some(dragged) = dragged else {
            return false;
        };
        let Some(command) = self
            .root
            .boards()
            .selected_board()
            .with(|board| board.as_ref().and_then(|board| plan(board, &dragged)))
        else {
            debug!(card_id = %dragged.id, "Drop ignored");
            return false;
        };

        let moved = self
            .root
            .cards()
            .move_card(
                &self.user_id,
                &self.board_id,
                &command.card_id,
                &command.target_column_id,
                command.target_order,
            )
            .await;

        self.settle(moved.is_some()).await
    }

    /// Reloads the board after a card mutation that did not fail
    ///
    /// A response without data is "nothing to apply", not a failure: the
    /// card store's error tells the two apart.
    async fn settle(&self, returned_card: bool) -> bool {
        let succeeded = returned_card || self.root.cards().error().is_none();
        if succeeded {
            self.reload_if_mounted().await;
        }
        succeeded
    }

    async fn reload_if_mounted(&self) {
        if self.is_mounted() {
            self.load_board().await;
        } else {
            debug!(board_id = %self.board_id, "View unmounted, skipping board reload");
        }
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
        domain::{Column, UserBoard},
        error::TaskboardError,
        storage::memory_storage::MemorySessionStorage,
    };

    struct Fixture {
        api: Arc<StubApi>,
        view: Arc<BoardDetailView>,
        board: Board,
    }

    /// Board with "To Do" holding A, B, C and an empty "Done" column
    fn sample_board() -> Board {
        let mut board = Board::new("Sprint");
        let todo = board.add_column("To Do");
        todo.push_card("A");
        todo.push_card("B");
        todo.push_card("C");
        board.add_column("Done");
        board
    }

    async fn setup() -> Fixture {
        let api = Arc::new(StubApi::new());
        let root = RootStore::new(
            api.clone(),
            Arc::new(MemorySessionStorage::new()),
            SessionEvents::new(),
            ClientConfig::default(),
        )
        .await;
        let board = sample_board();
        let user_id = UserId::new();
        let view = BoardDetailView::new(Arc::new(root), user_id, board.id);

        api.on_get_user_board(Ok(ApiResponse::ok(UserBoard::new(user_id, board.clone()))));
        view.init().await;

        Fixture {
            api,
            view: Arc::new(view),
            board,
        }
    }

    impl Fixture {
        fn todo(&self) -> &Column {
            &self.board.columns[0]
        }

        fn done(&self) -> &Column {
            &self.board.columns[1]
        }

        fn queue_reload(&self) {
            self.api.on_get_user_board(Ok(ApiResponse::ok(UserBoard::new(
                self.view.user_id,
                self.board.clone(),
            ))));
        }

        fn queue_move(&self, card: &Card) {
            self.api.on_move_card(Ok(ApiResponse::ok(card.clone())));
        }

        fn calls_after_init(&self) -> Vec<ApiCall> {
            self.api.calls().into_iter().skip(1).collect()
        }
    }

    #[tokio::test]
    async fn test_init_selects_board() {
        let fx = setup().await;
        assert_eq!(fx.view.board(), Some(fx.board.clone()));
        assert!(!fx.view.loading());
        assert!(fx.view.error().is_none());
    }

    #[tokio::test]
    async fn test_drop_at_index_moves_and_reloads() {
        let fx = setup().await;
        let dragged = fx.todo().cards[2].clone();
        fx.queue_move(&dragged);
        fx.queue_reload();

        fx.view.begin_drag(dragged.clone());
        fx.view.enter_column(fx.todo().id);
        assert!(fx.view.drag().get().is_dragging());

        assert!(fx.view.drop_on_column(fx.todo().id, Some(1)).await);

        let calls = fx.calls_after_init();
        assert_eq!(calls.len(), 2);
        match &calls[0] {
            ApiCall::MoveCard { card_id, command, .. } => {
                assert_eq!(*card_id, dragged.id);
                assert_eq!(command.target_board_column_id, fx.todo().id);
                assert_eq!(command.target_order, 2);
            }
            call => panic!("unexpected call: {:?}", call),
        }
        assert!(matches!(calls[1], ApiCall::GetUserBoard { .. }));
        assert_eq!(fx.view.drag().get(), DragState::default());
    }

    #[tokio::test]
    async fn test_drop_on_empty_column_space_appends() {
        let fx = setup().await;
        let dragged = fx.todo().cards[0].clone();
        fx.queue_move(&dragged);
        fx.queue_reload();

        fx.view.begin_drag(dragged);
        assert!(fx.view.drop_on_column(fx.done().id, None).await);

        match &fx.calls_after_init()[0] {
            ApiCall::MoveCard { command, .. } => {
                assert_eq!(command.target_board_column_id, fx.done().id);
                assert_eq!(command.target_order, 1);
            }
            call => panic!("unexpected call: {:?}", call),
        }
    }

    #[tokio::test]
    async fn test_drop_on_itself_issues_nothing() {
        let fx = setup().await;
        let dragged = fx.todo().cards[1].clone();

        fx.view.begin_drag(dragged.clone());
        assert!(!fx.view.drop_on_card(&dragged).await);

        assert!(fx.calls_after_init().is_empty());
        assert!(!fx.view.drag().get().is_dragging());
    }

    #[tokio::test]
    async fn test_drop_on_own_slot_issues_nothing() {
        let fx = setup().await;
        let dragged = fx.todo().cards[0].clone();

        fx.view.begin_drag(dragged);
        fx.view.enter_column(fx.todo().id);
        assert!(!fx.view.drop_on_column(fx.todo().id, Some(0)).await);

        assert!(fx.calls_after_init().is_empty());
        assert_eq!(fx.view.drag().get(), DragState::default());
    }

    #[tokio::test]
    async fn test_drop_on_unknown_column_is_ignored() {
        let fx = setup().await;

        fx.view.begin_drag(fx.todo().cards[0].clone());
        assert!(!fx.view.drop_on_column(ColumnId::new(), None).await);

        assert!(fx.calls_after_init().is_empty());
        assert!(!fx.view.drag().get().is_dragging());
    }

    #[tokio::test]
    async fn test_drop_without_drag_is_ignored() {
        let fx = setup().await;
        assert!(!fx.view.drop_on_column(fx.todo().id, None).await);
        assert!(fx.calls_after_init().is_empty());
    }

    #[tokio::test]
    async fn test_move_without_payload_still_reloads() {
        let fx = setup().await;
        fx.api.on_move_card(Ok(ApiResponse::empty()));
        fx.queue_reload();

        fx.view.begin_drag(fx.todo().cards[0].clone());
        assert!(fx.view.drop_on_column(fx.done().id, None).await);

        let calls = fx.calls_after_init();
        assert_eq!(calls.len(), 2);
        assert!(matches!(calls[0], ApiCall::MoveCard { .. }));
        assert!(matches!(calls[1], ApiCall::GetUserBoard { .. }));
        assert!(fx.view.error().is_none());
    }

    #[tokio::test]
    async fn test_drop_on_card_takes_its_order() {
        let fx = setup().await;
        let dragged = fx.todo().cards[0].clone();
        let target = fx.todo().cards[2].clone();
        fx.queue_move(&dragged);
        fx.queue_reload();

        fx.view.begin_drag(dragged);
        assert!(fx.view.drop_on_card(&target).await);

        match &fx.calls_after_init()[0] {
            ApiCall::MoveCard { command, .. } => {
                assert_eq!(command.target_board_column_id, fx.todo().id);
                assert_eq!(command.target_order, 3);
            }
            call => panic!("unexpected call: {:?}", call),
        }
    }

    #[tokio::test]
    async fn test_failed_move_clears_drag_and_skips_reload() {
        let fx = setup().await;
        fx.api
            .on_move_card(Err(TaskboardError::transport(500, "Internal error")));

        fx.view.begin_drag(fx.todo().cards[0].clone());
        fx.view.enter_column(fx.done().id);
        assert!(!fx.view.drop_on_column(fx.done().id, None).await);

        assert_eq!(fx.calls_after_init().len(), 1);
        assert_eq!(fx.view.drag().get(), DragState::default());
        assert_eq!(fx.view.error().as_deref(), Some("Failed to move card"));
    }

    #[tokio::test]
    async fn test_drag_enter_leave_and_end() {
        let fx = setup().await;

        fx.view.begin_drag(fx.todo().cards[0].clone());
        fx.view.enter_column(fx.done().id);
        assert_eq!(fx.view.drag().get().dragged_over_column(), Some(fx.done().id));

        fx.view.leave_column();
        assert!(fx.view.drag().get().dragged_over_column().is_none());
        assert!(fx.view.drag().get().is_dragging());

        fx.view.end_drag();
        assert_eq!(fx.view.drag().get(), DragState::default());
    }

    #[tokio::test]
    async fn test_create_card_reloads_board() {
        let fx = setup().await;
        fx.api
            .on_create_card(Ok(ApiResponse::ok(Card::new(fx.done().id, "New", 1))));
        fx.queue_reload();

        assert!(fx.view.create_card(&fx.done().id, "New").await);

        let calls = fx.calls_after_init();
        assert!(matches!(calls[0], ApiCall::CreateCard { .. }));
        assert!(matches!(calls[1], ApiCall::GetUserBoard { .. }));
    }

    #[tokio::test]
    async fn test_create_card_rejects_blank_description() {
        let fx = setup().await;

        assert!(!fx.view.create_card(&fx.done().id, "  ").await);

        assert!(fx.calls_after_init().is_empty());
        assert_eq!(fx.view.error().as_deref(), Some("Description is required"));
    }

    #[tokio::test]
    async fn test_update_card_reloads_board() {
        let fx = setup().await;
        let card = fx.todo().cards[0].clone();
        fx.api.on_update_card(Ok(ApiResponse::ok(card.clone())));
        fx.queue_reload();

        assert!(fx.view.update_card(&card.id, "Edited", None).await);

        let calls = fx.calls_after_init();
        assert!(matches!(calls[0], ApiCall::UpdateCard { .. }));
        assert!(matches!(calls[1], ApiCall::GetUserBoard { .. }));
    }

    #[tokio::test]
    async fn test_failed_update_skips_reload() {
        let fx = setup().await;
        fx.api
            .on_update_card(Err(TaskboardError::transport(404, "Card not found")));

        assert!(!fx.view.update_card(&CardId::new(), "Edited", None).await);

        assert_eq!(fx.calls_after_init().len(), 1);
        assert_eq!(fx.view.error().as_deref(), Some("Failed to update card"));
    }

    #[tokio::test]
    async fn test_unmount_discards_follow_up_reload() {
        let fx = setup().await;
        let dragged = fx.todo().cards[0].clone();
        fx.queue_move(&dragged);
        fx.view.begin_drag(dragged);
        let gate = fx.api.hold().await;

        let task = tokio::spawn({
            let view = Arc::clone(&fx.view);
            let column_id = fx.done().id;
            async move { view.drop_on_column(column_id, None).await }
        });
        while fx.api.call_count() < 2 {
            tokio::task::yield_now().await;
        }
        assert!(fx.view.loading());

        fx.view.unmount();
        drop(gate);

        assert!(task.await.unwrap());
        assert_eq!(fx.calls_after_init().len(), 1);
        assert!(!fx.view.is_mounted());
        assert!(!fx.view.loading());
    }
}
