//! Translation of drag-and-drop gestures into card move commands.
//!
//! Everything here is pure: the functions look at a loaded board and the
//! gesture and decide which single move, if any, should be sent. Sibling
//! cards are never renumbered locally; the server reorders the column and
//! the caller reloads the board.

use crate::domain::{
    board::{Board, Column},
    card::Card,
    id::{CardId, ColumnId},
};

/// Where a dragged card was released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget<'a> {
    /// Released over a column body. `index` is the 0-based visual slot the
    /// card was dropped at; `None` means empty column space (append).
    Column {
        column_id: ColumnId,
        index: Option<usize>,
    },
    /// Released directly onto another card (insert before it)
    Card(&'a Card),
}

/// A request to move one card to a 1-based position in a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveCommand {
    pub card_id: CardId,
    pub target_column_id: ColumnId,
    pub target_order: u32,
}

/// Computes the 1-based order a card dropped on `column` should request
///
/// An explicit slot `i` maps to `i + 1`; no slot appends after the last card.
pub fn target_order(column: &Column, index: Option<usize>) -> u32 {
    match index {
        Some(i) => u32::try_from(i).map_or(u32::MAX, |i| i.saturating_add(1)),
        None => column.next_order(),
    }
}

/// Decides the move command for a drop gesture
///
/// Returns `None` when the drop must be ignored: the card was dropped onto
/// itself, the target column is not part of `board`, or the card would end
/// up exactly where it already is.
///
/// # Examples
/// ```
/// use taskboard_core::domain::board::Board;
/// use taskboard_core::domain::reorder::{plan_move, DropTarget};
///
/// let mut board = Board::new("Sprint");
/// let todo = board.add_column("To Do");
/// todo.push_card("A");
/// todo.push_card("B");
/// todo.push_card("C");
/// let column_id = todo.id;
/// let dragged = todo.cards[2].clone();
///
/// let command = plan_move(&board, &dragged, DropTarget::Column { column_id, index: Some(1) })
///     .expect("moving C up is not a no-op");
/// assert_eq!(command.target_order, 2);
/// ```
pub fn plan_move(board: &Board, dragged: &Card, target: DropTarget<'_>) -> Option<MoveCommand> {
    let (target_column_id, target_order) = match target {
        DropTarget::Column { column_id, index } => {
            let column = board.column(&column_id)?;
            (column.id, target_order(column, index))
        }
        DropTarget::Card(target_card) => {
            if target_card.id == dragged.id {
                return None;
            }
            let column = board.column(&target_card.board_column_id)?;
            (column.id, target_card.order)
        }
    };

    if is_same_position(dragged, target_column_id, target_order) {
        return None;
    }

    Some(MoveCommand {
        card_id: dragged.id,
        target_column_id,
        target_order,
    })
}

/// Same column and same order as the card already has
fn is_same_position(card: &Card, column_id: ColumnId, order: u32) -> bool {
    card.board_column_id == column_id && card.order == order
}

/// Transient drag-and-drop state of a board view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragState {
    dragged_card: Option<Card>,
    dragged_over_column: Option<ColumnId>,
}

impl DragState {
    pub fn begin(&mut self, card: Card) {
        self.dragged_card = Some(card);
    }

    pub fn enter_column(&mut self, column_id: ColumnId) {
        self.dragged_over_column = Some(column_id);
    }

    pub fn leave_column(&mut self) {
        self.dragged_over_column = None;
    }

    /// Ends the gesture, returning the dragged card and clearing all state
    pub fn finish(&mut self) -> Option<Card> {
        self.dragged_over_column = None;
        self.dragged_card.take()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn dragged_card(&self) -> Option<&Card> {
        self.dragged_card.as_ref()
    }

    pub fn dragged_over_column(&self) -> Option<ColumnId> {
        self.dragged_over_column
    }

    pub fn is_dragging(&self) -> bool {
        self.dragged_card.is_some()
    }
}
