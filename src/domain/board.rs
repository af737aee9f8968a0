use crate::domain::{
    card::Card,
    id::{BoardId, CardId, ColumnId, UserId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A column of a board with its cards in display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    pub board_id: BoardId,
    pub name: String,
    pub order: u32,
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl Column {
    pub fn new(board_id: BoardId, name: impl Into<String>, order: u32) -> Self {
        Self {
            id: ColumnId::new(),
            board_id,
            name: name.into(),
            order,
            cards: Vec::new(),
        }
    }

    /// Appends a card at the end of the column, assigning it the next order
    pub fn push_card(&mut self, description: impl Into<String>) -> &Card {
        let order = self.next_order();
        self.cards.push(Card::new(self.id, description, order));
        &self.cards[self.cards.len() - 1]
    }

    /// The order a card appended to this column would receive
    pub fn next_order(&self) -> u32 {
        u32::try_from(self.cards.len()).map_or(u32::MAX, |len| len.saturating_add(1))
    }

    pub fn card(&self, id: &CardId) -> Option<&Card> {
        self.cards.iter().find(|card| &card.id == id)
    }
}

/// A board aggregate: the board with its columns and their cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl Board {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: BoardId::new(),
            name: name.into(),
            description: None,
            created_at: Utc::now(),
            columns: Vec::new(),
        }
    }

    /// Adds an empty column after the existing ones
    pub fn add_column(&mut self, name: impl Into<String>) -> &mut Column {
        let order = u32::try_from(self.columns.len()).map_or(u32::MAX, |len| len + 1);
        self.columns.push(Column::new(self.id, name, order));
        let last = self.columns.len() - 1;
        &mut self.columns[last]
    }

    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|col| &col.id == id)
    }

    /// Finds a card anywhere on the board
    pub fn card(&self, id: &CardId) -> Option<&Card> {
        self.columns.iter().find_map(|col| col.card(id))
    }
}

/// Membership of a user in a board, as returned by the board endpoints
///
/// The embedded board may be missing when the membership dangles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBoard {
    pub user_id: UserId,
    pub board_id: BoardId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board: Option<Board>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserBoard {
    pub fn new(user_id: UserId, board: Board) -> Self {
        Self {
            user_id,
            board_id: board.id,
            board: Some(board),
            created_at: Some(Utc::now()),
        }
    }

    /// A membership whose board is missing from the response
    pub fn dangling(user_id: UserId, board_id: BoardId) -> Self {
        Self {
            user_id,
            board_id,
            board: None,
            created_at: None,
        }
    }
}
