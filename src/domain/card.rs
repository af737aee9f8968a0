use crate::domain::{
    id::{CardId, ColumnId, UserId},
    user::User,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A card on a board column
///
/// `board_column_id` and `order` together define where the card sits.
/// `order` is 1-based and unique within the column once the server has
/// settled a move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub board_column_id: ColumnId,
    pub description: String,
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_user_id: Option<UserId>,
    /// Denormalized snapshot of the assignee, only populated by board loads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_user: Option<User>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    /// Creates a new card at the given position
    pub fn new(board_column_id: ColumnId, description: impl Into<String>, order: u32) -> Self {
        let now = Utc::now();
        Self {
            id: CardId::new(),
            board_column_id,
            description: description.into(),
            order,
            assigned_user_id: None,
            assigned_user: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Assigns the card to a user, keeping the denormalized snapshot in step
    pub fn with_assignee(mut self, user: User) -> Self {
        self.assigned_user_id = Some(user.id);
        self.assigned_user = Some(user);
        self
    }

    /// Returns the snapshot a mutation response is cached as.
    ///
    /// The assignee snapshot is dropped; it is only repopulated by
    /// reloading the owning board.
    pub fn normalized(mut self) -> Self {
        self.assigned_user = None;
        self
    }
}
