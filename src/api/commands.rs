use crate::domain::{BoardId, CardId, ColumnId, MoveCommand, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardCommand {
    pub user_id: UserId,
    pub board_id: BoardId,
    pub board_column_id: ColumnId,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_user_id: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCardCommand {
    pub user_id: UserId,
    pub board_id: BoardId,
    pub card_id: CardId,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_user_id: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCardCommand {
    pub user_id: UserId,
    pub board_id: BoardId,
    pub card_id: CardId,
    pub target_board_column_id: ColumnId,
    pub target_order: u32,
}

impl MoveCardCommand {
    /// Wire form of a move planned by the reorder engine
    pub fn from_plan(user_id: UserId, board_id: BoardId, plan: MoveCommand) -> Self {
        Self {
            user_id,
            board_id,
            card_id: plan.card_id,
            target_board_column_id: plan.target_column_id,
            target_order: plan.target_order,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCommand {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCommand")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
