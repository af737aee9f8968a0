pub mod board;
pub mod card;
pub mod id;
pub mod reorder;
pub mod session;
pub mod user;

pub use board::{Board, Column, UserBoard};
pub use card::Card;
pub use id::{BoardId, CardId, ColumnId, UserId};
pub use reorder::{plan_move, target_order, DragState, DropTarget, MoveCommand};
pub use session::{LoginData, Session, SessionUser};
pub use user::User;
