use crate::{
    api::{ApiClient, CreateCardCommand, MoveCardCommand, UpdateCardCommand},
    domain::{BoardId, Card, CardId, ColumnId, UserId},
    error::{Result, TaskboardError},
    store::{BaseStore, Observable, Store},
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Flat mirror of cards touched by this client
///
/// The nested card lists of the selected board stay authoritative; this
/// cache is a convenience and is never used to order cards.
pub struct CardStore {
    base: BaseStore,
    api: Arc<dyn ApiClient>,
    cards: Observable<Vec<Card>>,
    selected_card: Observable<Option<Card>>,
}

impl CardStore {
    pub fn new(api: Arc<dyn ApiClient>) -> Self {
        Self {
            base: BaseStore::new("cards"),
            api,
            cards: Observable::default(),
            selected_card: Observable::default(),
        }
    }

    pub fn cards(&self) -> &Observable<Vec<Card>> {
        &self.cards
    }

    pub fn selected_card(&self) -> &Observable<Option<Card>> {
        &self.selected_card
    }

    /// Creates a card at the end of `column_id`
    ///
    /// A blank description is rejected without calling the server. The
    /// returned card has no `assigned_user`; reload the board to see it.
    pub async fn create_card(
        &self,
        user_id: &UserId,
        board_id: &BoardId,
        column_id: &ColumnId,
        description: &str,
        assigned_user_id: Option<UserId>,
    ) -> Option<Card> {
        let description = match validate_description(description) {
            Ok(description) => description,
            Err(err) => {
                self.base.reject(err);
                return None;
            }
        };

        let command = CreateCardCommand {
            user_id: *user_id,
            board_id: *board_id,
            board_column_id: *column_id,
            description,
            assigned_user_id,
        };

        self.base
            .execute(Some("Failed to create card"), async {
                let card = self
                    .api
                    .create_card(user_id, board_id, &command)
                    .await?
                    .into_data()
                    .map(Card::normalized);

                if let Some(card) = &card {
                    debug!(card_id = %card.id, column_id = %card.board_column_id, "Created card");
                    self.cards.modify(|cards| cards.push(card.clone()));
                }
                Ok(card)
            })
            .await
            .flatten()
    }

    /// Updates description and assignee of a card
    ///
    /// The cached entry with the same id is replaced; its position in the
    /// cache is kept.
    pub async fn update_card(
        &self,
        user_id: &UserId,
        board_id: &BoardId,
        card_id: &CardId,
        description: &str,
        assigned_user_id: Option<UserId>,
    ) -> Option<Card> {
        let description = match validate_description(description) {
            Ok(description) => description,
            Err(err) => {
                self.base.reject(err);
                return None;
            }
        };

        let command = UpdateCardCommand {
            user_id: *user_id,
            board_id: *board_id,
            card_id: *card_id,
            description,
            assigned_user_id,
        };

        self.base
            .execute(Some("Failed to update card"), async {
                let card = self
                    .api
                    .update_card(user_id, board_id, card_id, &command)
                    .await?
                    .into_data()
                    .map(Card::normalized);

                if let Some(card) = &card {
                    debug!(card_id = %card.id, "Updated card");
                    self.cards.modify(|cards| {
                        if let Some(slot) = cards.iter_mut().find(|c| c.id == card.id) {
                            *slot = card.clone();
                        }
                    });
                }
                Ok(card)
            })
            .await
            .flatten()
    }

    /// Asks the server to move a card
    ///
    /// The returned card is normalized like the other mutations. The card
    /// cache is left untouched. Callers reload the board to see
    /// the renumbered columns.
    pub async fn move_card(
        &self,
        user_id: &UserId,
        board_id: &BoardId,
        card_id: &CardId,
        target_column_id: &ColumnId,
        target_order: u32,
    ) -> Option<Card> {
        let command = MoveCardCommand {
            user_id: *user_id,
            board_id: *board_id,
            card_id: *card_id,
            target_board_column_id: *target_column_id,
            target_order,
        };

        self.base
            .execute(Some("Failed to move card"), async {
                let card = self
                    .api
                    .move_card(user_id, board_id, card_id, &command)
                    .await?
                    .into_data()
                    .map(Card::normalized);
                debug!(
                    card_id = %card_id,
                    target_column_id = %target_column_id,
                    target_order,
                    "Moved card"
                );
                Ok(card)
            })
            .await
            .flatten()
    }

    pub fn select_card(&self, card: Option<Card>) {
        self.selected_card.set(card);
    }
}

/// Trims a card description, rejecting one that is blank
pub(crate) fn validate_description(description: &str) -> Result<String> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(TaskboardError::validation(
            "description",
            "Description is required",
        ));
    }
    Ok(trimmed.to_string())
}

#[async_trait]
impl Store for CardStore {
    fn base(&self) -> &BaseStore {
        &self.base
    }

    async fn reset(&self) {
        self.base.reset();
        self.cards.set(Vec::new());
        self.selected_card.set(None);
    }
}
