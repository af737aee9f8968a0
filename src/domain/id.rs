use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl FromStr for $name {
            type Err = crate::error::TaskboardError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| crate::error::TaskboardError::InvalidId(s.to_string()))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of a user account
    UserId
);
entity_id!(
    /// Identifier of a board
    BoardId
);
entity_id!(
    /// Identifier of a column within a board
    ColumnId
);
entity_id!(
    /// Identifier of a card
    CardId
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskboardError;

    #[test]
    fn test_id_parsing() {
        let id = CardId::new();
        let parsed: CardId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);

        let padded: CardId = format!("  {}  ", id).parse().unwrap();
        assert_eq!(padded, id);
    }

    #[test]
    fn test_invalid_id_rejected() {
        let err = "not-a-guid".parse::<BoardId>().unwrap_err();
        assert!(matches!(err, TaskboardError::InvalidId(s) if s == "not-a-guid"));
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = UserId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
    }
}
