//! Physical cards.
//!
//! A `Card` is one physical card (or token) in a match. Its `EntityId` is
//! fixed for the whole match while it moves between library, hand, stack,
//! graveyard and exile. Putting it onto the battlefield wraps it in a
//! `Permanent` with an id of its own.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::definition::CardDefinition;
use crate::core::{EntityId, PlayerId};

/// A physical card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: EntityId,
    pub owner: PlayerId,
    pub definition: Arc<CardDefinition>,
    /// Tokens cease to exist when they leave the battlefield.
    pub is_token: bool,
}

impl Card {
    #[must_use]
    pub fn new(id: EntityId, owner: PlayerId, definition: Arc<CardDefinition>) -> Self {
        Self {
            id,
            owner,
            definition,
            is_token: false,
        }
    }

    #[must_use]
    pub fn token(id: EntityId, owner: PlayerId, definition: Arc<CardDefinition>) -> Self {
        Self {
            is_token: true,
            ..Self::new(id, owner, definition)
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// The same physical card showing another card's characteristics.
    #[must_use]
    pub fn with_definition(&self, definition: Arc<CardDefinition>) -> Self {
        Self {
            definition,
            ..self.clone()
        }
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_keeps_identity() {
        let bears = Arc::new(CardDefinition::creature("Grizzly Bears", "{1}{G}".parse().unwrap(), 2, 2));
        let giant = Arc::new(CardDefinition::creature("Hill Giant", "{3}{R}".parse().unwrap(), 3, 3));

        let card = Card::new(EntityId(5), PlayerId::new(1), bears);
        let copy = card.with_definition(giant);

        assert_eq!(copy.id, card.id);
        assert_eq!(copy.owner, PlayerId::new(1));
        assert_eq!(copy.name(), "Hill Giant");
        assert!(!copy.is_token);
    }
}
