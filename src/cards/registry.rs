//! Card registry for definition lookup.
//!
//! The `CardRegistry` stores card definitions by name so decks can be
//! described as name lists. Loading a card catalog into it is the host's
//! concern.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::definition::CardDefinition;
use crate::core::{EngineError, Result};

/// Registry of card definitions keyed by name.
///
/// ## Example
///
/// ```
/// use duel_engine::cards::{CardDefinition, CardRegistry};
///
/// let mut registry = CardRegistry::new();
/// registry.register(CardDefinition::instant("Lightning Bolt", "{R}".parse().unwrap())).unwrap();
///
/// let deck = registry.deck(&["Lightning Bolt", "Lightning Bolt"]).unwrap();
/// assert_eq!(deck.len(), 2);
/// assert!(registry.deck(&["Black Lotus"]).is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    cards: FxHashMap<String, Arc<CardDefinition>>,
}

impl CardRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a card definition. Names must be unique.
    pub fn register(&mut self, card: CardDefinition) -> Result<Arc<CardDefinition>> {
        if self.cards.contains_key(&card.name) {
            return Err(EngineError::rejected(format!(
                "card '{}' is already registered",
                card.name
            )));
        }
        let card = Arc::new(card);
        self.cards.insert(card.name.clone(), Arc::clone(&card));
        Ok(card)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<CardDefinition>> {
        self.cards.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.cards.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<CardDefinition>> {
        self.cards.values()
    }

    /// Resolve a list of names into shared definitions.
    pub fn deck(&self, names: &[&str]) -> Result<Vec<Arc<CardDefinition>>> {
        names
            .iter()
            .map(|name| {
                self.get(name)
                    .cloned()
                    .ok_or_else(|| EngineError::rejected(format!("unknown card '{name}'")))
            })
            .collect()
    }
}
