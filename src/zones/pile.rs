//! Ordered card piles.
//!
//! A `Pile` is one player's library, hand, graveyard or exile. Index 0 is
//! the top of the pile; new hand and graveyard cards are appended at the
//! end so hand indices stay stable while cards arrive.

use serde::{Deserialize, Serialize};

use super::ZonePosition;
use crate::cards::Card;
use crate::core::{EngineError, EntityId, GameRng, Result};

/// An ordered list of cards. Index 0 is the top.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pile {
    cards: Vec<Card>,
}

impl Pile {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pile; the first card is the top.
    #[must_use]
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Card> + '_ {
        self.cards.iter()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    #[must_use]
    pub fn position(&self, id: EntityId) -> Option<usize> {
        self.cards.iter().position(|c| c.id == id)
    }

    #[must_use]
    pub fn find(&self, id: EntityId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    /// Append at the end (the bottom).
    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn put(&mut self, card: Card, position: ZonePosition) {
        match position {
            ZonePosition::Top => self.cards.insert(0, card),
            ZonePosition::Bottom => self.cards.push(card),
            ZonePosition::Index(i) => {
                let idx = i.min(self.cards.len());
                self.cards.insert(idx, card);
            }
        }
    }

    pub fn take_top(&mut self) -> Option<Card> {
        if self.cards.is_empty() {
            None
        } else {
            Some(self.cards.remove(0))
        }
    }

    pub fn remove(&mut self, index: usize) -> Option<Card> {
        (index < self.cards.len()).then(|| self.cards.remove(index))
    }

    pub fn remove_id(&mut self, id: EntityId) -> Option<Card> {
        let index = self.position(id)?;
        Some(self.cards.remove(index))
    }

    /// The top `n` cards (fewer if the pile is smaller).
    #[must_use]
    pub fn top(&self, n: usize) -> &[Card] {
        &self.cards[..n.min(self.cards.len())]
    }

    pub fn shuffle(&mut self, rng: &mut GameRng) {
        rng.shuffle(&mut self.cards);
    }

    pub fn drain_all(&mut self) -> Vec<Card> {
        std::mem::take(&mut self.cards)
    }

    /// Reorder the top `order.len()` cards. `order[i]` is the index (among
    /// those top cards) of the card that ends up at position `i`.
    pub fn reorder_top(&mut self, order: &[usize]) -> Result<()> {
        let n = order.len();
        if n > self.cards.len() {
            return Err(EngineError::InvalidIndex { what: "library", index: n });
        }
        let mut seen = vec![false; n];
        for &i in order {
            if i >= n || std::mem::replace(&mut seen[i], true) {
                return Err(EngineError::InvalidIndex { what: "library order", index: i });
            }
        }
        let top: Vec<Card> = self.cards.drain(..n).collect();
        let reordered: Vec<Card> = order.iter().map(|&i| top[i].clone()).collect();
        self.cards.splice(0..0, reordered);
        Ok(())
    }
}
