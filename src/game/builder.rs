//! Match construction.

use std::sync::Arc;

use super::broadcast::{Broadcaster, NullBroadcaster};
use super::session::Match;
use crate::cards::{Card, CardDefinition};
use crate::core::{EngineConfig, GameState, PlayerId, PlayerMap, Result};
use crate::rules::RulesEngine;

/// Builder for a [`Match`].
pub struct MatchBuilder {
    config: EngineConfig,
    decks: PlayerMap<Vec<Arc<CardDefinition>>>,
    broadcaster: Arc<dyn Broadcaster>,
}

impl Default for MatchBuilder {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            decks: PlayerMap::with_default(),
            broadcaster: Arc::new(NullBroadcaster),
        }
    }
}

impl MatchBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set a player's deck, top card first when shuffling is off.
    #[must_use]
    pub fn with_deck(mut self, player: PlayerId, deck: Vec<Arc<CardDefinition>>) -> Self {
        self.decks[player] = deck;
        self
    }

    #[must_use]
    pub fn with_broadcaster(mut self, broadcaster: Arc<dyn Broadcaster>) -> Self {
        self.broadcaster = broadcaster;
        self
    }

    /// Load the decks, start the match, and send the first snapshots.
    pub fn build(self) -> Result<Match> {
        self.config.validate()?;
        let mut state = GameState::new(self.config);
        for player in PlayerId::both() {
            for def in &self.decks[player] {
                let card = Card::new(state.alloc_id(), player, def.clone());
                state.players[player].library.push(card);
            }
        }
        RulesEngine::start(&mut state)?;
        Ok(Match::new(state, self.broadcaster))
    }
}
