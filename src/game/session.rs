//! A running match behind its lock.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use super::broadcast::Broadcaster;
use super::snapshot::GameSnapshot;
use crate::core::{EngineError, GameState, GameStatus, Intent, PlayerId, Result};
use crate::rules::RulesEngine;

struct Inner {
    state: GameState,
    /// Log index the next broadcast starts from.
    broadcast_from: usize,
}

/// One match. Every operation holds the lock for its whole duration, so
/// intents from both players are applied one at a time.
pub struct Match {
    inner: Mutex<Inner>,
    broadcaster: Arc<dyn Broadcaster>,
}

impl Match {
    pub(super) fn new(state: GameState, broadcaster: Arc<dyn Broadcaster>) -> Self {
        let game = Self {
            inner: Mutex::new(Inner { state, broadcast_from: 0 }),
            broadcaster,
        };
        if let Ok(mut inner) = game.inner.lock() {
            game.broadcast(&mut inner);
        }
        game
    }

    /// Apply an intent. On success every player receives a fresh snapshot.
    pub fn submit(&self, player: PlayerId, intent: Intent) -> Result<()> {
        let mut inner = self.lock()?;
        RulesEngine::apply(&mut inner.state, player, &intent)?;
        debug!(%player, verb = intent.verb(), "intent applied");
        self.broadcast(&mut inner);
        Ok(())
    }

    /// `player`'s current view, with the whole log.
    pub fn snapshot(&self, player: PlayerId) -> Result<GameSnapshot> {
        let inner = self.lock()?;
        Ok(GameSnapshot::for_player(&inner.state, player, 0))
    }

    /// Read the state under the lock.
    pub fn with_state<R>(&self, f: impl FnOnce(&GameState) -> R) -> Result<R> {
        let inner = self.lock()?;
        Ok(f(&inner.state))
    }

    pub fn status(&self) -> Result<GameStatus> {
        self.with_state(|state| state.status)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| EngineError::invariant("match lock poisoned"))
    }

    fn broadcast(&self, inner: &mut Inner) {
        for player in PlayerId::both() {
            let snapshot = GameSnapshot::for_player(&inner.state, player, inner.broadcast_from);
            self.broadcaster.send(player, &snapshot);
        }
        inner.broadcast_from = inner.state.log.len();
    }
}
