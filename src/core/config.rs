//! Engine configuration.
//!
//! A match is configured once at creation. The defaults match the usual
//! two-player rules; hosts override them with the `with_*` builders or by
//! deserializing an `EngineConfig` from their own config source.
//!
//! ```
//! use duel_engine::core::{EngineConfig, Step};
//!
//! let config = EngineConfig::default()
//!     .with_starting_life(30)
//!     .with_seed(7)
//!     .with_default_auto_stops(vec![Step::PrecombatMain]);
//!
//! assert_eq!(config.starting_life, 30);
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use super::error::{EngineError, Result};
use super::step::Step;

/// Configuration for one match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Life total each player starts with.
    pub starting_life: i32,

    /// Cards drawn into the opening hand.
    pub opening_hand_size: usize,

    /// Hand size enforced during cleanup.
    pub max_hand_size: usize,

    /// Maximum automatic passes per call before the loop gives up.
    pub auto_pass_limit: usize,

    /// Steps where a player stops to receive priority even with nothing
    /// obviously playable. Players can change theirs during the match.
    pub default_auto_stops: Vec<Step>,

    /// RNG seed for shuffles, starting player and coin flips.
    pub seed: u64,

    /// Shuffle libraries when the match starts.
    pub shuffle_libraries: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            starting_life: 20,
            opening_hand_size: 7,
            max_hand_size: 7,
            auto_pass_limit: 100,
            default_auto_stops: vec![Step::PrecombatMain, Step::PostcombatMain],
            seed: 0,
            shuffle_libraries: true,
        }
    }
}

impl EngineConfig {
    /// Set the starting life total.
    #[must_use]
    pub fn with_starting_life(mut self, life: i32) -> Self {
        self.starting_life = life;
        self
    }

    /// Set the opening hand size.
    #[must_use]
    pub fn with_opening_hand_size(mut self, size: usize) -> Self {
        self.opening_hand_size = size;
        self
    }

    /// Set the cleanup hand size limit.
    #[must_use]
    pub fn with_max_hand_size(mut self, size: usize) -> Self {
        self.max_hand_size = size;
        self
    }

    /// Set the auto-pass loop cap.
    #[must_use]
    pub fn with_auto_pass_limit(mut self, limit: usize) -> Self {
        self.auto_pass_limit = limit;
        self
    }

    /// Set the default auto-stop steps.
    #[must_use]
    pub fn with_default_auto_stops(mut self, steps: Vec<Step>) -> Self {
        self.default_auto_stops = steps;
        self
    }

    /// Set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Keep libraries in the given order (useful for scripted games).
    #[must_use]
    pub fn without_shuffle(mut self) -> Self {
        self.shuffle_libraries = false;
        self
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.starting_life <= 0 {
            return Err(EngineError::rejected("starting life must be positive"));
        }
        if self.auto_pass_limit == 0 {
            return Err(EngineError::rejected("auto-pass limit must be at least 1"));
        }
        if self.max_hand_size == 0 {
            return Err(EngineError::rejected("maximum hand size must be at least 1"));
        }
        Ok(())
    }
}
