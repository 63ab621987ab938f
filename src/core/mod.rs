//! Core engine types: ids, players, state, intents, mana, RNG, configuration.

pub mod config;
pub mod entity;
pub mod error;
pub mod intent;
pub mod mana;
pub mod player;
pub mod rng;
pub mod state;
pub mod step;

pub use config::EngineConfig;
pub use entity::EntityId;
pub use error::{EngineError, Result};
pub use intent::Intent;
pub use mana::{ManaColor, ManaCost, ManaPool};
pub use player::{PlayerId, PlayerMap, PLAYER_COUNT};
pub use rng::GameRng;
pub use state::{ControlChange, ControlDuration, GameState, GameStatus, PlayerBoard, PreventionState};
pub use step::Step;
