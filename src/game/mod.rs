//! The match facade.
//!
//! A [`Match`] owns one `GameState` behind a mutex. Hosts submit
//! [`Intent`](crate::core::Intent)s from either player; after each accepted
//! intent a [`Broadcaster`] receives one [`GameSnapshot`] per player.
//!
//! ```
//! use std::sync::Arc;
//! use duel_engine::cards::{CardDefinition, Subtype};
//! use duel_engine::core::{EngineConfig, Intent, PlayerId};
//! use duel_engine::game::MatchBuilder;
//!
//! let island = Arc::new(CardDefinition::basic_land(Subtype::Island));
//! let deck = vec![island; 40];
//! let game = MatchBuilder::new()
//!     .with_config(EngineConfig::default().with_seed(42))
//!     .with_deck(PlayerId::new(0), deck.clone())
//!     .with_deck(PlayerId::new(1), deck)
//!     .build()
//!     .unwrap();
//!
//! let first = game.with_state(|s| s.active_player).unwrap();
//! game.submit(first, Intent::play(0)).unwrap();
//! let view = game.snapshot(first).unwrap();
//! assert_eq!(view.players[first.index()].battlefield.len(), 1);
//! ```

mod broadcast;
mod builder;
mod session;
mod snapshot;

pub use broadcast::{Broadcaster, NullBroadcaster};
pub use builder::MatchBuilder;
pub use session::Match;
pub use snapshot::{CardView, GameSnapshot, PermanentView, PlayerView, StackView};
