//! The resolution stack and priority.
//!
//! Spells and abilities wait on `GameState::stack` (top = last element)
//! and resolve strictly last in, first out, one entry each time both
//! players pass in succession.
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use duel_engine::cards::{Card, CardDefinition};
//! use duel_engine::core::{EngineConfig, GameState, PlayerId};
//! use duel_engine::stack::{StackEntry, StackResolver};
//!
//! let mut state = GameState::new(EngineConfig::default());
//! let p0 = PlayerId::new(0);
//! let def = CardDefinition::creature("Grizzly Bears", "{1}{G}".parse().unwrap(), 2, 2);
//! let card = Card::new(state.alloc_id(), p0, Arc::new(def));
//! let id = state.alloc_id();
//! state.stack.push(StackEntry::spell(id, card, p0));
//!
//! StackResolver::resolve_top(&mut state).unwrap();
//! assert_eq!(state.players[p0].battlefield.len(), 1);
//! ```

mod entry;
mod priority;
mod resolve;

pub use entry::{StackEntry, StackEntryKind};
pub use priority::PriorityState;
pub use resolve::StackResolver;
