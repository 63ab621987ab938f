//! Zones: where cards are.
//!
//! ## Key Types
//!
//! - `Zone`: The six zones a card can be in
//! - `ZonePosition`: Position specifier for ordered piles
//! - `Pile`: Ordered library/hand/graveyard/exile contents
//!
//! The battlefield is a `Vec<Permanent>` per player and the stack lives on
//! `GameState`; `movement` holds the `GameState` methods that carry cards
//! between all of them.

pub mod movement;
pub mod pile;

use serde::{Deserialize, Serialize};

pub use pile::Pile;

/// A zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    Library,
    Hand,
    Battlefield,
    Graveyard,
    Exile,
    Stack,
}

/// Position in an ordered pile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZonePosition {
    Top,
    Bottom,
    /// Index counted from the top.
    Index(usize),
}
