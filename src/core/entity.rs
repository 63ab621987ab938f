//! Entity identification.
//!
//! Every game object (card, token, permanent, stack entry) is addressed by
//! an `EntityId`. Cross references between objects are always ids resolved
//! through the `GameState` arena, never live pointers. Players are not
//! entities; they are named by `PlayerId`.
//!
//! Allocation is monotonic, so a larger id always means a newer object.
//! The static query engine relies on this as a timestamp.
//!
//! ```
//! use duel_engine::core::EntityId;
//!
//! let older = EntityId(10);
//! let newer = EntityId(11);
//! assert!(older < newer);
//! assert_eq!(newer.to_string(), "#11");
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for any game object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// The first id a match hands out.
    pub const FIRST: u32 = 1;

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_is_allocation_order() {
        let mut ids = vec![EntityId(9), EntityId(5), EntityId(7)];
        ids.sort();
        assert_eq!(ids, vec![EntityId(5), EntityId(7), EntityId(9)]);
        assert_eq!(ids.iter().max().map(|id| id.raw()), Some(9));
    }

    #[test]
    fn test_serializes_as_number() {
        let id = EntityId(123);
        assert_eq!(serde_json::to_string(&id).unwrap(), "123");
        let back: EntityId = serde_json::from_str("123").unwrap();
        assert_eq!(back, id);
    }
}
