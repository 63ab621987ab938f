//! Effect handlers, grouped by what they touch.
//!
//! Handlers skip quietly when a target or source is gone: an illegal target
//! was already replaced by `None` in the context. Handlers that need a
//! decision set `GameState::pending` and return [`Flow::Suspend`](super::Flow).

pub(super) mod control;
pub(super) mod creatures;
pub(super) mod damage;
pub(super) mod graveyard;
pub(super) mod library;
pub(super) mod life;
pub(super) mod misc;
pub(super) mod prevention;
pub(super) mod removal;
pub(super) mod stack;

use crate::core::{EntityId, GameState};
use crate::statics::StaticQuery;

/// Ids of creatures matching a predicate, snapshotted before any of them
/// is touched.
fn creature_ids(state: &GameState, filter: impl Fn(&crate::cards::Permanent) -> bool) -> Vec<EntityId> {
    state
        .all_permanents()
        .filter(|p| StaticQuery::is_creature(state, p) && filter(p))
        .map(|p| p.id)
        .collect()
}
