//! Outbound snapshots.

use super::snapshot::GameSnapshot;
use crate::core::PlayerId;

/// Receives one snapshot per player after every accepted intent.
///
/// Called with the match lock held, so implementations should hand the
/// snapshot off (queue, channel) rather than block.
pub trait Broadcaster: Send + Sync {
    fn send(&self, player: PlayerId, snapshot: &GameSnapshot);
}

/// Drops every snapshot.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullBroadcaster;

impl Broadcaster for NullBroadcaster {
    fn send(&self, _player: PlayerId, _snapshot: &GameSnapshot) {}
}
