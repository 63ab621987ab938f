//! Priority passes.
//!
//! Players pass priority in turn order starting with the active player.
//! When both have passed in succession the top of the stack resolves (or,
//! with an empty stack, the step ends). Any state change clears the passes
//! so priority returns to the active player.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{PlayerId, PlayerMap};

/// Which players have passed since the last state change.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityState {
    passed: PlayerMap<bool>,
}

impl PriorityState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The active player if they have not passed, else the other player if
    /// they have not, else nobody.
    #[must_use]
    pub fn holder(&self, active: PlayerId) -> Option<PlayerId> {
        PlayerId::starting_with(active)
            .into_iter()
            .find(|p| !self.passed[*p])
    }

    /// Record a pass.
    pub fn pass(&mut self, player: PlayerId) {
        debug!(%player, "priority passed");
        self.passed[player] = true;
    }

    #[must_use]
    pub fn has_passed(&self, player: PlayerId) -> bool {
        self.passed[player]
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.passed.values().all(|p| *p)
    }

    /// Forget all passes.
    pub fn clear(&mut self) {
        self.passed = PlayerMap::with_value(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holder_follows_passes() {
        let active = PlayerId::new(1);
        let mut priority = PriorityState::new();
        assert_eq!(priority.holder(active), Some(active));

        priority.pass(active);
        assert_eq!(priority.holder(active), Some(PlayerId::new(0)));
        assert!(!priority.all_passed());

        priority.pass(PlayerId::new(0));
        assert_eq!(priority.holder(active), None);
        assert!(priority.all_passed());

        priority.clear();
        assert_eq!(priority.holder(active), Some(active));
    }

    #[test]
    fn test_non_active_pass_alone_keeps_active_holder() {
        let active = PlayerId::new(0);
        let mut priority = PriorityState::new();
        priority.pass(PlayerId::new(1));
        assert_eq!(priority.holder(active), Some(active));
    }
}
