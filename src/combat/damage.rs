//! Combat damage.
//!
//! Damage is dealt in up to two phases. The first-strike phase only exists
//! when some combatant has first strike or double strike. Within a phase
//! every assignment is computed from one snapshot, then dealt, then
//! casualties are collected together, so mutual lethal damage kills both
//! creatures. The dead leave play after the last phase, attackers first.

use smallvec::SmallVec;
use tracing::debug;

use super::declare::Combat;
use crate::cards::Keyword;
use crate::core::{EntityId, GameState, PlayerId, Result};
use crate::rules::{Damage, DamageSource, Destruction};
use crate::statics::StaticQuery;
use crate::triggers::{GameEvent, Triggers};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    FirstStrike,
    Regular,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Recipient {
    Player(PlayerId),
    Permanent(EntityId),
}

struct Assignment {
    source: DamageSource,
    recipient: Recipient,
    amount: i32,
}

impl Combat {
    /// Deal combat damage for the current combat.
    pub fn resolve_damage(state: &mut GameState) -> Result<()> {
        if state.combat.attackers.is_empty() {
            return Ok(());
        }
        if state.prevention.all_combat_damage {
            state.log_event("All combat damage is prevented.");
            return Ok(());
        }

        let combatants = Self::combatants(state);
        let first_strike = combatants.iter().any(|id| {
            state.permanent(*id).map_or(false, |p| {
                let kw = StaticQuery::keywords(state, p);
                kw.contains(Keyword::FirstStrike) || kw.contains(Keyword::DoubleStrike)
            })
        });

        let mut dead: Vec<EntityId> = Vec::new();
        if first_strike {
            Self::damage_phase(state, Phase::FirstStrike, &mut dead)?;
        }
        Self::damage_phase(state, Phase::Regular, &mut dead)?;

        let attackers = state.combat.attackers.clone();
        dead.sort_by_key(|id| !attackers.contains(id));
        for id in dead {
            if state.permanent(id).is_some() {
                state.dies(id)?;
            }
        }
        Ok(())
    }

    /// Attackers then blockers.
    fn combatants(state: &GameState) -> Vec<EntityId> {
        let mut ids = state.combat.attackers.clone();
        ids.extend(state.combat.blockers());
        ids
    }

    fn deals_damage_in(state: &GameState, id: EntityId, phase: Phase) -> bool {
        let Some(perm) = state.permanent(id) else {
            return false;
        };
        let keywords = StaticQuery::keywords(state, perm);
        let first = keywords.contains(Keyword::FirstStrike);
        let double = keywords.contains(Keyword::DoubleStrike);
        match phase {
            Phase::FirstStrike => first || double,
            Phase::Regular => double || !first,
        }
    }

    fn damage_phase(state: &mut GameState, phase: Phase, dead: &mut Vec<EntityId>) -> Result<()> {
        debug!(?phase, "combat damage phase");
        let assignments = Self::assign(state, phase, dead);

        for assignment in assignments {
            match assignment.recipient {
                Recipient::Player(player) => {
                    let dealt = Damage::to_player(state, &assignment.source, player, assignment.amount);
                    if dealt > 0 {
                        if let Some(id) = assignment.source.id {
                            Triggers::fire(state, GameEvent::CombatDamageToPlayer { source: id });
                        }
                    }
                }
                Recipient::Permanent(id) => {
                    if state.permanent(id).is_some() {
                        Damage::to_permanent(state, &assignment.source, id, assignment.amount)?;
                    }
                }
            }
        }

        Self::collect_casualties(state, dead)
    }

    /// Every assignment of one phase, from one snapshot.
    fn assign(state: &GameState, phase: Phase, dead: &[EntityId]) -> Vec<Assignment> {
        let alive = |id: &EntityId| !dead.contains(id) && state.permanent(*id).is_some();
        let defender = state.defending_player();
        let mut assignments = Vec::new();

        for &attacker in &state.combat.attackers {
            if !alive(&attacker) || !Self::deals_damage_in(state, attacker, phase) {
                continue;
            }
            let Some(perm) = state.permanent(attacker) else {
                continue;
            };
            let power = StaticQuery::power(state, perm);
            if power <= 0 {
                continue;
            }
            let source = DamageSource::from_permanent(state, perm);
            let trample = StaticQuery::has_keyword(state, perm, Keyword::Trample);

            if !state.combat.is_blocked(attacker) {
                let recipient = state
                    .prevention
                    .combat_redirect
                    .filter(|id| state.permanent(*id).is_some())
                    .map_or(Recipient::Player(defender), Recipient::Permanent);
                assignments.push(Assignment { source, recipient, amount: power });
                continue;
            }

            let blockers: SmallVec<[EntityId; 2]> =
                state.combat.blockers_of(attacker).into_iter().filter(|b| alive(b)).collect();
            for (recipient, amount) in Self::split(state, power, &blockers, trample.then_some(defender)) {
                assignments.push(Assignment { source: source.clone(), recipient, amount });
            }
        }

        for blocker in state.combat.blockers() {
            if !alive(&blocker) || !Self::deals_damage_in(state, blocker, phase) {
                continue;
            }
            let Some(perm) = state.permanent(blocker) else {
                continue;
            };
            let power = StaticQuery::power(state, perm);
            if power <= 0 {
                continue;
            }
            let source = DamageSource::from_permanent(state, perm);
            let targets: SmallVec<[EntityId; 2]> =
                state.combat.blocked_by(blocker).into_iter().filter(|a| alive(a)).collect();
            for (recipient, amount) in Self::split(state, power, &targets, None) {
                assignments.push(Assignment { source: source.clone(), recipient, amount });
            }
        }
        assignments
    }

    /// Divide damage among creatures in order, each up to its remaining
    /// toughness. Excess goes to `trample_to` if set, else to the last one.
    fn split(
        state: &GameState,
        power: i32,
        order: &[EntityId],
        trample_to: Option<PlayerId>,
    ) -> SmallVec<[(Recipient, i32); 3]> {
        let mut out = SmallVec::new();
        let Some((&last, rest)) = order.split_last() else {
            if let Some(player) = trample_to {
                out.push((Recipient::Player(player), power));
            }
            return out;
        };

        let mut remaining = power;
        for &id in rest.iter().chain(std::iter::once(&last)) {
            if remaining <= 0 {
                break;
            }
            let lethal = state
                .permanent(id)
                .map_or(0, |p| (StaticQuery::toughness(state, p) - p.damage).max(0));
            let amount = if id == last && trample_to.is_none() {
                remaining
            } else {
                remaining.min(lethal)
            };
            if amount > 0 {
                out.push((Recipient::Permanent(id), amount));
                remaining -= amount;
            }
        }
        if remaining > 0 {
            match trample_to {
                Some(player) => out.push((Recipient::Player(player), remaining)),
                None => out.push((Recipient::Permanent(last), remaining)),
            }
        }
        out
    }

    /// Snapshot every combatant with lethal damage, then regenerate or mark
    /// it dead.
    fn collect_casualties(state: &mut GameState, dead: &mut Vec<EntityId>) -> Result<()> {
        let lethal: Vec<EntityId> = Self::combatants(state)
            .into_iter()
            .filter(|id| !dead.contains(id))
            .filter(|id| {
                state.permanent(*id).map_or(false, |p| {
                    let toughness = StaticQuery::toughness(state, p);
                    p.damage > 0
                        && p.damage >= toughness
                        && !StaticQuery::has_keyword(state, p, Keyword::Indestructible)
                })
            })
            .collect();

        for id in lethal {
            let can_regenerate = state.permanent(id).map_or(false, |p| p.can_regenerate());
            if can_regenerate {
                Destruction::regenerate(state, id)?;
            } else {
                dead.push(id);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Card, CardDefinition};
    use crate::core::EngineConfig;
    use std::sync::Arc;

    fn p0() -> PlayerId {
        PlayerId::new(0)
    }

    fn p1() -> PlayerId {
        PlayerId::new(1)
    }

    fn put(state: &mut GameState, def: CardDefinition, controller: PlayerId) -> EntityId {
        let card = Card::new(state.alloc_id(), controller, Arc::new(def));
        let id = state.put_onto_battlefield(card, controller);
        state.permanent_mut(id).unwrap().summoning_sick = false;
        id
    }

    fn creature(name: &str, power: i32, toughness: i32) -> CardDefinition {
        CardDefinition::creature(name, "{2}".parse().unwrap(), power, toughness)
    }

    /// Attack with p0's creature at `attacker`, block with p1's at each of `blockers`.
    fn fight(state: &mut GameState, attacker: usize, blockers: &[usize]) {
        Combat::declare_attackers(state, p0(), &[attacker]).unwrap();
        let pairs: Vec<(usize, usize)> = blockers.iter().map(|b| (*b, attacker)).collect();
        Combat::declare_blockers(state, p1(), &pairs).unwrap();
        Combat::resolve_damage(state).unwrap();
    }

    // =========================================================================
    // Unblocked
    // =========================================================================

    /// Test that unblocked damage hits the defending player.
    #[test]
    fn test_unblocked_hits_player() {
        let mut state = GameState::new(EngineConfig::default());
        put(&mut state, creature("Ogre", 3, 3), p0());
        fight(&mut state, 0, &[]);
        assert_eq!(state.players[p1()].life, 17);
    }

    /// Test redirection to a permanent.
    #[test]
    fn test_redirect() {
        let mut state = GameState::new(EngineConfig::default());
        put(&mut state, creature("Ogre", 3, 3), p0());
        let wall = put(&mut state, creature("Wall", 0, 5), p1());
        state.prevention.combat_redirect = Some(wall);
        fight(&mut state, 0, &[]);
        assert_eq!(state.players[p1()].life, 20);
        assert_eq!(state.permanent(wall).unwrap().damage, 3);
    }

    /// Test that prevent-all short-circuits.
    #[test]
    fn test_prevent_all() {
        let mut state = GameState::new(EngineConfig::default());
        put(&mut state, creature("Ogre", 3, 3), p0());
        state.prevention.all_combat_damage = true;
        fight(&mut state, 0, &[]);
        assert_eq!(state.players[p1()].life, 20);
    }

    // =========================================================================
    // Blocked
    // =========================================================================

    /// Test that mutual lethal damage kills both.
    #[test]
    fn test_simultaneous_death() {
        let mut state = GameState::new(EngineConfig::default());
        let a = put(&mut state, creature("A", 2, 2), p0());
        let b = put(&mut state, creature("B", 2, 2), p1());
        fight(&mut state, 0, &[0]);
        assert!(state.permanent(a).is_none());
        assert!(state.permanent(b).is_none());
        assert_eq!(state.players[p0()].graveyard.len(), 1);
        assert_eq!(state.players[p1()].graveyard.len(), 1);
    }

    /// Test that a first striker blocked by a bigger creature dies alone.
    #[test]
    fn test_first_striker_dies_to_bigger_blocker() {
        let mut state = GameState::new(EngineConfig::default());
        let knight = put(&mut state, creature("Knight", 2, 2).with_keyword(Keyword::FirstStrike), p0());
        let ogre = put(&mut state, creature("Ogre", 3, 3), p1());
        fight(&mut state, 0, &[0]);
        assert!(state.permanent(knight).is_none());
        assert_eq!(state.permanent(ogre).unwrap().damage, 2);
    }

    /// Test that a first striker that kills its blocker takes no damage.
    #[test]
    fn test_first_strike_kills_first() {
        let mut state = GameState::new(EngineConfig::default());
        let knight = put(&mut state, creature("Knight", 2, 2).with_keyword(Keyword::FirstStrike), p0());
        let bears = put(&mut state, creature("Bears", 2, 2), p1());
        fight(&mut state, 0, &[0]);
        assert_eq!(state.permanent(knight).unwrap().damage, 0);
        assert!(state.permanent(bears).is_none());
    }

    /// Test that double strike deals damage in both phases.
    #[test]
    fn test_double_strike_unblocked() {
        let mut state = GameState::new(EngineConfig::default());
        put(&mut state, creature("Duelist", 2, 2).with_keyword(Keyword::DoubleStrike), p0());
        fight(&mut state, 0, &[]);
        assert_eq!(state.players[p1()].life, 16);
    }

    /// Test ordered assignment and trample excess.
    #[test]
    fn test_trample_over_blockers() {
        let mut state = GameState::new(EngineConfig::default());
        put(&mut state, creature("Craw Wurm", 6, 4).with_keyword(Keyword::Trample), p0());
        let a = put(&mut state, creature("A", 1, 1), p1());
        let b = put(&mut state, creature("B", 2, 2), p1());
        fight(&mut state, 0, &[0, 1]);
        assert!(state.permanent(a).is_none());
        assert!(state.permanent(b).is_none());
        assert_eq!(state.players[p1()].life, 17);
    }

    /// Test that without trample the excess stays on the last blocker.
    #[test]
    fn test_excess_to_last_blocker() {
        let mut state = GameState::new(EngineConfig::default());
        put(&mut state, creature("Wurm", 6, 6), p0());
        put(&mut state, creature("A", 1, 1), p1());
        let b = put(&mut state, creature("B", 1, 9), p1());
        fight(&mut state, 0, &[0, 1]);
        assert_eq!(state.permanent(b).unwrap().damage, 5);
        assert_eq!(state.players[p1()].life, 20);
    }

    /// Test that a regenerating blocker survives and leaves combat.
    #[test]
    fn test_regeneration_in_combat() {
        let mut state = GameState::new(EngineConfig::default());
        put(&mut state, creature("Ogre", 3, 3), p0());
        let drudge = put(&mut state, creature("Drudge", 1, 1), p1());
        state.permanent_mut(drudge).unwrap().regeneration_shields = 1;
        fight(&mut state, 0, &[0]);
        let perm = state.permanent(drudge).unwrap();
        assert!(perm.tapped);
        assert_eq!(perm.damage, 0);
        assert!(!perm.blocking);
    }
}
