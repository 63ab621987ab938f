//! Attacker and blocker declarations.
//!
//! A declaration is validated as a whole before anything changes. Indices
//! refer to battlefields: attackers to the active player's, blockers to the
//! defender's.

use smallvec::SmallVec;

use crate::cards::{CardType, Color, Keyword, Permanent};
use crate::core::{EngineError, EntityId, GameState, PlayerId, Result};
use crate::statics::StaticQuery;
use crate::triggers::{GameEvent, Triggers};

/// Combat rules.
pub struct Combat;

impl Combat {
    // === Eligibility ===

    /// Whether a permanent could be declared as an attacker right now.
    #[must_use]
    pub fn can_attack(state: &GameState, perm: &Permanent) -> bool {
        let chars = StaticQuery::characteristics(state, perm);
        chars.is_creature
            && !perm.tapped
            && (!perm.summoning_sick || chars.keywords.contains(Keyword::Haste))
            && !chars.keywords.contains(Keyword::Defender)
            && !StaticQuery::cant_attack_or_block(state, perm)
    }

    /// Whether a permanent could block something in general.
    #[must_use]
    pub fn can_block_at_all(state: &GameState, perm: &Permanent) -> bool {
        StaticQuery::is_creature(state, perm)
            && !perm.tapped
            && !perm.cant_block_this_turn
            && !StaticQuery::cant_attack_or_block(state, perm)
    }

    /// Whether `blocker` may block `attacker`, with the reason if not.
    pub fn check_block(state: &GameState, blocker: &Permanent, attacker: &Permanent) -> std::result::Result<(), String> {
        if !Self::can_block_at_all(state, blocker) {
            return Err(format!("{} can't block", blocker.name()));
        }
        if !attacker.attacking {
            return Err(format!("{} is not attacking", attacker.name()));
        }
        if StaticQuery::cant_be_blocked(attacker) {
            return Err(format!("{} can't be blocked", attacker.name()));
        }

        let attacking = StaticQuery::characteristics(state, attacker);
        let blocking = StaticQuery::characteristics(state, blocker);

        if attacking.keywords.contains(Keyword::Flying)
            && !blocking.keywords.contains(Keyword::Flying)
            && !blocking.keywords.contains(Keyword::Reach)
        {
            return Err(format!("{} has flying", attacker.name()));
        }
        if attacking.keywords.contains(Keyword::Fear)
            && !blocker.definition().has_type(CardType::Artifact)
            && blocking.color != Some(Color::Black)
        {
            return Err(format!("{} has fear", attacker.name()));
        }
        if StaticQuery::can_only_block_flyers(blocker) && !attacking.keywords.contains(Keyword::Flying) {
            return Err(format!("{} can only block creatures with flying", blocker.name()));
        }
        if StaticQuery::unblockable_by(attacker)
            .iter()
            .any(|s| blocker.definition().has_subtype(*s))
        {
            return Err(format!("{} can't be blocked by {}", attacker.name(), blocker.name()));
        }
        let defender = blocker.controller;
        for keyword in attacking.keywords.iter() {
            if let Some(land) = keyword.landwalk_subtype() {
                let walkable = state.players[defender]
                    .battlefield
                    .iter()
                    .any(|p| p.definition().is_land() && p.definition().has_subtype(land));
                if walkable {
                    return Err(format!("{} has {keyword:?}", attacker.name()));
                }
            }
        }
        if attacking.protection.contains_opt(blocking.color) {
            return Err(format!("{} has protection from {}'s color", attacker.name(), blocker.name()));
        }
        Ok(())
    }

    // === Declarations ===

    /// Declare attackers for the active player.
    pub fn declare_attackers(state: &mut GameState, player: PlayerId, indices: &[usize]) -> Result<()> {
        let board = &state.players[player];
        let mut ids: Vec<EntityId> = Vec::with_capacity(indices.len());
        for &index in indices {
            let perm = board
                .battlefield
                .get(index)
                .ok_or(EngineError::InvalidIndex { what: "battlefield", index })?;
            if ids.contains(&perm.id) {
                return Err(EngineError::declaration(format!("{} is declared twice", perm.name())));
            }
            if !Self::can_attack(state, perm) {
                return Err(EngineError::declaration(format!("{} can't attack", perm.name())));
            }
            ids.push(perm.id);
        }
        if let Some(missing) = board
            .battlefield
            .iter()
            .find(|p| StaticQuery::must_attack(p) && Self::can_attack(state, p) && !ids.contains(&p.id))
        {
            return Err(EngineError::declaration(format!("{} attacks each combat if able", missing.name())));
        }

        let defender = player.opponent();
        let count = u32::try_from(ids.len()).unwrap_or(u32::MAX);
        let tax = StaticQuery::attack_tax(state, defender).saturating_mul(count);
        if tax > 0 {
            state.players[player].mana_pool.remove_generic(tax)?;
        }

        if ids.is_empty() {
            state.log_event(format!("{player} declares no attackers."));
            return Ok(());
        }

        let mut names = Vec::with_capacity(ids.len());
        for &id in &ids {
            let vigilant = StaticQuery::has_keyword(state, state.require_permanent(id)?, Keyword::Vigilance);
            let perm = state.require_permanent_mut(id)?;
            perm.attacking = true;
            if !vigilant {
                perm.tapped = true;
            }
            names.push(perm.name().to_string());
        }
        state.combat.attackers = ids.clone();
        state.log_event(format!("{player} attacks with {}.", names.join(", ")));
        for id in ids {
            Triggers::fire(state, GameEvent::Attacked(id));
        }
        Ok(())
    }

    /// Declare blockers for the defending player.
    pub fn declare_blockers(state: &mut GameState, player: PlayerId, blocks: &[(usize, usize)]) -> Result<()> {
        let attacking_player = player.opponent();
        let mut pairs: Vec<(EntityId, EntityId)> = Vec::with_capacity(blocks.len());
        let mut uses: SmallVec<[(EntityId, u32); 4]> = SmallVec::new();

        for &(blocker_index, attacker_index) in blocks {
            let blocker = state.permanent_at(player, blocker_index)?;
            let attacker = state
                .players[attacking_player]
                .battlefield
                .get(attacker_index)
                .ok_or(EngineError::InvalidIndex { what: "attacker", index: attacker_index })?;
            if pairs.contains(&(blocker.id, attacker.id)) {
                return Err(EngineError::declaration(format!(
                    "{} blocks {} twice",
                    blocker.name(),
                    attacker.name()
                )));
            }
            Self::check_block(state, blocker, attacker).map_err(EngineError::declaration)?;

            let used = match uses.iter_mut().find(|(id, _)| *id == blocker.id) {
                Some((_, n)) => {
                    *n += 1;
                    *n
                }
                None => {
                    uses.push((blocker.id, 1));
                    1
                }
            };
            if used > StaticQuery::block_limit(blocker) {
                return Err(EngineError::declaration(format!(
                    "{} can't block that many creatures",
                    blocker.name()
                )));
            }
            pairs.push((blocker.id, attacker.id));
        }

        for &attacker in &state.combat.attackers {
            let Some(perm) = state.permanent(attacker) else {
                continue;
            };
            let blockers = pairs.iter().filter(|(_, a)| *a == attacker).count();
            if blockers == 1 && StaticQuery::has_keyword(state, perm, Keyword::Menace) {
                return Err(EngineError::declaration(format!(
                    "{} can't be blocked except by two or more creatures",
                    perm.name()
                )));
            }
        }

        if pairs.is_empty() {
            state.log_event(format!("{player} declares no blockers."));
            return Ok(());
        }

        for &(blocker, attacker) in &pairs {
            let attacker_name = state.require_permanent(attacker)?.name().to_string();
            let perm = state.require_permanent_mut(blocker)?;
            perm.blocking = true;
            perm.blocking_targets.push(attacker);
            let blocker_name = perm.name().to_string();
            state.combat.blocks.push((blocker, attacker));
            if !state.combat.blocked.contains(&attacker) {
                state.combat.blocked.push(attacker);
            }
            state.log_event(format!("{blocker_name} blocks {attacker_name}."));
        }
        for blocker in state.combat.blockers() {
            Triggers::fire(state, GameEvent::Blocked(blocker));
        }
        Ok(())
    }

    /// Whether the active player controls anything able to attack.
    #[must_use]
    pub fn has_possible_attackers(state: &GameState) -> bool {
        state.players[state.active_player]
            .battlefield
            .iter()
            .any(|p| Self::can_attack(state, p))
    }

    /// Whether the defender has a creature able to block some attacker.
    #[must_use]
    pub fn has_possible_blockers(state: &GameState) -> bool {
        let defender = state.defending_player();
        let attackers: Vec<&Permanent> = state
            .combat
            .attackers
            .iter()
            .filter_map(|id| state.permanent(*id))
            .collect();
        state.players[defender].battlefield.iter().any(|blocker| {
            attackers
                .iter()
                .any(|attacker| Self::check_block(state, blocker, attacker).is_ok())
        })
    }

    /// End of combat: everyone leaves combat.
    pub fn clear(state: &mut GameState) {
        for (_, board) in state.players.iter_mut() {
            for perm in &mut board.battlefield {
                perm.remove_from_combat();
            }
        }
        state.combat.clear();
    }
}
