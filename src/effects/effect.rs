//! Effect definitions.
//!
//! Two closed vocabularies:
//!
//! - [`Effect`]: one-shot effects carried by spells, triggered and activated
//!   abilities. They resolve once, through [`EffectResolver`](super::EffectResolver).
//! - [`StaticEffect`]: continuous effects printed on permanents. They never
//!   resolve; the static query engine re-reads them on every query.
//!
//! Variants hold only the data their resolution needs. Adding a variant
//! forces a new arm in the exhaustive dispatch, so nothing can silently no-op.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::{CardType, Color, ColorSet, Keyword, KeywordSet, Subtype};
use crate::core::ManaColor;

/// A number that is either printed or equal to the X paid on casting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Amount {
    Fixed(i32),
    X,
}

impl Amount {
    /// Resolve against the X value of the stack entry.
    #[must_use]
    pub const fn value(self, x: i32) -> i32 {
        match self {
            Amount::Fixed(n) => n,
            Amount::X => x,
        }
    }
}

impl From<i32> for Amount {
    fn from(n: i32) -> Self {
        Amount::Fixed(n)
    }
}

/// A creature token to create.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSpec {
    pub name: String,
    pub power: i32,
    pub toughness: i32,
    pub color: Option<Color>,
    pub subtypes: SmallVec<[Subtype; 2]>,
    pub keywords: KeywordSet,
}

/// A one-shot effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    // === Damage ===

    /// Damage to the targeted creature, planeswalker or player.
    DealDamageToAnyTarget { amount: Amount },
    /// Damage to the targeted creature.
    DealDamageToTargetCreature { amount: Amount },
    /// Damage to the targeted player.
    DealDamageToTargetPlayer { amount: Amount },
    /// Damage to each of several targets, in target order.
    DealOrderedDamageToTargets { amounts: SmallVec<[i32; 3]> },
    /// Damage to every creature.
    DealDamageToAllCreatures { amount: Amount },
    /// Damage to every creature and every player.
    DealDamageToAllCreaturesAndPlayers { amount: Amount },
    /// Damage to every creature with flying and every player.
    DealDamageToFlyingAndPlayers { amount: Amount },
    /// Damage to the controller of the source.
    DealDamageToController { amount: Amount },
    /// Damage to any target, controller gains life.
    DealDamageToAnyTargetAndGainLife { amount: Amount, life: i32 },

    // === Life ===

    GainLife { amount: Amount },
    LoseLife { amount: Amount },
    TargetPlayerLosesLife { amount: Amount },
    /// Target player loses life and the controller gains the same amount.
    DrainTargetPlayer { amount: Amount },
    /// Gain one life per card in the controller's graveyard.
    GainLifePerGraveyardCard,
    GainLifeEqualToTargetToughness,
    DoubleTargetPlayerLife,
    TargetPlayerLosesGame,

    // === Creatures ===

    /// Until end of turn, on the source permanent.
    BoostSelf { power: i32, toughness: i32 },
    BoostTargetCreature { power: i32, toughness: i32 },
    BoostAllOwnCreatures { power: i32, toughness: i32 },
    GrantKeywordToTarget { keyword: Keyword },
    GrantKeywordToSelf { keyword: Keyword },
    MakeTargetUnblockable,
    TargetCreatureCantBlockThisTurn,
    TapTargetPermanent,
    UntapTargetPermanent,
    UntapSelf,
    PutPlusOneCountersOnSource { count: i32 },
    /// The source becomes a creature with the given P/T until end of turn.
    AnimateSelf { power: i32, toughness: i32 },
    RegenerateSource,
    RegenerateTarget,
    /// Attach the source equipment to the targeted creature.
    Equip,
    /// The source becomes a copy of the targeted creature.
    BecomeCopyOfTargetCreature,

    // === Removal ===

    DestroyTargetPermanent { no_regeneration: bool },
    DestroyAllCreatures { no_regeneration: bool },
    DestroyAllEnchantments,
    ExileTargetPermanent,
    ReturnTargetPermanentToHand,
    ReturnAllCreaturesToHand,
    PutTargetOnBottomOfLibrary,
    ReturnSelfToHand,
    SacrificeSelf,
    /// Target player sacrifices a creature of their choice.
    TargetPlayerSacrificesCreature,
    SacrificeTargetAtEndOfCombat,
    /// Destroy the source and every creature in combat with it.
    DestroyBlockedCreatureAndSelf,

    // === Cards and libraries ===

    DrawCards { amount: Amount },
    TargetPlayerDraws { amount: Amount },
    /// The controller discards, choosing each card.
    DiscardCards { amount: i32 },
    /// Look at target player's hand and choose a nonland card to discard.
    ChooseCardFromTargetHandToDiscard,
    MillTargetPlayer { amount: Amount },
    /// The spell is shuffled into its owner's library instead of the graveyard.
    ShuffleIntoLibrary,
    ShuffleGraveyardIntoLibrary,
    SearchLibraryForBasicLandToHand,
    /// Look at the top cards of the library and put them back in any order.
    ReorderTopCards { count: usize },

    // === Graveyards ===

    ReturnTargetCardFromGraveyardToHand,
    /// "You may return a creature card from your graveyard to the battlefield."
    ReturnCreatureFromGraveyardToBattlefield,
    ReturnArtifactFromGraveyardToHand,
    ExileTargetGraveyardCards,

    // === Stack ===

    CounterTargetSpell,
    CopyTargetSpell,

    // === Control ===

    /// Gain control, untap, haste until end of turn.
    GainControlOfTargetUntilEndOfTurn,

    // === Prevention ===

    PreventDamageToTarget { amount: i32 },
    PreventNextDamage { amount: i32 },
    PreventAllCombatDamage,
    /// The controller chooses a color; damage from sources of it is prevented this turn.
    PreventDamageFromChosenColor,
    RedirectUnblockedCombatDamageToSelf,

    // === Misc ===

    CreateTokens { count: u32, token: TokenSpec },
    ExtraTurn,
    AddMana { color: ManaColor, amount: u32 },
    /// The controller chooses a color for the source permanent.
    ChooseColorForSource,
    /// The controller may choose to apply the inner effect.
    May(Box<Effect>),
}

impl Effect {
    /// Damage to any target.
    pub fn damage(amount: i32) -> Self {
        Self::DealDamageToAnyTarget { amount: Amount::Fixed(amount) }
    }

    /// Damage to target creature.
    pub fn damage_creature(amount: i32) -> Self {
        Self::DealDamageToTargetCreature { amount: Amount::Fixed(amount) }
    }

    /// Draw cards.
    pub fn draw(amount: i32) -> Self {
        Self::DrawCards { amount: Amount::Fixed(amount) }
    }

    /// Gain life.
    pub fn gain_life(amount: i32) -> Self {
        Self::GainLife { amount: Amount::Fixed(amount) }
    }

    /// Destroy the targeted permanent.
    pub fn destroy() -> Self {
        Self::DestroyTargetPermanent { no_regeneration: false }
    }

    /// Temporary boost of the targeted creature.
    pub fn pump(power: i32, toughness: i32) -> Self {
        Self::BoostTargetCreature { power, toughness }
    }

    /// Add one mana.
    pub fn mana(color: ManaColor) -> Self {
        Self::AddMana { color, amount: 1 }
    }

    /// Wrap an effect so its controller may decline it.
    pub fn may(effect: Effect) -> Self {
        Self::May(Box::new(effect))
    }

    /// True for effects that only add mana.
    #[must_use]
    pub fn is_mana(&self) -> bool {
        matches!(self, Effect::AddMana { .. })
    }

    /// True if the effect is an optional wrapper.
    #[must_use]
    pub fn is_may(&self) -> bool {
        matches!(self, Effect::May(_))
    }
}

/// Who a granted keyword or boost applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrantScope {
    EnchantedCreature,
    EquippedCreature,
    OwnCreatures,
    OwnTappedCreatures,
}

/// Quantities a characteristic-defining ability can count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountOf {
    /// Creature cards in all graveyards.
    CreatureCardsInAllGraveyards,
    /// Lands of a subtype the controller controls.
    LandsYouControl(Subtype),
    /// Cards in the controller's hand.
    CardsInHand,
    /// Creatures the controller controls (including this one).
    CreaturesYouControl,
}

/// A continuous effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaticEffect {
    // === Boosts to other permanents ===

    /// Other creatures of a subtype get +N/+N and keywords.
    BoostCreaturesBySubtype { subtype: Subtype, power: i32, toughness: i32, keywords: KeywordSet },
    /// Other creatures you control get +N/+N.
    BoostOtherOwnCreatures { power: i32, toughness: i32 },
    BoostEnchantedCreature { power: i32, toughness: i32 },
    BoostEquippedCreature { power: i32, toughness: i32 },
    GrantKeyword { keyword: Keyword, scope: GrantScope },
    /// Other creatures of a color get +N/+N.
    BoostOtherCreaturesByColor { color: Color, power: i32, toughness: i32 },
    /// Creatures that are not of a color get +N/+N.
    BoostNonColorCreatures { color: Color, power: i32, toughness: i32 },
    /// Noncreature artifacts are creatures with P/T equal to their mana value.
    AnimateNoncreatureArtifacts,
    /// Enchanted creature has base power and toughness N/N.
    SetEnchantedCreatureBase { power: i32, toughness: i32 },

    // === Self ===

    /// Power and toughness are each equal to a count.
    PowerToughnessFromCount { count: CountOf },
    ProtectionFromColors { colors: ColorSet },
    ProtectionFromChosenColor,
    CantBeBlocked,
    CanOnlyBlockFlyers,
    CantBeBlockedBySubtype { subtype: Subtype },
    CanBlockAdditionalCreatures { count: u32 },
    MustAttack,

    // === Attached ===

    ControlEnchantedCreature,
    EnchantedCreatureDoesntUntap,
    EnchantedCreatureCantAttackOrBlock,

    // === Global ===

    /// Each creature attacking the controller costs {N} to attack with.
    AttackTax { amount: u32 },
    DoubleDamage,
    ControllerHasShroud,
    LimitSpellsPerTurn { max: u32 },
}

impl StaticEffect {
    /// Boost other creatures of a subtype.
    pub fn lord(subtype: Subtype, power: i32, toughness: i32) -> Self {
        Self::BoostCreaturesBySubtype {
            subtype,
            power,
            toughness,
            keywords: KeywordSet::empty(),
        }
    }

    /// Effects that only apply through an attachment.
    #[must_use]
    pub fn needs_attachment(&self) -> bool {
        matches!(
            self,
            StaticEffect::BoostEnchantedCreature { .. }
                | StaticEffect::BoostEquippedCreature { .. }
                | StaticEffect::SetEnchantedCreatureBase { .. }
                | StaticEffect::ControlEnchantedCreature
                | StaticEffect::EnchantedCreatureDoesntUntap
                | StaticEffect::EnchantedCreatureCantAttackOrBlock
                | StaticEffect::GrantKeyword {
                    scope: GrantScope::EnchantedCreature | GrantScope::EquippedCreature,
                    ..
                }
        )
    }
}

/// Type filter shorthand used by destroy-style effects and targeting.
pub type TypeList = SmallVec<[CardType; 2]>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount() {
        assert_eq!(Amount::Fixed(3).value(7), 3);
        assert_eq!(Amount::X.value(7), 7);
        assert_eq!(Amount::from(2), Amount::Fixed(2));
    }

    #[test]
    fn test_helpers() {
        assert_eq!(
            Effect::damage(3),
            Effect::DealDamageToAnyTarget { amount: Amount::Fixed(3) }
        );
        assert!(Effect::mana(ManaColor::Green).is_mana());
        assert!(!Effect::draw(1).is_mana());

        let may = Effect::may(Effect::gain_life(1));
        assert!(may.is_may());
        match may {
            Effect::May(inner) => assert_eq!(*inner, Effect::gain_life(1)),
            other => panic!("expected May, got {other:?}"),
        }
    }

    #[test]
    fn test_attachment_classification() {
        assert!(StaticEffect::ControlEnchantedCreature.needs_attachment());
        assert!(StaticEffect::GrantKeyword {
            keyword: Keyword::Flying,
            scope: GrantScope::EquippedCreature
        }
        .needs_attachment());
        assert!(!StaticEffect::lord(Subtype::Goblin, 1, 1).needs_attachment());
    }

    #[test]
    fn test_effect_serialization() {
        let effect = Effect::DealOrderedDamageToTargets { amounts: SmallVec::from_slice(&[3, 2]) };
        let json = serde_json::to_string(&effect).unwrap();
        let deserialized: Effect = serde_json::from_str(&json).unwrap();
        assert_eq!(effect, deserialized);
    }
}
