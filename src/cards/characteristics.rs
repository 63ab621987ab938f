//! Printed characteristics: colors, types, subtypes, keywords.
//!
//! Sets of colors and keywords are small bitsets so the static query engine
//! can union them cheaply on every query.

use serde::{Deserialize, Serialize};

use crate::core::ManaColor;

/// A card color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Blue,
    Black,
    Red,
    Green,
}

impl Color {
    pub const ALL: [Color; 5] = [Color::White, Color::Blue, Color::Black, Color::Red, Color::Green];

    /// The mana of this color.
    #[must_use]
    pub const fn mana(self) -> ManaColor {
        match self {
            Color::White => ManaColor::White,
            Color::Blue => ManaColor::Blue,
            Color::Black => ManaColor::Black,
            Color::Red => ManaColor::Red,
            Color::Green => ManaColor::Green,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Blue => "blue",
            Color::Black => "black",
            Color::Red => "red",
            Color::Green => "green",
        }
    }

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of colors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorSet(u8);

impl ColorSet {
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[must_use]
    pub fn of(colors: &[Color]) -> Self {
        colors.iter().fold(Self::empty(), |set, c| set.with(*c))
    }

    #[must_use]
    pub const fn with(self, color: Color) -> Self {
        Self(self.0 | color.bit())
    }

    pub fn insert(&mut self, color: Color) {
        self.0 |= color.bit();
    }

    #[must_use]
    pub const fn contains(self, color: Color) -> bool {
        self.0 & color.bit() != 0
    }

    /// True if the set contains the (possibly absent) color.
    #[must_use]
    pub fn contains_opt(self, color: Option<Color>) -> bool {
        color.map_or(false, |c| self.contains(c))
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Color> {
        Color::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

/// Card types. A card may have more than one (artifact creature).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    Land,
    Creature,
    Artifact,
    Enchantment,
    Planeswalker,
    Instant,
    Sorcery,
}

impl CardType {
    /// Types that become permanents when they resolve.
    #[must_use]
    pub const fn is_permanent(self) -> bool {
        !matches!(self, CardType::Instant | CardType::Sorcery)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            CardType::Land => "land",
            CardType::Creature => "creature",
            CardType::Artifact => "artifact",
            CardType::Enchantment => "enchantment",
            CardType::Planeswalker => "planeswalker",
            CardType::Instant => "instant",
            CardType::Sorcery => "sorcery",
        }
    }
}

/// Supertypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Supertype {
    Basic,
    Legendary,
}

/// Subtypes (creature types, land types, aura/equipment).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subtype {
    // Land types
    Plains,
    Island,
    Swamp,
    Mountain,
    Forest,
    // Enchantment / artifact types
    Aura,
    Equipment,
    // Creature types
    Angel,
    Beast,
    Bird,
    Dragon,
    Elf,
    Goblin,
    Human,
    Knight,
    Merfolk,
    Rat,
    Soldier,
    Spirit,
    Wall,
    Wizard,
    Zombie,
}

impl Subtype {
    #[must_use]
    pub const fn is_land_type(self) -> bool {
        matches!(
            self,
            Subtype::Plains | Subtype::Island | Subtype::Swamp | Subtype::Mountain | Subtype::Forest
        )
    }

    #[must_use]
    pub const fn is_creature_type(self) -> bool {
        !self.is_land_type() && !matches!(self, Subtype::Aura | Subtype::Equipment)
    }
}

/// Keyword abilities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keyword {
    Flying,
    Reach,
    FirstStrike,
    DoubleStrike,
    Trample,
    Vigilance,
    Haste,
    Defender,
    Lifelink,
    Fear,
    Menace,
    Shroud,
    Indestructible,
    Flash,
    Plainswalk,
    Islandwalk,
    Swampwalk,
    Mountainwalk,
    Forestwalk,
}

impl Keyword {
    pub const ALL: [Keyword; 19] = [
        Keyword::Flying,
        Keyword::Reach,
        Keyword::FirstStrike,
        Keyword::DoubleStrike,
        Keyword::Trample,
        Keyword::Vigilance,
        Keyword::Haste,
        Keyword::Defender,
        Keyword::Lifelink,
        Keyword::Fear,
        Keyword::Menace,
        Keyword::Shroud,
        Keyword::Indestructible,
        Keyword::Flash,
        Keyword::Plainswalk,
        Keyword::Islandwalk,
        Keyword::Swampwalk,
        Keyword::Mountainwalk,
        Keyword::Forestwalk,
    ];

    /// Land subtype a landwalk keyword refers to.
    #[must_use]
    pub const fn landwalk_subtype(self) -> Option<Subtype> {
        match self {
            Keyword::Plainswalk => Some(Subtype::Plains),
            Keyword::Islandwalk => Some(Subtype::Island),
            Keyword::Swampwalk => Some(Subtype::Swamp),
            Keyword::Mountainwalk => Some(Subtype::Mountain),
            Keyword::Forestwalk => Some(Subtype::Forest),
            _ => None,
        }
    }

    const fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

/// A set of keywords.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeywordSet(u32);

impl KeywordSet {
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[must_use]
    pub fn of(keywords: &[Keyword]) -> Self {
        keywords.iter().fold(Self::empty(), |set, k| set.with(*k))
    }

    #[must_use]
    pub const fn with(self, keyword: Keyword) -> Self {
        Self(self.0 | keyword.bit())
    }

    pub fn insert(&mut self, keyword: Keyword) {
        self.0 |= keyword.bit();
    }

    #[must_use]
    pub const fn contains(self, keyword: Keyword) -> bool {
        self.0 & keyword.bit() != 0
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Keyword> {
        Keyword::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}
