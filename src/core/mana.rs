//! Mana: pools and costs.
//!
//! A `ManaPool` holds unsigned counters per mana color and is emptied at
//! every step boundary. A `ManaCost` is parsed from the usual brace notation
//! (`{2}{R}{R}`, `{X}{G}`).
//!
//! ```
//! use duel_engine::core::{ManaColor, ManaCost, ManaPool};
//!
//! let cost: ManaCost = "{1}{R}".parse().unwrap();
//! let mut pool = ManaPool::new();
//! pool.add(ManaColor::Red, 1);
//! pool.add(ManaColor::Green, 1);
//!
//! assert!(cost.can_pay(&pool, 0));
//! cost.pay(&mut pool, 0).unwrap();
//! assert_eq!(pool.total(), 0);
//! ```

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::error::{EngineError, Result};

/// A type of mana.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManaColor {
    White,
    Blue,
    Black,
    Red,
    Green,
    Colorless,
}

impl ManaColor {
    pub const ALL: [ManaColor; 6] = [
        ManaColor::White,
        ManaColor::Blue,
        ManaColor::Black,
        ManaColor::Red,
        ManaColor::Green,
        ManaColor::Colorless,
    ];

    /// Parse a single-letter mana symbol.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "W" => Some(ManaColor::White),
            "U" => Some(ManaColor::Blue),
            "B" => Some(ManaColor::Black),
            "R" => Some(ManaColor::Red),
            "G" => Some(ManaColor::Green),
            "C" => Some(ManaColor::Colorless),
            _ => None,
        }
    }

    /// Single-letter mana symbol.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            ManaColor::White => 'W',
            ManaColor::Blue => 'U',
            ManaColor::Black => 'B',
            ManaColor::Red => 'R',
            ManaColor::Green => 'G',
            ManaColor::Colorless => 'C',
        }
    }

    const fn slot(self) -> usize {
        match self {
            ManaColor::White => 0,
            ManaColor::Blue => 1,
            ManaColor::Black => 2,
            ManaColor::Red => 3,
            ManaColor::Green => 4,
            ManaColor::Colorless => 5,
        }
    }
}

/// Mana available to a player during the current step.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaPool {
    counts: [u32; 6],
}

impl ManaPool {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add mana of one color.
    pub fn add(&mut self, color: ManaColor, amount: u32) {
        self.counts[color.slot()] += amount;
    }

    /// Amount of one color.
    #[must_use]
    pub fn get(&self, color: ManaColor) -> u32 {
        self.counts[color.slot()]
    }

    /// Total mana of all colors.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Remove mana of one color. Fails without mutation if the pool holds less.
    pub fn remove(&mut self, color: ManaColor, amount: u32) -> Result<()> {
        let slot = &mut self.counts[color.slot()];
        if *slot < amount {
            return Err(EngineError::InsufficientMana(format!(
                "need {} {:?}, have {}",
                amount, color, slot
            )));
        }
        *slot -= amount;
        Ok(())
    }

    /// Pay generic mana, always taking from the largest remaining color.
    pub fn remove_generic(&mut self, amount: u32) -> Result<()> {
        if self.total() < amount {
            return Err(EngineError::InsufficientMana(format!(
                "need {} generic, have {}",
                amount,
                self.total()
            )));
        }
        for _ in 0..amount {
            let (slot, _) = self
                .counts
                .iter()
                .enumerate()
                .max_by_key(|(i, count)| (**count, std::cmp::Reverse(*i)))
                .ok_or_else(|| EngineError::invariant("mana pool has no slots"))?;
            self.counts[slot] -= 1;
        }
        Ok(())
    }

    /// Empty the pool.
    pub fn clear(&mut self) {
        self.counts = [0; 6];
    }

    /// Iterate over non-empty colors.
    pub fn iter(&self) -> impl Iterator<Item = (ManaColor, u32)> + '_ {
        ManaColor::ALL
            .into_iter()
            .map(|c| (c, self.get(c)))
            .filter(|(_, n)| *n > 0)
    }
}

/// A parsed mana cost.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaCost {
    generic: u32,
    colored: [u32; 6],
    has_x: bool,
}

impl ManaCost {
    /// A cost of nothing.
    #[must_use]
    pub fn free() -> Self {
        Self::default()
    }

    /// Converted mana value (X counts as zero).
    #[must_use]
    pub fn mana_value(&self) -> u32 {
        self.generic + self.colored.iter().sum::<u32>()
    }

    #[must_use]
    pub fn has_x(&self) -> bool {
        self.has_x
    }

    #[must_use]
    pub fn generic(&self) -> u32 {
        self.generic
    }

    /// Colored requirement for one color.
    #[must_use]
    pub fn colored(&self, color: ManaColor) -> u32 {
        self.colored[color.slot()]
    }

    /// Check the cost (plus `x` and any extra generic) against a pool.
    #[must_use]
    pub fn can_pay(&self, pool: &ManaPool, extra_generic: u32) -> bool {
        let colored_total: u32 = self.colored.iter().sum();
        ManaColor::ALL
            .iter()
            .all(|c| pool.get(*c) >= self.colored(*c))
            && pool.total() - colored_total >= self.generic + extra_generic
    }

    /// Pay the cost from a pool. Nothing is removed if the pool is short.
    pub fn pay(&self, pool: &mut ManaPool, extra_generic: u32) -> Result<()> {
        if !self.can_pay(pool, extra_generic) {
            return Err(EngineError::InsufficientMana(format!(
                "cost {} (+{}) with {} in pool",
                self,
                extra_generic,
                pool.total()
            )));
        }
        for color in ManaColor::ALL {
            pool.remove(color, self.colored(color))?;
        }
        pool.remove_generic(self.generic + extra_generic)
    }
}

impl FromStr for ManaCost {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let mut cost = ManaCost::default();
        let mut rest = s.trim();
        while !rest.is_empty() {
            let open = rest
                .strip_prefix('{')
                .ok_or_else(|| EngineError::invariant(format!("malformed mana cost '{s}'")))?;
            let close = open
                .find('}')
                .ok_or_else(|| EngineError::invariant(format!("unclosed mana symbol in '{s}'")))?;
            let symbol = &open[..close];
            rest = &open[close + 1..];

            if symbol == "X" {
                cost.has_x = true;
            } else if let Some(color) = ManaColor::from_code(symbol) {
                cost.colored[color.slot()] += 1;
            } else {
                let n: u32 = symbol.parse().map_err(|_| {
                    EngineError::invariant(format!("unknown mana symbol '{{{symbol}}}'"))
                })?;
                cost.generic += n;
            }
        }
        Ok(cost)
    }
}

impl std::fmt::Display for ManaCost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.has_x {
            f.write_str("{X}")?;
        }
        if self.generic > 0 || self.mana_value() == 0 && !self.has_x {
            write!(f, "{{{}}}", self.generic)?;
        }
        for color in ManaColor::ALL {
            for _ in 0..self.colored(color) {
                write!(f, "{{{}}}", color.code())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(entries: &[(ManaColor, u32)]) -> ManaPool {
        let mut p = ManaPool::new();
        for (c, n) in entries {
            p.add(*c, *n);
        }
        p
    }

    #[test]
    fn test_parse() {
        let cost: ManaCost = "{2}{R}{R}".parse().unwrap();
        assert_eq!(cost.generic(), 2);
        assert_eq!(cost.colored(ManaColor::Red), 2);
        assert_eq!(cost.mana_value(), 4);
        assert!(!cost.has_x());

        let x: ManaCost = "{X}{G}".parse().unwrap();
        assert!(x.has_x());
        assert_eq!(x.mana_value(), 1);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("{Q}".parse::<ManaCost>().is_err());
        assert!("{2".parse::<ManaCost>().is_err());
        assert!("R".parse::<ManaCost>().is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        for text in ["{2}{R}{R}", "{X}{G}", "{0}", "{W}{U}"] {
            let cost: ManaCost = text.parse().unwrap();
            assert_eq!(cost.to_string(), text);
        }
    }

    #[test]
    fn test_colored_requirement() {
        let cost: ManaCost = "{1}{R}".parse().unwrap();
        assert!(!cost.can_pay(&pool(&[(ManaColor::Green, 5)]), 0));
        assert!(cost.can_pay(&pool(&[(ManaColor::Green, 1), (ManaColor::Red, 1)]), 0));
    }

    #[test]
    fn test_generic_uses_largest_color() {
        let cost: ManaCost = "{2}".parse().unwrap();
        let mut p = pool(&[(ManaColor::Green, 3), (ManaColor::Red, 1)]);
        cost.pay(&mut p, 0).unwrap();
        assert_eq!(p.get(ManaColor::Green), 1);
        assert_eq!(p.get(ManaColor::Red), 1);
    }

    #[test]
    fn test_failed_payment_leaves_pool_untouched() {
        let cost: ManaCost = "{3}{B}".parse().unwrap();
        let mut p = pool(&[(ManaColor::Black, 1), (ManaColor::Red, 1)]);
        let before = p.clone();
        assert!(cost.pay(&mut p, 0).is_err());
        assert_eq!(p, before);
    }

    #[test]
    fn test_x_is_extra_generic() {
        let cost: ManaCost = "{X}{R}".parse().unwrap();
        let mut p = pool(&[(ManaColor::Red, 4)]);
        assert!(cost.can_pay(&p, 3));
        assert!(!cost.can_pay(&p, 4));
        cost.pay(&mut p, 3).unwrap();
        assert!(p.is_empty());
    }

    #[test]
    fn test_remove_never_goes_negative() {
        let mut p = pool(&[(ManaColor::Blue, 1)]);
        assert!(p.remove(ManaColor::Blue, 2).is_err());
        assert_eq!(p.get(ManaColor::Blue), 1);
    }
}
