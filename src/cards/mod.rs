//! Card system: characteristics, definitions, physical cards, permanents.
//!
//! ## Key Types
//!
//! - `CardDefinition`: Immutable template shared via `Arc`
//! - `Card`: One physical card (or token) with an owner
//! - `Permanent`: A card on the battlefield with its play state
//! - `CardRegistry`: Definition lookup by name
//! - `Color`, `CardType`, `Subtype`, `Keyword` and their small bitsets

pub mod card;
pub mod characteristics;
pub mod definition;
pub mod permanent;
pub mod registry;

pub use card::Card;
pub use characteristics::{CardType, Color, ColorSet, Keyword, KeywordSet, Subtype, Supertype};
pub use definition::{AbilityTiming, ActivatedAbility, CardDefinition, EffectSlot};
pub use permanent::Permanent;
pub use registry::CardRegistry;
