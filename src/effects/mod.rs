//! Effect system.
//!
//! - `Effect`: Closed set of one-shot effects (spells, triggers, abilities)
//! - `StaticEffect`: Closed set of continuous effects read by the static
//!   query engine
//! - `TargetRequirement` / `TargetFilter` / `TargetValidator`: What may be
//!   targeted, checked when cast and again on resolution
//! - `EffectResolver`: Applies effects to the game state, suspending when a
//!   player has to decide something
//!
//! ## Design Philosophy
//!
//! Effects are data. A card carries a list of them per slot; resolving is
//! one exhaustive `match` over the variant, so a new variant cannot be
//! added without saying what it does.

mod effect;
mod handlers;
mod resolver;
mod targeting;

pub use effect::{Amount, CountOf, Effect, GrantScope, StaticEffect, TokenSpec, TypeList};
pub use resolver::{EffectContext, EffectResolver, Flow, SuspendedResolution};
pub use targeting::{
    PlayerRelation, Target, TargetContext, TargetFilter, TargetKind, TargetRequirement, TargetValidator,
};
