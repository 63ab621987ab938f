//! Triggered abilities.
//!
//! ## Key Components
//!
//! - [`GameEvent`]: Something that happened (entered, attacked, died, step began)
//! - [`PendingTrigger`]: An ability that triggered and has not reached the stack
//! - [`TriggerQueue`]: Fired, "may" and targeted triggers held on the `GameState`
//! - [`Triggers`]: Fire, flush in APNAP order, prompt for decisions
//!
//! Triggers come from card effect slots (`OnEnter`, `OnDeath`, `Upkeep`,
//! ...). There is no registration step: firing an event reads the slots of
//! the permanents it concerns.

mod event;
mod queue;

pub use event::GameEvent;
pub use queue::{PendingTrigger, TriggerQueue, Triggers};
