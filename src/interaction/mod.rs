//! Player prompts and their answers.
//!
//! ## Key Types
//!
//! - `PendingInput`: The single open question, stored on `GameState::pending`
//! - `Answers`: Applies the answer verbs and resumes whatever was waiting

mod answer;
mod pending;

pub use answer::Answers;
pub use pending::{ChoicePurpose, ColorPurpose, DiscardReason, GraveyardPurpose, PendingInput};
