//! Engine errors.
//!
//! Two classes:
//!
//! - **Illegal actions**: a request that breaks a rule. Validation happens
//!   before any mutation, so the state is untouched and the caller may retry
//!   with a corrected request.
//! - **Invariants**: programming errors (a reference that cannot be resolved,
//!   an effect in a slot it cannot resolve from). The match is aborted.

use super::step::Step;

/// Errors returned by engine operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("Game is not running")]
    NotRunning,
    #[error("Waiting for a player to answer a prompt")]
    InputPending,
    #[error("You do not have priority")]
    NotYourPriority,
    #[error("No such prompt is awaiting your answer")]
    WrongPrompt,
    #[error("Invalid {what} index: {index}")]
    InvalidIndex { what: &'static str, index: usize },
    #[error("Not enough mana: {0}")]
    InsufficientMana(String),
    #[error("Illegal target: {0}")]
    IllegalTarget(String),
    #[error("Can't do that during {step}: {reason}")]
    WrongTiming { step: Step, reason: String },
    #[error("Illegal declaration: {0}")]
    IllegalDeclaration(String),
    #[error("{0}")]
    Rejected(String),
    #[error("Engine invariant violated: {0}")]
    Invariant(String),
}

impl EngineError {
    /// True for rule violations by the caller, false for engine bugs.
    #[must_use]
    pub fn is_illegal_action(&self) -> bool {
        !matches!(self, EngineError::Invariant(_))
    }

    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        EngineError::Invariant(msg.into())
    }

    pub(crate) fn rejected(msg: impl Into<String>) -> Self {
        EngineError::Rejected(msg.into())
    }

    pub(crate) fn illegal_target(msg: impl Into<String>) -> Self {
        EngineError::IllegalTarget(msg.into())
    }

    pub(crate) fn declaration(msg: impl Into<String>) -> Self {
        EngineError::IllegalDeclaration(msg.into())
    }
}

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(EngineError::NotYourPriority.is_illegal_action());
        assert!(EngineError::illegal_target("gone").is_illegal_action());
        assert!(!EngineError::invariant("missing permanent").is_illegal_action());
    }

    #[test]
    fn test_messages() {
        let err = EngineError::InvalidIndex { what: "hand", index: 9 };
        assert_eq!(err.to_string(), "Invalid hand index: 9");

        let err = EngineError::WrongTiming {
            step: Step::Upkeep,
            reason: "sorcery speed".to_string(),
        };
        assert_eq!(err.to_string(), "Can't do that during Upkeep: sorcery speed");
    }
}
