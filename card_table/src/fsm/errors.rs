//! Error types for the state machine engine

use thiserror::Error;

/// Errors returned while driving a machine.
///
/// A rejection is the ordinary outcome of sending an event the current
/// state has no transition for; callers are expected to handle it.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum StateMachineError {
    /// No transition for `event` out of `state`
    #[error("event {event} rejected in state {state}")]
    Rejected { state: String, event: String },

    /// Chained transitions exceeded the machine's cascade limit
    #[error("event {event} cascaded through more than {limit} transitions")]
    CascadeLimit { event: String, limit: usize },
}

impl StateMachineError {
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Mistakes in a transition table, caught when the table is built.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum TableConfigError {
    /// The initial state has neither an entry action nor transitions
    #[error("initial state {0} is not declared in the table")]
    MissingInitial(String),

    /// A transition targets a state that has no entry action
    #[error("state {state} is a transition target but has no entry action")]
    MissingAction { state: String },

    /// A transition targets a state that was never declared
    #[error("transition {from} --{event}--> {to} targets an undeclared state")]
    UnknownTarget {
        from: String,
        event: String,
        to: String,
    },
}
