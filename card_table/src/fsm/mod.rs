//! Generic finite state machine engine.
//!
//! A [`StateTable`] maps `(state, event)` pairs to target states and binds an
//! entry [`Action`] to each state. A [`StateMachine`] walks a shared table on
//! behalf of one actor:
//! - one event at a time per machine (internally locked)
//! - entry actions may chain further events, cascading through several
//!   states within a single `send_event` call
//! - unknown `(state, event)` pairs are rejected without touching state
//!
//! Tables are validated when built, so a target state without an entry
//! action fails at setup instead of mid-frame.

pub mod errors;
pub mod machine;
pub mod table;

pub use errors::{StateMachineError, TableConfigError};
pub use machine::{Cursor, DEFAULT_CASCADE_LIMIT, StateMachine};
pub use table::{Action, Label, Next, StateTable, StateTableBuilder};
