//! Board configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use super::registry::DEFAULT_MAX_OBJECTS;
use crate::fsm::DEFAULT_CASCADE_LIMIT;

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardConfigError {
    #[error("Invalid board configuration for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Board limits and per-frame budgets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Maximum number of objects on the board (default: 400)
    pub capacity: usize,

    /// Time a single command, update or draw task may take before it is
    /// reported as slow (default: 8ms)
    pub task_budget: Duration,

    /// Chained transitions allowed within one state machine event
    pub cascade_limit: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_MAX_OBJECTS,
            task_budget: Duration::from_millis(8),
            cascade_limit: DEFAULT_CASCADE_LIMIT,
        }
    }
}

impl BoardConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), BoardConfigError> {
        if self.capacity == 0 {
            return Err(BoardConfigError::Invalid {
                field: "capacity",
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.task_budget.is_zero() {
            return Err(BoardConfigError::Invalid {
                field: "task_budget",
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.cascade_limit == 0 {
            return Err(BoardConfigError::Invalid {
                field: "cascade_limit",
                reason: "Must allow at least one transition".to_string(),
            });
        }

        Ok(())
    }
}
