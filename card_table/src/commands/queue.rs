use log::{debug, warn};
use rayon::prelude::*;
use std::{
    collections::HashMap,
    fmt,
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

use super::{Command, CommandError, CommandOutcome};
use crate::board::{Board, BoardConfig, scheduler::run_timed};

/// Result of one [`CommandQueue::execute_all`] batch.
#[derive(Debug, Default)]
pub struct ExecutionReport {
    /// One entry per executed command, sorted by key
    pub results: Vec<(String, Result<CommandOutcome, CommandError>)>,
    /// Commands that ran over the per-task budget
    pub slow_tasks: usize,
    pub elapsed: Duration,
}

impl ExecutionReport {
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn outcome(&self, key: &str) -> Option<&Result<CommandOutcome, CommandError>> {
        self.results
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, result)| result)
    }
}

/// Pending commands keyed by a descriptive string.
///
/// Enqueuing under a key that is already pending replaces the earlier
/// command; it is never run.
pub struct CommandQueue {
    pending: Mutex<HashMap<String, Box<dyn Command>>>,
    task_budget: Duration,
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::from(&BoardConfig::default())
    }
}

impl From<&BoardConfig> for CommandQueue {
    fn from(config: &BoardConfig) -> Self {
        Self::new(config.task_budget)
    }
}

impl fmt::Debug for CommandQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandQueue")
            .field("pending", &self.len())
            .field("task_budget", &self.task_budget)
            .finish()
    }
}

impl CommandQueue {
    #[must_use]
    pub fn new(task_budget: Duration) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            task_budget,
        }
    }

    /// Queues `command` under `key`. Returns `true` when it replaced a
    /// pending command with the same key.
    pub fn enqueue(&self, key: impl Into<String>, command: impl Command + 'static) -> bool {
        self.enqueue_boxed(key.into(), Box::new(command))
    }

    pub fn enqueue_boxed(&self, key: String, command: Box<dyn Command>) -> bool {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let replaced = pending.insert(key, command).is_some();
        if replaced {
            debug!("replaced pending command");
        }
        replaced
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// Runs every pending command once, in parallel, and joins.
    ///
    /// The whole batch leaves the queue before any command starts, so a
    /// command enqueued while the batch runs waits for the next call.
    pub fn execute_all(&self, board: &Mutex<Board>) -> ExecutionReport {
        let started = Instant::now();
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let batch = std::mem::take(&mut *pending);
        drop(pending);
        if batch.is_empty() {
            return ExecutionReport::default();
        }
        let budget = self.task_budget;

        let mut ran: Vec<(String, Result<CommandOutcome, CommandError>, bool)> = batch
            .into_par_iter()
            .map(|(key, command)| {
                debug!("executing: {key}");
                let (result, slow) = run_timed(budget, "command", &key, || command.execute(board));
                if let Err(err) = &result {
                    warn!("command {key} failed: {err}");
                }
                (key, result, slow)
            })
            .collect();
        ran.sort_by(|a, b| a.0.cmp(&b.0));

        let slow_tasks = ran.iter().filter(|(_, _, slow)| *slow).count();
        ExecutionReport {
            results: ran.into_iter().map(|(key, result, _)| (key, result)).collect(),
            slow_tasks,
            elapsed: started.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        board::{EntityId, Vec2},
        commands::{Rejection, RemoveObjectAtPosition, lock_board},
    };
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    struct Counting {
        runs: Arc<AtomicUsize>,
    }

    impl Command for Counting {
        fn execute(self: Box<Self>, _board: &Mutex<Board>) -> Result<CommandOutcome, CommandError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(CommandOutcome::Added(EntityId(0)))
        }
    }

    #[test]
    fn test_each_command_runs_exactly_once() {
        let queue = CommandQueue::default();
        let board = Mutex::new(Board::default());
        let runs = Arc::new(AtomicUsize::new(0));
        for i in 0..20 {
            queue.enqueue(format!("count {i}"), Counting { runs: Arc::clone(&runs) });
        }

        let report = queue.execute_all(&board);
        let again = queue.execute_all(&board);

        assert_eq!(report.len(), 20);
        assert!(again.is_empty());
        assert!(queue.is_empty());
        assert_eq!(runs.load(Ordering::SeqCst), 20);
    }

    #[test]
    fn test_colliding_key_replaces_pending_command() {
        let queue = CommandQueue::default();
        let board = Mutex::new(Board::default());
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        assert!(!queue.enqueue("same", Counting { runs: Arc::clone(&first) }));
        assert!(queue.enqueue("same", Counting { runs: Arc::clone(&second) }));
        assert_eq!(queue.len(), 1);
        queue.execute_all(&board);

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_report_is_keyed_and_sorted() {
        let queue = CommandQueue::default();
        let board = Mutex::new(Board::default());
        queue.enqueue("b remove", RemoveObjectAtPosition::new(Vec2::ZERO));
        queue.enqueue("a count", Counting { runs: Arc::new(AtomicUsize::new(0)) });

        let report = queue.execute_all(&board);

        let keys: Vec<&str> = report.results.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, vec!["a count", "b remove"]);
        assert!(matches!(report.outcome("b remove"), Some(Err(CommandError::EmptyBoard { .. }))));
        assert!(report.outcome("missing").is_none());
        assert!(lock_board(&board).registry.is_empty());
    }

    #[test]
    fn test_rejections_are_outcomes() {
        let queue = CommandQueue::default();
        let board = Mutex::new(Board::default());
        queue.enqueue("move", crate::commands::MoveSelectedToPosition::new(Vec2::ZERO));

        let report = queue.execute_all(&board);

        assert!(matches!(
            report.outcome("move"),
            Some(Ok(CommandOutcome::Rejected(Rejection::NothingSelected)))
        ));
    }
}
