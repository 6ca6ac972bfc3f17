//! Per-frame update and draw fan-out.
//!
//! Each phase runs one task per object on the rayon pool and joins before
//! returning, so the phases of a frame never overlap:
//! commands → update → (apply effects) → draw.
//!
//! Update tasks get exclusive access to their own object and a shared,
//! immutable [`BoardView`] of the whole board. Cross-object changes come
//! back as [`Effect`]s for the single-threaded reducer.

use log::warn;
use rayon::prelude::*;
use std::time::{Duration, Instant};

use super::{
    config::BoardConfig,
    effects::Effect,
    identity::EntityId,
    object::GameObject,
    registry::Registry,
    render::RenderTarget,
};

/// Outcome of one fan-out phase.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PhaseReport {
    pub tasks: usize,
    /// Tasks that ran over the per-task budget
    pub slow_tasks: usize,
    pub elapsed: Duration,
}

/// Runs `task`, reporting whether it exceeded `budget`.
pub(crate) fn run_timed<R>(
    budget: Duration,
    phase: &str,
    subject: &dyn std::fmt::Display,
    task: impl FnOnce() -> R,
) -> (R, bool) {
    let started = Instant::now();
    let result = task();
    let took = started.elapsed();
    let slow = took > budget;
    if slow {
        warn!("{phase} of {subject} took {took:?} (budget {budget:?})");
    }
    (result, slow)
}

struct Subject<'a> {
    name: &'a str,
    id: EntityId,
}

impl std::fmt::Display for Subject<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.id)
    }
}

/// Fans update and draw calls out across the registry.
#[derive(Clone, Debug)]
pub struct Scheduler {
    task_budget: Duration,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::from(&BoardConfig::default())
    }
}

impl From<&BoardConfig> for Scheduler {
    fn from(config: &BoardConfig) -> Self {
        Self::new(config.task_budget)
    }
}

impl Scheduler {
    #[must_use]
    pub fn new(task_budget: Duration) -> Self {
        Self { task_budget }
    }

    #[must_use]
    pub fn task_budget(&self) -> Duration {
        self.task_budget
    }

    /// Updates every object in parallel and joins.
    ///
    /// Effects are returned in registry order, so the reducer applies them
    /// deterministically regardless of which task finished first.
    pub fn update_all<T>(&self, registry: &mut Registry<T>, dt: f64) -> (Vec<Effect>, PhaseReport)
    where
        T: GameObject + Send,
    {
        let started = Instant::now();
        let view = registry.view();
        let budget = self.task_budget;

        let results: Vec<(Vec<Effect>, bool)> = registry
            .as_mut_slice()
            .par_iter_mut()
            .map(|object| {
                let subject = Subject {
                    name: object.object_name(),
                    id: object.id(),
                };
                run_timed(budget, "update", &subject, || object.update(dt, &view))
            })
            .collect();

        let report = PhaseReport {
            tasks: results.len(),
            slow_tasks: results.iter().filter(|(_, slow)| *slow).count(),
            elapsed: started.elapsed(),
        };
        let effects = results.into_iter().flat_map(|(effects, _)| effects).collect();
        (effects, report)
    }

    /// Draws every object in parallel and joins.
    pub fn draw_all<T>(
        &self,
        registry: &Registry<T>,
        target: &dyn RenderTarget,
        draw_hit_boxes: bool,
    ) -> PhaseReport
    where
        T: GameObject + Sync,
    {
        let started = Instant::now();
        let budget = self.task_budget;

        let slow: Vec<bool> = registry
            .as_slice()
            .par_iter()
            .map(|object| {
                let subject = Subject {
                    name: object.object_name(),
                    id: object.id(),
                };
                run_timed(budget, "draw", &subject, || object.draw(target, draw_hit_boxes)).1
            })
            .collect();

        PhaseReport {
            tasks: slow.len(),
            slow_tasks: slow.iter().filter(|slow| **slow).count(),
            elapsed: started.elapsed(),
        }
    }
}
