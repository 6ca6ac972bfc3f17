use log::{debug, info, warn};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{
    board::{
        Board, BoardConfig, BoardConfigError, EffectReport, EntityId, GameObject, PhaseReport,
        RenderTarget, Scheduler, apply_effects,
    },
    commands::{CommandQueue, ExecutionReport},
    control::{ControlReceiver, ControlSender, ControlTopic, control_channel},
    input::{InputEvent, InputMapper, Mapped},
    objects::{Blueprint, FactoryError, ObjectFactory, Placement},
};

/// Whether the loop should keep going.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FrameOutcome {
    Continue,
    /// A `stop` topic arrived; the frame did not run
    Stop,
}

/// Everything one frame did.
#[derive(Debug)]
pub struct FrameReport {
    /// Frame number, starting at 1
    pub frame: u64,
    pub outcome: FrameOutcome,
    pub topic: Option<ControlTopic>,
    pub commands: ExecutionReport,
    pub update: PhaseReport,
    pub effects: EffectReport,
    pub draw: PhaseReport,
}

impl FrameReport {
    fn stopped(frame: u64) -> Self {
        Self {
            frame,
            outcome: FrameOutcome::Stop,
            topic: Some(ControlTopic::Stop),
            commands: ExecutionReport::default(),
            update: PhaseReport::default(),
            effects: EffectReport::default(),
            draw: PhaseReport::default(),
        }
    }

    /// Tasks over budget across all phases.
    #[must_use]
    pub fn slow_tasks(&self) -> usize {
        self.commands.slow_tasks + self.update.slow_tasks + self.draw.slow_tasks
    }
}

/// Board, command queue, scheduler and control channel, driven one frame
/// at a time.
#[derive(Debug)]
pub struct Table {
    /// Locked by commands during their phase; accessed exclusively
    /// otherwise
    board: Mutex<Board>,

    queue: CommandQueue,

    scheduler: Scheduler,

    input: InputMapper,

    control: ControlReceiver,

    /// Outline hit boxes when drawing
    draw_hit_boxes: bool,

    /// Flipped by each `poke` topic
    poked: bool,

    frame: u64,
}

impl Table {
    /// Builds an empty table and the sender half of its control channel.
    ///
    /// # Errors
    ///
    /// Returns the validation error of an invalid `config`.
    pub fn new(
        config: &BoardConfig,
        factory: ObjectFactory,
    ) -> Result<(Self, ControlSender), BoardConfigError> {
        config.validate()?;
        let (sender, control) = control_channel();
        let factory = factory.with_cascade_limit(config.cascade_limit);
        let placing = Blueprint::card(crate::objects::STANDARD_CARDS[0]);

        let table = Self {
            board: Mutex::new(Board::with_config(config)),
            queue: CommandQueue::from(config),
            scheduler: Scheduler::from(config),
            input: InputMapper::new(factory, placing),
            control,
            draw_hit_boxes: false,
            poked: false,
            frame: 0,
        };
        Ok((table, sender))
    }

    /// Exclusive access between frames.
    pub fn board(&mut self) -> &mut Board {
        self.board.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    /// Shared access, for callers that only hold `&Table`.
    pub fn lock_board(&self) -> MutexGuard<'_, Board> {
        self.board.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    #[must_use]
    pub fn input(&self) -> &InputMapper {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputMapper {
        &mut self.input
    }

    #[must_use]
    pub fn draw_hit_boxes(&self) -> bool {
        self.draw_hit_boxes
    }

    pub fn set_draw_hit_boxes(&mut self, on: bool) {
        self.draw_hit_boxes = on;
    }

    #[must_use]
    pub fn poked(&self) -> bool {
        self.poked
    }

    /// Frames run so far.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Places a starting layout directly, outside the frame loop.
    /// Placements beyond the board's capacity are skipped.
    ///
    /// # Errors
    ///
    /// Fails on the first placement the factory cannot build; earlier
    /// placements stay on the board.
    pub fn populate(&mut self, layout: &[Placement]) -> Result<Vec<EntityId>, FactoryError> {
        let factory = self.input.factory().clone();
        let registry = &mut self.board().registry;
        let mut placed = Vec::with_capacity(layout.len());

        for placement in layout {
            if registry.is_full() {
                warn!("board full, skipping {:?}", placement.blueprint);
                continue;
            }
            let object = factory.build(&placement.blueprint, registry.ids(), placement.position)?;
            let id = object.id();
            if registry.append(object) {
                placed.push(id);
            }
        }

        info!("placed {} of {} objects", placed.len(), layout.len());
        Ok(placed)
    }

    /// Feeds one input event in: commands are queued for the next frame,
    /// the overlay toggle applies at once.
    pub fn handle_input(&mut self, event: InputEvent) {
        match self.input.translate(event) {
            Mapped::Command { key, command } => {
                self.queue.enqueue_boxed(key, command);
            }
            Mapped::ToggleHitBoxes => {
                self.draw_hit_boxes = !self.draw_hit_boxes;
                debug!("hit boxes {}", if self.draw_hit_boxes { "on" } else { "off" });
            }
        }
    }

    fn handle_topic(&mut self) -> Option<ControlTopic> {
        let topic = self.control.poll()?;
        match topic {
            ControlTopic::Test => debug!("control channel test"),
            ControlTopic::Poke => {
                self.poked = !self.poked;
                info!("poked: {}", self.poked);
            }
            ControlTopic::Stop => info!("stop requested"),
        }
        Some(topic)
    }

    /// Runs one frame of `dt` seconds, drawing onto `target`.
    pub fn tick(&mut self, dt: f64, target: &dyn RenderTarget) -> FrameReport {
        self.frame += 1;
        let frame = self.frame;

        let topic = self.handle_topic();
        if topic == Some(ControlTopic::Stop) {
            return FrameReport::stopped(frame);
        }

        let commands = self.queue.execute_all(&self.board);

        let board = self.board.get_mut().unwrap_or_else(PoisonError::into_inner);
        let (effects, update) = self.scheduler.update_all(&mut board.registry, dt);
        let effects = apply_effects(&mut board.registry, effects);
        let draw = self.scheduler.draw_all(&board.registry, target, self.draw_hit_boxes);

        if !effects.is_empty() {
            debug!(
                "frame {frame}: spawned {}, returned {}, dropped {}",
                effects.spawned.len(),
                effects.returned.len(),
                effects.dropped
            );
        }

        FrameReport {
            frame,
            outcome: FrameOutcome::Continue,
            topic,
            commands,
            update,
            effects,
            draw,
        }
    }
}
