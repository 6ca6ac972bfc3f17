use log::debug;
use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, f64::consts::FRAC_PI_2, sync::Arc};

use super::{CardState, Entity, Event, card::Card};
use crate::{
    board::{BoardView, Effect, EntityId, GameObject, Rect, RenderTarget, Transform, Vec2},
    fsm::{Next, StateMachine, StateMachineError, StateTable, TableConfigError},
};

/// Total angle the fan of cards spans, in radians.
pub const FAN_SPREAD: f64 = FRAC_PI_2;

/// Pivot height of the fan as a share of the card height.
const FAN_PIVOT: f64 = 0.9;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum HandState {
    Operational,
    /// Transient: taking the first card out of the hand.
    Playing,
    Empty,
}

#[derive(Debug)]
pub struct HandData {
    pub(crate) id: EntityId,
    pub(crate) name: String,
    pub(crate) cards: Vec<Card>,
    /// Cards played but not yet put on the board.
    pub(crate) played: VecDeque<Card>,
    /// Cards put on the board so far
    pub(crate) dealt: usize,
    pub(crate) position: Vec2,
    pub(crate) card_size: Vec2,
    pub(crate) hit_box: Rect,
}

impl HandData {
    fn refresh_hit_box(&mut self) {
        self.hit_box = Rect::centered(self.position, self.card_size);
    }
}

pub type HandTable = StateTable<HandState, Event, HandData>;
pub type HandMachine = StateMachine<HandState, Event, HandData>;

fn ready(_hand: &mut HandData) -> Next<Event> {
    Next::NoOp
}

fn play_first(hand: &mut HandData) -> Next<Event> {
    if !hand.cards.is_empty() {
        let mut card = hand.cards.remove(0);
        if let Err(err) = card.flip() {
            debug!("hand {} could not turn {} up: {err}", hand.id, card.name());
        }
        debug!("hand {} played {}", hand.id, card.name());
        hand.played.push_back(card);
    }
    if hand.cards.is_empty() {
        Next::Event(Event::Exhaust)
    } else {
        Next::Event(Event::Settle)
    }
}

fn emptied(hand: &mut HandData) -> Next<Event> {
    debug!("hand {} {} is empty", hand.id, hand.name);
    Next::NoOp
}

/// ```text
/// Operational --Play--> Playing --Settle--> Operational
///                       Playing --Exhaust-> Empty --Refill--> Operational
/// ```
pub fn hand_table() -> Result<HandTable, TableConfigError> {
    StateTable::builder(HandState::Operational)
        .entry(HandState::Operational, ready)
        .entry(HandState::Playing, play_first)
        .entry(HandState::Empty, emptied)
        .transition(HandState::Operational, Event::Play, HandState::Playing)
        .transition(HandState::Playing, Event::Settle, HandState::Operational)
        .transition(HandState::Playing, Event::Exhaust, HandState::Empty)
        .transition(HandState::Empty, Event::Refill, HandState::Operational)
        .build()
}

/// Placement of `count` cards fanned across [`FAN_SPREAD`], relative to
/// the hand's position. The first card leans furthest left.
#[must_use]
pub fn fan_layout(count: usize, card_size: Vec2) -> Vec<Transform> {
    if count == 0 {
        return Vec::new();
    }
    let increment = FAN_SPREAD / count as f64;
    let initial = -FAN_SPREAD / 2.0;
    let left = Vec2::new(0.0, card_size.y * FAN_PIVOT);
    let right = Vec2::new(card_size.x, card_size.y * FAN_PIVOT);

    (0..count)
        .map(|slot| {
            let angle = increment * slot as f64;
            Transform {
                position: right.lerp(left, angle / FAN_SPREAD),
                rotation: initial + angle,
            }
        })
        .collect()
}

/// A player's hand. Plays from the front.
#[derive(Debug)]
pub struct Hand {
    data: HandData,
    machine: HandMachine,
}

impl Hand {
    pub fn new(
        id: EntityId,
        name: &str,
        position: Vec2,
        cards: Vec<Card>,
        card_size: Vec2,
        table: Arc<HandTable>,
    ) -> Result<Self, TableConfigError> {
        let machine = if cards.is_empty() {
            StateMachine::starting_at(table, HandState::Empty)?
        } else {
            StateMachine::new(table)
        };
        let mut data = HandData {
            id,
            name: name.to_string(),
            cards,
            played: VecDeque::new(),
            dealt: 0,
            position,
            card_size,
            hit_box: Rect::default(),
        };
        data.refresh_hit_box();
        Ok(Self { data, machine })
    }

    #[must_use]
    pub fn with_cascade_limit(mut self, limit: usize) -> Self {
        self.machine = self.machine.with_cascade_limit(limit);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.data.name
    }

    #[must_use]
    pub fn state(&self) -> HandState {
        self.machine.current()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.cards.is_empty()
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.data.cards.iter()
    }

    /// Cards played through events and waiting to be put on the board.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.data.played.len()
    }

    /// Takes the first card out of the hand, face up.
    ///
    /// # Errors
    ///
    /// Rejected once the hand is `Empty`.
    pub fn play(&mut self) -> Result<Card, StateMachineError> {
        self.machine.send_event(Event::Play, &mut self.data)?;
        self.data
            .played
            .pop_back()
            .ok_or_else(|| StateMachineError::Rejected {
                state: format!("{:?}", self.machine.current()),
                event: format!("{:?}", Event::Play),
            })
    }

    pub fn add_card(&mut self, card: Card) {
        self.data.cards.push(card);
        self.refill();
    }

    fn refill(&mut self) {
        if self.machine.current() == HandState::Empty {
            if let Err(err) = self.machine.send_event(Event::Refill, &mut self.data) {
                debug!("hand {} failed to refill: {err}", self.data.id);
            }
        }
    }
}

impl GameObject for Hand {
    fn object_name(&self) -> &'static str {
        "Hand"
    }

    fn id(&self) -> EntityId {
        self.data.id
    }

    fn position(&self) -> Vec2 {
        self.data.position
    }

    fn hit_box(&self) -> Rect {
        self.data.hit_box
    }

    fn state_label(&self) -> String {
        format!("{:?}", self.machine.current())
    }

    /// Puts played cards on the board above the hand.
    fn update(&mut self, _dt: f64, _view: &BoardView) -> Vec<Effect> {
        self.data.refresh_hit_box();
        let lift = self.data.card_size.y * 1.5;
        let step = self.data.card_size.x;
        let mut effects = Vec::with_capacity(self.data.played.len());
        while let Some(mut card) = self.data.played.pop_front() {
            let offset = Vec2::new(step * self.data.dealt as f64, lift);
            card.move_to_position(self.data.position.add(offset));
            self.data.dealt += 1;
            effects.push(Effect::deal(self.data.id, card.into()));
        }
        effects
    }

    fn draw(&self, target: &dyn RenderTarget, draw_hit_box: bool) {
        let layout = fan_layout(self.data.cards.len(), self.data.card_size);
        for (card, slot) in self.data.cards.iter().zip(layout) {
            let transform = Transform {
                position: slot.position.add(self.data.position),
                rotation: slot.rotation,
            };
            target.draw_sprite(self.data.id, card.front(), transform);
        }
        if draw_hit_box {
            target.draw_outline(self.data.id, self.data.hit_box);
        }
    }

    fn move_to_position(&mut self, position: Vec2) {
        self.data.position = position;
        self.data.refresh_hit_box();
    }

    fn send_event(&mut self, event: Event) -> Result<(), StateMachineError> {
        self.machine.send_event(event, &mut self.data).map(|_| ())
    }

    /// A card that found no room on the board goes back to the front of
    /// the hand, face down again.
    fn take_back(&mut self, entity: Entity) -> Option<Entity> {
        match entity {
            Entity::Card(mut card) => {
                if card.state() == CardState::Up {
                    if let Err(err) = card.flip() {
                        debug!("hand {} could not turn {} down: {err}", self.data.id, card.name());
                    }
                }
                card.move_to_position(self.data.position);
                self.data.cards.insert(0, card);
                self.refill();
                None
            }
            other => Some(other),
        }
    }
}
