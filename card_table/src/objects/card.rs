use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::Event;
use crate::{
    board::{
        BoardView, Effect, EntityId, GameObject, Rect, RenderTarget, SpriteFrame, Transform, Vec2,
    },
    fsm::{Next, StateMachine, StateMachineError, StateTable, TableConfigError},
};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum CardState {
    Down,
    Up,
}

/// Which side of the card is showing.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Face {
    Front,
    Back,
}

impl Face {
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }
}

/// Everything a card's state machine acts on.
#[derive(Debug)]
pub struct CardData {
    pub(crate) id: EntityId,
    pub(crate) name: String,
    pub(crate) face: Face,
    pub(crate) position: Vec2,
    pub(crate) hit_box: Rect,
    pub(crate) front: SpriteFrame,
    pub(crate) back: SpriteFrame,
    /// Seconds on the board
    pub(crate) age: f64,
}

impl CardData {
    fn refresh_hit_box(&mut self) {
        self.hit_box = Rect::centered(self.position, self.front.size());
    }
}

pub type CardTable = StateTable<CardState, Event, CardData>;
pub type CardMachine = StateMachine<CardState, Event, CardData>;

fn turn_over(card: &mut CardData) -> Next<Event> {
    card.face = card.face.flipped();
    debug!("card {} {} now shows {:?}", card.id, card.name, card.face);
    Next::NoOp
}

/// `Down --Flip--> Up --Flip--> Down`; entering either state turns the
/// card over.
pub fn card_table() -> Result<CardTable, TableConfigError> {
    StateTable::builder(CardState::Down)
        .entry(CardState::Down, turn_over)
        .entry(CardState::Up, turn_over)
        .transition(CardState::Down, Event::Flip, CardState::Up)
        .transition(CardState::Up, Event::Flip, CardState::Down)
        .build()
}

/// A single playing card. Starts face down.
#[derive(Debug)]
pub struct Card {
    data: CardData,
    machine: CardMachine,
}

impl Card {
    #[must_use]
    pub fn new(
        id: EntityId,
        name: &str,
        position: Vec2,
        front: SpriteFrame,
        back: SpriteFrame,
        table: Arc<CardTable>,
    ) -> Self {
        let mut data = CardData {
            id,
            name: name.to_string(),
            face: Face::Back,
            position,
            hit_box: Rect::default(),
            front,
            back,
            age: 0.0,
        };
        data.refresh_hit_box();
        Self {
            data,
            machine: StateMachine::new(table),
        }
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
    pub fn face(&self) -> Face {
        self.data.face
    }

    #[must_use]
    pub fn state(&self) -> CardState {
        self.machine.current()
    }

    #[must_use]
    pub fn previous_state(&self) -> CardState {
        self.machine.previous()
    }

    #[must_use]
    pub fn age(&self) -> f64 {
        self.data.age
    }

    #[must_use]
    pub fn front(&self) -> &SpriteFrame {
        &self.data.front
    }

    #[must_use]
    pub fn back(&self) -> &SpriteFrame {
        &self.data.back
    }

    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.data.front.size()
    }

    /// The sprite for the side currently showing.
    #[must_use]
    pub fn visible(&self) -> &SpriteFrame {
        match self.data.face {
            Face::Front => &self.data.front,
            Face::Back => &self.data.back,
        }
    }

    pub fn flip(&mut self) -> Result<CardState, StateMachineError> {
        self.machine.send_event(Event::Flip, &mut self.data)
    }
}

impl GameObject for Card {
    fn object_name(&self) -> &'static str {
        "Card"
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

    fn update(&mut self, dt: f64, _view: &BoardView) -> Vec<Effect> {
        self.data.age += dt;
        self.data.refresh_hit_box();
        Vec::new()
    }

    fn draw(&self, target: &dyn RenderTarget, draw_hit_box: bool) {
        target.draw_sprite(self.data.id, self.visible(), Transform::at(self.data.position));
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
}
