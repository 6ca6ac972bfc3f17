use log::{debug, warn};
use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, sync::Arc};

use super::{Entity, Event, card::Card};
use crate::{
    board::{
        BoardView, Effect, EntityId, GameObject, Rect, RenderTarget, SpriteFrame, Transform, Vec2,
    },
    fsm::{Next, StateMachine, StateMachineError, StateTable, TableConfigError},
};

/// Gap between a deck and the cards it deals onto the board.
pub const DEAL_GAP: f64 = 10.0;

/// Cards dealt side by side before a new row starts.
pub const DEAL_ROW: usize = 8;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum DeckState {
    Operational,
    /// Transient: taking the top card off the pile.
    Pulling,
    Empty,
}

#[derive(Debug)]
pub struct DeckData {
    pub(crate) id: EntityId,
    pub(crate) name: String,
    /// The pile; the top card is the last element.
    pub(crate) cards: Vec<Card>,
    /// Cards pulled but not yet handed out.
    pub(crate) pulled: VecDeque<Card>,
    /// Cards dealt onto the board so far
    pub(crate) dealt: usize,
    pub(crate) position: Vec2,
    pub(crate) size: Vec2,
    pub(crate) hit_box: Rect,
    pub(crate) back: SpriteFrame,
}

impl DeckData {
    fn refresh_hit_box(&mut self) {
        self.hit_box = Rect::centered(self.position, self.size);
    }
}

pub type DeckTable = StateTable<DeckState, Event, DeckData>;
pub type DeckMachine = StateMachine<DeckState, Event, DeckData>;

fn ready(_deck: &mut DeckData) -> Next<Event> {
    Next::NoOp
}

fn pull_top(deck: &mut DeckData) -> Next<Event> {
    if let Some(card) = deck.cards.pop() {
        debug!("deck {} pulled {}", deck.id, card.name());
        deck.pulled.push_back(card);
    }
    if deck.cards.is_empty() {
        Next::Event(Event::Exhaust)
    } else {
        Next::Event(Event::Settle)
    }
}

fn exhausted(deck: &mut DeckData) -> Next<Event> {
    debug!("deck {} {} is empty", deck.id, deck.name);
    Next::NoOp
}

/// ```text
/// Operational --Pull--> Pulling --Settle--> Operational
///                       Pulling --Exhaust-> Empty --Refill--> Operational
/// ```
pub fn deck_table() -> Result<DeckTable, TableConfigError> {
    StateTable::builder(DeckState::Operational)
        .entry(DeckState::Operational, ready)
        .entry(DeckState::Pulling, pull_top)
        .entry(DeckState::Empty, exhausted)
        .transition(DeckState::Operational, Event::Pull, DeckState::Pulling)
        .transition(DeckState::Pulling, Event::Settle, DeckState::Operational)
        .transition(DeckState::Pulling, Event::Exhaust, DeckState::Empty)
        .transition(DeckState::Empty, Event::Refill, DeckState::Operational)
        .build()
}

/// A face-down pile. Pulls take the most recently added card.
#[derive(Debug)]
pub struct Deck {
    data: DeckData,
    machine: DeckMachine,
}

impl Deck {
    /// A deck holding `cards`, bottom first. A deck built without cards
    /// starts out `Empty`.
    pub fn new(
        id: EntityId,
        name: &str,
        position: Vec2,
        cards: Vec<Card>,
        back: SpriteFrame,
        table: Arc<DeckTable>,
    ) -> Result<Self, TableConfigError> {
        let machine = if cards.is_empty() {
            StateMachine::starting_at(table, DeckState::Empty)?
        } else {
            StateMachine::new(table)
        };
        let mut data = DeckData {
            id,
            name: name.to_string(),
            cards,
            pulled: VecDeque::new(),
            dealt: 0,
            position,
            size: back.size(),
            hit_box: Rect::default(),
            back,
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
    pub fn state(&self) -> DeckState {
        self.machine.current()
    }

    /// Cards left in the pile.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.cards.is_empty()
    }

    /// The card the next pull returns.
    #[must_use]
    pub fn top(&self) -> Option<&Card> {
        self.data.cards.last()
    }

    /// Cards pulled through events and waiting to be dealt on the next
    /// update.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.data.pulled.len()
    }

    /// Takes the top card.
    ///
    /// # Errors
    ///
    /// Rejected once the deck is `Empty`; the deck is left unchanged.
    pub fn pull(&mut self) -> Result<Card, StateMachineError> {
        self.machine.send_event(Event::Pull, &mut self.data)?;
        self.data
            .pulled
            .pop_back()
            .ok_or_else(|| StateMachineError::Rejected {
                state: format!("{:?}", self.machine.current()),
                event: format!("{:?}", Event::Pull),
            })
    }

    /// Puts `card` on top of the pile, reviving an empty deck.
    pub fn add_card(&mut self, mut card: Card) {
        card.move_to_position(self.data.position);
        self.data.cards.push(card);
        if self.machine.current() == DeckState::Empty {
            if let Err(err) = self.machine.send_event(Event::Refill, &mut self.data) {
                warn!("deck {} failed to refill: {err}", self.data.id);
            }
        }
    }

    pub fn shuffle(&mut self) {
        self.shuffle_with(&mut rand::rng());
    }

    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.data.cards.shuffle(rng);
    }

    /// Where the deck's `nth` dealt card lands: left to right beside the
    /// deck, one row lower every [`DEAL_ROW`] cards.
    fn deal_position(&self, nth: usize) -> Vec2 {
        let column = (nth % DEAL_ROW) as f64 + 1.0;
        let row = (nth / DEAL_ROW) as f64;
        self.data.position.add(Vec2::new(
            (self.data.size.x + DEAL_GAP) * column,
            -(self.data.size.y + DEAL_GAP) * row,
        ))
    }
}

impl GameObject for Deck {
    fn object_name(&self) -> &'static str {
        "Deck"
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

    /// Deals cards pulled through events onto the board beside the deck.
    fn update(&mut self, _dt: f64, _view: &BoardView) -> Vec<Effect> {
        self.data.refresh_hit_box();
        let mut effects = Vec::with_capacity(self.data.pulled.len());
        while let Some(mut card) = self.data.pulled.pop_front() {
            card.move_to_position(self.deal_position(self.data.dealt));
            self.data.dealt += 1;
            effects.push(Effect::deal(self.data.id, card.into()));
        }
        effects
    }

    fn draw(&self, target: &dyn RenderTarget, draw_hit_box: bool) {
        if !self.data.cards.is_empty() {
            let transform = Transform::at(self.data.position);
            target.draw_sprite(self.data.id, &self.data.back, transform);
        }
        if draw_hit_box {
            target.draw_outline(self.data.id, self.data.hit_box);
        }
    }

    fn move_to_position(&mut self, position: Vec2) {
        self.data.position = position;
        self.data.refresh_hit_box();
        for card in &mut self.data.cards {
            card.move_to_position(position);
        }
    }

    fn send_event(&mut self, event: Event) -> Result<(), StateMachineError> {
        self.machine.send_event(event, &mut self.data).map(|_| ())
    }

    /// Cards go back on top of the pile.
    fn take_back(&mut self, entity: Entity) -> Option<Entity> {
        match entity {
            Entity::Card(card) => {
                self.add_card(card);
                None
            }
            other => Some(other),
        }
    }
}
