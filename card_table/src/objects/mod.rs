//! Concrete board objects and the factory that builds them.
//!
//! Each kind keeps its state machine and the data the machine acts on as
//! sibling fields. Tables are built once per kind by [`ObjectFactory`] and
//! shared by every object of that kind.

pub mod assets;
pub mod card;
pub mod deck;
pub mod factory;
pub mod hand;

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use assets::{AtlasAsset, CARD_BACK, ObjectAsset, STANDARD_CARD_SIZE, STANDARD_CARDS};
pub use card::{Card, CardState, Face};
pub use deck::{Deck, DeckState};
pub use factory::{Blueprint, FactoryError, ObjectFactory, Placement};
pub use hand::{Hand, HandState, fan_layout};

use crate::{
    board::{BoardView, Effect, EntityId, GameObject, Rect, RenderTarget, Vec2},
    fsm::StateMachineError,
};

/// Every event any object kind understands. Each kind's table decides
/// which ones it accepts.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Event {
    Flip,
    Pull,
    Play,
    /// Chained: a transient state finished with cards left.
    Settle,
    /// Chained: a transient state took the last card.
    Exhaust,
    Refill,
}

impl Event {
    /// Whether accepting the event puts a card on the board.
    #[must_use]
    pub fn deals_card(self) -> bool {
        matches!(self, Self::Pull | Self::Play)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Any object that can sit on the board.
#[enum_dispatch(GameObject)]
#[derive(Debug)]
pub enum Entity {
    Card,
    Deck,
    Hand,
}

impl Entity {
    #[must_use]
    pub fn as_card(&self) -> Option<&Card> {
        match self {
            Self::Card(card) => Some(card),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_deck(&self) -> Option<&Deck> {
        match self {
            Self::Deck(deck) => Some(deck),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_hand(&self) -> Option<&Hand> {
        match self {
            Self::Hand(hand) => Some(hand),
            _ => None,
        }
    }
}

/// The standard atlas, for tests that need real sprite names.
#[cfg(test)]
pub(crate) fn test_assets() -> AtlasAsset {
    AtlasAsset::standard()
}
