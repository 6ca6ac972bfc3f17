//! Builds fully initialized objects from named assets.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use super::{
    Entity,
    assets::{CARD_BACK, ObjectAsset},
    card::{Card, CardTable, card_table},
    deck::{Deck, DeckTable, deck_table},
    hand::{Hand, HandTable, hand_table},
};
use crate::{
    board::{IdGenerator, SpriteFrame, Vec2},
    fsm::{DEFAULT_CASCADE_LIMIT, TableConfigError},
};

#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("no image named {0:?}")]
    MissingImage(String),

    #[error("invalid state table: {0}")]
    Table(#[from] TableConfigError),
}

/// A recipe for one object.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Blueprint {
    Card { name: String },
    /// `cards` are listed bottom first.
    Deck { name: String, cards: Vec<String> },
    Hand { name: String, cards: Vec<String> },
}

impl Blueprint {
    #[must_use]
    pub fn card(name: &str) -> Self {
        Self::Card {
            name: name.to_string(),
        }
    }

    #[must_use]
    pub fn deck(name: &str, cards: &[&str]) -> Self {
        Self::Deck {
            name: name.to_string(),
            cards: cards.iter().map(ToString::to_string).collect(),
        }
    }

    #[must_use]
    pub fn hand(name: &str, cards: &[&str]) -> Self {
        Self::Hand {
            name: name.to_string(),
            cards: cards.iter().map(ToString::to_string).collect(),
        }
    }
}

/// A blueprint and where to put it.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Placement {
    pub blueprint: Blueprint,
    pub position: Vec2,
}

impl Placement {
    /// Parses a table layout: a JSON array of placements.
    pub fn layout_from_json(json: &str) -> Result<Vec<Self>, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Owns the assets and the per-kind state tables every object of a kind
/// shares.
#[derive(Debug, Clone)]
pub struct ObjectFactory {
    assets: Arc<dyn ObjectAsset>,
    back: SpriteFrame,
    cards: Arc<CardTable>,
    decks: Arc<DeckTable>,
    hands: Arc<HandTable>,
    cascade_limit: usize,
}

impl ObjectFactory {
    /// Builds and validates every kind's state table.
    ///
    /// # Errors
    ///
    /// Fails when the assets have no [`CARD_BACK`] image or a table is
    /// malformed.
    pub fn new(assets: Arc<dyn ObjectAsset>) -> Result<Self, FactoryError> {
        let back = assets
            .image(CARD_BACK)
            .ok_or_else(|| FactoryError::MissingImage(CARD_BACK.to_string()))?;
        Ok(Self {
            assets,
            back,
            cards: Arc::new(card_table()?),
            decks: Arc::new(deck_table()?),
            hands: Arc::new(hand_table()?),
            cascade_limit: DEFAULT_CASCADE_LIMIT,
        })
    }

    #[must_use]
    pub fn with_cascade_limit(mut self, limit: usize) -> Self {
        self.cascade_limit = limit;
        self
    }

    #[must_use]
    pub fn assets(&self) -> &Arc<dyn ObjectAsset> {
        &self.assets
    }

    fn front(&self, name: &str) -> Result<SpriteFrame, FactoryError> {
        self.assets
            .image(name)
            .ok_or_else(|| FactoryError::MissingImage(name.to_string()))
    }

    /// Every sprite is resolved before any identity is drawn, so a failed
    /// build never consumes ids.
    fn fronts<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<SpriteFrame>, FactoryError> {
        names.iter().map(|name| self.front(name.as_ref())).collect()
    }

    fn assemble(
        &self,
        ids: &IdGenerator,
        names: &[impl AsRef<str>],
        fronts: Vec<SpriteFrame>,
        position: Vec2,
    ) -> Vec<Card> {
        names
            .iter()
            .zip(fronts)
            .map(|(name, front)| {
                Card::new(
                    ids.next_id(),
                    name.as_ref(),
                    position,
                    front,
                    self.back.clone(),
                    Arc::clone(&self.cards),
                )
                .with_cascade_limit(self.cascade_limit)
            })
            .collect()
    }

    /// A face-down card showing `name` on its front.
    pub fn card(
        &self,
        ids: &IdGenerator,
        position: Vec2,
        name: &str,
    ) -> Result<Card, FactoryError> {
        let front = self.front(name)?;
        Ok(Card::new(
            ids.next_id(),
            name,
            position,
            front,
            self.back.clone(),
            Arc::clone(&self.cards),
        )
        .with_cascade_limit(self.cascade_limit))
    }

    /// A deck holding one card per entry of `cards`, bottom first.
    pub fn deck<S: AsRef<str>>(
        &self,
        ids: &IdGenerator,
        position: Vec2,
        name: &str,
        cards: &[S],
    ) -> Result<Deck, FactoryError> {
        let fronts = self.fronts(cards)?;
        let id = ids.next_id();
        let cards = self.assemble(ids, cards, fronts, position);
        let deck = Deck::new(
            id,
            name,
            position,
            cards,
            self.back.clone(),
            Arc::clone(&self.decks),
        )?;
        Ok(deck.with_cascade_limit(self.cascade_limit))
    }

    /// A hand holding one card per entry of `cards`, first to be played
    /// first.
    pub fn hand<S: AsRef<str>>(
        &self,
        ids: &IdGenerator,
        position: Vec2,
        name: &str,
        cards: &[S],
    ) -> Result<Hand, FactoryError> {
        let fronts = self.fronts(cards)?;
        let id = ids.next_id();
        let cards = self.assemble(ids, cards, fronts, position);
        let hand = Hand::new(
            id,
            name,
            position,
            cards,
            self.back.size(),
            Arc::clone(&self.hands),
        )?;
        Ok(hand.with_cascade_limit(self.cascade_limit))
    }

    pub fn build(
        &self,
        blueprint: &Blueprint,
        ids: &IdGenerator,
        position: Vec2,
    ) -> Result<Entity, FactoryError> {
        Ok(match blueprint {
            Blueprint::Card { name } => self.card(ids, position, name)?.into(),
            Blueprint::Deck { name, cards } => self.deck(ids, position, name, cards)?.into(),
            Blueprint::Hand { name, cards } => self.hand(ids, position, name, cards)?.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        board::{EntityId, GameObject},
        objects::{AtlasAsset, test_assets},
    };

    fn factory() -> ObjectFactory {
        ObjectFactory::new(Arc::new(test_assets())).unwrap()
    }

    #[test]
    fn test_assets_without_card_back_are_rejected() {
        let assets = AtlasAsset::new("bare", "bare.png");
        let err = ObjectFactory::new(Arc::new(assets)).unwrap_err();
        assert!(matches!(err, FactoryError::MissingImage(name) if name == CARD_BACK));
    }

    #[test]
    fn test_deck_takes_its_id_before_its_cards() {
        let ids = IdGenerator::new();
        let deck = factory().deck(&ids, Vec2::ZERO, "draw", &["bullet", "zombies"]).unwrap();
        assert_eq!(deck.id(), EntityId(0));
        assert_eq!(deck.top().unwrap().id(), EntityId(2));
        assert_eq!(ids.peek(), EntityId(3));
    }

    #[test]
    fn test_unknown_card_consumes_no_ids() {
        let ids = IdGenerator::new();
        let factory = factory();

        assert!(matches!(
            factory.deck(&ids, Vec2::ZERO, "draw", &["bullet", "unicorn"]),
            Err(FactoryError::MissingImage(name)) if name == "unicorn"
        ));
        assert!(factory.card(&ids, Vec2::ZERO, "unicorn").is_err());
        assert_eq!(ids.peek(), EntityId(0));
    }

    #[test]
    fn test_build_follows_blueprint() {
        let ids = IdGenerator::new();
        let factory = factory();

        let card = factory.build(&Blueprint::card("bullet"), &ids, Vec2::ZERO).unwrap();
        let deck = factory
            .build(&Blueprint::deck("draw", &["bullet"]), &ids, Vec2::ZERO)
            .unwrap();
        let hand = factory
            .build(&Blueprint::hand("player", &["zombies"]), &ids, Vec2::ZERO)
            .unwrap();

        assert_eq!(card.object_name(), "Card");
        assert_eq!(deck.object_name(), "Deck");
        assert_eq!(hand.object_name(), "Hand");
    }

    #[test]
    fn test_layout_from_json() {
        let json = r#"[
            { "blueprint": { "kind": "deck", "name": "draw", "cards": ["bullet", "zombies"] },
              "position": { "x": 100, "y": 300 } },
            { "blueprint": { "kind": "card", "name": "ammo_box" },
              "position": { "x": 400, "y": 300 } }
        ]"#;

        let layout = Placement::layout_from_json(json).unwrap();

        assert_eq!(layout.len(), 2);
        assert_eq!(layout[0].blueprint, Blueprint::deck("draw", &["bullet", "zombies"]));
        assert_eq!(layout[1].position, Vec2::new(400.0, 300.0));
    }
}
