//! Boundary to the asset collaborator.
//!
//! The core never decodes images. It only needs to know which sheet a
//! named sprite lives on and which sub-rectangle it occupies.

use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, sync::Arc};

use crate::board::{Rect, SpriteFrame, Vec2};

/// Image name of the shared card back.
pub const CARD_BACK: &str = "card_back";

/// Card faces laid out on the standard sheet, in sheet order.
pub const STANDARD_CARDS: [&str; 31] = [
    "ham_radio",
    "trash",
    "slug",
    "survivor",
    "zombies",
    "more_zombies",
    "even_more_zombies",
    "ammo_box",
    "barricade",
    "bullet",
    "courage",
    "cunning",
    "decoy",
    "hide",
    "higher_ground",
    "hollow_points",
    "maverick",
    "molotov_cocktail",
    "quick_escape",
    "recon",
    "regroup",
    "reload",
    "restock",
    "sacrifice",
    "scavenger",
    "shotgun",
    "sidekick",
    "stick_together",
    "zombie_swarm",
    "tactics",
    "weapons_cache",
];

/// Frame size of a card on the standard sheet.
pub const STANDARD_CARD_SIZE: Vec2 = Vec2::new(70.0, 100.0);

const STANDARD_COLUMNS: usize = 8;

/// Pre-loaded sprite lookup handed to object factories.
pub trait ObjectAsset: fmt::Debug + Send + Sync {
    fn description(&self) -> &str;

    fn sheet(&self) -> &str;

    fn images(&self) -> &HashMap<String, Rect>;

    fn animations(&self) -> &HashMap<String, Vec<Rect>>;

    /// Frame of the image called `name`.
    fn image(&self, name: &str) -> Option<SpriteFrame> {
        self.images().get(name).map(|frame| SpriteFrame {
            sheet: Arc::from(self.sheet()),
            frame: *frame,
        })
    }
}

/// Atlas description: a sheet name plus named sub-rectangles.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct AtlasAsset {
    pub description: String,
    pub sheet: String,
    #[serde(default)]
    pub images: HashMap<String, Rect>,
    #[serde(default)]
    pub animations: HashMap<String, Vec<Rect>>,
}

impl AtlasAsset {
    #[must_use]
    pub fn new(description: &str, sheet: &str) -> Self {
        Self {
            description: description.to_string(),
            sheet: sheet.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_image(mut self, name: &str, frame: Rect) -> Self {
        self.images.insert(name.to_string(), frame);
        self
    }

    #[must_use]
    pub fn with_animation(mut self, name: &str, frames: Vec<Rect>) -> Self {
        self.animations.insert(name.to_string(), frames);
        self
    }

    /// Parses an atlas description from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The standard card sheet: every face in [`STANDARD_CARDS`] followed
    /// by [`CARD_BACK`], in rows of eight.
    #[must_use]
    pub fn standard() -> Self {
        STANDARD_CARDS
            .iter()
            .chain(std::iter::once(&CARD_BACK))
            .enumerate()
            .fold(Self::new("cards", "cards.png"), |atlas, (slot, name)| {
                let column = (slot % STANDARD_COLUMNS) as f64;
                let row = (slot / STANDARD_COLUMNS) as f64;
                let min = Vec2::new(column * STANDARD_CARD_SIZE.x, row * STANDARD_CARD_SIZE.y);
                atlas.with_image(name, Rect::new(min, min.add(STANDARD_CARD_SIZE)))
            })
    }
}

impl ObjectAsset for AtlasAsset {
    fn description(&self) -> &str {
        &self.description
    }

    fn sheet(&self) -> &str {
        &self.sheet
    }

    fn images(&self) -> &HashMap<String, Rect> {
        &self.images
    }

    fn animations(&self) -> &HashMap<String, Vec<Rect>> {
        &self.animations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_atlas_has_every_card_and_the_back() {
        let atlas = AtlasAsset::standard();
        assert_eq!(atlas.images().len(), STANDARD_CARDS.len() + 1);
        let back = atlas.image(CARD_BACK).unwrap();
        assert_eq!(back.size(), STANDARD_CARD_SIZE);
        assert_eq!(&*back.sheet, "cards.png");
        // Slot 31 sits in the last column of the fourth row.
        assert_eq!(back.frame.min, Vec2::new(7.0 * 70.0, 3.0 * 100.0));
    }

    #[test]
    fn test_atlas_from_json() {
        let json = r#"{
            "description": "cursor",
            "sheet": "cursor.png",
            "images": { "hand": { "min": { "x": 0, "y": 0 }, "max": { "x": 16, "y": 16 } } },
            "animations": {
                "press": [
                    { "min": { "x": 0, "y": 0 }, "max": { "x": 16, "y": 16 } },
                    { "min": { "x": 16, "y": 0 }, "max": { "x": 32, "y": 16 } }
                ]
            }
        }"#;

        let atlas = AtlasAsset::from_json(json).unwrap();

        assert_eq!(atlas.description(), "cursor");
        assert_eq!(atlas.image("hand").unwrap().size(), Vec2::new(16.0, 16.0));
        assert_eq!(atlas.animations()["press"].len(), 2);
        assert!(atlas.image("missing").is_none());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(AtlasAsset::from_json("{ \"sheet\": 3 }").is_err());
    }
}
