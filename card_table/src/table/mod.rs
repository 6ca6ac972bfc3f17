//! The frame driver.
//!
//! A [`Table`] owns the board and everything that touches it, and runs one
//! frame per [`Table::tick`]:
//!
//! 1. poll the control channel (never waits)
//! 2. execute queued commands in parallel, join
//! 3. update every object in parallel, join
//! 4. apply the effects the updates proposed, single-threaded
//! 5. draw every object in parallel, join
//!
//! ## Example
//!
//! ```
//! use card_table::{
//!     board::{BoardConfig, DrawList, Vec2},
//!     objects::{AtlasAsset, Blueprint, ObjectFactory, Placement},
//!     table::{FrameOutcome, Table},
//! };
//! use std::sync::Arc;
//!
//! let factory = ObjectFactory::new(Arc::new(AtlasAsset::standard())).unwrap();
//! let (mut table, _control) = Table::new(&BoardConfig::default(), factory).unwrap();
//! table
//!     .populate(&[Placement {
//!         blueprint: Blueprint::deck("draw", &["zombies", "bullet"]),
//!         position: Vec2::new(100.0, 100.0),
//!     }])
//!     .unwrap();
//!
//! let target = DrawList::new();
//! let report = table.tick(1.0 / 60.0, &target);
//! assert_eq!(report.outcome, FrameOutcome::Continue);
//! assert_eq!(target.len(), 1);
//! ```

pub mod driver;

pub use driver::{FrameOutcome, FrameReport, Table};
