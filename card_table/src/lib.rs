//! # Card Table
//!
//! Runtime core for a 2D tabletop card game: a bounded registry of board
//! objects, a generic finite state machine engine driving each object, a
//! keyed command queue, and a frame scheduler that fans updates and draws
//! out across a thread pool.
//!
//! ## Architecture
//!
//! Every frame runs three parallel phases, each joined before the next
//! begins:
//!
//! - **Commands**: deferred mutations queued by input handling
//! - **Update**: each object advances itself and proposes cross-object
//!   effects, applied single-threaded once the phase joins
//! - **Draw**: each object emits draw calls for the frame's final positions
//!
//! Objects never hold references to each other. Relations such as the
//! current selection are kept as [`board::EntityId`]s and looked up on use.
//!
//! ## Core Modules
//!
//! - [`fsm`]: state tables, entry actions and the machine itself
//! - [`board`]: registry, capability contract, effects and scheduler
//! - [`objects`]: cards, decks, hands and the factory that builds them
//! - [`commands`]: the command queue and the board commands
//! - [`control`]: single-slot control channel for an external console
//! - [`input`]: input events to commands
//! - [`table`]: the frame driver tying it all together
//!
//! ## Example
//!
//! ```
//! use card_table::{
//!     board::{BoardConfig, DrawList, Vec2},
//!     input::InputEvent,
//!     objects::{AtlasAsset, Blueprint, ObjectFactory, Placement},
//!     table::Table,
//! };
//! use std::sync::Arc;
//!
//! let factory = ObjectFactory::new(Arc::new(AtlasAsset::standard())).unwrap();
//! let (mut table, _control) = Table::new(&BoardConfig::default(), factory).unwrap();
//! table
//!     .populate(&[Placement {
//!         blueprint: Blueprint::card("zombies"),
//!         position: Vec2::new(50.0, 50.0),
//!     }])
//!     .unwrap();
//!
//! // Clicking the card flips it face up on the next frame.
//! table.handle_input(InputEvent::SelectAt { position: Vec2::new(50.0, 50.0) });
//! let report = table.tick(1.0 / 60.0, &DrawList::new());
//! assert_eq!(report.commands.len(), 1);
//! ```

/// Generic finite state machine engine.
pub mod fsm;
pub use fsm::{Next, StateMachine, StateMachineError, StateTable, TableConfigError};

/// Entity registry, capability contract and frame phases.
pub mod board;
pub use board::{Board, BoardConfig, EntityId, GameObject, Rect, Registry, Vec2};

/// Card, deck and hand behaviour.
pub mod objects;
pub use objects::{Entity, Event, ObjectFactory};

/// Deferred board mutations.
pub mod commands;
pub use commands::{Command, CommandOutcome, CommandQueue};

pub mod control;
pub mod input;

/// The frame driver.
pub mod table;
pub use table::{FrameOutcome, Table};
