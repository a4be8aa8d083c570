//! # Hold'em Tables
//!
//! A multiplayer Texas Hold'em hand engine with one async actor per table.
//!
//! A [`game::Table`] keeps seats and stacks between hands and owns at most
//! one [`game::Hand`]. Inbound [`game::TableEvent`]s are applied one at a time
//! and every change produces an [`game::Outbox`] holding a redacted
//! [`game::TableView`] per connected seat, or an error for the seat whose
//! event was refused.
//!
//! ## Core Modules
//!
//! - [`game`]: cards, hand evaluation, the betting state machine and views
//! - [`table`]: table actors, their messages and the table manager
//!
//! ## Example
//!
//! ```
//! use holdem_tables::game::{Action, Phase, Table, TableEvent, apply_event};
//! use holdem_tables::table::TableConfig;
//!
//! let mut table = Table::new(TableConfig::default());
//! for id in ["alice", "bob"] {
//!     apply_event(&mut table, TableEvent::PlayerJoined {
//!         player_id: id.into(),
//!         nickname: id.to_string(),
//!     });
//! }
//! apply_event(&mut table, TableEvent::StartTable { player_id: "alice".into() });
//! assert_eq!(table.phase(), Phase::Preflop);
//!
//! let outbox = apply_event(&mut table, TableEvent::PlayerAction {
//!     player_id: "alice".into(),
//!     action: Action::Fold,
//! });
//! assert_eq!(outbox.len(), 2);
//! assert_eq!(table.phase(), Phase::Showdown);
//! ```

/// Core game logic, entities, and the hand state machine.
pub mod game;

/// Table actors and the table manager.
pub mod table;

pub use game::{
    Action, Card, EngineError, Phase, PlayerId, Table, TableEvent, TableView, apply_event,
    apply_raw, constants,
};
pub use table::{TableConfig, TableManager};
