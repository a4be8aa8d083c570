//! Hand engine: cards, betting rounds, showdown and per-seat views.
//!
//! - [`hand::Hand`] runs a single hand from blinds to showdown
//! - [`table::Table`] keeps seats and stacks between hands
//! - [`events`] turns inbound events into outbound messages
//! - [`view`] redacts table state for each recipient

pub mod constants;
pub mod entities;
pub mod errors;
pub mod evaluator;
pub mod events;
pub mod hand;
pub mod seats;
pub mod table;
pub mod view;

pub use entities::{
    Action, Blinds, Card, Chips, Deck, Phase, PlayerId, Rank, SeatIndex, Winner,
};
pub use errors::EngineError;
pub use evaluator::{BestHandEvaluator, HandEvaluator, HandStrength};
pub use events::{
    Envelope, OutboundMessage, Outbox, Rejection, TableEvent, apply_event, apply_raw,
    decode_event,
};
pub use hand::Hand;
pub use table::{Table, TableId};
pub use view::{HandView, SeatView, TableView, project, project_all};
