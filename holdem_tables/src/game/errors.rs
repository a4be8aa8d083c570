//! Errors raised by the hand engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::Phase;

/// Reasons the engine refuses an event.
///
/// Every variant except [`EngineError::DeckExhausted`] is a local rejection:
/// the table state is left exactly as it was before the event.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum EngineError {
    #[error("not your turn")]
    NotYourTurn,

    #[error("illegal action: {0}")]
    IllegalAction(String),

    #[error("betting round is not open")]
    RoundNotOpen,

    #[error("expected {expected} phase, table is in {actual}")]
    WrongPhase { expected: Phase, actual: Phase },

    #[error("not enough active players with chips to continue")]
    InsufficientPlayers,

    #[error("deck exhausted")]
    DeckExhausted,

    #[error("not seated at this table")]
    NotAtTable,

    #[error("table is full")]
    TableFull,
}

impl EngineError {
    pub fn illegal(reason: impl Into<String>) -> Self {
        Self::IllegalAction(reason.into())
    }
}
