//! Table actor message types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use crate::game::{
    entities::{Chips, Phase, PlayerId},
    errors::EngineError,
    events::{OutboundMessage, TableEvent},
    table::TableId,
    view::TableView,
};

/// Messages that can be sent to a TableActor
#[derive(Debug)]
pub enum TableMessage {
    /// Apply a decoded table event
    Event {
        event: TableEvent,
        response: oneshot::Sender<TableResponse>,
    },

    /// Decode and apply a JSON event
    Raw {
        payload: String,
        response: oneshot::Sender<TableResponse>,
    },

    /// Get the redacted view for one seated player
    GetView {
        player_id: PlayerId,
        response: oneshot::Sender<Option<TableView>>,
    },

    /// Get a summary of the table
    GetState {
        response: oneshot::Sender<TableStateResponse>,
    },

    /// Route a player's outbound messages to `sender`
    Subscribe {
        player_id: PlayerId,
        sender: mpsc::Sender<OutboundMessage>,
    },

    /// Stop routing a player's outbound messages
    Unsubscribe { player_id: PlayerId },

    /// Close table
    Close {
        response: oneshot::Sender<TableResponse>,
    },
}

/// Response from table operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableResponse {
    /// Operation succeeded
    Success,

    /// Input could not be decoded and was dropped
    Ignored,

    /// Operation failed
    Error(String),

    /// Table is full
    TableFull,

    /// Not your turn
    NotYourTurn,

    /// Invalid action for current game state
    InvalidAction(String),

    /// Player not at table
    NotAtTable,

    /// Not enough funded players to deal
    GameOver,
}

impl From<EngineError> for TableResponse {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::NotYourTurn => Self::NotYourTurn,
            EngineError::IllegalAction(reason) => Self::InvalidAction(reason),
            EngineError::NotAtTable => Self::NotAtTable,
            EngineError::TableFull => Self::TableFull,
            EngineError::InsufficientPlayers => Self::GameOver,
            other => Self::Error(other.to_string()),
        }
    }
}

impl From<Result<(), EngineError>> for TableResponse {
    fn from(result: Result<(), EngineError>) -> Self {
        match result {
            Ok(()) => Self::Success,
            Err(err) => err.into(),
        }
    }
}

impl TableResponse {
    /// Check if response is success
    pub fn is_success(&self) -> bool {
        matches!(self, TableResponse::Success)
    }

    /// Get error message if response is error
    pub fn error_message(&self) -> Option<String> {
        match self {
            TableResponse::Error(msg) => Some(msg.clone()),
            TableResponse::TableFull => Some("Table is full".to_string()),
            TableResponse::NotYourTurn => Some("Not your turn".to_string()),
            TableResponse::InvalidAction(msg) => Some(format!("Invalid action: {}", msg)),
            TableResponse::NotAtTable => Some("Not at table".to_string()),
            TableResponse::GameOver => Some("Not enough players to continue".to_string()),
            TableResponse::Success | TableResponse::Ignored => None,
        }
    }
}

/// Table state response
#[derive(Debug, Clone, Serialize)]
pub struct TableStateResponse {
    /// Table ID
    pub table_id: TableId,

    /// Table name
    pub table_name: String,

    /// Seated players, connected or not
    pub player_count: usize,

    /// Maximum players
    pub max_players: usize,

    /// Small blind
    pub small_blind: Chips,

    /// Big blind
    pub big_blind: Chips,

    /// Current pot size
    pub pot_size: Chips,

    /// Current game phase
    pub phase: Phase,

    /// Hands dealt since the table was created
    pub hand_count: u64,

    /// Player nicknames at table
    pub players: Vec<String>,

    /// Every chip on the table, pot included
    pub total_chips: Chips,

    pub last_activity: DateTime<Utc>,
}
