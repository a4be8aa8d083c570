//! Inbound table events and the outbox of messages they produce.

use serde::{Deserialize, Serialize};

use super::{
    entities::{Action, ActionPayload, PlayerId},
    errors::EngineError,
    table::Table,
    view::{TableView, project_all},
};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableEvent {
    /// Reset every stack and deal the first hand of a new game.
    StartTable { player_id: PlayerId },
    PlayerJoined { player_id: PlayerId, nickname: String },
    PlayerAction { player_id: PlayerId, action: Action },
    RequestNextHand { player_id: PlayerId },
    PlayerDisconnected { player_id: PlayerId },
}

impl TableEvent {
    /// The player the event came from. Rejections are sent back to them.
    pub fn player_id(&self) -> &PlayerId {
        match self {
            Self::StartTable { player_id }
            | Self::PlayerJoined { player_id, .. }
            | Self::PlayerAction { player_id, .. }
            | Self::RequestNextHand { player_id }
            | Self::PlayerDisconnected { player_id } => player_id,
        }
    }
}

/// Same shape as [`TableEvent`] but with the action left untyped, so a bad
/// amount can be told apart from garbage.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
enum WireEvent {
    StartTable { player_id: PlayerId },
    PlayerJoined { player_id: PlayerId, nickname: String },
    PlayerAction { player_id: PlayerId, action: ActionPayload },
    RequestNextHand { player_id: PlayerId },
    PlayerDisconnected { player_id: PlayerId },
}

/// A well-formed event that is refused before it reaches the table.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Rejection {
    pub player_id: PlayerId,
    pub error: EngineError,
}

impl TryFrom<WireEvent> for TableEvent {
    type Error = Rejection;

    fn try_from(wire: WireEvent) -> Result<Self, Self::Error> {
        Ok(match wire {
            WireEvent::StartTable { player_id } => Self::StartTable { player_id },
            WireEvent::PlayerJoined {
                player_id,
                nickname,
            } => Self::PlayerJoined {
                player_id,
                nickname,
            },
            WireEvent::PlayerAction { player_id, action } => match Action::try_from(action) {
                Ok(action) => Self::PlayerAction { player_id, action },
                Err(error) => return Err(Rejection { player_id, error }),
            },
            WireEvent::RequestNextHand { player_id } => Self::RequestNextHand { player_id },
            WireEvent::PlayerDisconnected { player_id } => Self::PlayerDisconnected { player_id },
        })
    }
}

/// Decode a JSON event. Unparseable input yields `None` and is dropped.
pub fn decode_event(raw: &str) -> Option<Result<TableEvent, Rejection>> {
    match serde_json::from_str::<WireEvent>(raw) {
        Ok(wire) => Some(TableEvent::try_from(wire)),
        Err(e) => {
            log::debug!("Dropping malformed event: {e}");
            None
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutboundMessage {
    GameStateUpdate(TableView),
    GameError(String),
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Envelope {
    pub recipient: PlayerId,
    pub message: OutboundMessage,
}

/// Messages to deliver once a table mutation is complete.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Outbox {
    pub envelopes: Vec<Envelope>,
}

impl Outbox {
    pub fn push(&mut self, recipient: PlayerId, message: OutboundMessage) {
        self.envelopes.push(Envelope { recipient, message });
    }

    pub fn is_empty(&self) -> bool {
        self.envelopes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.envelopes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Envelope> {
        self.envelopes.iter()
    }

    /// The state snapshot addressed to `recipient`, if any.
    pub fn view_for(&self, recipient: &PlayerId) -> Option<&TableView> {
        self.iter().find_map(|envelope| match &envelope.message {
            OutboundMessage::GameStateUpdate(view) if &envelope.recipient == recipient => {
                Some(view)
            }
            _ => None,
        })
    }

    /// Error texts addressed to `recipient`.
    pub fn errors_for(&self, recipient: &PlayerId) -> Vec<&str> {
        self.iter()
            .filter(|envelope| &envelope.recipient == recipient)
            .filter_map(|envelope| match &envelope.message {
                OutboundMessage::GameError(error) => Some(error.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl IntoIterator for Outbox {
    type Item = Envelope;
    type IntoIter = std::vec::IntoIter<Envelope>;

    fn into_iter(self) -> Self::IntoIter {
        self.envelopes.into_iter()
    }
}

/// Run one event against the table. Callers must serialize calls per table.
pub fn handle_event(table: &mut Table, event: TableEvent) -> Result<(), EngineError> {
    match event {
        TableEvent::StartTable { player_id } => {
            table.seat_of(&player_id).ok_or(EngineError::NotAtTable)?;
            table.start_table()
        }
        TableEvent::PlayerJoined {
            player_id,
            nickname,
        } => table.seat_player(player_id, &nickname).map(|_| ()),
        TableEvent::PlayerAction { player_id, action } => table.take_action(&player_id, action),
        TableEvent::RequestNextHand { player_id } => table.request_next_hand(&player_id),
        TableEvent::PlayerDisconnected { player_id } => table.disconnect(&player_id),
    }
}

/// Messages that follow the outcome of an event from `actor`.
///
/// A plain rejection goes to the actor alone. Anything that changed the table
/// sends a fresh view to every connected seat; a hand that could not start
/// or had to be aborted is also reported to all of them.
pub fn build_outbox(table: &Table, actor: &PlayerId, result: &Result<(), EngineError>) -> Outbox {
    let mut outbox = Outbox::default();
    match result {
        Ok(()) => broadcast(table, &mut outbox),
        Err(err @ (EngineError::InsufficientPlayers | EngineError::DeckExhausted)) => {
            broadcast(table, &mut outbox);
            for seat in table.seats().iter().filter(|seat| seat.connected) {
                outbox.push(
                    seat.player_id.clone(),
                    OutboundMessage::GameError(err.to_string()),
                );
            }
        }
        Err(err) => outbox.push(actor.clone(), OutboundMessage::GameError(err.to_string())),
    }
    outbox
}

/// Apply `event` and collect everything that has to be sent because of it.
pub fn apply_event(table: &mut Table, event: TableEvent) -> Outbox {
    let actor = event.player_id().clone();
    let result = handle_event(table, event);
    build_outbox(table, &actor, &result)
}

/// [`apply_event`] for raw JSON. Malformed input produces an empty outbox.
pub fn apply_raw(table: &mut Table, raw: &str) -> Outbox {
    match decode_event(raw) {
        None => Outbox::default(),
        Some(Ok(event)) => apply_event(table, event),
        Some(Err(rejection)) => {
            let mut outbox = Outbox::default();
            outbox.push(
                rejection.player_id,
                OutboundMessage::GameError(rejection.error.to_string()),
            );
            outbox
        }
    }
}

fn broadcast(table: &Table, outbox: &mut Outbox) {
    for (recipient, view) in project_all(table) {
        outbox.push(recipient, OutboundMessage::GameStateUpdate(view));
    }
}
