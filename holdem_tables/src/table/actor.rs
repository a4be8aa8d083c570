//! Table actor implementation with async message handling.

use std::collections::HashMap;
use tokio::sync::mpsc;

use super::{
    config::TableConfig,
    messages::{TableMessage, TableResponse, TableStateResponse},
};
use crate::game::{
    entities::PlayerId,
    events::{self, OutboundMessage, Outbox, TableEvent},
    table::{Table, TableId},
    view::{TableView, project},
};

/// Inbox capacity of every table actor
pub const INBOX_CAPACITY: usize = 100;

/// Table actor handle for sending messages
#[derive(Clone, Debug)]
pub struct TableHandle {
    sender: mpsc::Sender<TableMessage>,
    table_id: TableId,
}

impl TableHandle {
    /// Create a new table handle
    pub fn new(sender: mpsc::Sender<TableMessage>, table_id: TableId) -> Self {
        Self { sender, table_id }
    }

    /// Get table ID
    pub fn table_id(&self) -> &TableId {
        &self.table_id
    }

    /// Send a message to the table
    pub async fn send(&self, message: TableMessage) -> Result<(), String> {
        self.sender
            .send(message)
            .await
            .map_err(|_| "Table is closed".to_string())
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Table actor owning a single table. Messages are handled one at a time,
/// so every cascade an event triggers finishes before the next is read.
pub struct TableActor {
    table: Table,

    /// Message inbox
    inbox: mpsc::Receiver<TableMessage>,

    /// Outbound channels keyed by player
    subscribers: HashMap<PlayerId, mpsc::Sender<OutboundMessage>>,

    /// Is table closed
    is_closed: bool,
}

impl TableActor {
    /// Create a new table actor
    ///
    /// # Returns
    ///
    /// * `(TableActor, TableHandle)` - Actor and handle for sending messages
    pub fn new(config: TableConfig) -> (Self, TableHandle) {
        Self::with_table(Table::new(config))
    }

    /// Wrap an already built table, e.g. one with a custom evaluator.
    pub fn with_table(table: Table) -> (Self, TableHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);
        let handle = TableHandle::new(sender, table.id().clone());

        let actor = Self {
            table,
            inbox,
            subscribers: HashMap::new(),
            is_closed: false,
        };

        (actor, handle)
    }

    /// Run the table actor event loop
    pub async fn run(mut self) {
        log::info!(
            "Table {} '{}' starting",
            self.table.id(),
            self.table.config().name
        );

        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message);

            if self.is_closed {
                break;
            }
        }

        log::info!(
            "Table {} '{}' closed after {} hands",
            self.table.id(),
            self.table.config().name,
            self.table.hand_count()
        );
    }

    /// Handle a table message
    fn handle_message(&mut self, message: TableMessage) {
        match message {
            TableMessage::Event { event, response } => {
                let result = self.handle_event(event);
                let _ = response.send(result);
            }

            TableMessage::Raw { payload, response } => {
                let result = self.handle_raw(&payload);
                let _ = response.send(result);
            }

            TableMessage::GetView {
                player_id,
                response,
            } => {
                let _ = response.send(self.get_view(&player_id));
            }

            TableMessage::GetState { response } => {
                let _ = response.send(self.get_state());
            }

            TableMessage::Subscribe { player_id, sender } => {
                log::debug!(
                    "Player {} subscribed to table {}",
                    player_id,
                    self.table.id()
                );
                if let Some(view) = self.get_view(&player_id) {
                    let _ = sender.try_send(OutboundMessage::GameStateUpdate(view));
                }
                self.subscribers.insert(player_id, sender);
            }

            TableMessage::Unsubscribe { player_id } => {
                self.subscribers.remove(&player_id);
                log::debug!(
                    "Player {} unsubscribed from table {}",
                    player_id,
                    self.table.id()
                );
            }

            TableMessage::Close { response } => {
                self.is_closed = true;
                let _ = response.send(TableResponse::Success);
            }
        }
    }

    fn handle_event(&mut self, event: TableEvent) -> TableResponse {
        log::debug!("Table {}: {:?}", self.table.id(), event);
        let actor = event.player_id().clone();
        let result = events::handle_event(&mut self.table, event);
        if let Err(e) = &result {
            log::debug!("Table {}: {} rejected: {}", self.table.id(), actor, e);
        }
        let outbox = events::build_outbox(&self.table, &actor, &result);
        self.deliver(outbox);
        result.into()
    }

    fn handle_raw(&mut self, payload: &str) -> TableResponse {
        match events::decode_event(payload) {
            None => TableResponse::Ignored,
            Some(Ok(event)) => self.handle_event(event),
            Some(Err(rejection)) => {
                let result = Err(rejection.error);
                let outbox = events::build_outbox(&self.table, &rejection.player_id, &result);
                self.deliver(outbox);
                result.into()
            }
        }
    }

    /// Hand every envelope to its recipient's channel
    fn deliver(&mut self, outbox: Outbox) {
        for envelope in outbox {
            let Some(sender) = self.subscribers.get(&envelope.recipient) else {
                continue;
            };
            match sender.try_send(envelope.message) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!(
                        "Subscriber {} channel full, dropping update",
                        envelope.recipient
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("Subscriber {} disconnected, removing", envelope.recipient);
                    self.subscribers.remove(&envelope.recipient);
                }
            }
        }
    }

    fn get_view(&self, player_id: &PlayerId) -> Option<TableView> {
        self.table
            .seat_of(player_id)
            .map(|seat| project(&self.table, seat))
    }

    fn get_state(&self) -> TableStateResponse {
        let config = self.table.config();
        TableStateResponse {
            table_id: self.table.id().clone(),
            table_name: config.name.clone(),
            player_count: self.table.seats().len(),
            max_players: config.max_players,
            small_blind: config.small_blind,
            big_blind: config.big_blind,
            pot_size: self.table.hand().map_or(0, |hand| hand.pot),
            phase: self.table.phase(),
            hand_count: self.table.hand_count(),
            players: self
                .table
                .seats()
                .iter()
                .map(|seat| seat.nickname.clone())
                .collect(),
            total_chips: self.table.total_chips(),
            last_activity: self.table.last_activity(),
        }
    }
}
