//! Table manager for spawning and managing multiple table actors.

use chrono::{DateTime, Utc};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tokio::sync::{RwLock, mpsc, oneshot};

use super::{
    actor::{TableActor, TableHandle},
    config::TableConfig,
    messages::{TableMessage, TableResponse, TableStateResponse},
};
use crate::game::{
    entities::{Chips, Phase, PlayerId},
    events::{OutboundMessage, TableEvent},
    table::{Table, TableId},
    view::TableView,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManagerError {
    #[error("table {0} not found")]
    TableNotFound(TableId),

    #[error("invalid table config: {0}")]
    InvalidConfig(String),

    #[error("table {0} is closed")]
    TableClosed(TableId),
}

/// Table metadata for discovery
#[derive(Debug, Clone)]
pub struct TableMetadata {
    pub id: TableId,
    pub name: String,
    pub player_count: usize,
    pub max_players: usize,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub phase: Phase,
    pub hand_count: u64,
    pub last_activity: DateTime<Utc>,
}

impl From<TableStateResponse> for TableMetadata {
    fn from(state: TableStateResponse) -> Self {
        Self {
            id: state.table_id,
            name: state.table_name,
            player_count: state.player_count,
            max_players: state.max_players,
            small_blind: state.small_blind,
            big_blind: state.big_blind,
            phase: state.phase,
            hand_count: state.hand_count,
            last_activity: state.last_activity,
        }
    }
}

/// Table manager for managing multiple table instances
#[derive(Clone, Default)]
pub struct TableManager {
    /// Active table handles
    tables: Arc<RwLock<HashMap<TableId, TableHandle>>>,
}

impl TableManager {
    /// Create a new table manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table and spawn its actor
    ///
    /// # Returns
    ///
    /// * `Result<TableId, ManagerError>` - Table ID or error
    pub async fn create_table(&self, config: TableConfig) -> Result<TableId, ManagerError> {
        self.spawn_table(Table::new(config)).await
    }

    /// Spawn an actor for an already built table
    pub async fn spawn_table(&self, table: Table) -> Result<TableId, ManagerError> {
        table
            .config()
            .validate()
            .map_err(ManagerError::InvalidConfig)?;

        let (actor, handle) = TableActor::with_table(table);
        let table_id = handle.table_id().clone();

        let mut tables = self.tables.write().await;
        tables.insert(table_id.clone(), handle);
        drop(tables);

        tokio::spawn(actor.run());

        log::info!("Created and spawned table {}", table_id);

        Ok(table_id)
    }

    /// Get a table handle
    pub async fn get_table(&self, table_id: &TableId) -> Option<TableHandle> {
        let tables = self.tables.read().await;
        tables.get(table_id).cloned()
    }

    /// List all open tables, most recently active first
    pub async fn list_tables(&self) -> Vec<TableMetadata> {
        let handles: Vec<TableHandle> = self.tables.read().await.values().cloned().collect();

        let mut metadata_list: Vec<TableMetadata> = Vec::with_capacity(handles.len());
        for handle in handles {
            match request(&handle, |response| TableMessage::GetState { response }).await {
                Ok(state) => metadata_list.push(state.into()),
                Err(e) => log::debug!("Skipping table in listing: {}", e),
            }
        }
        metadata_list.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));

        metadata_list
    }

    /// Close a table and forget its handle
    pub async fn close_table(&self, table_id: &TableId) -> Result<(), ManagerError> {
        let handle = self
            .tables
            .write()
            .await
            .remove(table_id)
            .ok_or_else(|| ManagerError::TableNotFound(table_id.clone()))?;

        // An actor that already stopped is as good as closed.
        if let Err(e) = request(&handle, |response| TableMessage::Close { response }).await {
            log::debug!("Close of table {}: {}", table_id, e);
        }

        log::info!("Closed table {}", table_id);

        Ok(())
    }

    /// Apply an event on a table
    pub async fn send_event(
        &self,
        table_id: &TableId,
        event: TableEvent,
    ) -> Result<TableResponse, ManagerError> {
        let handle = self.handle(table_id).await?;
        request(&handle, |response| TableMessage::Event { event, response }).await
    }

    /// Decode and apply a JSON event on a table
    pub async fn send_raw(
        &self,
        table_id: &TableId,
        payload: impl Into<String>,
    ) -> Result<TableResponse, ManagerError> {
        let handle = self.handle(table_id).await?;
        let payload = payload.into();
        request(&handle, |response| TableMessage::Raw { payload, response }).await
    }

    /// Receive a player's outbound messages on a fresh channel
    ///
    /// A seated player gets the current view straight away.
    pub async fn subscribe(
        &self,
        table_id: &TableId,
        player_id: PlayerId,
        capacity: usize,
    ) -> Result<mpsc::Receiver<OutboundMessage>, ManagerError> {
        let handle = self.handle(table_id).await?;
        let (sender, receiver) = mpsc::channel(capacity);
        handle
            .send(TableMessage::Subscribe { player_id, sender })
            .await
            .map_err(|_| ManagerError::TableClosed(table_id.clone()))?;
        Ok(receiver)
    }

    pub async fn unsubscribe(
        &self,
        table_id: &TableId,
        player_id: PlayerId,
    ) -> Result<(), ManagerError> {
        let handle = self.handle(table_id).await?;
        handle
            .send(TableMessage::Unsubscribe { player_id })
            .await
            .map_err(|_| ManagerError::TableClosed(table_id.clone()))
    }

    /// Get the view a seated player would receive
    pub async fn get_view(
        &self,
        table_id: &TableId,
        player_id: PlayerId,
    ) -> Result<Option<TableView>, ManagerError> {
        let handle = self.handle(table_id).await?;
        request(&handle, |response| TableMessage::GetView {
            player_id,
            response,
        })
        .await
    }

    /// Get table state
    pub async fn get_table_state(
        &self,
        table_id: &TableId,
    ) -> Result<TableStateResponse, ManagerError> {
        let handle = self.handle(table_id).await?;
        request(&handle, |response| TableMessage::GetState { response }).await
    }

    /// Get active table count
    pub async fn active_table_count(&self) -> usize {
        let tables = self.tables.read().await;
        tables.len()
    }

    async fn handle(&self, table_id: &TableId) -> Result<TableHandle, ManagerError> {
        self.get_table(table_id)
            .await
            .ok_or_else(|| ManagerError::TableNotFound(table_id.clone()))
    }
}

/// Send a message carrying a oneshot and wait for the actor's answer
async fn request<T>(
    handle: &TableHandle,
    message: impl FnOnce(oneshot::Sender<T>) -> TableMessage,
) -> Result<T, ManagerError> {
    let closed = || ManagerError::TableClosed(handle.table_id().clone());
    let (tx, rx) = oneshot::channel();
    handle.send(message(tx)).await.map_err(|_| closed())?;
    rx.await.map_err(|_| closed())
}
