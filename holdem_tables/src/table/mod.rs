//! Table module providing multi-table support with an async actor model.
//!
//! Each table runs in a separate Tokio task with an mpsc message inbox.
//! The TableManager spawns TableActor instances and keeps their handles for
//! discovery, event routing and shutdown.
//!
//! ## Example
//!
//! ```no_run
//! use holdem_tables::game::TableEvent;
//! use holdem_tables::table::{TableConfig, TableManager};
//!
//! #[tokio::main]
//! async fn main() {
//!     let manager = TableManager::new();
//!     let table_id = manager.create_table(TableConfig::default()).await.unwrap();
//!
//!     let join = TableEvent::PlayerJoined {
//!         player_id: "p1".into(),
//!         nickname: "Alice".to_string(),
//!     };
//!     let response = manager.send_event(&table_id, join).await.unwrap();
//!     assert!(response.is_success());
//! }
//! ```

pub mod actor;
pub mod config;
pub mod manager;
pub mod messages;

pub use actor::{TableActor, TableHandle};
pub use config::TableConfig;
pub use manager::{ManagerError, TableManager, TableMetadata};
pub use messages::{TableMessage, TableResponse, TableStateResponse};
