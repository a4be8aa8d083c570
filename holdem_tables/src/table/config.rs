//! Table configuration models.

use serde::{Deserialize, Serialize};

use crate::game::{
    constants::{BIG_BLIND, DEFAULT_MAX_PLAYERS, MAX_PLAYERS, SMALL_BLIND, STARTING_CHIPS},
    entities::{Blinds, Chips},
};

/// Table configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Table name
    pub name: String,

    /// Maximum number of seats (default: 10)
    pub max_players: usize,

    /// Small blind amount
    pub small_blind: Chips,

    /// Big blind amount
    pub big_blind: Chips,

    /// Stack every seat receives when a game starts
    pub starting_chips: Chips,

    /// Fixed RNG seed for reproducible shuffles
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: "Default Table".to_string(),
            max_players: DEFAULT_MAX_PLAYERS,
            small_blind: SMALL_BLIND,
            big_blind: BIG_BLIND,
            starting_chips: STARTING_CHIPS,
            seed: None,
        }
    }
}

impl TableConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.small_blind == 0 {
            return Err("Small blind must be positive".to_string());
        }

        if self.big_blind <= self.small_blind {
            return Err("Big blind must be greater than small blind".to_string());
        }

        if self.max_players < 2 || self.max_players > MAX_PLAYERS {
            return Err(format!("Max players must be between 2 and {MAX_PLAYERS}"));
        }

        if self.starting_chips == 0 {
            return Err("Starting chips must be positive".to_string());
        }

        Ok(())
    }

    pub fn blinds(&self) -> Blinds {
        Blinds {
            small: self.small_blind,
            big: self.big_blind,
        }
    }
}
