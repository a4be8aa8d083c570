//! Simulator configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use holdem_tables::{
    constants::{BIG_BLIND, MAX_PLAYERS, SMALL_BLIND, STARTING_CHIPS},
    game::Chips,
    table::TableConfig,
};

/// Complete simulator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of tables to run concurrently
    pub num_tables: usize,
    /// Bots seated at every table
    pub players_per_table: usize,
    /// Hands to play per table before closing it
    pub hands_per_table: u64,
    /// Small blind amount
    pub small_blind: Chips,
    /// Big blind amount
    pub big_blind: Chips,
    /// Stack each bot starts with
    pub starting_chips: Chips,
    /// Base seed; table `n` shuffles with `seed + n`
    pub seed: Option<u64>,
}

impl SimConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `tables_override` - Optional table count override (from CLI args)
    /// * `players_override` - Optional players per table override (from CLI args)
    /// * `hands_override` - Optional hands per table override (from CLI args)
    /// * `seed_override` - Optional seed override (from CLI args)
    pub fn from_env(
        tables_override: Option<usize>,
        players_override: Option<usize>,
        hands_override: Option<u64>,
        seed_override: Option<u64>,
    ) -> Self {
        SimConfig {
            num_tables: tables_override.unwrap_or_else(|| parse_env_or("SIM_TABLES", 2)),
            players_per_table: players_override.unwrap_or_else(|| parse_env_or("SIM_PLAYERS", 4)),
            hands_per_table: hands_override.unwrap_or_else(|| parse_env_or("SIM_HANDS", 50)),
            small_blind: parse_env_or("TABLE_SMALL_BLIND", SMALL_BLIND),
            big_blind: parse_env_or("TABLE_BIG_BLIND", BIG_BLIND),
            starting_chips: parse_env_or("TABLE_STARTING_CHIPS", STARTING_CHIPS),
            seed: seed_override.or_else(|| {
                std::env::var("SIM_SEED")
                    .ok()
                    .and_then(|v| v.parse().ok())
            }),
        }
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_tables == 0 {
            return Err(ConfigError::Invalid {
                var: "SIM_TABLES".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.players_per_table < 2 || self.players_per_table > MAX_PLAYERS {
            return Err(ConfigError::Invalid {
                var: "SIM_PLAYERS".to_string(),
                reason: format!("Must be between 2 and {MAX_PLAYERS}"),
            });
        }

        if self.hands_per_table == 0 {
            return Err(ConfigError::Invalid {
                var: "SIM_HANDS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.small_blind == 0 {
            return Err(ConfigError::Invalid {
                var: "TABLE_SMALL_BLIND".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.big_blind <= self.small_blind {
            return Err(ConfigError::Invalid {
                var: "TABLE_BIG_BLIND".to_string(),
                reason: format!("Must be greater than small blind ({})", self.small_blind),
            });
        }

        if self.starting_chips == 0 {
            return Err(ConfigError::Invalid {
                var: "TABLE_STARTING_CHIPS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Table settings for the `index`-th table
    pub fn table_config(&self, index: usize) -> TableConfig {
        TableConfig {
            name: format!("Table {}", index + 1),
            max_players: self.players_per_table,
            small_blind: self.small_blind,
            big_blind: self.big_blind,
            starting_chips: self.starting_chips,
            seed: self.seed.map(|seed| seed.wrapping_add(index as u64)),
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> SimConfig {
        SimConfig {
            num_tables: 2,
            players_per_table: 4,
            hands_per_table: 10,
            small_blind: 10,
            big_blind: 20,
            starting_chips: 1000,
            seed: Some(7),
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Invalid {
            var: "SIM_PLAYERS".to_string(),
            reason: "Must be between 2 and 23".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("SIM_PLAYERS"));
        assert!(msg.contains("between 2 and 23"));
    }

    #[test]
    fn test_overrides_win() {
        let config = SimConfig::from_env(Some(3), Some(6), Some(12), Some(99));
        assert_eq!(config.num_tables, 3);
        assert_eq!(config.players_per_table, 6);
        assert_eq!(config.hands_per_table, 12);
        assert_eq!(config.seed, Some(99));
    }

    #[test]
    fn test_config_validation_big_blind_too_small() {
        let config = SimConfig {
            small_blind: 20,
            big_blind: 10, // Invalid: less than small blind
            ..valid_config()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var, .. } if var == "TABLE_BIG_BLIND"));
    }

    #[test]
    fn test_config_validation_player_count() {
        let config = SimConfig {
            players_per_table: 1,
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_table_configs_get_distinct_seeds() {
        let config = valid_config();
        assert!(config.validate().is_ok());
        let first = config.table_config(0);
        let second = config.table_config(1);
        assert_eq!(first.name, "Table 1");
        assert_eq!(first.seed, Some(7));
        assert_eq!(second.seed, Some(8));
        assert!(second.validate().is_ok());
    }
}
