//! Headless Hold'em simulator.
//!
//! Creates tables through the TableManager, seats bots at each one and plays
//! hands on every table concurrently through the actor handles.

mod bot;
mod config;
mod driver;

use anyhow::Error;
use ctrlc::set_handler;
use holdem_tables::table::TableManager;
use log::info;
use pico_args::Arguments;

use crate::config::SimConfig;

const HELP: &str = "\
Run bot games on several Hold'em tables at once

USAGE:
  holdem_sim [OPTIONS]

OPTIONS:
  --tables     N           Number of tables to run     [default: env SIM_TABLES or 2]
  --players    N           Bots seated per table       [default: env SIM_PLAYERS or 4]
  --hands      N           Hands to play per table     [default: env SIM_HANDS or 50]
  --seed       N           Seed for shuffles and bots  [default: env SIM_SEED or random]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  TABLE_SMALL_BLIND        Small blind (default 10)
  TABLE_BIG_BLIND          Big blind (default 20)
  TABLE_STARTING_CHIPS     Stack per bot (default 1000)
  RUST_LOG                 Log filter, e.g. info or holdem_tables=debug
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let config = SimConfig::from_env(
        pargs.opt_value_from_str("--tables")?,
        pargs.opt_value_from_str("--players")?,
        pargs.opt_value_from_str("--hands")?,
        pargs.opt_value_from_str("--seed")?,
    );
    config.validate()?;

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    env_logger::builder().format_target(false).init();
    info!(
        "Starting {} table(s) with {} bots each, blinds {}/{}",
        config.num_tables, config.players_per_table, config.small_blind, config.big_blind
    );

    let manager = TableManager::new();
    let mut table_ids = Vec::with_capacity(config.num_tables);
    for index in 0..config.num_tables {
        let table_id = manager.create_table(config.table_config(index)).await?;
        table_ids.push(table_id);
    }

    info!("Active tables:");
    for table in manager.list_tables().await {
        info!(
            "  - {} (ID: {}) - max {} players, blinds: {}/{}",
            table.name, table.id, table.max_players, table.small_blind, table.big_blind
        );
    }

    let mut drivers = Vec::with_capacity(table_ids.len());
    for (index, table_id) in table_ids.into_iter().enumerate() {
        let seed = config.seed.map(|seed| seed.wrapping_add(index as u64));
        drivers.push(tokio::spawn(driver::run_table(
            manager.clone(),
            table_id,
            config.players_per_table,
            config.hands_per_table,
            seed,
        )));
    }

    let expected_chips = config.starting_chips * config.players_per_table as u32;
    for driver in drivers {
        match driver.await? {
            Ok(summary) => {
                info!(
                    "Table {}: {} hands, {} updates, {} errors, chips {}/{}",
                    summary.table_id,
                    summary.hands_played,
                    summary.updates_received,
                    summary.errors_received,
                    summary.total_chips,
                    expected_chips
                );
                if let Some((nickname, chips)) = summary.chip_leader {
                    info!("Table {}: chip leader {} with {}", summary.table_id, nickname, chips);
                }
            }
            Err(e) => log::error!("Table driver failed: {e:#}"),
        }
    }

    info!(
        "Simulation finished, {} table(s) still open",
        manager.active_table_count().await
    );

    Ok(())
}
