pub mod cache;
pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod errors;
pub mod history;
pub mod output;
pub mod pairing;
pub mod rating;
pub mod services;
pub mod stats;
pub mod storage;

use std::fs;
use std::io;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use log::info;

use crate::cache::JsonFileStore;
use crate::cli::{Cli, PickSide};
use crate::config::settings::AppConfig;
use crate::database::SqliteStore;
use crate::domain::ItemCatalog;
use crate::pairing::RngSource;
use crate::services::Session;
use crate::storage::{ExportDocument, PersistenceStore};

pub fn interpret() -> Cli {
    Cli::parse()
}

/// Defaults and environment, overridden by command line flags.
pub fn build_config(cli: &Cli) -> AppConfig {
    let mut config = AppConfig::new();
    if let Some(user) = &cli.user {
        config.storage.user = user.clone();
    }
    if let Some(data_dir) = &cli.data_dir {
        config.storage.data_dir = data_dir.clone();
    }
    if let Some(sqlite) = &cli.sqlite {
        config.storage.database_path = Some(sqlite.clone());
    }
    config
}

pub fn open_store(config: &AppConfig) -> Result<Box<dyn PersistenceStore>> {
    match &config.storage.database_path {
        Some(path) => {
            let path = path.to_str().context("Database path is not valid UTF-8")?;
            Ok(Box::new(SqliteStore::open(path)?))
        }
        None => Ok(Box::new(JsonFileStore::new(&config.storage.data_dir)?)),
    }
}

pub fn open_session(cli: &Cli) -> Result<Session> {
    let config = build_config(cli);
    let catalog = ItemCatalog::load(&cli.catalog)?;
    let store = open_store(&config)?;
    Session::open(&config, &catalog, store)
}

/// Run `action` on the session and print any persistence warnings it left.
fn with_session<F>(cli: &Cli, action: F) -> Result<()>
where
    F: FnOnce(&mut Session) -> Result<()>,
{
    let mut session = open_session(cli)?;
    let result = action(&mut session);
    output::print_warnings(&session.take_warnings());
    result
}

pub fn handle_next(cli: &Cli) -> Result<()> {
    with_session(cli, |session| {
        let mut rng = RngSource::from_entropy();
        match session.next_battle(&mut rng) {
            Some(battle) => {
                let label = |name: &str| {
                    session
                        .items()
                        .iter()
                        .find(|item| item.name == name)
                        .map_or_else(|| name.to_string(), |item| item.label())
                };
                output::print_battle(&battle, &label(&battle.left), &label(&battle.right));
            }
            None => output::print_exhausted(),
        }
        Ok(())
    })
}

pub fn handle_pick(cli: &Cli, side: PickSide) -> Result<()> {
    with_session(cli, |session| {
        let record = session.resolve(side.into())?;
        output::print_result(&record);
        Ok(())
    })
}

pub fn handle_simulate(cli: &Cli, count: usize, seed: Option<u64>) -> Result<()> {
    with_session(cli, |session| {
        let mut rng = match seed {
            Some(seed) => RngSource::seeded(seed),
            None => RngSource::from_entropy(),
        };
        let report = session.simulate(count, &mut rng);
        output::print_simulation(&report);
        Ok(())
    })
}

pub fn handle_ranking(cli: &Cli, limit: Option<usize>) -> Result<()> {
    with_session(cli, |session| {
        let rows = session.ranking();
        let shown = limit.unwrap_or(rows.len()).min(rows.len());
        output::print_ranking(&rows[..shown]);
        Ok(())
    })
}

pub fn handle_history(cli: &Cli, limit: usize) -> Result<()> {
    with_session(cli, |session| {
        output::print_history(session.ledger().entries(), limit);
        Ok(())
    })
}

pub fn handle_delete(cli: &Cli, index: usize) -> Result<()> {
    with_session(cli, |session| {
        let removed = session.delete(index)?;
        println!("Deleted {} vs {} (use `undo` to restore)", removed.left, removed.right);
        Ok(())
    })
}

pub fn handle_undo(cli: &Cli) -> Result<()> {
    with_session(cli, |session| {
        if session.undo() {
            println!("Restored the last deleted battle");
        } else {
            println!("Nothing to undo");
        }
        Ok(())
    })
}

pub fn handle_switch(cli: &Cli, index: usize) -> Result<()> {
    with_session(cli, |session| {
        session.switch_winner(index)?;
        if let Some(entry) = session.ledger().get(index) {
            println!("{} now beats {}", entry.winner, entry.loser);
        }
        Ok(())
    })
}

pub fn handle_wizard(cli: &Cli) -> Result<()> {
    with_session(cli, |session| {
        let report = session.run_wizard()?;
        output::print_wizard(&report);
        Ok(())
    })
}

pub fn handle_tune(cli: &Cli, exploration: Option<f64>, proximity: Option<f64>) -> Result<()> {
    with_session(cli, |session| {
        let tuning = session.tune(exploration, proximity)?;
        println!(
            "exploration power: {}, proximity power: {}",
            tuning.exploration_power, tuning.proximity_power
        );
        Ok(())
    })
}

pub fn handle_export(cli: &Cli, path: &std::path::Path) -> Result<()> {
    with_session(cli, |session| {
        let json = session.export_document().to_json()?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write export to {}", path.display()))?;
        info!("Exported data of '{}' to {}", session.user(), path.display());
        println!("Exported to {}", path.display());
        Ok(())
    })
}

pub fn handle_import(cli: &Cli, path: &std::path::Path) -> Result<()> {
    let json =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let document = ExportDocument::from_json(&json)
        .with_context(|| format!("Failed to import {}", path.display()))?;

    with_session(cli, |session| {
        session.import_document(document);
        println!("Imported {} battles into '{}'", session.ledger().len(), session.user());
        Ok(())
    })
}

pub fn handle_reset(cli: &Cli) -> Result<()> {
    with_session(cli, |session| {
        session.reset();
        println!("Ranking of '{}' has been reset", session.user());
        Ok(())
    })
}

pub fn handle_summary(cli: &Cli) -> Result<()> {
    with_session(cli, |session| {
        output::print_summary(session.user(), &session.summary());
        Ok(())
    })
}

pub fn handle_completions(shell: clap_complete::Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut io::stdout());
    Ok(())
}
