use anyhow::Result;

use coaster_ranking::cli::{Cli, Command};
use coaster_ranking::{
    handle_completions, handle_delete, handle_export, handle_history, handle_import, handle_next,
    handle_pick, handle_ranking, handle_reset, handle_simulate, handle_summary, handle_switch,
    handle_tune, handle_undo, handle_wizard, interpret,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let cli = interpret();
    execute_command(&cli)
}

fn execute_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Next => handle_next(cli),
        Command::Pick { side } => handle_pick(cli, *side),
        Command::Simulate { count, seed } => handle_simulate(cli, *count, *seed),
        Command::Ranking { limit } => handle_ranking(cli, *limit),
        Command::History { limit } => handle_history(cli, *limit),
        Command::Delete { index } => handle_delete(cli, *index),
        Command::Undo => handle_undo(cli),
        Command::Switch { index } => handle_switch(cli, *index),
        Command::Wizard => handle_wizard(cli),
        Command::Tune { exploration, proximity } => handle_tune(cli, *exploration, *proximity),
        Command::Export { path } => handle_export(cli, path),
        Command::Import { path } => handle_import(cli, path),
        Command::Reset => handle_reset(cli),
        Command::Summary => handle_summary(cli),
        Command::Completions { shell } => handle_completions(*shell),
    }
}
