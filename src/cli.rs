use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use crate::history::Side;

#[derive(Parser, Debug)]
#[command(author, version, about = "coaster ranking through pairwise battles")]
pub struct Cli {
    /// User whose ranking is used
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// JSON file with the item catalog
    #[arg(short, long, global = true, default_value = "coasters.json")]
    pub catalog: PathBuf,

    /// Directory for JSON data files
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Store data in this SQLite database instead of JSON files
    #[arg(long, global = true)]
    pub sqlite: Option<PathBuf>,

    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickSide {
    Left,
    Right,
}

impl From<PickSide> for Side {
    fn from(side: PickSide) -> Self {
        match side {
            PickSide::Left => Side::Left,
            PickSide::Right => Side::Right,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Show the pending battle, choosing a new pair if needed
    Next,
    /// Resolve the pending battle
    Pick {
        #[arg(value_enum)]
        side: PickSide,
    },
    /// Play battles automatically using the current ratings
    Simulate {
        count: usize,
        /// Seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the ranking
    Ranking {
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Print the most recent battles
    History {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Delete a history entry (index as shown by `history`)
    Delete { index: usize },
    /// Restore the most recently deleted entry
    Undo,
    /// Flip the winner of a history entry
    Switch { index: usize },
    /// Replay the whole history until ranks settle
    Wizard,
    /// Show or change pairing tuning
    Tune {
        #[arg(long)]
        exploration: Option<f64>,
        #[arg(long)]
        proximity: Option<f64>,
    },
    /// Write all data of the user to a JSON file
    Export { path: PathBuf },
    /// Replace the user's data with an exported JSON file
    Import { path: PathBuf },
    /// Clear ratings and history of the user
    Reset,
    /// Print totals and pair coverage
    Summary,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}
