pub mod adjust;
pub mod import;
pub mod init;
pub mod query;
pub mod report;
pub mod status;
pub mod tags;

use clap::{Parser, Subcommand};

use crate::error::{Result, TallyError};
use crate::settings::load_settings;

/// Period from the flag, falling back to settings.default_period.
pub(crate) fn resolve_period(period: Option<String>) -> Result<String> {
    if let Some(p) = period {
        return Ok(p);
    }
    let default = load_settings().default_period;
    if default.is_empty() {
        return Err(TallyError::Other(
            "No --period given and no default_period in settings".to_string(),
        ));
    }
    Ok(default)
}

#[derive(Parser)]
#[command(name = "tally", about = "Reconciles personal payment exports into one tagged ledger.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up tally: choose a data directory and initialize the ledger.
    Init {
        /// Path for tally data (default: ~/Documents/tally)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Import one provider export for one accounting period.
    Import {
        /// Path to the provider CSV export
        file: String,
        /// Source key: bank, wallet_a, wallet_b
        #[arg(long)]
        source: String,
        /// Accounting period YYYYMM the batch is imported under
        #[arg(long)]
        period: Option<String>,
    },
    /// Query ledger rows.
    Query {
        /// Accounting period YYYYMM
        #[arg(long)]
        period: Option<String>,
        /// Tag filter
        #[arg(long)]
        tag: Option<String>,
        /// Keyword over counterparty and note
        #[arg(long)]
        key: Option<String>,
        /// Amount strictly greater than
        #[arg(long)]
        gt: Option<f64>,
        /// Amount strictly less than
        #[arg(long)]
        lt: Option<f64>,
        /// pay_time lower bound (YYYY-MM-DD HH:MM:SS)
        #[arg(long)]
        from: Option<String>,
        /// pay_time upper bound
        #[arg(long)]
        to: Option<String>,
    },
    /// Aggregate the ledger for reporting.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Re-run the tag rule table over rows still carrying the default tag.
    Retag,
    /// Inspect or maintain tags.
    Tag {
        #[command(subcommand)]
        command: TagCommands,
    },
    /// Add a manual balancing entry (amount is stored negative).
    Adjust {
        /// Accounting period YYYYMM
        #[arg(long)]
        period: Option<String>,
        /// Counterparty text
        #[arg(long)]
        counterparty: String,
        /// Note text
        #[arg(long)]
        note: String,
        /// Amount to balance out
        #[arg(long)]
        amount: f64,
        /// Time YYYY-MM-DD HH:MM:SS (default: 2nd of the period, midnight)
        #[arg(long)]
        time: Option<String>,
    },
    /// Delete one ledger row by its identity.
    Delete {
        /// Row id (epoch seconds, shown in `tally query`)
        id: i64,
        /// Accounting period YYYYMM
        #[arg(long)]
        period: String,
        /// Row amount
        #[arg(long)]
        amount: f64,
    },
    /// Show current database and summary statistics.
    Status,
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Totals per tag for a period.
    Tags {
        #[arg(long)]
        period: Option<String>,
    },
    /// Totals per day for a period.
    Daily {
        #[arg(long)]
        period: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum TagCommands {
    /// List the tag rule table and the closed tag vocabulary.
    Rules,
    /// Bulk-set a tag on rows matching the filters.
    Set {
        /// Tag to assign (must be in the vocabulary)
        tag: String,
        /// Keyword over counterparty and note
        #[arg(long)]
        key: Option<String>,
        /// Accounting period YYYYMM
        #[arg(long)]
        period: Option<String>,
        /// Amount strictly greater than
        #[arg(long)]
        gt: Option<f64>,
        /// Amount strictly less than
        #[arg(long)]
        lt: Option<f64>,
    },
}
