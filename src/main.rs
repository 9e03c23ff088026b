mod adapters;
mod cli;
mod db;
mod error;
mod fmt;
mod importer;
mod ledger_ops;
mod models;
mod reports;
mod settings;
mod staging;
mod tagger;

use clap::Parser;

use cli::{Cli, Commands, ReportCommands, TagCommands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Import {
            file,
            source,
            period,
        } => cli::import::run(&file, &source, period),
        Commands::Query {
            period,
            tag,
            key,
            gt,
            lt,
            from,
            to,
        } => cli::query::run(period, tag, key, gt, lt, from, to),
        Commands::Report { command } => match command {
            ReportCommands::Tags { period } => cli::report::tags(period),
            ReportCommands::Daily { period } => cli::report::daily(period),
        },
        Commands::Retag => cli::tags::retag(),
        Commands::Tag { command } => match command {
            TagCommands::Rules => cli::tags::rules(),
            TagCommands::Set {
                tag,
                key,
                period,
                gt,
                lt,
            } => cli::tags::set(&tag, key, period, gt, lt),
        },
        Commands::Adjust {
            period,
            counterparty,
            note,
            amount,
            time,
        } => cli::adjust::run(period, &counterparty, &note, amount, time),
        Commands::Delete { id, period, amount } => cli::adjust::delete(id, &period, amount),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
