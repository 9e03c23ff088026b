use std::path::PathBuf;

use colored::Colorize;

use crate::adapters::Source;
use crate::cli::resolve_period;
use crate::db::{get_connection, init_db};
use crate::error::{Result, TallyError};
use crate::importer::{file_checksum, import_period, record_import};
use crate::settings::{get_data_dir, load_tag_rules};
use crate::staging::stage_file;

pub fn run(file: &str, source_key: &str, period: Option<String>) -> Result<()> {
    let source = Source::from_key(source_key)
        .ok_or_else(|| TallyError::UnknownSource(source_key.to_string()))?;
    let period = resolve_period(period)?;

    let data_dir = get_data_dir();
    let conn = get_connection(&data_dir.join("tally.db"))?;
    init_db(&conn)?;
    let rules = load_tag_rules(&data_dir)?;

    let file_path = PathBuf::from(file);
    let raw_rows = stage_file(&file_path, source)?;
    let result = import_period(&conn, &rules, source, &period, &raw_rows)?;

    let checksum = file_checksum(&file_path)?;
    record_import(
        &conn,
        source,
        &period,
        file_path.file_name().and_then(|n| n.to_str()).unwrap_or(""),
        raw_rows.len(),
        result.inserted,
        Some(&checksum),
    )?;

    println!(
        "{} [{}]: {} inserted, {} duplicate, {} out of scope, {} rejected",
        source.name(),
        period,
        result.inserted,
        result.deduped,
        result.skipped,
        result.rejected.len()
    );
    for reject in &result.rejected {
        println!(
            "  {} line {}: {}",
            "rejected".red(),
            reject.line,
            reject.reason
        );
    }
    Ok(())
}
