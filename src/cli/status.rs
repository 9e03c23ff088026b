use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::money;
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = std::path::PathBuf::from(&settings.data_dir);
    let db_path = data_dir.join("tally.db");

    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());
    if !settings.default_period.is_empty() {
        println!("Period:     {}", settings.default_period);
    }

    if !db_path.exists() {
        println!();
        println!("Database not found. Run `tally init` to set up.");
        return Ok(());
    }

    let conn = get_connection(&db_path)?;
    let rows: i64 = conn.query_row("SELECT count(*) FROM ledger", [], |r| r.get(0))?;
    let periods: i64 =
        conn.query_row("SELECT count(DISTINCT period) FROM ledger", [], |r| r.get(0))?;
    let total: f64 =
        conn.query_row("SELECT COALESCE(SUM(amount), 0) FROM ledger", [], |r| r.get(0))?;
    let imports: i64 = conn.query_row("SELECT count(*) FROM imports", [], |r| r.get(0))?;
    let last_import: Option<String> = conn
        .query_row(
            "SELECT imported_at FROM imports ORDER BY imported_at DESC LIMIT 1",
            [],
            |r| r.get(0),
        )
        .ok();

    println!();
    println!("Ledger rows:   {rows}");
    println!("Periods:       {periods}");
    println!("Total:         {}", money(total));
    println!("Import runs:   {imports}");
    if let Some(at) = last_import {
        println!("Last import:   {at}");
    }
    Ok(())
}
