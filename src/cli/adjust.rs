use crate::cli::resolve_period;
use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::fmt::money;
use crate::ledger_ops;
use crate::settings::get_data_dir;

pub fn run(
    period: Option<String>,
    counterparty: &str,
    note: &str,
    amount: f64,
    time: Option<String>,
) -> Result<()> {
    let period = resolve_period(period)?;
    let conn = get_connection(&get_data_dir().join("tally.db"))?;
    init_db(&conn)?;

    let id = ledger_ops::add_adjustment(&conn, &period, counterparty, note, amount, time.as_deref())?;
    println!(
        "Added balancing entry {id} in {period}: {} ({counterparty})",
        money(-amount.abs())
    );
    Ok(())
}

pub fn delete(id: i64, period: &str, amount: f64) -> Result<()> {
    let conn = get_connection(&get_data_dir().join("tally.db"))?;

    if ledger_ops::delete_row(&conn, id, period, amount)? {
        println!("Deleted row {id} ({period}, {})", money(amount));
    } else {
        println!("No row with id {id}, period {period}, amount {}", money(amount));
    }
    Ok(())
}
