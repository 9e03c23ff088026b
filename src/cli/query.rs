use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::{money, redact};
use crate::models::QueryFilter;
use crate::reports;
use crate::settings::{get_data_dir, load_sensitive_words};

#[allow(clippy::too_many_arguments)]
pub fn run(
    period: Option<String>,
    tag: Option<String>,
    key: Option<String>,
    gt: Option<f64>,
    lt: Option<f64>,
    from: Option<String>,
    to: Option<String>,
) -> Result<()> {
    let data_dir = get_data_dir();
    let conn = get_connection(&data_dir.join("tally.db"))?;
    let words = load_sensitive_words(&data_dir)?;

    let filter = QueryFilter {
        period,
        tag,
        keyword: key,
        min_amount: gt,
        max_amount: lt,
        from_time: from,
        to_time: to,
    };
    let rows = reports::query(&conn, &filter)?;

    if rows.is_empty() {
        println!("No matching rows.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Time", "Period", "Amount", "Tag", "Source", "Counterparty", "Note"]);
    for row in &rows {
        table.add_row(vec![
            Cell::new(&row.pay_time),
            Cell::new(&row.period),
            Cell::new(money(row.amount)),
            Cell::new(row.tag.as_deref().unwrap_or("")),
            Cell::new(&row.source),
            Cell::new(redact(row.counterparty.as_deref().unwrap_or(""), &words)),
            Cell::new(redact(row.note.as_deref().unwrap_or(""), &words)),
        ]);
    }
    println!("{table}");

    let total: f64 = rows.iter().map(|r| r.amount).sum();
    println!(
        "{} rows, total {}",
        rows.len(),
        money(total).bold().green()
    );
    Ok(())
}
