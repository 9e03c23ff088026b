use comfy_table::{Cell, Table};

use crate::cli::resolve_period;
use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::money;
use crate::reports;
use crate::settings::get_data_dir;

pub fn tags(period: Option<String>) -> Result<()> {
    let period = resolve_period(period)?;
    let conn = get_connection(&get_data_dir().join("tally.db"))?;

    let summary = reports::tag_summary(&conn, &period)?;
    if summary.is_empty() {
        println!("No rows for period {period}.");
        return Ok(());
    }

    let overall = reports::period_summary(&conn, &period)?;
    let mut table = Table::new();
    table.set_header(vec!["Tag", "Total", "Count", "Share"]);
    for item in &summary {
        let share = if overall.total != 0.0 {
            format!("{:.1}%", item.total / overall.total * 100.0)
        } else {
            String::from("-")
        };
        table.add_row(vec![
            Cell::new(&item.tag),
            Cell::new(money(item.total)),
            Cell::new(item.count),
            Cell::new(share),
        ]);
    }
    println!("Spending by tag ({period})\n{table}");
    println!("{} rows, total {}", overall.count, money(overall.total));
    Ok(())
}

pub fn daily(period: Option<String>) -> Result<()> {
    let period = resolve_period(period)?;
    let conn = get_connection(&get_data_dir().join("tally.db"))?;

    let days = reports::daily_totals(&conn, &period)?;
    if days.is_empty() {
        println!("No rows for period {period}.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Day", "Total"]);
    for day in &days {
        table.add_row(vec![Cell::new(&day.day), Cell::new(money(day.total))]);
    }
    println!("Daily totals ({period})\n{table}");
    Ok(())
}
