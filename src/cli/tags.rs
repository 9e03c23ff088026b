use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::ledger_ops;
use crate::models::QueryFilter;
use crate::settings::{get_data_dir, load_tag_rules};

pub fn rules() -> Result<()> {
    let data_dir = get_data_dir();
    let rules = load_tag_rules(&data_dir)?;

    let mut table = Table::new();
    table.set_header(vec!["#", "Pattern", "Type", "Tag"]);
    for (i, rule) in rules.rules().iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&rule.pattern),
            Cell::new(&rule.match_type),
            Cell::new(&rule.tag),
        ]);
    }
    println!("Tag rules (first match wins)\n{table}");

    let vocabulary: Vec<String> = rules.vocabulary().into_iter().collect();
    println!("Vocabulary: {}", vocabulary.join(", "));
    Ok(())
}

pub fn set(
    tag: &str,
    key: Option<String>,
    period: Option<String>,
    gt: Option<f64>,
    lt: Option<f64>,
) -> Result<()> {
    let data_dir = get_data_dir();
    let conn = get_connection(&data_dir.join("tally.db"))?;
    let rules = load_tag_rules(&data_dir)?;

    let filter = QueryFilter {
        period,
        keyword: key,
        min_amount: gt,
        max_amount: lt,
        ..Default::default()
    };
    let changed = ledger_ops::set_tags(&conn, &rules, tag, &filter)?;
    println!("Updated {changed} rows to tag '{tag}'");
    Ok(())
}

pub fn retag() -> Result<()> {
    let data_dir = get_data_dir();
    let conn = get_connection(&data_dir.join("tally.db"))?;
    let rules = load_tag_rules(&data_dir)?;

    let result = ledger_ops::retag(&conn, &rules)?;
    println!("{} retagged, {} left on the default tag", result.updated, result.unchanged);
    Ok(())
}
