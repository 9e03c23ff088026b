use std::collections::HashMap;

/// One staged input line: source column name -> raw text. Lives only for the
/// duration of a single (source, period) import call.
pub type RawRow = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRow {
    pub id: i64,
    pub pay_time: String,
    pub period: String,
    pub counterparty: Option<String>,
    pub note: Option<String>,
    pub amount: f64,
    pub tag: Option<String>,
    pub source: String,
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct ImportRecord {
    pub id: Option<i64>,
    pub source: String,
    pub period: String,
    pub filename: String,
    pub record_count: i64,
    pub inserted: i64,
    pub checksum: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    pub period: Option<String>,
    pub tag: Option<String>,
    pub keyword: Option<String>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub from_time: Option<String>,
    pub to_time: Option<String>,
}
