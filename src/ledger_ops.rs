use chrono::NaiveDate;
use rusqlite::Connection;

use crate::adapters::epoch_seconds;
use crate::error::{Result, TallyError};
use crate::models::QueryFilter;
use crate::tagger::{TagRuleSet, ADJUST_TAG, DEFAULT_TAG};

// ---------------------------------------------------------------------------
// Manual balancing entries
// ---------------------------------------------------------------------------

/// Add a user-initiated balancing entry. The amount is forced negative (an
/// adjustment reverses recorded spending); when no time is given it defaults
/// to the 2nd of the period at midnight so the entry sorts near the start of
/// the month without colliding with the 1st.
pub fn add_adjustment(
    conn: &Connection,
    period: &str,
    counterparty: &str,
    note: &str,
    amount: f64,
    pay_time: Option<&str>,
) -> Result<i64> {
    let pay_time = match pay_time {
        Some(t) => t.to_string(),
        None => default_adjustment_time(period)?,
    };
    let id = epoch_seconds(&pay_time)
        .ok_or_else(|| TallyError::Other(format!("Invalid time: {pay_time}")))?;
    let amount = -amount.abs();

    conn.execute(
        "INSERT INTO ledger (id, pay_time, period, counterparty, note, amount, tag, source) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'manual')",
        rusqlite::params![id, pay_time, period, counterparty, note, amount, ADJUST_TAG],
    )?;
    Ok(id)
}

fn default_adjustment_time(period: &str) -> Result<String> {
    if period.len() != 6 {
        return Err(TallyError::Other(format!("Invalid period: {period} (expected YYYYMM)")));
    }
    let year: i32 = period[..4]
        .parse()
        .map_err(|_| TallyError::Other(format!("Invalid period: {period}")))?;
    let month: u32 = period[4..]
        .parse()
        .map_err(|_| TallyError::Other(format!("Invalid period: {period}")))?;
    let date = NaiveDate::from_ymd_opt(year, month, 2)
        .ok_or_else(|| TallyError::Other(format!("Invalid period: {period}")))?;
    Ok(format!("{} 00:00:00", date.format("%Y-%m-%d")))
}

/// Delete one ledger row by its full identity. Returns whether a row existed.
pub fn delete_row(conn: &Connection, id: i64, period: &str, amount: f64) -> Result<bool> {
    let changed = conn.execute(
        "DELETE FROM ledger WHERE id = ?1 AND period = ?2 AND amount = ?3",
        rusqlite::params![id, period, amount],
    )?;
    Ok(changed > 0)
}

// ---------------------------------------------------------------------------
// Tag maintenance on stored rows
// ---------------------------------------------------------------------------

pub struct RetagResult {
    pub updated: usize,
    pub unchanged: usize,
}

/// Re-run the rule table over rows still carrying the default tag, for when
/// rules were added after an import. Adapter-assigned and manually set tags
/// are left alone.
pub fn retag(conn: &Connection, rules: &TagRuleSet) -> Result<RetagResult> {
    let mut stmt = conn.prepare(
        "SELECT id, period, amount, counterparty, note FROM ledger \
         WHERE tag = ?1 OR tag IS NULL",
    )?;
    let candidates: Vec<(i64, String, f64, Option<String>, Option<String>)> = stmt
        .query_map([DEFAULT_TAG], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut updated = 0usize;
    let mut unchanged = 0usize;
    for (id, period, amount, counterparty, note) in &candidates {
        match rules.lookup(counterparty.as_deref(), note.as_deref()) {
            Some(tag) => {
                conn.execute(
                    "UPDATE ledger SET tag = ?1 WHERE id = ?2 AND period = ?3 AND amount = ?4",
                    rusqlite::params![tag, id, period, amount],
                )?;
                updated += 1;
            }
            None => unchanged += 1,
        }
    }
    Ok(RetagResult { updated, unchanged })
}

/// Bulk manual tag update over rows matching the filter. The tag must come
/// from the closed vocabulary.
pub fn set_tags(
    conn: &Connection,
    rules: &TagRuleSet,
    tag: &str,
    filter: &QueryFilter,
) -> Result<usize> {
    if !rules.is_known_tag(tag) {
        return Err(TallyError::UnknownTag(tag.to_string()));
    }

    let mut conditions = Vec::new();
    let mut params: Vec<rusqlite::types::Value> = vec![tag.to_string().into()];
    if let Some(period) = &filter.period {
        conditions.push(format!("period = ?{}", params.len() + 1));
        params.push(period.clone().into());
    }
    if let Some(key) = &filter.keyword {
        conditions.push(format!(
            "(counterparty LIKE ?{n} OR note LIKE ?{m})",
            n = params.len() + 1,
            m = params.len() + 2
        ));
        params.push(format!("%{key}%").into());
        params.push(format!("%{key}%").into());
    }
    if let Some(min) = filter.min_amount {
        conditions.push(format!("amount > ?{}", params.len() + 1));
        params.push(min.into());
    }
    if let Some(max) = filter.max_amount {
        conditions.push(format!("amount < ?{}", params.len() + 1));
        params.push(max.into());
    }

    let mut sql = "UPDATE ledger SET tag = ?1".to_string();
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    let changed = conn.execute(&sql, rusqlite::params_from_iter(params))?;
    Ok(changed)
}
