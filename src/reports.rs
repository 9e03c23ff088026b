use rusqlite::types::Value;
use rusqlite::Connection;

use crate::error::Result;
use crate::models::{LedgerRow, QueryFilter};

// ---------------------------------------------------------------------------
// Filter clause builder
// ---------------------------------------------------------------------------

fn build_clause(filter: &QueryFilter) -> (String, Vec<Value>) {
    let mut conditions = Vec::new();
    let mut params: Vec<Value> = Vec::new();

    if let Some(period) = &filter.period {
        conditions.push(format!("period = ?{}", params.len() + 1));
        params.push(Value::from(period.clone()));
    }
    if let Some(tag) = &filter.tag {
        conditions.push(format!("tag = ?{}", params.len() + 1));
        params.push(Value::from(tag.clone()));
    }
    if let Some(key) = &filter.keyword {
        conditions.push(format!(
            "(counterparty LIKE ?{n} OR note LIKE ?{m})",
            n = params.len() + 1,
            m = params.len() + 2
        ));
        params.push(Value::from(format!("%{key}%")));
        params.push(Value::from(format!("%{key}%")));
    }
    if let Some(min) = filter.min_amount {
        conditions.push(format!("amount > ?{}", params.len() + 1));
        params.push(Value::from(min));
    }
    if let Some(max) = filter.max_amount {
        conditions.push(format!("amount < ?{}", params.len() + 1));
        params.push(Value::from(max));
    }
    if let Some(from) = &filter.from_time {
        conditions.push(format!("pay_time >= ?{}", params.len() + 1));
        params.push(Value::from(from.clone()));
    }
    if let Some(to) = &filter.to_time {
        conditions.push(format!("pay_time <= ?{}", params.len() + 1));
        params.push(Value::from(to.clone()));
    }

    let clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };
    (clause, params)
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

pub fn query(conn: &Connection, filter: &QueryFilter) -> Result<Vec<LedgerRow>> {
    let (clause, params) = build_clause(filter);
    let sql = format!(
        "SELECT id, pay_time, period, counterparty, note, amount, tag, source \
         FROM ledger{clause} ORDER BY amount DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params), |row| {
        Ok(LedgerRow {
            id: row.get(0)?,
            pay_time: row.get(1)?,
            period: row.get(2)?,
            counterparty: row.get(3)?,
            note: row.get(4)?,
            amount: row.get(5)?,
            tag: row.get(6)?,
            source: row.get(7)?,
        })
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

pub struct TagSummary {
    pub tag: String,
    pub total: f64,
    pub count: i64,
}

pub fn tag_summary(conn: &Connection, period: &str) -> Result<Vec<TagSummary>> {
    let mut stmt = conn.prepare(
        "SELECT COALESCE(tag, 'other'), SUM(amount), COUNT(*) FROM ledger \
         WHERE period = ?1 GROUP BY tag ORDER BY SUM(amount) DESC",
    )?;
    let rows = stmt.query_map([period], |row| {
        Ok(TagSummary {
            tag: row.get(0)?,
            total: row.get(1)?,
            count: row.get(2)?,
        })
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub struct DailyTotal {
    pub day: String,
    pub total: f64,
}

pub fn daily_totals(conn: &Connection, period: &str) -> Result<Vec<DailyTotal>> {
    let mut stmt = conn.prepare(
        "SELECT substr(pay_time, 1, 10) AS day, SUM(amount) FROM ledger \
         WHERE period = ?1 GROUP BY day ORDER BY day",
    )?;
    let rows = stmt.query_map([period], |row| {
        Ok(DailyTotal {
            day: row.get(0)?,
            total: row.get(1)?,
        })
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub struct PeriodSummary {
    pub total: f64,
    pub count: i64,
}

pub fn period_summary(conn: &Connection, period: &str) -> Result<PeriodSummary> {
    let (total, count) = conn.query_row(
        "SELECT COALESCE(SUM(amount), 0), COUNT(*) FROM ledger WHERE period = ?1",
        [period],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(PeriodSummary { total, count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn seed(conn: &Connection) {
        let rows: &[(i64, &str, &str, &str, &str, f64, &str, &str)] = &[
            (1709287200, "2024-03-01 10:00:00", "202403", "Acme", "installment", 50.0, "credit", "bank"),
            (1709460600, "2024-03-03 12:30:00", "202403", "Noodle place", "lunch", 23.0, "meals", "wallet_a"),
            (1709478000, "2024-03-03 17:20:00", "202403", "Metro", "commute", 4.0, "transport", "wallet_b"),
            (1711929600, "2024-04-01 00:00:00", "202404", "Shop", "coffee", 4.5, "other", "wallet_b"),
        ];
        for r in rows {
            conn.execute(
                "INSERT INTO ledger (id, pay_time, period, counterparty, note, amount, tag, source) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![r.0, r.1, r.2, r.3, r.4, r.5, r.6, r.7],
            )
            .unwrap();
        }
    }

    #[test]
    fn test_query_no_filters_returns_all_by_amount_desc() {
        let (_dir, conn) = test_db();
        seed(&conn);
        let rows = query(&conn, &QueryFilter::default()).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].amount, 50.0);
        assert_eq!(rows[3].amount, 4.0);
    }

    #[test]
    fn test_query_by_period_and_tag() {
        let (_dir, conn) = test_db();
        seed(&conn);
        let filter = QueryFilter {
            period: Some("202403".into()),
            tag: Some("meals".into()),
            ..Default::default()
        };
        let rows = query(&conn, &filter).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].counterparty.as_deref(), Some("Noodle place"));
    }

    #[test]
    fn test_query_keyword_matches_counterparty_or_note() {
        let (_dir, conn) = test_db();
        seed(&conn);
        let by_counterparty = query(
            &conn,
            &QueryFilter { keyword: Some("Metro".into()), ..Default::default() },
        )
        .unwrap();
        assert_eq!(by_counterparty.len(), 1);
        let by_note = query(
            &conn,
            &QueryFilter { keyword: Some("coffee".into()), ..Default::default() },
        )
        .unwrap();
        assert_eq!(by_note.len(), 1);
        assert_eq!(by_note[0].source, "wallet_b");
    }

    #[test]
    fn test_query_amount_bounds() {
        let (_dir, conn) = test_db();
        seed(&conn);
        let filter = QueryFilter {
            min_amount: Some(4.2),
            max_amount: Some(30.0),
            ..Default::default()
        };
        let rows = query(&conn, &filter).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.amount > 4.2 && r.amount < 30.0));
    }

    #[test]
    fn test_query_time_range() {
        let (_dir, conn) = test_db();
        seed(&conn);
        let filter = QueryFilter {
            from_time: Some("2024-03-03 00:00:00".into()),
            to_time: Some("2024-03-03 23:59:59".into()),
            ..Default::default()
        };
        let rows = query(&conn, &filter).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_tag_summary_groups_and_orders() {
        let (_dir, conn) = test_db();
        seed(&conn);
        let summary = tag_summary(&conn, "202403").unwrap();
        assert_eq!(summary.len(), 3);
        assert_eq!(summary[0].tag, "credit");
        assert_eq!(summary[0].total, 50.0);
        assert_eq!(summary[0].count, 1);
    }

    #[test]
    fn test_daily_totals() {
        let (_dir, conn) = test_db();
        seed(&conn);
        let days = daily_totals(&conn, "202403").unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].day, "2024-03-01");
        assert_eq!(days[1].day, "2024-03-03");
        assert_eq!(days[1].total, 27.0);
    }

    #[test]
    fn test_period_summary_empty_period() {
        let (_dir, conn) = test_db();
        seed(&conn);
        let summary = period_summary(&conn, "209901").unwrap();
        assert_eq!(summary.count, 0);
        assert_eq!(summary.total, 0.0);
    }
}
