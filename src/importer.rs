use std::path::Path;

use rusqlite::Connection;
use sha2::{Digest, Sha256};

use crate::adapters::{Outcome, RejectReason, Source};
use crate::error::Result;
use crate::models::RawRow;
use crate::tagger::TagRuleSet;

// ---------------------------------------------------------------------------
// import_period
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Reject {
    pub line: usize,
    pub reason: RejectReason,
}

#[derive(Debug, Default)]
pub struct ImportResult {
    /// Rows newly merged into the ledger.
    pub inserted: usize,
    /// Rows that collided with an existing (id, period, amount) key.
    pub deduped: usize,
    /// Rows intentionally out of scope per the source's inclusion rules.
    pub skipped: usize,
    /// Rows that failed required-field parsing, with line numbers.
    pub rejected: Vec<Reject>,
}

/// Run one (source, period) batch to completion: adapter per row, tag
/// resolution, then insert-if-absent against the composite key. Business-rule
/// exclusions and merge collisions are counted, never errors; only a broken
/// ledger aborts. Re-running the identical batch inserts nothing.
pub fn import_period(
    conn: &Connection,
    rules: &TagRuleSet,
    source: Source,
    period: &str,
    raw_rows: &[RawRow],
) -> Result<ImportResult> {
    let mut result = ImportResult::default();

    for (i, raw) in raw_rows.iter().enumerate() {
        match source.adapt(raw, period) {
            Outcome::Excluded => result.skipped += 1,
            Outcome::Rejected(reason) => result.rejected.push(Reject { line: i + 1, reason }),
            Outcome::Row(mut row) => {
                row.tag = Some(rules.resolve(&row));
                let changed = conn.execute(
                    "INSERT OR IGNORE INTO ledger \
                     (id, pay_time, period, counterparty, note, amount, tag, source) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    rusqlite::params![
                        row.id,
                        row.pay_time,
                        row.period,
                        row.counterparty,
                        row.note,
                        row.amount,
                        row.tag,
                        row.source,
                    ],
                )?;
                if changed == 0 {
                    result.deduped += 1;
                } else {
                    result.inserted += 1;
                }
            }
        }
    }

    Ok(result)
}

// ---------------------------------------------------------------------------
// Batch audit trail
// ---------------------------------------------------------------------------

pub fn file_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

/// Record the batch in the imports table. Audit only: dedup is carried by the
/// ledger's primary key, so a re-imported file gets a fresh audit row with
/// inserted = 0.
pub fn record_import(
    conn: &Connection,
    source: Source,
    period: &str,
    filename: &str,
    record_count: usize,
    inserted: usize,
    checksum: Option<&str>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO imports (source, period, filename, record_count, inserted, checksum) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            source.key(),
            period,
            filename,
            record_count as i64,
            inserted as i64,
            checksum,
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};
    use crate::models::RawRow;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn raw(fields: &[(&str, &str)]) -> RawRow {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn bank_batch() -> Vec<RawRow> {
        vec![
            raw(&[
                ("pay_time", "2024-03-01 10:00:00"),
                ("pay_source", "Acme"),
                ("pay_note", "refund for order"),
                ("pay_money", "50.00"),
            ]),
            raw(&[
                ("pay_time", "2024-03-05 08:00:00"),
                ("pay_source", "Acme"),
                ("pay_note", "monthly installment"),
                ("pay_money", "120.00"),
            ]),
        ]
    }

    #[test]
    fn test_bank_batch_inserts_with_refund_negated() {
        let (_dir, conn) = test_db();
        let result =
            import_period(&conn, &TagRuleSet::default(), Source::Bank, "202403", &bank_batch())
                .unwrap();
        assert_eq!(result.inserted, 2);
        assert_eq!(result.deduped, 0);
        assert!(result.rejected.is_empty());

        let (amount, source, tag): (f64, String, String) = conn
            .query_row(
                "SELECT amount, source, tag FROM ledger WHERE note = 'refund for order'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!(amount, -50.0);
        assert_eq!(source, "bank");
        assert_eq!(tag, "credit");
    }

    #[test]
    fn test_reimport_is_idempotent() {
        let (_dir, conn) = test_db();
        let rules = TagRuleSet::default();
        let batch = bank_batch();
        let first = import_period(&conn, &rules, Source::Bank, "202403", &batch).unwrap();
        assert_eq!(first.inserted, 2);
        let second = import_period(&conn, &rules, Source::Bank, "202403", &batch).unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.deduped, 2);
        let count: i64 = conn.query_row("SELECT count(*) FROM ledger", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_same_row_in_new_period_inserts_again() {
        let (_dir, conn) = test_db();
        let rules = TagRuleSet::default();
        let batch = bank_batch();
        import_period(&conn, &rules, Source::Bank, "202403", &batch).unwrap();
        let other = import_period(&conn, &rules, Source::Bank, "202404", &batch).unwrap();
        assert_eq!(other.inserted, 2);
    }

    #[test]
    fn test_rejected_row_does_not_affect_others() {
        let (_dir, conn) = test_db();
        let mut batch = bank_batch();
        batch.insert(
            1,
            raw(&[("pay_time", "not a time"), ("pay_money", "10.00")]),
        );
        let result =
            import_period(&conn, &TagRuleSet::default(), Source::Bank, "202403", &batch).unwrap();
        assert_eq!(result.inserted, 2);
        assert_eq!(result.rejected.len(), 1);
        assert_eq!(result.rejected[0].line, 2);
        assert_eq!(result.rejected[0].reason, RejectReason::BadTimestamp);
    }

    #[test]
    fn test_wallet_a_filter_counts_as_skipped() {
        let (_dir, conn) = test_db();
        let batch = vec![
            raw(&[
                ("transaction_time", "2024-03-03 12:30:00"),
                ("counterparty", "Noodle place"),
                ("amount_yuan", "23.00"),
                ("direction", "expense"),
            ]),
            raw(&[
                ("transaction_time", "2024-03-03 13:00:00"),
                ("counterparty", "Employer"),
                ("amount_yuan", "5000.00"),
                ("direction", "income"),
            ]),
        ];
        let result =
            import_period(&conn, &TagRuleSet::default(), Source::WalletA, "202403", &batch)
                .unwrap();
        assert_eq!(result.inserted, 1);
        assert_eq!(result.skipped, 1);
        assert!(result.rejected.is_empty());
        let sources: i64 = conn
            .query_row("SELECT count(*) FROM ledger WHERE source = 'wallet_a'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(sources, 1);
    }

    #[test]
    fn test_wallet_b_refunded_row_skipped_not_adjusted() {
        let (_dir, conn) = test_db();
        let mut included = raw(&[
            ("creation_time", "2024-03-02 09:00:00"),
            ("counterparty", "Shop"),
            ("product", "coffee"),
            ("amount_yuan", "4.50"),
            ("direction", "expense"),
            ("status", "success"),
            ("refund_amount", "0"),
        ]);
        let batch = vec![included.clone(), {
            included.insert("refund_amount".into(), "2.00".into());
            included.insert("creation_time".into(), "2024-03-02 09:05:00".into());
            included
        }];
        let result =
            import_period(&conn, &TagRuleSet::default(), Source::WalletB, "202403", &batch)
                .unwrap();
        assert_eq!(result.inserted, 1);
        assert_eq!(result.skipped, 1);
        let amount: f64 = conn
            .query_row("SELECT amount FROM ledger", [], |r| r.get(0))
            .unwrap();
        assert_eq!(amount, 4.5);
    }

    #[test]
    fn test_rule_tags_applied_before_merge() {
        let (_dir, conn) = test_db();
        let rules = TagRuleSet::from_json(
            r#"[{"pattern": "noodle", "tag": "meals"}]"#,
        )
        .unwrap();
        let batch = vec![raw(&[
            ("transaction_time", "2024-03-03 12:30:00"),
            ("counterparty", "Noodle place"),
            ("amount_yuan", "23.00"),
            ("direction", "expense"),
        ])];
        import_period(&conn, &rules, Source::WalletA, "202403", &batch).unwrap();
        let tag: String = conn.query_row("SELECT tag FROM ledger", [], |r| r.get(0)).unwrap();
        assert_eq!(tag, "meals");
    }

    #[test]
    fn test_untagged_row_gets_default() {
        let (_dir, conn) = test_db();
        let batch = vec![raw(&[
            ("transaction_time", "2024-03-03 12:30:00"),
            ("counterparty", "corner store"),
            ("amount_yuan", "9.90"),
            ("direction", "expense"),
        ])];
        import_period(&conn, &TagRuleSet::default(), Source::WalletA, "202403", &batch).unwrap();
        let tag: String = conn.query_row("SELECT tag FROM ledger", [], |r| r.get(0)).unwrap();
        assert_eq!(tag, "other");
    }

    #[test]
    fn test_record_import_audit_row() {
        let (_dir, conn) = test_db();
        record_import(&conn, Source::Bank, "202403", "202403.csv", 10, 8, Some("abc123"))
            .unwrap();
        let (source, count, inserted): (String, i64, i64) = conn
            .query_row(
                "SELECT source, record_count, inserted FROM imports",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!(source, "bank");
        assert_eq!(count, 10);
        assert_eq!(inserted, 8);
    }
}
