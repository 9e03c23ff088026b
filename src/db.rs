use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

// The composite key (id, period, amount) is what makes re-imports idempotent:
// id is epoch seconds of the source timestamp, so the same export merged twice
// collides on all three columns and is ignored. Known limitation: two distinct
// transactions in the same second with the same amount in the same period also
// collide; kept for compatibility with the source data's identity scheme.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS ledger (
    id INTEGER NOT NULL,
    pay_time TEXT NOT NULL,
    period TEXT NOT NULL,
    counterparty TEXT,
    note TEXT,
    amount REAL NOT NULL,
    tag TEXT,
    source TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now')),
    PRIMARY KEY (id, period, amount)
);

CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY,
    source TEXT NOT NULL,
    period TEXT NOT NULL,
    filename TEXT NOT NULL,
    record_count INTEGER,
    inserted INTEGER,
    checksum TEXT,
    imported_at TEXT DEFAULT (datetime('now'))
);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
