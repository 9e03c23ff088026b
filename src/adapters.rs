use chrono::NaiveDateTime;

use crate::models::{LedgerRow, RawRow};
use crate::tagger::CREDIT_TAG;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a money field. Provider exports wrap amounts with currency marks and
/// thousands separators. Unparseable text is a rejection, never 0.0.
pub fn parse_money(raw: &str) -> Option<f64> {
    let s = raw.replace('¥', "").replace(',', "").replace('"', "");
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse().ok()
}

/// Epoch seconds of a `YYYY-MM-DD HH:MM:SS` timestamp. This is the row id:
/// stable across re-imports of the same export.
pub fn epoch_seconds(raw: &str) -> Option<i64> {
    NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| dt.and_utc().timestamp())
}

fn field<'a>(raw: &'a RawRow, name: &str) -> &'a str {
    raw.get(name).map(String::as_str).unwrap_or("")
}

fn optional(raw: &RawRow, name: &str) -> Option<String> {
    let v = field(raw, name).trim();
    if v.is_empty() {
        None
    } else {
        Some(v.to_string())
    }
}

// ---------------------------------------------------------------------------
// Per-row outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    BadTimestamp,
    BadAmount,
    MissingField(&'static str),
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadTimestamp => write!(f, "unparseable timestamp"),
            Self::BadAmount => write!(f, "unparseable amount"),
            Self::MissingField(name) => write!(f, "missing field: {name}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Row mapped into the canonical schema, ready for tag resolution.
    Row(LedgerRow),
    /// Row is intentionally out of scope for this source (not an error).
    Excluded,
    /// Row failed required-field parsing.
    Rejected(RejectReason),
}

// ---------------------------------------------------------------------------
// Source kinds — enum dispatch instead of trait objects
// ---------------------------------------------------------------------------

/// The bank export marks reversals only by this literal token inside the
/// free-form note. Case-sensitive on purpose: that is how the export writes
/// it, and loosening the match would change which rows flip sign. Known
/// limitation: differently worded refunds are not detected.
const BANK_REFUND_MARKER: &str = "refund";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Bank,
    WalletA,
    WalletB,
}

pub const ALL_SOURCES: &[Source] = &[Source::Bank, Source::WalletA, Source::WalletB];

impl Source {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Bank => "bank",
            Self::WalletA => "wallet_a",
            Self::WalletB => "wallet_b",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bank => "Bank / credit card",
            Self::WalletA => "Messaging-app wallet",
            Self::WalletB => "Online-payments wallet",
        }
    }

    pub fn from_key(key: &str) -> Option<Source> {
        ALL_SOURCES.iter().find(|s| s.key() == key).copied()
    }

    /// Lines before the header row in this provider's CSV export.
    pub fn preamble_lines(&self) -> usize {
        match self {
            Self::Bank => 0,
            Self::WalletA => 16,
            Self::WalletB => 4,
        }
    }

    /// Map one staged row into the canonical schema. Pure: same row and
    /// period always produce the same outcome.
    pub fn adapt(&self, raw: &RawRow, period: &str) -> Outcome {
        match self {
            Self::Bank => adapt_bank(raw, period),
            Self::WalletA => adapt_wallet_a(raw, period),
            Self::WalletB => adapt_wallet_b(raw, period),
        }
    }
}

// ---------------------------------------------------------------------------
// Bank / credit card
// ---------------------------------------------------------------------------

// Every row in this export is a recurring/credit-type charge, so the tag is
// fixed; a "refund" note reverses the expense by negating the amount.
fn adapt_bank(raw: &RawRow, period: &str) -> Outcome {
    let pay_time = field(raw, "pay_time").trim();
    if pay_time.is_empty() {
        return Outcome::Rejected(RejectReason::MissingField("pay_time"));
    }
    let Some(id) = epoch_seconds(pay_time) else {
        return Outcome::Rejected(RejectReason::BadTimestamp);
    };
    let Some(mut amount) = parse_money(field(raw, "pay_money")) else {
        return Outcome::Rejected(RejectReason::BadAmount);
    };
    if field(raw, "pay_note").contains(BANK_REFUND_MARKER) {
        amount = -amount;
    }
    Outcome::Row(LedgerRow {
        id,
        pay_time: pay_time.to_string(),
        period: period.to_string(),
        counterparty: optional(raw, "pay_source"),
        note: optional(raw, "pay_note"),
        amount,
        tag: Some(CREDIT_TAG.to_string()),
        source: Source::Bank.key().to_string(),
    })
}

// ---------------------------------------------------------------------------
// Wallet A (messaging-app wallet)
// ---------------------------------------------------------------------------

// Expense-only: income and transfer rows are excluded, not errors. The export
// never reports refund polarity inline, so amounts stay positive.
fn adapt_wallet_a(raw: &RawRow, period: &str) -> Outcome {
    if field(raw, "direction").trim() != "expense" {
        return Outcome::Excluded;
    }
    let transaction_time = field(raw, "transaction_time").trim();
    if transaction_time.is_empty() {
        return Outcome::Rejected(RejectReason::MissingField("transaction_time"));
    }
    let Some(id) = epoch_seconds(transaction_time) else {
        return Outcome::Rejected(RejectReason::BadTimestamp);
    };
    let Some(amount) = parse_money(field(raw, "amount_yuan")) else {
        return Outcome::Rejected(RejectReason::BadAmount);
    };
    Outcome::Row(LedgerRow {
        id,
        pay_time: transaction_time.to_string(),
        period: period.to_string(),
        counterparty: optional(raw, "counterparty"),
        note: optional(raw, "note"),
        amount,
        tag: None,
        source: Source::WalletA.key().to_string(),
    })
}

// ---------------------------------------------------------------------------
// Wallet B (online-payments wallet)
// ---------------------------------------------------------------------------

// Stricter inclusion: the export carries pending/closed rows and records
// later refunds in a separate column. A transaction refunded after the fact,
// partially or fully, is excluded entirely rather than amount-adjusted.
fn adapt_wallet_b(raw: &RawRow, period: &str) -> Outcome {
    if !field(raw, "direction").trim().starts_with("expense") {
        return Outcome::Excluded;
    }
    if !field(raw, "status").trim().starts_with("success") {
        return Outcome::Excluded;
    }
    let refund_raw = field(raw, "refund_amount");
    let refund = if refund_raw.trim().is_empty() {
        0.0
    } else {
        match parse_money(refund_raw) {
            Some(v) => v,
            None => return Outcome::Rejected(RejectReason::BadAmount),
        }
    };
    if refund != 0.0 {
        return Outcome::Excluded;
    }
    let creation_time = field(raw, "creation_time").trim();
    if creation_time.is_empty() {
        return Outcome::Rejected(RejectReason::MissingField("creation_time"));
    }
    let Some(id) = epoch_seconds(creation_time) else {
        return Outcome::Rejected(RejectReason::BadTimestamp);
    };
    let Some(amount) = parse_money(field(raw, "amount_yuan")) else {
        return Outcome::Rejected(RejectReason::BadAmount);
    };
    Outcome::Row(LedgerRow {
        id,
        pay_time: creation_time.to_string(),
        period: period.to_string(),
        counterparty: optional(raw, "counterparty"),
        note: optional(raw, "product"),
        amount,
        tag: None,
        source: Source::WalletB.key().to_string(),
    })
}
