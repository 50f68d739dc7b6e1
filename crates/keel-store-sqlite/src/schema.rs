//! SQL schema for the keel SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Items are never deleted; `status` is the only column ever updated,
-- by the re-evaluation pass.
CREATE TABLE IF NOT EXISTS items (
    item_id      TEXT PRIMARY KEY,
    subject_id   TEXT NOT NULL,
    item_type    TEXT NOT NULL,
    name         TEXT NOT NULL,
    status       TEXT NOT NULL,   -- 'compliant' | 'at_risk' | 'non_compliant'
    issue_date   TEXT,            -- ISO calendar date or NULL
    expiry_date  TEXT,            -- ISO calendar date; NULL = never expires
    jurisdiction TEXT NOT NULL,
    details      TEXT NOT NULL DEFAULT '{}',
    created_at   TEXT NOT NULL    -- ISO 8601 UTC; store-assigned
);

-- Alerts reference their item weakly: no cascade, alert outlives item.
-- `resolved` flips 0 -> 1 at most once.
CREATE TABLE IF NOT EXISTS alerts (
    alert_id   TEXT PRIMARY KEY,
    item_id    TEXT NOT NULL,
    subject_id TEXT NOT NULL,
    alert_type TEXT NOT NULL,     -- 'expiring' | 'expired'
    severity   TEXT NOT NULL,     -- 'critical' | 'high' | 'medium' | 'low'
    message    TEXT NOT NULL,
    created_at TEXT NOT NULL,
    resolved   INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS items_subject_idx       ON items(subject_id);
CREATE INDEX IF NOT EXISTS items_jurisdiction_idx  ON items(jurisdiction);
CREATE INDEX IF NOT EXISTS alerts_subject_idx      ON alerts(subject_id);
CREATE INDEX IF NOT EXISTS alerts_resolved_idx     ON alerts(resolved);

PRAGMA user_version = 1;
";
