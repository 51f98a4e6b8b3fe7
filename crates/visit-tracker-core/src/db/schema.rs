//! SQLite schema definition.

/// Complete database schema for the visit tracker.
///
/// The database is used as a flat key-value store: every collection lives
/// as one serialized value under a well-known key.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Key-Value Store
-- ============================================================================

CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,                         -- serialized JSON collection
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
