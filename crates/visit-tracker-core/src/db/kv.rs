//! Key-value operations on the `kv_store` table.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};

impl Database {
    /// Get the value stored under a key.
    pub fn get_item(&self, key: &str) -> DbResult<Option<String>> {
        self.conn
            .query_row("SELECT value FROM kv_store WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(Into::into)
    }

    /// Insert or replace the value under a key.
    pub fn set_item(&self, key: &str, value: &str) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_get_missing_key() {
        let db = setup_db();
        assert_eq!(db.get_item("patients").unwrap(), None);
    }

    #[test]
    fn test_set_and_get() {
        let db = setup_db();

        db.set_item("visits", r#"[{"id":"v1"}]"#).unwrap();

        let value = db.get_item("visits").unwrap();
        assert_eq!(value, Some(r#"[{"id":"v1"}]"#.to_string()));
    }

    #[test]
    fn test_set_replaces_value() {
        let db = setup_db();

        db.set_item("patients", "[1]").unwrap();
        db.set_item("patients", "[2]").unwrap();

        assert_eq!(db.get_item("patients").unwrap(), Some("[2]".to_string()));

        let rows: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM kv_store", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }
}
