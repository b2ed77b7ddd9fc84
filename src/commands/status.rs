use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use tracing::{info, warn};

use crate::cli::StatusArgs;

#[derive(Debug, Default, PartialEq, Eq)]
struct IndexStatus {
    edition: String,
    generated_at: String,
    current_entities: i64,
    deleted_entities: i64,
    footnotes: i64,
}

pub fn run(args: StatusArgs) -> Result<()> {
    let db_path = &args.db_path;
    info!(path = %db_path.display(), "status requested");

    if !db_path.exists() {
        warn!(path = %db_path.display(), "entity index missing; run extract with --db-path first");
        return Ok(());
    }

    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("failed to open index read-only: {}", db_path.display()))?;

    let status = read_status(&conn)
        .with_context(|| format!("{} is not an entity index", db_path.display()))?;

    info!(
        edition = %status.edition,
        generated_at = %status.generated_at,
        current_entities = status.current_entities,
        deleted_entities = status.deleted_entities,
        footnotes = status.footnotes,
        "entity index status"
    );

    Ok(())
}

fn read_status(conn: &Connection) -> Result<IndexStatus> {
    Ok(IndexStatus {
        current_entities: query_count(conn, "SELECT COUNT(*) FROM entities WHERE is_current = 1")
            .context("failed to count current entities")?,
        deleted_entities: query_count(conn, "SELECT COUNT(*) FROM entities WHERE is_current = 0")
            .context("failed to count deleted entities")?,
        footnotes: query_count(conn, "SELECT COUNT(*) FROM footnotes")
            .context("failed to count footnotes")?,
        edition: metadata_value(conn, "edition")?.unwrap_or_default(),
        generated_at: metadata_value(conn, "generated_at")?.unwrap_or_default(),
    })
}

fn query_count(conn: &Connection, sql: &str) -> Result<i64> {
    let count = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(count)
}

fn metadata_value(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row("SELECT value FROM metadata WHERE key = ?1", [key], |row| {
        row.get(0)
    })
    .optional()
    .with_context(|| format!("failed to read metadata key {key}"))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::*;
    use crate::commands::extract::{ensure_schema, open_index};

    fn scratch_db(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("dxcclist-status-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir.join("index.sqlite")
    }

    #[test]
    fn missing_index_is_reported_without_error() {
        let db_path = scratch_db("missing");
        assert!(run(StatusArgs { db_path }).is_ok());
    }

    #[test]
    fn counts_come_from_the_stored_index() {
        let db_path = scratch_db("populated");
        {
            let conn = open_index(&db_path).unwrap();
            ensure_schema(&conn).unwrap();
            conn.execute_batch(
                "
                INSERT INTO metadata (key, value) VALUES ('edition', 'January 2024 Edition');
                INSERT INTO metadata (key, value) VALUES ('generated_at', '2024-01-01T00:00:00Z');
                INSERT INTO entities VALUES (260, '3A', 'Monaco', 'EU', '27', '14', 1);
                INSERT INTO entities VALUES (318, 'BY', 'China', 'AS', 'E', '24', 1);
                INSERT INTO entities VALUES (501, 'BV9M', 'Meadow Reef', 'AS', 'E', '24', 0);
                INSERT INTO footnotes VALUES ('current_note_5', 'current', 'Agreement.');
                ",
            )
            .unwrap();

            let status = read_status(&conn).unwrap();
            assert_eq!(
                status,
                IndexStatus {
                    edition: "January 2024 Edition".to_string(),
                    generated_at: "2024-01-01T00:00:00Z".to_string(),
                    current_entities: 2,
                    deleted_entities: 1,
                    footnotes: 1,
                }
            );
        }

        assert!(run(StatusArgs { db_path: db_path.clone() }).is_ok());
        let _ = fs::remove_dir_all(db_path.parent().unwrap());
    }

    #[test]
    fn database_without_entity_tables_is_an_error() {
        let db_path = scratch_db("foreign");
        {
            let conn = Connection::open(&db_path).unwrap();
            conn.execute_batch(
                "CREATE TABLE metadata (key TEXT PRIMARY KEY, value TEXT NOT NULL);",
            )
            .unwrap();
        }

        let err = run(StatusArgs { db_path: db_path.clone() }).unwrap_err();
        assert!(format!("{err:#}").contains("not an entity index"), "{err:#}");
        let _ = fs::remove_dir_all(db_path.parent().unwrap());
    }
}
