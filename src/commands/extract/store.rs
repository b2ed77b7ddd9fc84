use super::*;

pub(crate) fn open_index(db_path: &Path) -> Result<Connection> {
    let connection = Connection::open(db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(connection)
}

pub(crate) fn ensure_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(
            "
            CREATE TABLE IF NOT EXISTS metadata (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS entities (
              entity_code INTEGER PRIMARY KEY,
              prefix TEXT NOT NULL,
              entity_name TEXT NOT NULL,
              continent TEXT NOT NULL,
              zone_itu TEXT NOT NULL,
              zone_cq TEXT NOT NULL,
              is_current INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS footnotes (
              note_key TEXT PRIMARY KEY,
              scope TEXT NOT NULL,
              text TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS entity_notes (
              entity_code INTEGER NOT NULL,
              position INTEGER NOT NULL,
              note_key TEXT NOT NULL,
              PRIMARY KEY (entity_code, position)
            );

            CREATE INDEX IF NOT EXISTS idx_entities_current ON entities(is_current);
            ",
        )
        .context("failed to create index schema")?;
    Ok(())
}

pub(super) fn store_result(connection: &mut Connection, result: &DocumentResult) -> Result<()> {
    let tx = connection
        .transaction()
        .context("failed to start index transaction")?;

    tx.execute_batch(
        "
        DELETE FROM entity_notes;
        DELETE FROM entities;
        DELETE FROM footnotes;
        DELETE FROM metadata;
        ",
    )
    .context("failed to clear previous index contents")?;

    {
        let mut metadata_statement = tx
            .prepare("INSERT INTO metadata (key, value) VALUES (?1, ?2)")
            .context("failed to prepare metadata insert")?;
        let metadata = &result.metadata;
        let pairs = [
            ("title", metadata.title.clone()),
            ("edition", metadata.edition.clone()),
            ("generated_at", metadata.generated_at.clone()),
            ("filter", metadata.filter.clone()),
            ("source_file", metadata.source_file.clone().unwrap_or_default()),
            ("source_sha256", metadata.source_sha256.clone().unwrap_or_default()),
        ];
        for (key, value) in pairs {
            metadata_statement
                .execute(params![key, value])
                .with_context(|| format!("failed to store metadata key {key}"))?;
        }

        let mut entity_statement = tx
            .prepare(
                "
                INSERT INTO entities (
                  entity_code, prefix, entity_name, continent, zone_itu, zone_cq, is_current
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ",
            )
            .context("failed to prepare entity insert")?;
        let mut reference_statement = tx
            .prepare("INSERT INTO entity_notes (entity_code, position, note_key) VALUES (?1, ?2, ?3)")
            .context("failed to prepare entity note insert")?;

        for entity in &result.entities {
            entity_statement
                .execute(params![
                    entity.entity_code,
                    entity.prefix,
                    entity.entity_name,
                    entity.continent.to_string(),
                    entity.zone_itu.to_string(),
                    entity.zone_cq.to_string(),
                    entity.is_current,
                ])
                .with_context(|| format!("failed to store entity {}", entity.entity_code))?;

            for (position, key) in entity.notes.iter().enumerate() {
                reference_statement
                    .execute(params![entity.entity_code, position as i64, key])
                    .with_context(|| {
                        format!("failed to store note {key} for entity {}", entity.entity_code)
                    })?;
            }
        }

        let mut footnote_statement = tx
            .prepare("INSERT INTO footnotes (note_key, scope, text) VALUES (?1, ?2, ?3)")
            .context("failed to prepare footnote insert")?;
        for (key, text) in &metadata.notes {
            footnote_statement
                .execute(params![key, note_scope_label(key), text])
                .with_context(|| format!("failed to store footnote {key}"))?;
        }
    }

    tx.commit().context("failed to commit index transaction")?;
    Ok(())
}

fn note_scope_label(key: &str) -> &'static str {
    if key.starts_with("current_note_") {
        NoteScope::Current.as_str()
    } else if key.starts_with("deleted_note_") {
        NoteScope::Deleted.as_str()
    } else {
        "symbol"
    }
}
