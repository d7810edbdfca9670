use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS products (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            name            TEXT,
            price           REAL,
            description     TEXT,
            image_url       TEXT,
            creator_name    TEXT,
            creator_id      INTEGER,
            status          TEXT DEFAULT 'pending'
        );
        ",
    )?;

    // Stores created before the approval workflow existed lack these three
    // columns; add them in place without touching existing rows.
    add_missing_columns(conn)?;

    info!("Database migrations complete");
    Ok(())
}

fn add_missing_columns(conn: &Connection) -> Result<()> {
    let mut stmt = conn.prepare("PRAGMA table_info(products)")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if !columns.iter().any(|c| c == "creator_name") {
        conn.execute("ALTER TABLE products ADD COLUMN creator_name TEXT", [])?;
    }
    if !columns.iter().any(|c| c == "creator_id") {
        conn.execute("ALTER TABLE products ADD COLUMN creator_id INTEGER", [])?;
    }
    if !columns.iter().any(|c| c == "status") {
        conn.execute(
            "ALTER TABLE products ADD COLUMN status TEXT DEFAULT 'pending'",
            [],
        )?;
    }

    Ok(())
}
