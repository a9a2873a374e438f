use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);"
    )?;

    let version: i64 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE accounts (
                id          TEXT PRIMARY KEY,
                username    TEXT NOT NULL UNIQUE
            );

            CREATE TABLE profiles (
                id          TEXT PRIMARY KEY,
                account_id  TEXT NOT NULL UNIQUE REFERENCES accounts(id),
                first_name  TEXT NOT NULL DEFAULT '',
                last_name   TEXT NOT NULL DEFAULT '',
                city        TEXT NOT NULL DEFAULT '',
                email       TEXT NOT NULL,
                image_url   TEXT,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE status_messages (
                id          TEXT PRIMARY KEY,
                profile_id  TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
                message     TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );

            CREATE INDEX idx_status_messages_profile
                ON status_messages(profile_id, created_at);

            CREATE TABLE images (
                id          TEXT PRIMARY KEY,
                profile_id  TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
                file_ref    TEXT NOT NULL,
                caption     TEXT,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE status_images (
                status_id   TEXT NOT NULL REFERENCES status_messages(id) ON DELETE CASCADE,
                image_id    TEXT NOT NULL REFERENCES images(id) ON DELETE CASCADE,
                position    INTEGER NOT NULL,
                PRIMARY KEY (status_id, image_id)
            );

            -- One row per unordered pair: profile1 is always the smaller id.
            CREATE TABLE friendships (
                profile1    TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
                profile2    TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
                created_at  TEXT NOT NULL,
                CHECK (profile1 < profile2),
                UNIQUE (profile1, profile2)
            );

            CREATE INDEX idx_friendships_profile2
                ON friendships(profile2);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
