use crate::models::{FriendshipRow, ImageRow, ProfileRow, StatusImageRow, StatusRow};
use crate::Database;
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use tracing::debug;

/// Upper bound on ids bound into one `IN (...)` list. Older SQLite builds
/// cap host parameters at 999.
pub const MAX_BOUND_IDS: usize = 500;

const PROFILE_COLUMNS: &str =
    "id, account_id, first_name, last_name, city, email, image_url, created_at";

impl Database {
    // -- Accounts --

    /// Record an account reference. Returns false when `username` already
    /// belongs to a different account; an existing `id` is left untouched.
    pub fn ensure_account(&self, id: &str, username: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let known: Option<String> = conn
                .query_row("SELECT id FROM accounts WHERE id = ?1", [id], |row| row.get(0))
                .optional()?;
            if known.is_some() {
                return Ok(true);
            }

            match conn.execute("INSERT INTO accounts (id, username) VALUES (?1, ?2)", (id, username)) {
                Ok(_) => Ok(true),
                Err(e) if is_unique_violation(&e) => Ok(false),
                Err(e) => Err(e.into()),
            }
        })
    }

    // -- Profiles --

    /// Returns false if the account already owns a profile.
    pub fn insert_profile(&self, row: &ProfileRow) -> Result<bool> {
        self.with_conn_mut(|conn| {
            match conn.execute(
                "INSERT INTO profiles (id, account_id, first_name, last_name, city, email, image_url, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    row.id,
                    row.account_id,
                    row.first_name,
                    row.last_name,
                    row.city,
                    row.email,
                    row.image_url,
                    row.created_at
                ],
            ) {
                Ok(_) => Ok(true),
                Err(e) if is_unique_violation(&e) => Ok(false),
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_profile_by_id(&self, id: &str) -> Result<Option<ProfileRow>> {
        self.with_conn(|conn| query_profile(conn, "id", id))
    }

    pub fn get_profile_by_account(&self, account_id: &str) -> Result<Option<ProfileRow>> {
        self.with_conn(|conn| query_profile(conn, "account_id", account_id))
    }

    pub fn list_profiles(&self) -> Result<Vec<ProfileRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM profiles ORDER BY last_name, first_name, id",
                PROFILE_COLUMNS
            ))?;
            let rows = stmt
                .query_map([], profile_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Returns false if no such profile exists.
    pub fn update_profile_contact(
        &self,
        id: &str,
        city: &str,
        email: &str,
        image_url: Option<&str>,
    ) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE profiles SET city = ?2, email = ?3, image_url = ?4 WHERE id = ?1",
                params![id, city, email, image_url],
            )?;
            Ok(changed > 0)
        })
    }

    // -- Status messages --

    pub fn insert_status(&self, row: &StatusRow) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO status_messages (id, profile_id, message, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![row.id, row.profile_id, row.message, row.created_at],
            )?;
            Ok(())
        })
    }

    pub fn get_status(&self, id: &str) -> Result<Option<StatusRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, profile_id, message, created_at FROM status_messages WHERE id = ?1",
                    [id],
                    status_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn update_status_message(&self, id: &str, message: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE status_messages SET message = ?2 WHERE id = ?1",
                (id, message),
            )?;
            Ok(changed > 0)
        })
    }

    /// Image associations go with the row (`ON DELETE CASCADE`).
    pub fn delete_status(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute("DELETE FROM status_messages WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }

    /// Status messages owned by any of `profile_ids`, newest first.
    /// Equal timestamps fall back to insertion order, newest first.
    ///
    /// Ids are bound in chunks of [`MAX_BOUND_IDS`] to stay under SQLite's
    /// host-parameter limit; the chunks are merged before returning.
    pub fn get_statuses_by_profiles(&self, profile_ids: &[String]) -> Result<Vec<StatusRow>> {
        if profile_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let mut rows: Vec<(String, i64, StatusRow)> = Vec::new();
            for chunk in profile_ids.chunks(MAX_BOUND_IDS) {
                let sql = format!(
                    "SELECT id, profile_id, message, created_at, rowid FROM status_messages
                     WHERE profile_id IN ({})",
                    placeholders(chunk.len())
                );

                let mut stmt = conn.prepare(&sql)?;
                let fetched = stmt.query_map(params_from_iter(chunk.iter()), |row| {
                    let status = status_from_row(row)?;
                    Ok((status.created_at.clone(), row.get::<_, i64>(4)?, status))
                })?;
                for row in fetched {
                    rows.push(row?);
                }
            }

            rows.sort_by(|a, b| (&b.0, b.1).cmp(&(&a.0, a.1)));

            debug!(profiles = profile_ids.len(), statuses = rows.len(), "Fetched status messages");
            Ok(rows.into_iter().map(|(_, _, status)| status).collect())
        })
    }

    // -- Images --

    /// Record an uploaded image and link it to `status_id` at `position`.
    /// Both rows commit together or not at all.
    pub fn insert_attached_image(&self, status_id: &str, row: &ImageRow, position: i64) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.unchecked_transaction()?;
            tx.execute(
                "INSERT INTO images (id, profile_id, file_ref, caption, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![row.id, row.profile_id, row.file_ref, row.caption, row.created_at],
            )?;
            tx.execute(
                "INSERT INTO status_images (status_id, image_id, position) VALUES (?1, ?2, ?3)",
                params![status_id, row.id, position],
            )?;
            tx.commit()?;
            Ok(())
        })
    }

    /// Number of image rows uploaded by `profile_id`, linked or not.
    pub fn count_images_by_profile(&self, profile_id: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row("SELECT COUNT(*) FROM images WHERE profile_id = ?1", [profile_id], |row| {
                row.get(0)
            })?;
            Ok(count)
        })
    }

    /// Batch-fetch attached images for a set of status ids, in attachment
    /// order within each status. Ids are bound in chunks of [`MAX_BOUND_IDS`].
    pub fn get_images_for_statuses(&self, status_ids: &[String]) -> Result<Vec<StatusImageRow>> {
        if status_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let mut rows = Vec::new();
            for chunk in status_ids.chunks(MAX_BOUND_IDS) {
                let sql = format!(
                    "SELECT si.status_id, si.position, i.id, i.profile_id, i.file_ref, i.caption, i.created_at
                     FROM status_images si
                     JOIN images i ON i.id = si.image_id
                     WHERE si.status_id IN ({})
                     ORDER BY si.status_id, si.position",
                    placeholders(chunk.len())
                );

                let mut stmt = conn.prepare(&sql)?;
                let fetched = stmt.query_map(params_from_iter(chunk.iter()), |row| {
                    Ok(StatusImageRow {
                        status_id: row.get(0)?,
                        position: row.get(1)?,
                        image: ImageRow {
                            id: row.get(2)?,
                            profile_id: row.get(3)?,
                            file_ref: row.get(4)?,
                            caption: row.get(5)?,
                            created_at: row.get(6)?,
                        },
                    })
                })?;
                for row in fetched {
                    rows.push(row?);
                }
            }

            Ok(rows)
        })
    }

    // -- Friendships --

    /// Looks up a canonical pair; callers pass `profile1 < profile2`.
    pub fn get_friendship(&self, profile1: &str, profile2: &str) -> Result<Option<FriendshipRow>> {
        self.with_conn(|conn| query_friendship(conn, profile1, profile2))
    }

    /// Insert a canonical pair unless it already exists.
    /// The lookup and the insert share one lock acquisition, and the UNIQUE
    /// constraint catches anything that slips past. Returns false on a duplicate.
    pub fn insert_friendship(&self, row: &FriendshipRow) -> Result<bool> {
        self.with_conn_mut(|conn| {
            if query_friendship(conn, &row.profile1, &row.profile2)?.is_some() {
                return Ok(false);
            }

            match conn.execute(
                "INSERT INTO friendships (profile1, profile2, created_at) VALUES (?1, ?2, ?3)",
                params![row.profile1, row.profile2, row.created_at],
            ) {
                Ok(_) => Ok(true),
                Err(e) if is_unique_violation(&e) => Ok(false),
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Profiles on the other end of every edge touching `profile_id`,
    /// whichever column it was stored in.
    pub fn get_friend_profiles(&self, profile_id: &str) -> Result<Vec<ProfileRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {cols} FROM profiles WHERE id IN (SELECT profile2 FROM friendships WHERE profile1 = ?1)
                 UNION
                 SELECT {cols} FROM profiles WHERE id IN (SELECT profile1 FROM friendships WHERE profile2 = ?1)
                 ORDER BY last_name, first_name, id",
                cols = PROFILE_COLUMNS
            );

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([profile_id], profile_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn query_profile(conn: &Connection, column: &str, value: &str) -> Result<Option<ProfileRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM profiles WHERE {} = ?1",
        PROFILE_COLUMNS, column
    ))?;

    let row = stmt.query_row([value], profile_from_row).optional()?;

    Ok(row)
}

fn query_friendship(conn: &Connection, profile1: &str, profile2: &str) -> Result<Option<FriendshipRow>> {
    let row = conn
        .query_row(
            "SELECT profile1, profile2, created_at FROM friendships WHERE profile1 = ?1 AND profile2 = ?2",
            [profile1, profile2],
            |row| {
                Ok(FriendshipRow {
                    profile1: row.get(0)?,
                    profile2: row.get(1)?,
                    created_at: row.get(2)?,
                })
            },
        )
        .optional()?;

    Ok(row)
}

fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<ProfileRow> {
    Ok(ProfileRow {
        id: row.get(0)?,
        account_id: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        city: row.get(4)?,
        email: row.get(5)?,
        image_url: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn status_from_row(row: &Row<'_>) -> rusqlite::Result<StatusRow> {
    Ok(StatusRow {
        id: row.get(0)?,
        profile_id: row.get(1)?,
        message: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn placeholders(n: usize) -> String {
    (1..=n).map(|i| format!("?{}", i)).collect::<Vec<_>>().join(", ")
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}
