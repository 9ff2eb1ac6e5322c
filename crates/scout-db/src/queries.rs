use crate::models::{
    NotificationRow, ProfileRow, ReportRow, RequestRow, ScoredSubmissionRow, SubmissionRow, VoteRow,
};
use anyhow::Result;
use rusqlite::{Connection, Row};

// Column lists shared by the row mappers below.
const PROFILE_COLUMNS: &str = "id, username, display_name, bio, reputation, created_at";
const REQUEST_COLUMNS: &str =
    "id, author_id, title, category, description, status, winning_submission_id, created_at";
const SUBMISSION_COLUMNS: &str =
    "id, request_id, author_id, link, title, price_cents, note, created_at";
const NOTIFICATION_COLUMNS: &str = "id, recipient_id, read, payload, created_at";

// -- Profiles --

/// Insert a profile unless it would clash with an existing row, either on
/// `id` or on `username`. Returns whether a row was written.
pub fn insert_profile_if_absent(
    conn: &Connection,
    id: &str,
    username: &str,
    display_name: &str,
) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT INTO profiles (id, username, display_name) VALUES (?1, ?2, ?3)
         ON CONFLICT DO NOTHING",
        (id, username, display_name),
    )?;
    Ok(inserted == 1)
}

pub fn get_profile(conn: &Connection, id: &str) -> Result<Option<ProfileRow>> {
    let sql = format!("SELECT {} FROM profiles WHERE id = ?1", PROFILE_COLUMNS);
    conn.query_row(&sql, [id], map_profile).optional()
}

/// Add a non-negative `amount` to a profile's reputation. Changes nothing
/// (and returns 0) when the profile is missing or the sum would overflow.
pub fn add_reputation(conn: &Connection, id: &str, amount: i64) -> Result<usize> {
    if amount < 0 {
        anyhow::bail!("Reputation award must not be negative, got {}", amount);
    }
    let updated = conn.execute(
        "UPDATE profiles SET reputation = reputation + ?2
         WHERE id = ?1 AND reputation <= 9223372036854775807 - ?2",
        rusqlite::params![id, amount],
    )?;
    Ok(updated)
}

// -- Requests --

pub fn insert_request(
    conn: &Connection,
    id: &str,
    author_id: &str,
    title: &str,
    category: &str,
    description: Option<&str>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO requests (id, author_id, title, category, description)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![id, author_id, title, category, description],
    )?;
    Ok(())
}

pub fn get_request(conn: &Connection, id: &str) -> Result<Option<RequestRow>> {
    let sql = format!("SELECT {} FROM requests WHERE id = ?1", REQUEST_COLUMNS);
    conn.query_row(&sql, [id], map_request).optional()
}

/// Newest first. `None` filters match everything.
pub fn list_requests(
    conn: &Connection,
    status: Option<&str>,
    category: Option<&str>,
    limit: u32,
) -> Result<Vec<RequestRow>> {
    let sql = format!(
        "SELECT {} FROM requests
         WHERE (?1 IS NULL OR status = ?1)
           AND (?2 IS NULL OR category = ?2)
         ORDER BY created_at DESC, rowid DESC
         LIMIT ?3",
        REQUEST_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params![status, category, limit], map_request)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Compare-and-set `open -> closed`. Returns the number of rows changed (0 or 1).
pub fn close_open_request(conn: &Connection, id: &str) -> Result<usize> {
    let updated = conn.execute(
        "UPDATE requests SET status = 'closed' WHERE id = ?1 AND status = 'open'",
        [id],
    )?;
    Ok(updated)
}

/// Compare-and-set `open -> solved`. Returns the number of rows changed (0 or 1).
pub fn solve_open_request(conn: &Connection, id: &str, submission_id: &str) -> Result<usize> {
    let updated = conn.execute(
        "UPDATE requests SET status = 'solved', winning_submission_id = ?2
         WHERE id = ?1 AND status = 'open'",
        (id, submission_id),
    )?;
    Ok(updated)
}

// -- Submissions --

#[allow(clippy::too_many_arguments)]
pub fn insert_submission(
    conn: &Connection,
    id: &str,
    request_id: &str,
    author_id: &str,
    link: &str,
    title: Option<&str>,
    price_cents: Option<i64>,
    note: Option<&str>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO submissions (id, request_id, author_id, link, title, price_cents, note)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![id, request_id, author_id, link, title, price_cents, note],
    )?;
    Ok(())
}

pub fn get_submission(conn: &Connection, id: &str) -> Result<Option<SubmissionRow>> {
    let sql = format!("SELECT {} FROM submissions WHERE id = ?1", SUBMISSION_COLUMNS);
    conn.query_row(&sql, [id], map_submission).optional()
}

/// Submissions of a request with their scores and `viewer_id`'s vote,
/// highest score first, oldest first among ties.
pub fn list_scored_submissions(
    conn: &Connection,
    request_id: &str,
    viewer_id: &str,
) -> Result<Vec<ScoredSubmissionRow>> {
    // Aggregates in correlated subqueries keep the main query free of GROUP BY
    let mut stmt = conn.prepare(
        "SELECT s.id, s.request_id, s.author_id, s.link, s.title, s.price_cents, s.note, s.created_at,
                (SELECT COALESCE(SUM(v.value), 0) FROM votes v WHERE v.submission_id = s.id) AS score,
                (SELECT v.value FROM votes v WHERE v.submission_id = s.id AND v.user_id = ?2)
         FROM submissions s
         WHERE s.request_id = ?1
         ORDER BY score DESC, s.created_at ASC, s.rowid ASC",
    )?;

    let rows = stmt
        .query_map((request_id, viewer_id), |row| {
            Ok(ScoredSubmissionRow {
                submission: map_submission(row)?,
                score: row.get(8)?,
                viewer_vote: row.get(9)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

// -- Votes --

pub fn get_vote(conn: &Connection, submission_id: &str, user_id: &str) -> Result<Option<VoteRow>> {
    conn.query_row(
        "SELECT id, submission_id, user_id, value FROM votes
         WHERE submission_id = ?1 AND user_id = ?2",
        (submission_id, user_id),
        |row| {
            Ok(VoteRow {
                id: row.get(0)?,
                submission_id: row.get(1)?,
                user_id: row.get(2)?,
                value: row.get(3)?,
            })
        },
    )
    .optional()
}

pub fn insert_vote(
    conn: &Connection,
    id: &str,
    submission_id: &str,
    user_id: &str,
    value: i64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO votes (id, submission_id, user_id, value) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![id, submission_id, user_id, value],
    )?;
    Ok(())
}

pub fn update_vote(conn: &Connection, submission_id: &str, user_id: &str, value: i64) -> Result<usize> {
    let updated = conn.execute(
        "UPDATE votes SET value = ?3 WHERE submission_id = ?1 AND user_id = ?2",
        rusqlite::params![submission_id, user_id, value],
    )?;
    Ok(updated)
}

pub fn delete_vote(conn: &Connection, submission_id: &str, user_id: &str) -> Result<usize> {
    let deleted = conn.execute(
        "DELETE FROM votes WHERE submission_id = ?1 AND user_id = ?2",
        (submission_id, user_id),
    )?;
    Ok(deleted)
}

pub fn submission_score(conn: &Connection, submission_id: &str) -> Result<i64> {
    let score = conn.query_row(
        "SELECT COALESCE(SUM(value), 0) FROM votes WHERE submission_id = ?1",
        [submission_id],
        |row| row.get(0),
    )?;
    Ok(score)
}

// -- Favorites --

pub fn get_favorite_id(conn: &Connection, request_id: &str, user_id: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT id FROM favorites WHERE request_id = ?1 AND user_id = ?2",
        (request_id, user_id),
        |row| row.get(0),
    )
    .optional()
}

pub fn insert_favorite(conn: &Connection, id: &str, request_id: &str, user_id: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO favorites (id, request_id, user_id) VALUES (?1, ?2, ?3)",
        (id, request_id, user_id),
    )?;
    Ok(())
}

pub fn delete_favorite(conn: &Connection, request_id: &str, user_id: &str) -> Result<usize> {
    let deleted = conn.execute(
        "DELETE FROM favorites WHERE request_id = ?1 AND user_id = ?2",
        (request_id, user_id),
    )?;
    Ok(deleted)
}

/// Requests `user_id` has favorited, most recently favorited first.
pub fn list_favorite_requests(conn: &Connection, user_id: &str) -> Result<Vec<RequestRow>> {
    let mut stmt = conn.prepare(
        "SELECT r.id, r.author_id, r.title, r.category, r.description, r.status,
                r.winning_submission_id, r.created_at
         FROM favorites f
         JOIN requests r ON r.id = f.request_id
         WHERE f.user_id = ?1
         ORDER BY f.created_at DESC, f.rowid DESC",
    )?;
    let rows = stmt
        .query_map([user_id], map_request)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// -- Notifications --

pub fn insert_notification(conn: &Connection, id: &str, recipient_id: &str, payload: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO notifications (id, recipient_id, payload) VALUES (?1, ?2, ?3)",
        (id, recipient_id, payload),
    )?;
    Ok(())
}

pub fn get_notification(conn: &Connection, id: &str) -> Result<Option<NotificationRow>> {
    let sql = format!("SELECT {} FROM notifications WHERE id = ?1", NOTIFICATION_COLUMNS);
    conn.query_row(&sql, [id], map_notification).optional()
}

pub fn mark_notification_read(conn: &Connection, id: &str) -> Result<usize> {
    let updated = conn.execute("UPDATE notifications SET read = 1 WHERE id = ?1", [id])?;
    Ok(updated)
}

pub fn mark_all_notifications_read(conn: &Connection, recipient_id: &str) -> Result<usize> {
    let updated = conn.execute(
        "UPDATE notifications SET read = 1 WHERE recipient_id = ?1 AND read = 0",
        [recipient_id],
    )?;
    Ok(updated)
}

pub fn list_notifications(
    conn: &Connection,
    recipient_id: &str,
    unread_only: bool,
    limit: u32,
) -> Result<Vec<NotificationRow>> {
    let sql = format!(
        "SELECT {} FROM notifications
         WHERE recipient_id = ?1 AND (?2 = 0 OR read = 0)
         ORDER BY created_at DESC, rowid DESC
         LIMIT ?3",
        NOTIFICATION_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params![recipient_id, unread_only, limit], map_notification)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn count_unread_notifications(conn: &Connection, recipient_id: &str) -> Result<u64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM notifications WHERE recipient_id = ?1 AND read = 0",
        [recipient_id],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}

// -- Reports --

pub fn insert_report(
    conn: &Connection,
    id: &str,
    reporter_id: &str,
    target_type: &str,
    target_id: &str,
    reason: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO reports (id, reporter_id, target_type, target_id, reason)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (id, reporter_id, target_type, target_id, reason),
    )?;
    Ok(())
}

/// Reports filed against one target, oldest first.
pub fn list_reports_for_target(
    conn: &Connection,
    target_type: &str,
    target_id: &str,
) -> Result<Vec<ReportRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, reporter_id, target_type, target_id, reason, created_at FROM reports
         WHERE target_type = ?1 AND target_id = ?2
         ORDER BY created_at ASC, rowid ASC",
    )?;
    let rows = stmt
        .query_map((target_type, target_id), |row| {
            Ok(ReportRow {
                id: row.get(0)?,
                reporter_id: row.get(1)?,
                target_type: row.get(2)?,
                target_id: row.get(3)?,
                reason: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// -- Row mappers --

fn map_profile(row: &Row<'_>) -> rusqlite::Result<ProfileRow> {
    Ok(ProfileRow {
        id: row.get(0)?,
        username: row.get(1)?,
        display_name: row.get(2)?,
        bio: row.get(3)?,
        reputation: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn map_request(row: &Row<'_>) -> rusqlite::Result<RequestRow> {
    Ok(RequestRow {
        id: row.get(0)?,
        author_id: row.get(1)?,
        title: row.get(2)?,
        category: row.get(3)?,
        description: row.get(4)?,
        status: row.get(5)?,
        winning_submission_id: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn map_submission(row: &Row<'_>) -> rusqlite::Result<SubmissionRow> {
    Ok(SubmissionRow {
        id: row.get(0)?,
        request_id: row.get(1)?,
        author_id: row.get(2)?,
        link: row.get(3)?,
        title: row.get(4)?,
        price_cents: row.get(5)?,
        note: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn map_notification(row: &Row<'_>) -> rusqlite::Result<NotificationRow> {
    Ok(NotificationRow {
        id: row.get(0)?,
        recipient_id: row.get(1)?,
        read: row.get(2)?,
        payload: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
