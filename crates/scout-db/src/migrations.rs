use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE profiles (
                id              TEXT PRIMARY KEY,
                username        TEXT NOT NULL UNIQUE,
                display_name    TEXT NOT NULL,
                bio             TEXT,
                reputation      INTEGER NOT NULL DEFAULT 0 CHECK (reputation >= 0),
                created_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
            );

            CREATE TABLE requests (
                id                      TEXT PRIMARY KEY,
                author_id               TEXT NOT NULL REFERENCES profiles(id),
                title                   TEXT NOT NULL,
                category                TEXT NOT NULL,
                description             TEXT,
                status                  TEXT NOT NULL DEFAULT 'open'
                                            CHECK (status IN ('open', 'closed', 'solved')),
                winning_submission_id   TEXT REFERENCES submissions(id),
                created_at              TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
                CHECK ((status = 'solved') = (winning_submission_id IS NOT NULL))
            );

            CREATE INDEX idx_requests_status
                ON requests(status, created_at);

            CREATE TABLE submissions (
                id              TEXT PRIMARY KEY,
                request_id      TEXT NOT NULL REFERENCES requests(id),
                author_id       TEXT NOT NULL REFERENCES profiles(id),
                link            TEXT NOT NULL,
                title           TEXT,
                price_cents     INTEGER CHECK (price_cents IS NULL OR price_cents >= 0),
                note            TEXT,
                created_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
            );

            CREATE INDEX idx_submissions_request
                ON submissions(request_id, created_at);

            CREATE TABLE votes (
                id              TEXT PRIMARY KEY,
                submission_id   TEXT NOT NULL REFERENCES submissions(id),
                user_id         TEXT NOT NULL REFERENCES profiles(id),
                value           INTEGER NOT NULL CHECK (value IN (1, -1)),
                created_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
                UNIQUE(submission_id, user_id)
            );

            CREATE TABLE favorites (
                id              TEXT PRIMARY KEY,
                request_id      TEXT NOT NULL REFERENCES requests(id),
                user_id         TEXT NOT NULL REFERENCES profiles(id),
                created_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
                UNIQUE(request_id, user_id)
            );

            CREATE INDEX idx_favorites_user
                ON favorites(user_id, created_at);

            CREATE TABLE notifications (
                id              TEXT PRIMARY KEY,
                recipient_id    TEXT NOT NULL REFERENCES profiles(id),
                read            INTEGER NOT NULL DEFAULT 0 CHECK (read IN (0, 1)),
                payload         TEXT NOT NULL,
                created_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
            );

            CREATE INDEX idx_notifications_recipient
                ON notifications(recipient_id, read, created_at);

            CREATE TABLE reports (
                id              TEXT PRIMARY KEY,
                reporter_id     TEXT NOT NULL REFERENCES profiles(id),
                target_type     TEXT NOT NULL CHECK (target_type IN ('request', 'submission')),
                target_id       TEXT NOT NULL,
                reason          TEXT NOT NULL CHECK (length(trim(reason)) > 0),
                created_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
            );

            CREATE INDEX idx_reports_target
                ON reports(target_type, target_id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
