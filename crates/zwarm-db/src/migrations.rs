use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            email       TEXT NOT NULL UNIQUE,
            username    TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            emoji       TEXT,
            bio         TEXT,
            skills      TEXT NOT NULL DEFAULT '[]',
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS missions (
            id          TEXT PRIMARY KEY,
            title       TEXT NOT NULL,
            description TEXT NOT NULL,
            emoji       TEXT,
            tags        TEXT NOT NULL DEFAULT '[]',
            status      TEXT NOT NULL DEFAULT 'OPEN',
            owner_id    TEXT NOT NULL REFERENCES users(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_missions_owner
            ON missions(owner_id, created_at);

        -- One row per (mission, user) pair; concurrent joins race on this
        -- primary key rather than on application-level checks.
        CREATE TABLE IF NOT EXISTS mission_participants (
            mission_id  TEXT NOT NULL REFERENCES missions(id) ON DELETE CASCADE,
            user_id     TEXT NOT NULL REFERENCES users(id),
            joined_at   TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (mission_id, user_id)
        );

        CREATE INDEX IF NOT EXISTS idx_participants_user
            ON mission_participants(user_id, joined_at);

        CREATE TABLE IF NOT EXISTS mission_tasks (
            id            TEXT PRIMARY KEY,
            text          TEXT NOT NULL,
            emoji         TEXT,
            is_completed  INTEGER NOT NULL DEFAULT 0,
            mission_id    TEXT NOT NULL REFERENCES missions(id) ON DELETE CASCADE,
            creator_id    TEXT NOT NULL REFERENCES users(id),
            created_at    TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_tasks_mission
            ON mission_tasks(mission_id, created_at);

        CREATE TABLE IF NOT EXISTS mission_comments (
            id          TEXT PRIMARY KEY,
            content     TEXT NOT NULL,
            mission_id  TEXT NOT NULL REFERENCES missions(id) ON DELETE CASCADE,
            user_id     TEXT NOT NULL REFERENCES users(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_comments_mission
            ON mission_comments(mission_id, created_at);

        CREATE TABLE IF NOT EXISTS mission_resources (
            id          TEXT PRIMARY KEY,
            title       TEXT NOT NULL,
            url         TEXT NOT NULL,
            description TEXT,
            emoji       TEXT,
            mission_id  TEXT NOT NULL REFERENCES missions(id) ON DELETE CASCADE,
            user_id     TEXT NOT NULL REFERENCES users(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_resources_mission
            ON mission_resources(mission_id, created_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
