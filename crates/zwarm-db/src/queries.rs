use crate::Database;
use crate::models::{
    CommentRow, MissionCardRow, MissionRow, MissionWithOwnerRow, ParticipantRow, ResourceRow,
    TaskRow, UserRow,
};
use anyhow::Result;
use rusqlite::{Connection, Row};

impl Database {
    // -- Users --

    pub fn create_user(&self, id: &str, email: &str, username: &str, password_hash: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (id, email, username, password) VALUES (?1, ?2, ?3, ?4)",
                (id, email, username, password_hash),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    /// Partial settings update: a None leaves the column untouched.
    pub fn update_user_settings(
        &self,
        id: &str,
        username: Option<&str>,
        emoji: Option<&str>,
        bio: Option<&str>,
        skills_json: Option<&str>,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE users SET
                     username   = COALESCE(?2, username),
                     emoji      = COALESCE(?3, emoji),
                     bio        = COALESCE(?4, bio),
                     skills     = COALESCE(?5, skills),
                     updated_at = datetime('now')
                 WHERE id = ?1",
                (id, username, emoji, bio, skills_json),
            )?;
            Ok(())
        })
    }

    // -- Missions --

    pub fn insert_mission(
        &self,
        id: &str,
        title: &str,
        description: &str,
        emoji: Option<&str>,
        tags_json: &str,
        owner_id: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO missions (id, title, description, emoji, tags, owner_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                (id, title, description, emoji, tags_json, owner_id),
            )?;
            Ok(())
        })
    }

    pub fn get_mission(&self, id: &str) -> Result<Option<MissionRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, description, emoji, tags, status, owner_id, created_at, updated_at
                 FROM missions WHERE id = ?1",
            )?;
            let row = stmt.query_row([id], map_mission_row).optional()?;
            Ok(row)
        })
    }

    pub fn get_mission_with_owner(&self, id: &str) -> Result<Option<MissionWithOwnerRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT m.id, m.title, m.description, m.emoji, m.tags, m.status, m.owner_id,
                        m.created_at, m.updated_at, u.username, u.emoji
                 FROM missions m
                 JOIN users u ON m.owner_id = u.id
                 WHERE m.id = ?1",
            )?;
            let row = stmt.query_row([id], map_mission_with_owner_row).optional()?;
            Ok(row)
        })
    }

    /// All missions, newest first, with owner summaries in a single query.
    pub fn list_missions(&self) -> Result<Vec<MissionWithOwnerRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT m.id, m.title, m.description, m.emoji, m.tags, m.status, m.owner_id,
                        m.created_at, m.updated_at, u.username, u.emoji
                 FROM missions m
                 JOIN users u ON m.owner_id = u.id
                 ORDER BY m.created_at DESC, m.id",
            )?;
            let rows = stmt
                .query_map([], map_mission_with_owner_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Updates mission fields; owner_id is never touched. A None emoji or
    /// status leaves the column unchanged, tags are always replaced.
    pub fn update_mission(
        &self,
        id: &str,
        title: &str,
        description: &str,
        emoji: Option<&str>,
        tags_json: &str,
        status: Option<&str>,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE missions SET
                     title       = ?2,
                     description = ?3,
                     emoji       = COALESCE(?4, emoji),
                     tags        = ?5,
                     status      = COALESCE(?6, status),
                     updated_at  = datetime('now')
                 WHERE id = ?1",
                (id, title, description, emoji, tags_json, status),
            )?;
            Ok(())
        })
    }

    /// Cascades to participants, tasks, comments and resources via FKs.
    pub fn delete_mission(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute("DELETE FROM missions WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }

    // -- Participants --

    /// Returns true if a new row was inserted, false if the pair already
    /// existed. Races between concurrent joins resolve on the composite
    /// primary key, so a lost race is the benign already-a-member outcome.
    pub fn insert_participant(&self, mission_id: &str, user_id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "INSERT OR IGNORE INTO mission_participants (mission_id, user_id) VALUES (?1, ?2)",
                (mission_id, user_id),
            )?;
            Ok(changed > 0)
        })
    }

    /// Returns false when the caller held no participant row.
    pub fn delete_participant(&self, mission_id: &str, user_id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "DELETE FROM mission_participants WHERE mission_id = ?1 AND user_id = ?2",
                (mission_id, user_id),
            )?;
            Ok(changed > 0)
        })
    }

    pub fn is_participant(&self, mission_id: &str, user_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row(
                    "SELECT 1 FROM mission_participants WHERE mission_id = ?1 AND user_id = ?2",
                    (mission_id, user_id),
                    |_| Ok(()),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    pub fn list_participants(&self, mission_id: &str) -> Result<Vec<ParticipantRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT p.mission_id, p.user_id, u.username, u.emoji, p.joined_at
                 FROM mission_participants p
                 JOIN users u ON p.user_id = u.id
                 WHERE p.mission_id = ?1
                 ORDER BY p.joined_at ASC, p.user_id",
            )?;
            let rows = stmt
                .query_map([mission_id], |row| {
                    Ok(ParticipantRow {
                        mission_id: row.get(0)?,
                        user_id: row.get(1)?,
                        username: row.get(2)?,
                        user_emoji: row.get(3)?,
                        joined_at: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_participants(&self, mission_id: &str) -> Result<u32> {
        self.with_conn(|conn| {
            let count: u32 = conn.query_row(
                "SELECT COUNT(*) FROM mission_participants WHERE mission_id = ?1",
                [mission_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    // -- Tasks --

    pub fn insert_task(
        &self,
        id: &str,
        mission_id: &str,
        creator_id: &str,
        text: &str,
        emoji: Option<&str>,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO mission_tasks (id, text, emoji, mission_id, creator_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                (id, text, emoji, mission_id, creator_id),
            )?;
            Ok(())
        })
    }

    pub fn get_task(&self, id: &str) -> Result<Option<TaskRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT t.id, t.text, t.emoji, t.is_completed, t.mission_id, t.creator_id,
                        u.username, u.emoji, t.created_at
                 FROM mission_tasks t
                 JOIN users u ON t.creator_id = u.id
                 WHERE t.id = ?1",
            )?;
            let row = stmt.query_row([id], map_task_row).optional()?;
            Ok(row)
        })
    }

    /// Partial task update: a None leaves the column untouched.
    pub fn update_task(&self, id: &str, text: Option<&str>, is_completed: Option<bool>) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE mission_tasks SET
                     text         = COALESCE(?2, text),
                     is_completed = COALESCE(?3, is_completed)
                 WHERE id = ?1",
                (id, text, is_completed),
            )?;
            Ok(())
        })
    }

    pub fn delete_task(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute("DELETE FROM mission_tasks WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }

    pub fn list_tasks(&self, mission_id: &str) -> Result<Vec<TaskRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT t.id, t.text, t.emoji, t.is_completed, t.mission_id, t.creator_id,
                        u.username, u.emoji, t.created_at
                 FROM mission_tasks t
                 JOIN users u ON t.creator_id = u.id
                 WHERE t.mission_id = ?1
                 ORDER BY t.created_at DESC, t.id",
            )?;
            let rows = stmt
                .query_map([mission_id], map_task_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Comments --

    pub fn insert_comment(&self, id: &str, mission_id: &str, user_id: &str, content: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO mission_comments (id, content, mission_id, user_id)
                 VALUES (?1, ?2, ?3, ?4)",
                (id, content, mission_id, user_id),
            )?;
            Ok(())
        })
    }

    pub fn list_comments(&self, mission_id: &str) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.content, c.mission_id, c.user_id, u.username, u.emoji, c.created_at
                 FROM mission_comments c
                 JOIN users u ON c.user_id = u.id
                 WHERE c.mission_id = ?1
                 ORDER BY c.created_at ASC, c.id",
            )?;
            let rows = stmt
                .query_map([mission_id], |row| {
                    Ok(CommentRow {
                        id: row.get(0)?,
                        content: row.get(1)?,
                        mission_id: row.get(2)?,
                        user_id: row.get(3)?,
                        username: row.get(4)?,
                        user_emoji: row.get(5)?,
                        created_at: row.get(6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Resources --

    pub fn insert_resource(
        &self,
        id: &str,
        mission_id: &str,
        user_id: &str,
        title: &str,
        url: &str,
        description: Option<&str>,
        emoji: Option<&str>,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO mission_resources (id, title, url, description, emoji, mission_id, user_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                (id, title, url, description, emoji, mission_id, user_id),
            )?;
            Ok(())
        })
    }

    pub fn get_resource(&self, id: &str) -> Result<Option<ResourceRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT r.id, r.title, r.url, r.description, r.emoji, r.mission_id, r.user_id,
                        u.username, u.emoji, r.created_at
                 FROM mission_resources r
                 JOIN users u ON r.user_id = u.id
                 WHERE r.id = ?1",
            )?;
            let row = stmt.query_row([id], map_resource_row).optional()?;
            Ok(row)
        })
    }

    pub fn delete_resource(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute("DELETE FROM mission_resources WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }

    pub fn list_resources(&self, mission_id: &str) -> Result<Vec<ResourceRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT r.id, r.title, r.url, r.description, r.emoji, r.mission_id, r.user_id,
                        u.username, u.emoji, r.created_at
                 FROM mission_resources r
                 JOIN users u ON r.user_id = u.id
                 WHERE r.mission_id = ?1
                 ORDER BY r.created_at ASC, r.id",
            )?;
            let rows = stmt
                .query_map([mission_id], map_resource_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Mission cards --

    pub fn list_owned_mission_cards(&self, user_id: &str) -> Result<Vec<MissionCardRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT m.id, m.title, m.description, m.emoji, m.tags, m.status,
                        (SELECT COUNT(*) FROM mission_participants p WHERE p.mission_id = m.id),
                        m.created_at
                 FROM missions m
                 WHERE m.owner_id = ?1
                 ORDER BY m.created_at DESC, m.id",
            )?;
            let rows = stmt
                .query_map([user_id], map_mission_card_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Missions the user has joined, most recent join first.
    pub fn list_joined_mission_cards(&self, user_id: &str) -> Result<Vec<MissionCardRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT m.id, m.title, m.description, m.emoji, m.tags, m.status,
                        (SELECT COUNT(*) FROM mission_participants c WHERE c.mission_id = m.id),
                        m.created_at
                 FROM mission_participants p
                 JOIN missions m ON p.mission_id = m.id
                 WHERE p.user_id = ?1
                 ORDER BY p.joined_at DESC, m.id",
            )?;
            let rows = stmt
                .query_map([user_id], map_mission_card_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    // column is one of our own identifiers, never caller input
    let sql = format!(
        "SELECT id, email, username, password, emoji, bio, skills, created_at, updated_at
         FROM users WHERE {} = ?1",
        column
    );
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                email: row.get(1)?,
                username: row.get(2)?,
                password: row.get(3)?,
                emoji: row.get(4)?,
                bio: row.get(5)?,
                skills: row.get(6)?,
                created_at: row.get(7)?,
                updated_at: row.get(8)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn map_mission_row(row: &Row<'_>) -> rusqlite::Result<MissionRow> {
    Ok(MissionRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        emoji: row.get(3)?,
        tags: row.get(4)?,
        status: row.get(5)?,
        owner_id: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn map_mission_with_owner_row(row: &Row<'_>) -> rusqlite::Result<MissionWithOwnerRow> {
    Ok(MissionWithOwnerRow {
        mission: map_mission_row(row)?,
        owner_username: row.get(9)?,
        owner_emoji: row.get(10)?,
    })
}

fn map_mission_card_row(row: &Row<'_>) -> rusqlite::Result<MissionCardRow> {
    Ok(MissionCardRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        emoji: row.get(3)?,
        tags: row.get(4)?,
        status: row.get(5)?,
        participant_count: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn map_task_row(row: &Row<'_>) -> rusqlite::Result<TaskRow> {
    Ok(TaskRow {
        id: row.get(0)?,
        text: row.get(1)?,
        emoji: row.get(2)?,
        is_completed: row.get(3)?,
        mission_id: row.get(4)?,
        creator_id: row.get(5)?,
        creator_username: row.get(6)?,
        creator_emoji: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn map_resource_row(row: &Row<'_>) -> rusqlite::Result<ResourceRow> {
    Ok(ResourceRow {
        id: row.get(0)?,
        title: row.get(1)?,
        url: row.get(2)?,
        description: row.get(3)?,
        emoji: row.get(4)?,
        mission_id: row.get(5)?,
        user_id: row.get(6)?,
        username: row.get(7)?,
        user_emoji: row.get(8)?,
        created_at: row.get(9)?,
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

#[cfg(test)]
mod tests {
    use super::*;

    fn db_with_users() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "a@example.com", "alice", "hash-a").unwrap();
        db.create_user("u2", "b@example.com", "bob", "hash-b").unwrap();
        db.create_user("u3", "c@example.com", "carol", "hash-c").unwrap();
        db
    }

    fn seed_mission(db: &Database, id: &str, owner: &str) {
        db.insert_mission(id, "Build a Rocket", "Reach 1000ft with a model rocket", Some("🚀"), "[\"aerospace\"]", owner)
            .unwrap();
    }

    fn table_count(db: &Database, table: &str, mission_id: &str) -> i64 {
        db.with_conn(|conn| {
            let sql = format!("SELECT COUNT(*) FROM {} WHERE mission_id = ?1", table);
            let count = conn.query_row(&sql, [mission_id], |row| row.get(0))?;
            Ok(count)
        })
        .unwrap()
    }

    #[test]
    fn join_is_idempotent() {
        let db = db_with_users();
        seed_mission(&db, "m1", "u1");

        assert!(db.insert_participant("m1", "u2").unwrap());
        assert!(!db.insert_participant("m1", "u2").unwrap());
        assert_eq!(db.count_participants("m1").unwrap(), 1);
    }

    #[test]
    fn join_leave_join_leaves_single_row() {
        let db = db_with_users();
        seed_mission(&db, "m1", "u1");

        assert!(db.insert_participant("m1", "u2").unwrap());
        assert!(db.delete_participant("m1", "u2").unwrap());
        assert!(db.insert_participant("m1", "u2").unwrap());
        assert_eq!(db.count_participants("m1").unwrap(), 1);
        assert!(db.is_participant("m1", "u2").unwrap());
    }

    #[test]
    fn leave_without_membership_reports_missing() {
        let db = db_with_users();
        seed_mission(&db, "m1", "u1");

        assert!(!db.delete_participant("m1", "u2").unwrap());
    }

    #[test]
    fn mission_delete_cascades_to_children() {
        let db = db_with_users();
        seed_mission(&db, "m1", "u1");
        db.insert_participant("m1", "u2").unwrap();
        db.insert_task("t1", "m1", "u1", "Create blueprint", None).unwrap();
        db.insert_comment("c1", "m1", "u3", "Count me in").unwrap();
        db.insert_resource("r1", "m1", "u1", "NAR safety code", "https://nar.org", None, None)
            .unwrap();

        assert!(db.delete_mission("m1").unwrap());

        assert!(db.get_mission("m1").unwrap().is_none());
        assert_eq!(table_count(&db, "mission_participants", "m1"), 0);
        assert_eq!(table_count(&db, "mission_tasks", "m1"), 0);
        assert_eq!(table_count(&db, "mission_comments", "m1"), 0);
        assert_eq!(table_count(&db, "mission_resources", "m1"), 0);
    }

    #[test]
    fn update_mission_never_changes_owner() {
        let db = db_with_users();
        seed_mission(&db, "m1", "u1");

        db.update_mission("m1", "New title", "A longer new description", None, "[]", Some("COMPLETED"))
            .unwrap();

        let mission = db.get_mission("m1").unwrap().unwrap();
        assert_eq!(mission.owner_id, "u1");
        assert_eq!(mission.title, "New title");
        assert_eq!(mission.status, "COMPLETED");
    }

    #[test]
    fn update_mission_keeps_status_when_absent() {
        let db = db_with_users();
        seed_mission(&db, "m1", "u1");

        db.update_mission("m1", "New title", "A longer new description", None, "[]", None)
            .unwrap();

        let mission = db.get_mission("m1").unwrap().unwrap();
        assert_eq!(mission.status, "OPEN");
    }

    #[test]
    fn partial_task_update_preserves_other_fields() {
        let db = db_with_users();
        seed_mission(&db, "m1", "u1");
        db.insert_task("t1", "m1", "u2", "Prepare soil", None).unwrap();

        db.update_task("t1", None, Some(true)).unwrap();
        let task = db.get_task("t1").unwrap().unwrap();
        assert!(task.is_completed);
        assert_eq!(task.text, "Prepare soil");

        db.update_task("t1", Some("Prepare the soil"), None).unwrap();
        let task = db.get_task("t1").unwrap().unwrap();
        assert!(task.is_completed);
        assert_eq!(task.text, "Prepare the soil");
    }

    #[test]
    fn task_carries_creator_summary() {
        let db = db_with_users();
        seed_mission(&db, "m1", "u1");
        db.insert_task("t1", "m1", "u2", "Plant seeds", Some("🌱")).unwrap();

        let task = db.get_task("t1").unwrap().unwrap();
        assert_eq!(task.creator_id, "u2");
        assert_eq!(task.creator_username, "bob");
        assert_eq!(task.mission_id, "m1");
    }

    #[test]
    fn duplicate_username_is_rejected_by_constraint() {
        let db = db_with_users();
        let result = db.create_user("u9", "z@example.com", "alice", "hash-z");
        assert!(result.is_err());
    }

    #[test]
    fn joined_cards_follow_membership() {
        let db = db_with_users();
        seed_mission(&db, "m1", "u1");
        seed_mission(&db, "m2", "u1");
        db.insert_participant("m1", "u2").unwrap();

        let cards = db.list_joined_mission_cards("u2").unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].id, "m1");
        assert_eq!(cards[0].participant_count, 1);

        let owned = db.list_owned_mission_cards("u1").unwrap();
        assert_eq!(owned.len(), 2);
    }
}
