//! Room data access object

use super::models::{PairState, Room};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// How an imported state landed in the store.
#[derive(Debug, Clone)]
pub enum Imported {
    /// A room for the same pair already existed; its state was replaced.
    Merged(Room),
    /// No room matched; a new one was created.
    Created(Room),
}

impl Imported {
    pub fn room(&self) -> &Room {
        match self {
            Imported::Merged(room) | Imported::Created(room) => room,
        }
    }
}

/// Data access object for Room operations
#[derive(Clone)]
pub struct RoomStore {
    conn: Arc<Mutex<Connection>>,
}

impl RoomStore {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Insert a new room
    pub fn create(&self, room: &Room) -> SqliteResult<()> {
        let state = serialize_state(&room.state)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO rooms (id, state, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                room.id.to_string(),
                state,
                room.created_at.to_rfc3339(),
                room.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get a room by ID
    pub fn get_by_id(&self, id: Uuid) -> SqliteResult<Option<Room>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, state, created_at, updated_at FROM rooms WHERE id = ?1",
        )?;

        let mut rows = stmt.query(params![id.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::row_to_room(row)?))
        } else {
            Ok(None)
        }
    }

    /// Get all rooms, most recently updated first.
    ///
    /// Rows whose stored state no longer parses are skipped with a warning
    /// rather than failing the whole listing.
    pub fn get_all(&self) -> SqliteResult<Vec<Room>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, state, created_at, updated_at FROM rooms
             ORDER BY datetime(updated_at) DESC, id",
        )?;

        let rooms = stmt
            .query_map([], Self::row_to_room)?
            .filter_map(|r| match r {
                Ok(room) => Some(room),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable room row");
                    None
                }
            })
            .collect();

        Ok(rooms)
    }

    /// Replace a room's state, bumping its `updated_at`.
    ///
    /// Returns false when no room has that id.
    pub fn update(&self, id: Uuid, state: &PairState) -> SqliteResult<bool> {
        let state = serialize_state(state)?;
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE rooms SET state = ?2, updated_at = ?3 WHERE id = ?1",
            params![id.to_string(), state, Utc::now().to_rfc3339()],
        )?;
        Ok(changed > 0)
    }

    /// Delete a room. Returns false when no room has that id.
    pub fn delete(&self, id: Uuid) -> SqliteResult<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute("DELETE FROM rooms WHERE id = ?1", params![id.to_string()])?;
        Ok(changed > 0)
    }

    /// Bring a shared state into the store.
    ///
    /// If a room already tracks the same two people (in either order) its
    /// state is replaced — the shared link is the newer copy. Otherwise a
    /// new room is created.
    pub fn import_state(&self, state: PairState) -> SqliteResult<Imported> {
        let existing = self
            .get_all()?
            .into_iter()
            .find(|room| room.state.same_pair(&state));

        match existing {
            Some(mut room) => {
                room.state = state;
                room.touch();
                self.update(room.id, &room.state)?;
                Ok(Imported::Merged(room))
            }
            None => {
                let room = Room::new(state);
                self.create(&room)?;
                Ok(Imported::Created(room))
            }
        }
    }

    /// Convert a database row to a Room
    fn row_to_room(row: &rusqlite::Row) -> SqliteResult<Room> {
        let id_str: String = row.get(0)?;
        let state_json: String = row.get(1)?;
        let created_at_str: String = row.get(2)?;
        let updated_at_str: String = row.get(3)?;

        let state: PairState = serde_json::from_str(&state_json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;

        Ok(Room {
            id: Uuid::parse_str(&id_str).unwrap_or_else(|_| Uuid::new_v4()),
            state,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
            updated_at: DateTime::parse_from_rfc3339(&updated_at_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}

fn serialize_state(state: &PairState) -> SqliteResult<String> {
    serde_json::to_string(state).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Database, Expense, Party};
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn setup_db() -> (tempfile::TempDir, Database, RoomStore) {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("test.db")).unwrap();
        let store = RoomStore::new(db.connection());
        (dir, db, store)
    }

    fn expense(description: &str, amount: f64, paid_by: Party) -> Expense {
        Expense::new(
            description,
            amount,
            None,
            paid_by,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        )
    }

    #[test]
    fn test_create_and_get() {
        let (_dir, _db, store) = setup_db();
        let mut state = PairState::new("Aki", "Ben");
        state.entries.push(expense("lunch", 1800.0, Party::A));
        let room = Room::new(state.clone());

        store.create(&room).unwrap();
        let retrieved = store.get_by_id(room.id).unwrap().unwrap();

        assert_eq!(retrieved.state, state);
        assert_eq!(retrieved.id, room.id);
    }

    #[test]
    fn test_get_all_orders_by_recency() {
        let (_dir, _db, store) = setup_db();

        let mut older = Room::new(PairState::new("Aki", "Ben"));
        older.created_at = older.created_at - chrono::Duration::hours(2);
        older.updated_at = older.created_at;
        let newer = Room::new(PairState::new("Caro", "Dan"));

        store.create(&older).unwrap();
        store.create(&newer).unwrap();

        let all = store.get_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, newer.id);
        assert_eq!(all[1].id, older.id);
    }

    #[test]
    fn test_update_replaces_state_and_reports_not_found() {
        let (_dir, _db, store) = setup_db();
        let room = Room::new(PairState::new("Aki", "Ben"));
        store.create(&room).unwrap();

        let mut state = room.state.clone();
        state.entries.push(expense("taxi", 2400.0, Party::B));
        assert!(store.update(room.id, &state).unwrap());

        let retrieved = store.get_by_id(room.id).unwrap().unwrap();
        assert_eq!(retrieved.state.entries.len(), 1);
        assert!(retrieved.updated_at >= room.updated_at);

        assert!(!store.update(Uuid::new_v4(), &state).unwrap());
    }

    #[test]
    fn test_delete() {
        let (_dir, _db, store) = setup_db();
        let room = Room::new(PairState::new("Aki", "Ben"));

        store.create(&room).unwrap();
        assert!(store.delete(room.id).unwrap());
        assert!(store.get_by_id(room.id).unwrap().is_none());
        assert!(!store.delete(room.id).unwrap());
    }

    #[test]
    fn test_import_creates_then_merges() {
        let (_dir, _db, store) = setup_db();

        let first = store.import_state(PairState::new("Aki", "Ben")).unwrap();
        assert!(matches!(first, Imported::Created(_)));

        // Same pair in reverse order: replace, don't duplicate
        let mut shared = PairState::new("Ben", "Aki");
        shared.entries.push(expense("hotel", 9800.0, Party::A));
        let second = store.import_state(shared.clone()).unwrap();
        assert!(matches!(second, Imported::Merged(_)));

        let all = store.get_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].state, shared);

        let third = store.import_state(PairState::new("Caro", "Dan")).unwrap();
        assert!(matches!(third, Imported::Created(_)));
        assert_eq!(store.get_all().unwrap().len(), 2);
    }

    #[test]
    fn test_unreadable_state_rows_are_skipped() {
        let (_dir, db, store) = setup_db();
        let room = Room::new(PairState::new("Aki", "Ben"));
        store.create(&room).unwrap();

        db.with_connection(|conn| {
            conn.execute(
                "INSERT INTO rooms (id, state, created_at, updated_at)
                 VALUES ('broken', 'not json', '2025-01-01T00:00:00Z', '2025-01-01T00:00:00Z')",
                [],
            )
        })
        .unwrap();

        let all = store.get_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, room.id);
    }
}
