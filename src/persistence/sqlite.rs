use super::{PersistenceError, PersistenceResult, TimetableStore};
use crate::model::{ResourceSnapshot, TimetableEntry};
use crate::timetable::Timetable;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::{Mutex, MutexGuard};

const COLLECTIONS: [&str; 6] = [
    "time_slots",
    "subjects",
    "teachers",
    "classes",
    "lab_rooms",
    "entries",
];

/// Stores a timetable as one JSON document per row, a table per collection.
pub struct SqliteTimetableStore {
    connection: Mutex<Connection>,
}

impl SqliteTimetableStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let mut ddl = String::from(
            r#"
            CREATE TABLE IF NOT EXISTS timetable_meta (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                saved_at TEXT NOT NULL
            );
            "#,
        );
        for table in COLLECTIONS {
            ddl.push_str(&format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    position INTEGER PRIMARY KEY,
                    id TEXT NOT NULL UNIQUE,
                    record_json TEXT NOT NULL
                );"
            ));
        }
        connection.execute_batch(&ddl)?;
        Ok(())
    }

    fn lock(&self) -> PersistenceResult<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| PersistenceError::InvalidData("sqlite connection lock poisoned".into()))
    }

    /// Timestamp of the last save, as RFC 3339.
    pub fn saved_at(&self) -> PersistenceResult<Option<String>> {
        let conn = self.lock()?;
        let saved_at = conn
            .query_row("SELECT saved_at FROM timetable_meta WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(saved_at)
    }
}

fn save_rows<T, F>(
    tx: &Transaction,
    table: &str,
    items: &[T],
    id_of: F,
) -> PersistenceResult<()>
where
    T: Serialize,
    F: Fn(&T) -> &str,
{
    tx.execute(&format!("DELETE FROM {table}"), [])?;
    let mut stmt = tx.prepare(&format!(
        "INSERT INTO {table} (position, id, record_json) VALUES (?1, ?2, ?3)"
    ))?;
    for (position, item) in items.iter().enumerate() {
        let json = serde_json::to_string(item)?;
        stmt.execute(params![position as i64, id_of(item), json])?;
    }
    Ok(())
}

fn load_rows<T: DeserializeOwned>(conn: &Connection, table: &str) -> PersistenceResult<Vec<T>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT record_json FROM {table} ORDER BY position ASC"
    ))?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    let mut items = Vec::new();
    for json in rows {
        items.push(serde_json::from_str(&json?)?);
    }
    Ok(items)
}

impl TimetableStore for SqliteTimetableStore {
    fn save_timetable(&self, timetable: &Timetable) -> PersistenceResult<()> {
        let resources = timetable.resources();
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        save_rows(&tx, "time_slots", &resources.time_slots, |s| &s.id)?;
        save_rows(&tx, "subjects", &resources.subjects, |s| &s.id)?;
        save_rows(&tx, "teachers", &resources.teachers, |t| &t.id)?;
        save_rows(&tx, "classes", &resources.classes, |c| &c.id)?;
        save_rows(&tx, "lab_rooms", &resources.lab_rooms, |r| &r.id)?;
        save_rows(&tx, "entries", timetable.entries(), |e| &e.id)?;
        tx.execute("DELETE FROM timetable_meta", [])?;
        tx.execute(
            "INSERT INTO timetable_meta (id, saved_at) VALUES (1, ?1)",
            params![Utc::now().to_rfc3339()],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn load_timetable(&self) -> PersistenceResult<Option<Timetable>> {
        let conn = self.lock()?;
        let stored: Option<String> = conn
            .query_row("SELECT saved_at FROM timetable_meta WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;
        if stored.is_none() {
            return Ok(None);
        }

        let resources = ResourceSnapshot {
            time_slots: load_rows(&conn, "time_slots")?,
            subjects: load_rows(&conn, "subjects")?,
            teachers: load_rows(&conn, "teachers")?,
            classes: load_rows(&conn, "classes")?,
            lab_rooms: load_rows(&conn, "lab_rooms")?,
        };
        let entries: Vec<TimetableEntry> = load_rows(&conn, "entries")?;
        Ok(Some(Timetable::from_parts(resources, entries)?))
    }
}
