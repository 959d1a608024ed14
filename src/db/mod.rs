use crate::errors::{AppError, AppResult};
use crate::models::{DashboardSettings, Domain};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const SCHEMA_SQL: &str = include_str!("schema.sql");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCollection {
    pub domain: Domain,
    pub records_json: String,
    pub record_count: i64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct Database {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl Database {
    pub fn new(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| AppError::Io(err.to_string()))?;
        }
        let conn = Connection::open(path).map_err(AppError::from)?;
        conn.execute_batch(SCHEMA_SQL).map_err(AppError::from)?;

        let db = Self {
            conn: Mutex::new(conn),
            db_path: path.to_path_buf(),
        };

        db.ensure_default_settings()?;

        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Raw stored collection, `None` when the domain was never written.
    pub fn read_collection(&self, domain: Domain) -> AppResult<Option<StoredCollection>> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        conn.query_row(
            "SELECT records_json, record_count, updated_at FROM collections WHERE domain = ?1",
            [domain.as_str()],
            |row| {
                Ok(StoredCollection {
                    domain,
                    records_json: row.get(0)?,
                    record_count: row.get(1)?,
                    updated_at: parse_time(&row.get::<_, String>(2)?)?,
                })
            },
        )
        .optional()
        .map_err(AppError::from)
    }

    /// Replaces the whole collection. Last write wins.
    pub fn write_collection(&self, domain: Domain, records: &[serde_json::Value]) -> AppResult<StoredCollection> {
        let now = Utc::now();
        let records_json = serde_json::to_string(records)?;
        let record_count = i64::try_from(records.len()).unwrap_or(i64::MAX);

        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        conn.execute(
            "INSERT INTO collections (domain, records_json, record_count, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(domain) DO UPDATE SET
               records_json = excluded.records_json,
               record_count = excluded.record_count,
               updated_at = excluded.updated_at",
            params![domain.as_str(), records_json, record_count, now.to_rfc3339()],
        )?;

        Ok(StoredCollection {
            domain,
            records_json,
            record_count,
            updated_at: now,
        })
    }

    pub fn get_settings(&self) -> AppResult<DashboardSettings> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        let raw = conn
            .query_row(
                "SELECT value_json FROM settings WHERE key = 'dashboard'",
                [],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        match raw {
            Some(raw) => Ok(serde_json::from_str::<DashboardSettings>(&raw).unwrap_or_default()),
            None => Ok(DashboardSettings::default()),
        }
    }

    pub fn update_settings(&self, update: serde_json::Value) -> AppResult<DashboardSettings> {
        let current = self.get_settings()?;
        let mut merged = serde_json::to_value(current)?;
        merge_json(&mut merged, update);
        let settings: DashboardSettings = serde_json::from_value(merged)?;

        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        conn.execute(
            "INSERT INTO settings (key, value_json, updated_at)
             VALUES ('dashboard', ?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json, updated_at = excluded.updated_at",
            params![serde_json::to_string(&settings)?, Utc::now().to_rfc3339()],
        )?;

        Ok(settings)
    }

    fn ensure_default_settings(&self) -> AppResult<()> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(1) FROM settings WHERE key = 'dashboard'",
            [],
            |row| row.get(0),
        )?;
        if count == 0 {
            conn.execute(
                "INSERT INTO settings (key, value_json, updated_at) VALUES ('dashboard', ?1, ?2)",
                params![
                    serde_json::to_string(&DashboardSettings::default())?,
                    Utc::now().to_rfc3339()
                ],
            )?;
        }
        Ok(())
    }
}

fn parse_time(raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, error.to_string())),
            )
        })
}

pub(crate) fn merge_json(target: &mut serde_json::Value, update: serde_json::Value) {
    match (target, update) {
        (serde_json::Value::Object(target_map), serde_json::Value::Object(update_map)) => {
            for (key, value) in update_map {
                merge_json(target_map.entry(key).or_insert(serde_json::Value::Null), value);
            }
        }
        (target, update) => {
            *target = update;
        }
    }
}
