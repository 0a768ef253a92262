//! SQLite-backed slot store. Simple and synchronous under the async trait;
//! a handful of small writes per user action is not latency sensitive.

use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use metrics::histogram;
use rusqlite::OptionalExtension;
use tracing::info;

use crate::{KvStore, Slot};

pub struct SqliteStore {
    db: Mutex<rusqlite::Connection>,
}

impl SqliteStore {
    /// Open `GEBETA_DB_PATH`, or `~/.gebeta/gebeta.db` when unset.
    pub fn open_default() -> Result<Self> {
        let path = std::env::var("GEBETA_DB_PATH").unwrap_or_else(|_| default_db_path());
        Self::open(&path)
    }

    pub fn open(path: &str) -> Result<Self> {
        let started = std::time::Instant::now();
        let db = rusqlite::Connection::open(path).with_context(|| format!("opening sqlite db at {}", path))?;
        db.pragma_update(None, "journal_mode", &"WAL").ok();
        db.pragma_update(None, "synchronous", &"NORMAL").ok();
        db.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                slot  TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                ts    INTEGER NOT NULL
            )",
            [],
        )
        .context("creating kv table")?;
        histogram!("persist_open_ms", started.elapsed().as_secs_f64() * 1000.0);
        info!(path = %path, "sqlite store opened");
        Ok(Self { db: Mutex::new(db) })
    }

    fn conn(&self) -> Result<std::sync::MutexGuard<'_, rusqlite::Connection>> {
        self.db.lock().map_err(|_| anyhow!("sqlite mutex poisoned"))
    }
}

#[async_trait::async_trait]
impl KvStore for SqliteStore {
    async fn get(&self, slot: Slot) -> Result<Option<String>> {
        let db = self.conn()?;
        let v = db
            .query_row("SELECT value FROM kv WHERE slot = ?1", [slot.key()], |row| row.get::<_, String>(0))
            .optional()?;
        Ok(v)
    }

    async fn set(&self, slot: Slot, value: String) -> Result<()> {
        let db = self.conn()?;
        db.execute(
            "INSERT INTO kv(slot, value, ts) VALUES (?1, ?2, ?3)
             ON CONFLICT(slot) DO UPDATE SET value = excluded.value, ts = excluded.ts",
            (slot.key(), &value, now_ts()),
        )?;
        Ok(())
    }

    async fn remove(&self, slots: &[Slot]) -> Result<()> {
        let mut db = self.conn()?;
        let tx = db.transaction()?;
        for s in slots {
            tx.execute("DELETE FROM kv WHERE slot = ?1", [s.key()])?;
        }
        tx.commit()?;
        Ok(())
    }
}

fn default_db_path() -> String {
    if let Some(home) = std::env::var_os("HOME") {
        let mut p = std::path::PathBuf::from(home);
        p.push(".gebeta");
        let _ = std::fs::create_dir_all(&p);
        p.push("gebeta.db");
        return p.to_string_lossy().to_string();
    }
    "gebeta.db".to_string()
}

fn now_ts() -> i64 {
    let now = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).unwrap_or_default();
    now.as_secs() as i64
}
