//! Key/value persistence for client state.
//!
//! Session tokens, cached user objects and read-through caches all live here
//! and nowhere else. `Local` survives restarts (SQLite in the workspace);
//! `Tab` lives as long as the process.

use anyhow::Context;
use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Local,
    Tab,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Local => "local",
            Scope::Tab => "tab",
        }
    }
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
    fn remove(&mut self, key: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn drain(&mut self) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self.entries.drain().collect();
        entries.sort();
        entries
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Local scope backed by the workspace database (`kv_entries`).
pub struct SqliteStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl KeyValueStore for SqliteStore<'_> {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM kv_entries WHERE key = ?", [key], |r| {
                r.get(0)
            })
            .optional()
            .with_context(|| format!("failed to read storage key {key}"))
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO kv_entries(key, value, updated_at) VALUES(?, ?, ?)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                (key, value, now),
            )
            .with_context(|| format!("failed to write storage key {key}"))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?", [key])
            .with_context(|| format!("failed to remove storage key {key}"))?;
        Ok(())
    }
}

pub enum LocalHandle<'a> {
    Sqlite(SqliteStore<'a>),
    Memory(&'a mut MemoryStore),
}

impl KeyValueStore for LocalHandle<'_> {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        match self {
            LocalHandle::Sqlite(s) => s.get(key),
            LocalHandle::Memory(m) => m.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match self {
            LocalHandle::Sqlite(s) => s.set(key, value),
            LocalHandle::Memory(m) => m.set(key, value),
        }
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        match self {
            LocalHandle::Sqlite(s) => s.remove(key),
            LocalHandle::Memory(m) => m.remove(key),
        }
    }
}

/// Both scopes, borrowed for the duration of one operation.
pub struct Storages<'a> {
    pub local: LocalHandle<'a>,
    pub tab: &'a mut MemoryStore,
}

impl<'a> Storages<'a> {
    pub fn new(local: LocalHandle<'a>, tab: &'a mut MemoryStore) -> Self {
        Self { local, tab }
    }

    pub fn in_memory(local: &'a mut MemoryStore, tab: &'a mut MemoryStore) -> Self {
        Self {
            local: LocalHandle::Memory(local),
            tab,
        }
    }

    pub fn scope(&mut self, scope: Scope) -> &mut dyn KeyValueStore {
        match scope {
            Scope::Local => &mut self.local,
            Scope::Tab => &mut *self.tab,
        }
    }

    pub fn get(&self, scope: Scope, key: &str) -> anyhow::Result<Option<String>> {
        match scope {
            Scope::Local => self.local.get(key),
            Scope::Tab => self.tab.get(key),
        }
    }

    /// Local first, then tab.
    pub fn get_any(&self, key: &str) -> anyhow::Result<Option<(Scope, String)>> {
        for scope in [Scope::Local, Scope::Tab] {
            if let Some(v) = self.get(scope, key)? {
                return Ok(Some((scope, v)));
            }
        }
        Ok(None)
    }

    pub fn remove_everywhere(&mut self, key: &str) -> anyhow::Result<()> {
        self.local.remove(key)?;
        self.tab.remove(key)?;
        Ok(())
    }
}

/// Owned storage state kept in the daemon between requests.
#[derive(Default)]
pub struct StorageState {
    pub db: Option<Connection>,
    pub local_fallback: MemoryStore,
    pub tab: MemoryStore,
}

impl StorageState {
    /// Switches the local scope to the workspace database. Entries written
    /// before a workspace was open move into it and overwrite older values.
    pub fn attach_db(&mut self, conn: Connection) -> anyhow::Result<()> {
        let pending = self.local_fallback.drain();
        let mut store = SqliteStore::new(&conn);
        for (key, value) in &pending {
            store.set(key, value)?;
        }
        if !pending.is_empty() {
            tracing::info!(entries = pending.len(), "moved local entries into workspace");
        }
        self.db = Some(conn);
        Ok(())
    }

    pub fn storages(&mut self) -> Storages<'_> {
        let local = match self.db.as_ref() {
            Some(conn) => LocalHandle::Sqlite(SqliteStore::new(conn)),
            None => LocalHandle::Memory(&mut self.local_fallback),
        };
        Storages {
            local,
            tab: &mut self.tab,
        }
    }
}
