use crate::catalog::model::MovieDetail;
use crate::core::config::Config;
use crate::core::error::{Error, Result};
use redb::{Database, ReadableTable, TableDefinition};
use tracing::warn;

/// Table definition for the persisted watched list
/// Using &str for both key and value (JSON serialized)
const WATCHED_TABLE: TableDefinition<&str, &str> = TableDefinition::new("watched");

/// Single slot holding the JSON-encoded full collection.
const WATCHED_KEY: &str = "watched";

/// One movie the user has watched and rated.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WatchedEntry {
    pub id: String,
    pub title: String,
    pub year: String,
    pub poster_url: String,
    pub imdb_rating: f32,
    pub runtime_minutes: u32,
    /// Self-entered rating, 1..=10
    pub user_rating: u8,
}

impl WatchedEntry {
    /// Build an entry from a fetched detail record and the user's rating
    pub fn from_detail(detail: &MovieDetail, user_rating: u8) -> Self {
        Self {
            id: detail.id.clone(),
            title: detail.title.clone(),
            year: detail.year.clone(),
            poster_url: detail.poster_url.clone(),
            imdb_rating: detail.imdb_rating,
            runtime_minutes: detail.runtime_minutes,
            user_rating,
        }
    }
}

/// Persistent store mirroring the watched list across sessions.
///
/// Single-writer: only the watched list drives it. Every save is a full
/// overwrite of the slot; load fails soft so a corrupt or absent slot
/// degrades to an empty list instead of an error.
pub struct WatchedStore {
    db: Database,
}

impl WatchedStore {
    /// Open or create the watched store
    pub fn open(config: &Config) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = config.watched_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = if config.watched_path.exists() {
            Database::open(&config.watched_path).map_err(|e| {
                let msg = e.to_string();
                if msg.to_lowercase().contains("lock") {
                    Error::Database("Watched store is locked. Another instance may be running. Close other instances and try again.".to_string())
                } else {
                    Error::Database(format!("Failed to open watched store: {}", e))
                }
            })?
        } else {
            Database::create(&config.watched_path)
                .map_err(|e| Error::Database(format!("Failed to create watched store: {}", e)))?
        };

        // Initialize table (this is safe even if table already exists)
        let write_txn = db
            .begin_write()
            .map_err(|e| Error::Database(format!("Failed to begin write transaction: {}", e)))?;
        {
            let _table = write_txn
                .open_table(WATCHED_TABLE)
                .map_err(|e| Error::Database(format!("Failed to open table: {}", e)))?;
        }
        write_txn
            .commit()
            .map_err(|e| Error::Database(format!("Failed to commit transaction: {}", e)))?;

        Ok(Self { db })
    }

    /// Load the persisted collection; absent or unparsable slots yield
    /// an empty list
    pub fn load(&self) -> Vec<WatchedEntry> {
        match self.try_load() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("failed to load watched list, starting empty: {}", e);
                Vec::new()
            }
        }
    }

    fn try_load(&self) -> Result<Vec<WatchedEntry>> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| Error::Database(format!("Failed to begin read transaction: {}", e)))?;

        let table = read_txn
            .open_table(WATCHED_TABLE)
            .map_err(|e| Error::Database(format!("Failed to open table: {}", e)))?;

        let result = match table
            .get(WATCHED_KEY)
            .map_err(|e| Error::Database(format!("Failed to get watched list: {}", e)))?
        {
            Some(guard) => {
                // Extract the value string before dropping the guard
                let json_str = guard.value().to_string();
                serde_json::from_str(&json_str)
                    .map_err(|e| Error::Database(format!("Failed to deserialize watched list: {}", e)))
            }
            None => Ok(Vec::new()),
        };

        result
    }

    /// Overwrite the slot with the full collection
    pub fn save(&self, entries: &[WatchedEntry]) -> Result<()> {
        let json_str = serde_json::to_string(entries)
            .map_err(|e| Error::Database(format!("Failed to serialize watched list: {}", e)))?;

        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| Error::Database(format!("Failed to begin write transaction: {}", e)))?;

        {
            let mut table = write_txn
                .open_table(WATCHED_TABLE)
                .map_err(|e| Error::Database(format!("Failed to open table: {}", e)))?;

            table
                .insert(WATCHED_KEY, json_str.as_str())
                .map_err(|e| Error::Database(format!("Failed to insert watched list: {}", e)))?;
        }

        write_txn
            .commit()
            .map_err(|e| Error::Database(format!("Failed to commit transaction: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> Config {
        let config = Config::new(Some(temp_dir.path().join("filmigyan")), "k").unwrap();
        config.init().unwrap();
        config
    }

    fn entry(id: &str, rating: u8) -> WatchedEntry {
        WatchedEntry {
            id: id.to_string(),
            title: format!("Movie {}", id),
            year: "2008".to_string(),
            poster_url: "http://example.com/p.jpg".to_string(),
            imdb_rating: 8.5,
            runtime_minutes: 120,
            user_rating: rating,
        }
    }

    #[test]
    fn test_load_empty_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = WatchedStore::open(&test_config(&temp_dir)).unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_load_round_trip_preserves_order() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        let store = WatchedStore::open(&config).unwrap();

        let entries = vec![entry("tt3", 9), entry("tt1", 4), entry("tt2", 7)];
        store.save(&entries).unwrap();
        assert_eq!(store.load(), entries);

        // Survives reopening the database
        drop(store);
        let store = WatchedStore::open(&config).unwrap();
        assert_eq!(store.load(), entries);
    }

    #[test]
    fn test_save_overwrites_previous_slot() {
        let temp_dir = TempDir::new().unwrap();
        let store = WatchedStore::open(&test_config(&temp_dir)).unwrap();

        store.save(&[entry("tt1", 5), entry("tt2", 6)]).unwrap();
        store.save(&[entry("tt2", 6)]).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "tt2");
    }

    #[test]
    fn test_load_fails_soft_on_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        let store = WatchedStore::open(&config).unwrap();

        // Plant a slot the deserializer cannot handle
        let write_txn = store.db.begin_write().unwrap();
        {
            let mut table = write_txn.open_table(WATCHED_TABLE).unwrap();
            table.insert(WATCHED_KEY, "not valid json {{").unwrap();
        }
        write_txn.commit().unwrap();

        assert!(store.load().is_empty());
    }

    #[test]
    fn test_entry_from_detail() {
        let detail = MovieDetail {
            id: "tt0468569".to_string(),
            title: "The Dark Knight".to_string(),
            year: "2008".to_string(),
            poster_url: "http://example.com/tdk.jpg".to_string(),
            runtime_minutes: 152,
            imdb_rating: 9.0,
            plot: String::new(),
            released: String::new(),
            actors: String::new(),
            director: String::new(),
            genre: String::new(),
        };

        let entry = WatchedEntry::from_detail(&detail, 8);
        assert_eq!(entry.id, "tt0468569");
        assert_eq!(entry.runtime_minutes, 152);
        assert_eq!(entry.imdb_rating, 9.0);
        assert_eq!(entry.user_rating, 8);
    }
}
