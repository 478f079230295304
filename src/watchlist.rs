use crate::core::config::Config;
use crate::core::error::Result;
use crate::storage::watched::{WatchedEntry, WatchedStore};
use tracing::debug;

/// Derived statistics over the watched collection, recomputed on read
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WatchedSummary {
    pub count: usize,
    pub avg_imdb_rating: f32,
    pub avg_user_rating: f32,
    pub avg_runtime_minutes: f32,
}

/// Owner of the watched collection. Mutations go through here and are
/// mirrored to the persistent store on every change; nothing else writes
/// the slot.
pub struct WatchedList {
    entries: Vec<WatchedEntry>,
    store: WatchedStore,
}

impl WatchedList {
    /// Open the backing store and load the persisted collection
    pub fn open(config: &Config) -> Result<Self> {
        let store = WatchedStore::open(config)?;
        let entries = store.load();
        debug!(count = entries.len(), "loaded watched list");
        Ok(Self { entries, store })
    }

    /// Add an entry. At most one entry exists per catalog id: adding an
    /// id that is already present replaces the stored entry. The slot is
    /// written first so a failed save leaves memory and store in step.
    pub fn add(&mut self, entry: WatchedEntry) -> Result<()> {
        let mut next = self.entries.clone();
        match next.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry,
            None => next.push(entry),
        }
        self.store.save(&next)?;
        self.entries = next;
        Ok(())
    }

    /// Remove the entry with the given catalog id, if present
    pub fn remove(&mut self, id: &str) -> Result<()> {
        let mut next = self.entries.clone();
        next.retain(|e| e.id != id);
        self.store.save(&next)?;
        self.entries = next;
        Ok(())
    }

    pub fn entries(&self) -> &[WatchedEntry] {
        &self.entries
    }

    /// Whether the given catalog id has already been watched
    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// The rating the user gave a watched movie, if any
    pub fn user_rating_for(&self, id: &str) -> Option<u8> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.user_rating)
    }

    /// Compute summary statistics. An empty collection yields all zeros,
    /// never NaN.
    pub fn summary(&self) -> WatchedSummary {
        let count = self.entries.len();
        if count == 0 {
            return WatchedSummary::default();
        }

        let n = count as f32;
        WatchedSummary {
            count,
            avg_imdb_rating: self.entries.iter().map(|e| e.imdb_rating).sum::<f32>() / n,
            avg_user_rating: self.entries.iter().map(|e| e.user_rating as f32).sum::<f32>() / n,
            avg_runtime_minutes: self
                .entries
                .iter()
                .map(|e| e.runtime_minutes as f32)
                .sum::<f32>()
                / n,
        }
    }
}
