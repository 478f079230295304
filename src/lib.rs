// Core functionality
pub mod core {
    pub mod config;
    pub mod error;
}

// Remote catalog access
pub mod catalog {
    pub mod client;
    pub mod model;
}

// Data storage
pub mod storage {
    pub mod watched;
}

// Query / selection state machines
pub mod controller {
    pub mod detail;
    pub mod search;
}

// Watched-list ownership & derived stats
pub mod watchlist;

// Application context wiring the controllers together
pub mod app;

// Re-export commonly used types
pub use crate::app::App;
pub use crate::catalog::client::{CatalogClient, CatalogFetch, FetchError};
pub use crate::catalog::model::{MovieDetail, SearchResultItem};
pub use crate::controller::detail::{DetailController, DetailTicket, NoopTitle, TitleSink};
pub use crate::controller::search::{SearchController, SearchTicket, MIN_QUERY_LEN};
pub use crate::core::config::Config;
pub use crate::core::error::{Error, Result};
pub use crate::storage::watched::{WatchedEntry, WatchedStore};
pub use crate::watchlist::{WatchedList, WatchedSummary};
