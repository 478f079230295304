use crate::catalog::client::{CatalogClient, CatalogFetch, FetchError};
use crate::catalog::model::{MovieDetail, SearchResultItem};
use crate::controller::detail::{DetailController, DetailTicket, NoopTitle, TitleSink};
use crate::controller::search::{SearchController, SearchTicket};
use crate::core::config::Config;
use crate::core::error::Result;
use crate::watchlist::WatchedList;

/// Application core: explicit context object owning the controllers, the
/// fetcher and the watched list. Hosts embed this and drive it from
/// their input layer; all state transitions happen on one logical
/// thread, interleaved at the fetch suspension points.
///
/// Every operation comes in a begin/finish pair so a host can keep
/// accepting input while a fetch is in flight; the `async` convenience
/// methods run both halves back to back for simple drivers.
pub struct App<F: CatalogFetch> {
    fetcher: F,
    search: SearchController,
    detail: DetailController,
    watched: WatchedList,
}

impl App<CatalogClient> {
    /// Open an app backed by the real catalog client and the persisted
    /// watched list
    pub fn open(config: &Config) -> Result<Self> {
        Self::open_with_title(config, Box::new(NoopTitle))
    }

    /// Same as [`App::open`] with an injected page-title collaborator
    pub fn open_with_title(config: &Config, title: Box<dyn TitleSink>) -> Result<Self> {
        Ok(Self::new(
            CatalogClient::new(config),
            WatchedList::open(config)?,
            title,
        ))
    }
}

impl<F: CatalogFetch> App<F> {
    pub fn new(fetcher: F, watched: WatchedList, title: Box<dyn TitleSink>) -> Self {
        Self {
            fetcher,
            search: SearchController::new(),
            detail: DetailController::new(title),
            watched,
        }
    }

    /// React to a query edit. When a real search starts, the open detail
    /// view is closed first: it pertains to the previous result set.
    pub fn begin_query(&mut self, query: &str) -> Option<SearchTicket> {
        let ticket = self.search.on_query_change(query)?;
        self.detail.close();
        Some(ticket)
    }

    /// Fold a search fetch outcome back into the search state
    pub fn finish_search(
        &mut self,
        ticket: &SearchTicket,
        outcome: std::result::Result<Vec<SearchResultItem>, FetchError>,
    ) {
        self.search.apply_outcome(ticket, outcome);
    }

    /// Run a full query change cycle: begin, fetch, finish
    pub async fn set_query(&mut self, query: &str) {
        if let Some(ticket) = self.begin_query(query) {
            let outcome = self.fetcher.search(ticket.query(), ticket.token()).await;
            self.finish_search(&ticket, outcome);
        }
    }

    /// React to the user picking (or re-picking) a result
    pub fn begin_select(&mut self, id: &str) -> Option<DetailTicket> {
        self.detail.on_select(id)
    }

    /// Fold a detail fetch outcome back into the detail state
    pub fn finish_detail(
        &mut self,
        ticket: &DetailTicket,
        outcome: std::result::Result<MovieDetail, FetchError>,
    ) {
        self.detail.apply_outcome(ticket, outcome);
    }

    /// Run a full selection change cycle: begin, fetch, finish
    pub async fn select(&mut self, id: &str) {
        if let Some(ticket) = self.begin_select(id) {
            let outcome = self.fetcher.detail(ticket.id(), ticket.token()).await;
            self.finish_detail(&ticket, outcome);
        }
    }

    /// Add the current detail to the watched list with the user's rating
    /// and close the detail view. Returns whether an entry was recorded.
    pub fn confirm_add(&mut self, user_rating: u8) -> Result<bool> {
        match self.detail.confirm_add(user_rating) {
            Some(entry) => {
                self.watched.add(entry)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove a movie from the watched list
    pub fn remove_watched(&mut self, id: &str) -> Result<()> {
        self.watched.remove(id)
    }

    pub fn search(&self) -> &SearchController {
        &self.search
    }

    pub fn detail(&self) -> &DetailController {
        &self.detail
    }

    pub fn watched(&self) -> &WatchedList {
        &self.watched
    }
}
