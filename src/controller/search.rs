use crate::catalog::client::FetchError;
use crate::catalog::model::SearchResultItem;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Queries shorter than this never hit the network
pub const MIN_QUERY_LEN: usize = 3;

/// User-visible error when the catalog has no match for the query
pub const NOT_FOUND_ERROR: &str = "Movie not found";

/// Generic user-visible error for transport-level failures
pub const FETCH_FAILED_ERROR: &str = "Something went wrong while fetching movies";

/// Handle for one issued search fetch. Carries the token the completion
/// handler checks before any state mutation; superseding the fetch fires
/// the token, so a slow early response can never overwrite a later one.
#[derive(Debug, Clone)]
pub struct SearchTicket {
    query: String,
    token: CancellationToken,
}

impl SearchTicket {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// State machine over the query string and its derived result list.
///
/// At most one search fetch is in flight at any time: issuing a new one
/// cancels the previous ticket, and a completion whose ticket was
/// cancelled is dropped without touching results, error or loading.
#[derive(Debug, Default)]
pub struct SearchController {
    query: String,
    results: Vec<SearchResultItem>,
    loading: bool,
    error: Option<String>,
    inflight: Option<CancellationToken>,
}

impl SearchController {
    pub fn new() -> Self {
        Self::default()
    }

    /// React to a query edit. Returns a ticket when a fetch should be
    /// issued; `None` means the short-query idle state was entered.
    pub fn on_query_change(&mut self, query: &str) -> Option<SearchTicket> {
        self.query = query.to_string();

        if query.chars().count() < MIN_QUERY_LEN {
            self.cancel_inflight();
            self.results.clear();
            self.error = None;
            self.loading = false;
            return None;
        }

        self.cancel_inflight();
        self.loading = true;
        self.error = None;

        let token = CancellationToken::new();
        self.inflight = Some(token.clone());
        Some(SearchTicket {
            query: query.to_string(),
            token,
        })
    }

    /// Fold a fetch outcome back into the state. Stale completions
    /// (ticket superseded before it resolved) are detected via the
    /// token and dropped.
    pub fn apply_outcome(
        &mut self,
        ticket: &SearchTicket,
        outcome: Result<Vec<SearchResultItem>, FetchError>,
    ) {
        if ticket.token.is_cancelled() {
            debug!(query = %ticket.query, "dropping stale search response");
            return;
        }

        match outcome {
            // Cancellation is never surfaced and never ends the loading
            // state of whatever fetch superseded this one.
            Err(FetchError::Cancelled) => return,
            Ok(items) if !items.is_empty() => {
                self.results = items;
                self.error = None;
            }
            Ok(_) | Err(FetchError::NotFound) => {
                self.results.clear();
                self.error = Some(NOT_FOUND_ERROR.to_string());
            }
            Err(FetchError::Transport(reason)) => {
                debug!(%reason, "search fetch failed");
                self.results.clear();
                self.error = Some(FETCH_FAILED_ERROR.to_string());
            }
        }

        self.loading = false;
        self.inflight = None;
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[SearchResultItem] {
        &self.results
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a fetch has been issued and not yet resolved or cancelled
    pub fn has_inflight(&self) -> bool {
        self.inflight.is_some()
    }

    fn cancel_inflight(&mut self) {
        if let Some(token) = self.inflight.take() {
            token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, title: &str) -> SearchResultItem {
        SearchResultItem {
            id: id.to_string(),
            title: title.to_string(),
            year: "2005".to_string(),
            poster_url: String::new(),
        }
    }

    #[test]
    fn test_short_queries_never_issue_fetch() {
        let mut controller = SearchController::new();

        for query in ["", "a", "ab", "  ", "口水", "1", "xy"] {
            assert!(controller.on_query_change(query).is_none(), "{:?}", query);
            assert!(controller.results().is_empty());
            assert!(controller.error().is_none());
            assert!(!controller.is_loading());
        }
    }

    #[test]
    fn test_short_query_clears_results_and_cancels_fetch() {
        let mut controller = SearchController::new();

        let ticket = controller.on_query_change("batman").unwrap();
        controller.apply_outcome(&ticket, Ok(vec![item("tt1", "Batman")]));
        assert_eq!(controller.results().len(), 1);

        let ticket = controller.on_query_change("inception").unwrap();
        assert!(controller.on_query_change("in").is_none());

        assert!(ticket.token().is_cancelled());
        assert!(controller.results().is_empty());
        assert!(!controller.is_loading());
        assert!(!controller.has_inflight());
    }

    #[test]
    fn test_success_replaces_result_list() {
        let mut controller = SearchController::new();

        let ticket = controller.on_query_change("batman").unwrap();
        assert!(controller.is_loading());

        controller.apply_outcome(&ticket, Ok(vec![item("tt1", "Batman"), item("tt2", "Batman Begins")]));
        assert_eq!(controller.results().len(), 2);
        assert!(!controller.is_loading());
        assert!(controller.error().is_none());
    }

    #[test]
    fn test_new_query_cancels_previous_ticket() {
        let mut controller = SearchController::new();

        let first = controller.on_query_change("bat").unwrap();
        let second = controller.on_query_change("batm").unwrap();

        assert!(first.token().is_cancelled());
        assert!(!second.token().is_cancelled());
    }

    #[test]
    fn test_stale_response_is_dropped() {
        // "ab" is below the gate; "abc" resolves last and slowest but
        // must not overwrite "abcd"'s results.
        let mut controller = SearchController::new();

        assert!(controller.on_query_change("ab").is_none());
        let abc = controller.on_query_change("abc").unwrap();
        let abcd = controller.on_query_change("abcd").unwrap();

        controller.apply_outcome(&abcd, Ok(vec![item("tt4", "abcd movie")]));
        controller.apply_outcome(&abc, Ok(vec![item("tt3", "abc movie")]));

        assert_eq!(controller.results().len(), 1);
        assert_eq!(controller.results()[0].id, "tt4");
        assert!(!controller.is_loading());
    }

    #[test]
    fn test_stale_error_does_not_clobber_loading() {
        let mut controller = SearchController::new();

        let first = controller.on_query_change("batman").unwrap();
        let second = controller.on_query_change("batman returns").unwrap();

        // The superseded fetch resolves as a transport failure while the
        // second is still in flight; nothing may change.
        controller.apply_outcome(&first, Err(FetchError::Transport("boom".to_string())));
        assert!(controller.is_loading());
        assert!(controller.error().is_none());

        controller.apply_outcome(&second, Ok(vec![item("tt5", "Batman Returns")]));
        assert_eq!(controller.results().len(), 1);
    }

    #[test]
    fn test_not_found_surfaces_error() {
        let mut controller = SearchController::new();

        let ticket = controller.on_query_change("zzzzzz").unwrap();
        controller.apply_outcome(&ticket, Err(FetchError::NotFound));

        assert!(controller.results().is_empty());
        assert_eq!(controller.error(), Some(NOT_FOUND_ERROR));
        assert!(!controller.is_loading());
    }

    #[test]
    fn test_transport_error_surfaces_generic_message() {
        let mut controller = SearchController::new();

        let ticket = controller.on_query_change("batman").unwrap();
        controller.apply_outcome(&ticket, Ok(vec![item("tt1", "Batman")]));

        let ticket = controller.on_query_change("batman 2").unwrap();
        controller.apply_outcome(&ticket, Err(FetchError::Transport("offline".to_string())));

        assert!(controller.results().is_empty());
        assert_eq!(controller.error(), Some(FETCH_FAILED_ERROR));
        assert!(!controller.is_loading());
    }

    #[test]
    fn test_empty_success_treated_as_not_found() {
        let mut controller = SearchController::new();

        let ticket = controller.on_query_change("batman").unwrap();
        controller.apply_outcome(&ticket, Ok(Vec::new()));

        assert!(controller.results().is_empty());
        assert_eq!(controller.error(), Some(NOT_FOUND_ERROR));
    }

    #[test]
    fn test_retry_requires_new_query_change() {
        let mut controller = SearchController::new();

        let ticket = controller.on_query_change("batman").unwrap();
        controller.apply_outcome(&ticket, Err(FetchError::Transport("offline".to_string())));
        assert!(controller.error().is_some());

        // Re-issuing the same query clears the error and fetches again
        let ticket = controller.on_query_change("batman").unwrap();
        assert!(controller.error().is_none());
        assert!(controller.is_loading());
        controller.apply_outcome(&ticket, Ok(vec![item("tt1", "Batman")]));
        assert_eq!(controller.results().len(), 1);
    }
}
