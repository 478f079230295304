use crate::catalog::client::FetchError;
use crate::catalog::model::MovieDetail;
use crate::storage::watched::WatchedEntry;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// External "page title" collaborator. Attached while a detail with a
/// non-empty title is current, detached when it is cleared or replaced.
pub trait TitleSink {
    fn set_title(&mut self, title: &str);
    fn reset_title(&mut self);
}

/// Default sink for hosts without a title surface
#[derive(Debug, Default)]
pub struct NoopTitle;

impl TitleSink for NoopTitle {
    fn set_title(&mut self, _title: &str) {}
    fn reset_title(&mut self) {}
}

fn page_title(title: &str) -> String {
    format!("Movie || {}", title)
}

/// Handle for one issued detail fetch
#[derive(Debug, Clone)]
pub struct DetailTicket {
    id: String,
    token: CancellationToken,
}

impl DetailTicket {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// State machine over the currently selected catalog id.
///
/// Entering a selection issues a fetch and, on completion, attaches the
/// title effect; leaving it cancels the fetch and detaches the effect.
/// Selecting the already-selected id toggles back to "none".
pub struct DetailController {
    selection: Option<String>,
    detail: Option<MovieDetail>,
    loading: bool,
    inflight: Option<CancellationToken>,
    title: Box<dyn TitleSink>,
}

impl DetailController {
    pub fn new(title: Box<dyn TitleSink>) -> Self {
        Self {
            selection: None,
            detail: None,
            loading: false,
            inflight: None,
            title,
        }
    }

    /// React to the user picking a result. Returns a ticket when a detail
    /// fetch should be issued; `None` means the selection was toggled off.
    pub fn on_select(&mut self, id: &str) -> Option<DetailTicket> {
        if self.selection.as_deref() == Some(id) {
            self.close();
            return None;
        }

        // Leave the previous selection before entering the new one
        self.cancel_inflight();
        self.clear_detail();

        self.selection = Some(id.to_string());
        self.loading = true;

        let token = CancellationToken::new();
        self.inflight = Some(token.clone());
        Some(DetailTicket {
            id: id.to_string(),
            token,
        })
    }

    /// Fold a detail fetch outcome back into the state. Stale completions
    /// are detected via the token and dropped.
    pub fn apply_outcome(&mut self, ticket: &DetailTicket, outcome: Result<MovieDetail, FetchError>) {
        if ticket.token.is_cancelled() {
            debug!(id = %ticket.id, "dropping stale detail response");
            return;
        }

        match outcome {
            Err(FetchError::Cancelled) => return,
            Ok(detail) => {
                if !detail.title.is_empty() {
                    self.title.set_title(&page_title(&detail.title));
                }
                self.detail = Some(detail);
            }
            // Failures degrade to an empty detail pane; nothing crashes
            // and nothing propagates to other controllers.
            Err(err) => {
                warn!(id = %ticket.id, "detail fetch failed: {}", err);
            }
        }

        self.loading = false;
        self.inflight = None;
    }

    /// Close the detail view: cancel any in-flight fetch and detach the
    /// title effect
    pub fn close(&mut self) {
        self.cancel_inflight();
        self.clear_detail();
        self.selection = None;
        self.loading = false;
    }

    /// Confirm adding the current detail to the watched list with the
    /// user's rating (1..=10). No-op unless a detail is loaded and the
    /// rating is in range; on success the detail view is closed.
    pub fn confirm_add(&mut self, user_rating: u8) -> Option<WatchedEntry> {
        if !(1..=10).contains(&user_rating) {
            return None;
        }
        let detail = self.detail.as_ref()?;
        let entry = WatchedEntry::from_detail(detail, user_rating);
        self.close();
        Some(entry)
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    pub fn detail(&self) -> Option<&MovieDetail> {
        self.detail.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
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

    fn clear_detail(&mut self) {
        if let Some(detail) = self.detail.take() {
            if !detail.title.is_empty() {
                self.title.reset_title();
            }
        }
    }
}

impl Default for DetailController {
    fn default() -> Self {
        Self::new(Box::new(NoopTitle))
    }
}
