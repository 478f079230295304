use crate::catalog::model::{MovieDetail, SearchPage, SearchResultItem};
use crate::core::config::Config;
use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Outcome taxonomy for a single catalog fetch.
///
/// `Cancelled` is internal plumbing: callers absorb it silently and never
/// surface it as a user-visible error.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("movie not found")]
    NotFound,

    #[error("fetch cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}

/// Seam between the controllers and the remote catalog. Production code
/// uses [`CatalogClient`]; tests substitute fakes with controllable
/// outcomes.
#[allow(async_fn_in_trait)]
pub trait CatalogFetch {
    /// Search the catalog by free-text query.
    async fn search(
        &self,
        query: &str,
        token: &CancellationToken,
    ) -> Result<Vec<SearchResultItem>, FetchError>;

    /// Fetch the full record for one catalog id.
    async fn detail(&self, id: &str, token: &CancellationToken) -> Result<MovieDetail, FetchError>;
}

/// HTTP client for the remote movie catalog.
///
/// Each call issues exactly one GET. The caller owns the cancellation
/// token and must fire it before issuing a superseding call; a fired
/// token resolves the call to `FetchError::Cancelled` even if the
/// transport-level request runs to completion.
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl CatalogClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/?apikey={}&s={}",
            self.base_url,
            self.api_key,
            urlencoding::encode(query)
        )
    }

    fn detail_url(&self, id: &str) -> String {
        format!(
            "{}/?apikey={}&i={}",
            self.base_url,
            self.api_key,
            urlencoding::encode(id)
        )
    }

    /// GET a JSON body, racing the request against the cancellation token.
    async fn get_body(&self, url: String, token: &CancellationToken) -> Result<Value, FetchError> {
        let request = async {
            let response = self.http.get(&url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Transport(format!(
                    "unexpected status {status}"
                )));
            }
            let body = response.json::<Value>().await?;
            Ok(body)
        };

        let body = race_cancellation(token, request).await?;
        ensure_found(&body)?;
        Ok(body)
    }
}

impl CatalogFetch for CatalogClient {
    async fn search(
        &self,
        query: &str,
        token: &CancellationToken,
    ) -> Result<Vec<SearchResultItem>, FetchError> {
        debug!(query, "issuing search fetch");
        let body = self.get_body(self.search_url(query), token).await?;
        decode_search(body)
    }

    async fn detail(&self, id: &str, token: &CancellationToken) -> Result<MovieDetail, FetchError> {
        debug!(id, "issuing detail fetch");
        let body = self.get_body(self.detail_url(id), token).await?;
        decode_detail(body)
    }
}

/// Resolve `fut`, short-circuiting to `Cancelled` if the token fires first.
pub(crate) async fn race_cancellation<T>(
    token: &CancellationToken,
    fut: impl std::future::Future<Output = Result<T, FetchError>>,
) -> Result<T, FetchError> {
    tokio::select! {
        _ = token.cancelled() => Err(FetchError::Cancelled),
        result = fut => result,
    }
}

/// The catalog signals "not found" in-band with `Response: "False"`.
fn ensure_found(body: &Value) -> Result<(), FetchError> {
    match body.get("Response").and_then(Value::as_str) {
        Some(flag) if flag.eq_ignore_ascii_case("false") => Err(FetchError::NotFound),
        _ => Ok(()),
    }
}

fn decode_search(body: Value) -> Result<Vec<SearchResultItem>, FetchError> {
    let page: SearchPage = serde_json::from_value(body)
        .map_err(|e| FetchError::Transport(format!("malformed search response: {e}")))?;
    // Defensive: a well-formed page with zero rows is still "not found".
    if page.search.is_empty() {
        return Err(FetchError::NotFound);
    }
    Ok(page.search)
}

fn decode_detail(body: Value) -> Result<MovieDetail, FetchError> {
    serde_json::from_value(body)
        .map_err(|e| FetchError::Transport(format!("malformed detail response: {e}")))
}
