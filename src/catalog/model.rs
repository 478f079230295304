use serde::{Deserialize, Deserializer};

/// One row of a search response. Immutable once received; a new search
/// replaces the whole list atomically.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchResultItem {
    #[serde(rename = "imdbID")]
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Poster")]
    pub poster_url: String,
}

/// Body shape of the search endpoint once the "not found" sentinel has
/// been ruled out.
#[derive(Debug, Deserialize)]
pub struct SearchPage {
    #[serde(rename = "Search", default)]
    pub search: Vec<SearchResultItem>,
}

/// Full record for a single movie. At most one instance is "current" at
/// a time; superseded instances are discarded, never merged.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieDetail {
    #[serde(rename = "imdbID")]
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "Poster", default)]
    pub poster_url: String,
    #[serde(rename = "Runtime", default, deserialize_with = "de_runtime_minutes")]
    pub runtime_minutes: u32,
    #[serde(rename = "imdbRating", default, deserialize_with = "de_rating")]
    pub imdb_rating: f32,
    #[serde(rename = "Plot", default)]
    pub plot: String,
    #[serde(rename = "Released", default)]
    pub released: String,
    #[serde(rename = "Actors", default)]
    pub actors: String,
    #[serde(rename = "Director", default)]
    pub director: String,
    #[serde(rename = "Genre", default)]
    pub genre: String,
}

/// Parse a catalog runtime string like "136 min" into minutes.
/// Non-numeric values ("N/A") yield 0 instead of failing the whole record.
fn de_runtime_minutes<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(parse_runtime_minutes(&raw))
}

pub(crate) fn parse_runtime_minutes(raw: &str) -> u32 {
    raw.split_whitespace()
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

/// The catalog encodes ratings as strings ("8.2") but numbers have been
/// observed too; accept both, with "N/A" falling back to 0.
fn de_rating<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Rating {
        Text(String),
        Number(f64),
    }

    match Rating::deserialize(deserializer)? {
        Rating::Text(s) => Ok(s.trim().parse().unwrap_or(0.0)),
        Rating::Number(n) => Ok(n as f32),
    }
}
