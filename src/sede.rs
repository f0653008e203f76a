//! Stack Exchange Data Explorer: who bookmarked a post.
//!
//! The API does not expose bookmarks, but a saved data-explorer query does.
//! Its CSV export lists `(date, user id)` per bookmark. The data behind it is
//! refreshed weekly, so results can be up to a week old.

use chrono::NaiveDate;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, warn};

use crate::api::transport::DEFAULT_TIMEOUT;
use crate::config::SedeConfig;
use crate::types::{User, UserId};
use crate::users::UserFetcher;
use crate::{HuginnError, Result};

/// Default data explorer root.
pub const DEFAULT_SEDE_URL: &str = "https://data.stackexchange.com";

/// Revision id of the bookmarkers query
/// (<https://data.stackexchange.com/stackoverflow/query/1549808>).
pub const DEFAULT_SEDE_QUERY_ID: &str = "1894927";

/// One bookmark of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookmarkedBy {
    pub date: NaiveDate,
    pub user_id: UserId,
}

/// Client for the bookmarkers query's CSV export.
#[derive(Debug, Clone)]
pub struct SedeClient {
    http: Client,
    base_url: Url,
    site: String,
    query_id: String,
}

impl SedeClient {
    /// Client for `site` against the public data explorer.
    pub fn new(site: impl Into<String>) -> Result<Self> {
        Self::from_config(&SedeConfig::default(), site)
    }

    pub fn from_config(config: &SedeConfig, site: impl Into<String>) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            HuginnError::Configuration(format!("invalid data explorer URL {}: {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(HuginnError::Configuration(format!(
                "data explorer URL cannot have a path: {base_url}"
            )));
        }
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(concat!("huginn/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HuginnError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url,
            site: site.into(),
            query_id: config.query_id.clone(),
        })
    }

    /// `{base}/{site}/csv/{query}?postId={post_id}`
    pub fn query_url(&self, post_id: u64) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend([self.site.as_str(), "csv", self.query_id.as_str()]);
        }
        url.query_pairs_mut()
            .append_pair("postId", &post_id.to_string());
        url
    }

    /// Everyone who bookmarked `post_id`, in the order the query lists them.
    pub async fn bookmarkers(&self, post_id: u64) -> Result<Vec<BookmarkedBy>> {
        let url = self.query_url(post_id);
        debug!(url = %url, "data explorer request");
        let response = self.http.get(url.clone()).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "data explorer request failed");
            HuginnError::Http(e.to_string())
        })?;
        let status = response.status();
        if status != StatusCode::OK {
            warn!(url = %url, status = %status, "data explorer returned an error status");
            return Err(HuginnError::Http(format!(
                "data explorer returned HTTP {status}"
            )));
        }
        let text = response
            .text()
            .await
            .map_err(|e| HuginnError::Http(format!("failed to read data explorer response: {e}")))?;
        parse_bookmarkers(&text)
    }
}

/// Parse the query's CSV export.
///
/// The header line is dropped and blank lines ignored. Columns are quoted;
/// the date column reads `YYYY-MM-DD hh:mm:ss`, of which only the date is
/// kept.
pub fn parse_bookmarkers(text: &str) -> Result<Vec<BookmarkedBy>> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .skip(1)
        .map(parse_row)
        .collect()
}

fn parse_row(line: &str) -> Result<BookmarkedBy> {
    let unquoted = line.replace('"', "");
    let mut columns = unquoted.split(',');
    let (Some(date), Some(user_id)) = (columns.next(), columns.next()) else {
        return Err(HuginnError::Decode(format!("bookmark row has too few columns: {line}")));
    };
    let date = date.trim().split(' ').next().unwrap_or_default();
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| HuginnError::Decode(format!("bad bookmark date in {line:?}: {e}")))?;
    let user_id = user_id
        .trim()
        .parse()
        .map_err(|e| HuginnError::Decode(format!("bad user id in {line:?}: {e}")))?;
    Ok(BookmarkedBy { date, user_id })
}

/// Resolve everyone who bookmarked `post_id`, with their bookmark date.
///
/// Users the API no longer knows are reported as deleted placeholders, so
/// the result has one entry per bookmark row (duplicate ids excepted).
pub async fn bookmark_users(
    sede: &SedeClient,
    fetcher: &UserFetcher,
    post_id: u64,
) -> Result<Vec<(NaiveDate, User)>> {
    let bookmarks = sede.bookmarkers(post_id).await?;
    if bookmarks.is_empty() {
        return Ok(Vec::new());
    }

    let mut dates = std::collections::HashMap::with_capacity(bookmarks.len());
    let mut ids = Vec::with_capacity(bookmarks.len());
    for bookmark in &bookmarks {
        if dates.insert(bookmark.user_id, bookmark.date).is_none() {
            ids.push(bookmark.user_id);
        }
    }

    let users = fetcher
        .clone()
        .missing_assume_deleted(true)
        .resolve(&ids)
        .await?;
    Ok(users
        .into_iter()
        .filter_map(|user| dates.get(&user.user_id()).map(|&date| (date, user)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_csv_export() {
        let csv = "\"CreationDate\",\"UserId\"\r\n\
                   \"2021-03-04 00:00:00\",\"42\"\r\n\
                   \r\n\
                   \"2022-11-30 00:00:00\",\"17\"\r\n";
        let rows = parse_bookmarkers(csv).unwrap();
        assert_eq!(
            rows,
            vec![
                BookmarkedBy {
                    date: NaiveDate::from_ymd_opt(2021, 3, 4).unwrap(),
                    user_id: 42,
                },
                BookmarkedBy {
                    date: NaiveDate::from_ymd_opt(2022, 11, 30).unwrap(),
                    user_id: 17,
                },
            ]
        );
    }

    #[test]
    fn header_only_is_empty() {
        assert!(parse_bookmarkers("\"CreationDate\",\"UserId\"\n").unwrap().is_empty());
        assert!(parse_bookmarkers("").unwrap().is_empty());
    }

    #[test]
    fn bad_row_is_a_decode_error() {
        let err = parse_bookmarkers("h\n\"yesterday\",\"42\"\n").unwrap_err();
        assert!(matches!(err, HuginnError::Decode(_)));
        let err = parse_bookmarkers("h\n\"2021-03-04 00:00:00\",\"abc\"\n").unwrap_err();
        assert!(matches!(err, HuginnError::Decode(_)));
    }

    #[test]
    fn query_url_layout() {
        let sede = SedeClient::new("stackoverflow").unwrap();
        assert_eq!(
            sede.query_url(11227809).as_str(),
            "https://data.stackexchange.com/stackoverflow/csv/1894927?postId=11227809"
        );
    }
}
