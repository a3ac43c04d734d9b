//! Paginated loading of people from the dataset API
//!
//! [`pages`] follows `rel="next"` links lazily; [`load_geojson_data`] drains
//! it and merges every page into one collection. Pages are requested strictly
//! one after another because each URL comes from the previous response, but
//! page bodies are only read and decoded once the last page is known, all at
//! the same time.

use async_trait::async_trait;
use futures::future::{try_join_all, BoxFuture};
use futures::stream::{self, Stream, TryStreamExt};
use futures::FutureExt;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Credentials;
use crate::data::PeopleFeatureCollection;
use crate::link::parse_link_header;

/// Query parameter carrying the API credential
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Base of the hosted datasets API
pub const DATASETS_API: &str = "https://api.mapbox.com/datasets/v1";

/// Errors that abort a load; no partial collection is ever returned
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("malformed feature collection from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Body of a response that has not been read yet
pub type BodyFuture = BoxFuture<'static, Result<Vec<u8>, LoadError>>;

/// What a [`Transport`] hands back for one GET
pub struct PageResponse {
    /// URL that was requested
    pub url: Url,
    /// Raw `Link` header, if the response had a readable one
    pub link: Option<String>,
    pub body: BodyFuture,
}

/// Issues GET requests for the loader
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and return as soon as headers are available
    async fn get(&self, url: Url) -> Result<PageResponse, LoadError>;
}

/// [`Transport`] backed by a `reqwest` client
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: Url) -> Result<PageResponse, LoadError> {
        let shown = redact(&url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| LoadError::Transport {
                url: shown.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                url: shown,
                status: status.as_u16(),
            });
        }

        let link = response
            .headers()
            .get(reqwest::header::LINK)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body = async move {
            response
                .bytes()
                .await
                .map(|bytes| bytes.to_vec())
                .map_err(|source| LoadError::Transport { url: shown, source })
        }
        .boxed();

        Ok(PageResponse { url, link, body })
    }
}

/// One fetched page whose body is still pending
pub struct Page {
    pub url: Url,
    /// Continuation, `None` on the last page
    pub next: Option<Url>,
    body: BodyFuture,
}

impl Page {
    /// Read and decode the page body
    pub async fn collection(self) -> Result<PeopleFeatureCollection, LoadError> {
        let bytes = self.body.await?;
        PeopleFeatureCollection::from_slice(&bytes).map_err(|source| LoadError::Body {
            url: redact(&self.url),
            source,
        })
    }
}

/// Lazily fetch every page starting at `url`
///
/// The stream ends after the first page without a `next` relation, or right
/// after yielding an error.
pub fn pages<'a, T>(
    transport: &'a T,
    url: Url,
    token: &'a str,
) -> impl Stream<Item = Result<Page, LoadError>> + 'a
where
    T: Transport + ?Sized,
{
    stream::try_unfold(Some(url), move |cursor: Option<Url>| async move {
        match cursor {
            Some(url) => fetch_page(transport, url, token).await.map(|page| {
                let next = page.next.clone();
                Some((page, next))
            }),
            None => Ok(None),
        }
    })
}

async fn fetch_page<T>(transport: &T, url: Url, token: &str) -> Result<Page, LoadError>
where
    T: Transport + ?Sized,
{
    let url = with_access_token(url, token);
    debug!(url = %redact(&url), "fetching page");

    let response = transport.get(url).await?;
    let next = response
        .link
        .as_deref()
        .and_then(|header| next_url(&response.url, header));

    Ok(Page {
        url: response.url,
        next,
        body: response.body,
    })
}

/// Fetch every page starting at `url` and merge them in request order
pub async fn load_geojson_data<T>(
    transport: &T,
    url: Url,
    token: &str,
) -> Result<PeopleFeatureCollection, LoadError>
where
    T: Transport + ?Sized,
{
    let pages: Vec<Page> = pages(transport, url, token).try_collect().await?;
    let page_count = pages.len();

    let collections = try_join_all(pages.into_iter().map(Page::collection)).await?;
    let merged = PeopleFeatureCollection::concat(collections);

    info!(pages = page_count, features = merged.len(), "loaded people");
    Ok(merged)
}

/// Load the whole dataset named by `credentials`
pub async fn load_dataset<T>(
    transport: &T,
    credentials: &Credentials,
) -> Result<PeopleFeatureCollection, LoadError>
where
    T: Transport + ?Sized,
{
    let url = dataset_features_url(&credentials.dataset)?;
    load_geojson_data(transport, url, &credentials.api_key).await
}

/// Features endpoint for a `{owner}/{dataset_id}` dataset
pub fn dataset_features_url(dataset: &str) -> Result<Url, LoadError> {
    let raw = format!("{}/{}/features", DATASETS_API, dataset.trim_matches('/'));
    Url::parse(&raw).map_err(|source| LoadError::InvalidUrl { url: raw, source })
}

/// Set `access_token`, replacing any value already present
pub fn with_access_token(mut url: Url, token: &str) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| *key != ACCESS_TOKEN_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(ACCESS_TOKEN_PARAM, token);
    url
}

/// Continuation URL from a `Link` header, resolved against `current`
///
/// A missing or unreadable relation means there are no further pages.
pub fn next_url(current: &Url, header: &str) -> Option<Url> {
    let rels = parse_link_header(header);
    let next = rels.next()?;
    match current.join(next) {
        Ok(url) => Some(url),
        Err(err) => {
            warn!(error = %err, "ignoring unparseable next link");
            None
        }
    }
}

/// URL as a string with the access token masked
pub fn redact(url: &Url) -> String {
    if url.query().is_none() {
        return url.to_string();
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            let value = if key == ACCESS_TOKEN_PARAM {
                "***".to_string()
            } else {
                value.into_owned()
            };
            (key.into_owned(), value)
        })
        .collect();

    let mut shown = url.clone();
    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_dataset_features_url() {
        let u = dataset_features_url("someone/ck123").unwrap();
        assert_eq!(
            u.as_str(),
            "https://api.mapbox.com/datasets/v1/someone/ck123/features"
        );
    }

    #[test]
    fn test_access_token_appended() {
        let u = with_access_token(url("https://x.test/features"), "pk.abc");
        assert_eq!(u.as_str(), "https://x.test/features?access_token=pk.abc");
    }

    #[test]
    fn test_access_token_keeps_other_params() {
        let u = with_access_token(url("https://x.test/f?start=abc&limit=10"), "pk.abc");
        assert_eq!(
            u.as_str(),
            "https://x.test/f?start=abc&limit=10&access_token=pk.abc"
        );
    }

    #[test]
    fn test_access_token_replaced_not_duplicated() {
        let u = with_access_token(url("https://x.test/f?access_token=old&start=abc"), "new");
        assert_eq!(u.as_str(), "https://x.test/f?start=abc&access_token=new");
    }

    #[test]
    fn test_next_url_absolute() {
        let current = url("https://x.test/f?access_token=t");
        let next = next_url(&current, r#"<https://y.test/f?start=2>; rel="next""#).unwrap();
        assert_eq!(next.as_str(), "https://y.test/f?start=2");
    }

    #[test]
    fn test_next_url_relative() {
        let current = url("https://x.test/datasets/f?access_token=t");
        let next = next_url(&current, r#"</datasets/f?start=2>; rel="next""#).unwrap();
        assert_eq!(next.as_str(), "https://x.test/datasets/f?start=2");
    }

    #[test]
    fn test_next_url_absent_or_malformed() {
        let current = url("https://x.test/f");
        assert_eq!(next_url(&current, r#"<https://x.test/f?p=0>; rel="prev""#), None);
        assert_eq!(next_url(&current, "<https://x.test/f?p=2>"), None);
        assert_eq!(next_url(&current, r#"<http://[::1>; rel="next""#), None);
    }

    #[test]
    fn test_redact_hides_token() {
        let shown = redact(&url("https://x.test/f?start=1&access_token=secret"));
        assert!(!shown.contains("secret"));
        assert!(shown.contains("access_token=***") || shown.contains("access_token=%2A%2A%2A"));
        assert!(shown.contains("start=1"));
    }

    #[test]
    fn test_redact_without_query() {
        assert_eq!(redact(&url("https://x.test/f")), "https://x.test/f");
    }
}
