use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, error};

use crate::{
    book::Book,
    error::{Error, Result},
    extract::extract_books,
    search_url, SEARCH_ENDPOINT,
};

pub const CONNECT_TIMEOUT: Duration = Duration::from_millis(15_000);
pub const READ_TIMEOUT: Duration = Duration::from_millis(10_000);

#[derive(Clone, Debug)]
pub struct FetchConfig {
    pub endpoint: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            endpoint: SEARCH_ENDPOINT.to_string(),
            connect_timeout: CONNECT_TIMEOUT,
            read_timeout: READ_TIMEOUT,
        }
    }
}

/// Performs search requests against a Google Books compatible endpoint.
#[derive(Clone, Debug)]
pub struct BookFetcher {
    client: Client,
    endpoint: String,
}

impl BookFetcher {
    pub fn new(config: FetchConfig) -> Result<BookFetcher> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .build()?;

        Ok(BookFetcher {
            client,
            endpoint: config.endpoint,
        })
    }

    pub fn search_url(&self, query: &str) -> String {
        search_url(&self.endpoint, query)
    }

    /// GETs `url` and returns the body. Anything but a 200 is an error.
    pub async fn try_fetch(&self, url: &str) -> Result<String> {
        debug!("request url: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Like [`BookFetcher::try_fetch`], but every failure is logged and
    /// collapsed to an empty body. `None` skips the request entirely.
    pub async fn fetch(&self, url: Option<&str>) -> String {
        let url = match url {
            Some(url) => url,
            None => return String::new(),
        };

        match self.try_fetch(url).await {
            Ok(body) => body,
            Err(Error::Status(code)) => {
                error!("Error response code: {}", code);
                String::new()
            }
            Err(e) => {
                error!("Problem retrieving the book JSON results: {}", e);
                String::new()
            }
        }
    }

    /// Builds the URL for `query`, fetches it and extracts the books.
    pub async fn search(&self, query: &str) -> Vec<Book> {
        let url = self.search_url(query);
        let body = self.fetch(Some(url.as_str())).await;
        extract_books(Some(body.as_str())).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_public_endpoint_and_timeouts() {
        let config = FetchConfig::default();
        assert_eq!(config.endpoint, "https://www.googleapis.com/books/v1/volumes");
        assert_eq!(config.connect_timeout, Duration::from_millis(15000));
        assert_eq!(config.read_timeout, Duration::from_millis(10000));
    }

    #[test]
    fn fetcher_builds_urls_against_its_endpoint() {
        let fetcher = BookFetcher::new(FetchConfig {
            endpoint: "http://localhost:9/volumes".to_string(),
            ..FetchConfig::default()
        })
        .unwrap();
        assert_eq!(
            fetcher.search_url("a b"),
            "http://localhost:9/volumes?q=a+b&filter=paid-ebooks&maxResults=20"
        );
    }

    #[tokio::test]
    async fn absent_url_returns_empty_body() {
        let fetcher = BookFetcher::new(FetchConfig::default()).unwrap();
        assert_eq!(fetcher.fetch(None).await, "");
    }

    #[tokio::test]
    async fn malformed_url_returns_empty_body() {
        let fetcher = BookFetcher::new(FetchConfig::default()).unwrap();
        assert_eq!(fetcher.fetch(Some("not a url")).await, "");
        assert!(matches!(
            fetcher.try_fetch("not a url").await,
            Err(Error::Network(_))
        ));
    }
}
