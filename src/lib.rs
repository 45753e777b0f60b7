use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

pub mod book;
pub mod db;
pub mod error;
pub mod export;
pub mod extract;
pub mod google_books_api;
pub mod session;

pub use book::{Book, BookRecord, RetailPrice};
pub use error::{Error, Result};
pub use extract::{extract_books, extract_items};
pub use google_books_api::{BookFetcher, FetchConfig};
pub use session::{SearchOutcome, SearchSession};

pub const SEARCH_ENDPOINT: &str = "https://www.googleapis.com/books/v1/volumes";

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Replaces every whitespace run with `+`. Nothing else is escaped.
pub fn query_string(input: &str) -> Cow<'_, str> {
    WHITESPACE.replace_all(input, "+")
}

pub fn search_url(endpoint: &str, input: &str) -> String {
    format!(
        "{endpoint}?q={query}&filter=paid-ebooks&maxResults=20",
        endpoint = endpoint,
        query = query_string(input)
    )
}

/// Search URL for `input` against the public Google Books endpoint.
pub fn build_search_url(input: &str) -> String {
    search_url(SEARCH_ENDPOINT, input)
}
