use reqwest::Url;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::book::{Book, RetailPrice};
use crate::error::{Error, Result};

/// Parses a search response body into books, in the order of `items`.
///
/// Returns `None` for an absent or empty body. Invalid JSON is logged and
/// yields an empty list. A malformed item is logged and skipped without
/// affecting the items around it.
pub fn extract_books(raw: Option<&str>) -> Option<Vec<Book>> {
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return None,
    };

    let items = match extract_items(raw) {
        Ok(items) => items,
        Err(e) => {
            error!("Problem parsing the book JSON results: {}", e);
            return Some(vec![]);
        }
    };

    let books = items
        .into_iter()
        .filter_map(|item| match item {
            Ok(book) => Some(book),
            Err(e) => {
                warn!("Skipping book: {}", e);
                None
            }
        })
        .collect();
    Some(books)
}

/// One tagged result per element of `items`. Fails as a whole only when the
/// body is not JSON.
pub fn extract_items(raw: &str) -> Result<Vec<Result<Book>>> {
    let json: Value = serde_json::from_str(raw)?;

    let items = match json.get("items").and_then(Value::as_array) {
        Some(items) => items,
        None => {
            debug!("response has no items");
            return Ok(vec![]);
        }
    };

    Ok(items
        .iter()
        .enumerate()
        .map(|(index, item)| extract_book(index, item))
        .collect())
}

fn extract_book(index: usize, item: &Value) -> Result<Book> {
    let missing = |field| Error::MissingField { index, field };

    let volume_info = object(item, "volumeInfo").ok_or_else(|| missing("volumeInfo"))?;
    let sale_info = object(item, "saleInfo").ok_or_else(|| missing("saleInfo"))?;

    let title = text(volume_info, "title")
        .filter(|title| !title.is_empty())
        .ok_or_else(|| missing("title"))?;
    let purchase_url = text(sale_info, "buyLink");
    let author = volume_info["authors"]
        .as_array()
        .and_then(|authors| authors.first())
        .and_then(Value::as_str)
        .map(str::to_string);
    let description = text(volume_info, "description");

    let retail_price = match object(sale_info, "retailPrice") {
        Some(retail_price) => Some(RetailPrice {
            amount: amount(retail_price).ok_or_else(|| missing("retailPrice.amount"))?,
            currency_code: text(retail_price, "currencyCode")
                .ok_or_else(|| missing("retailPrice.currencyCode"))?,
        }),
        None => None,
    };

    let language = text(volume_info, "language").ok_or_else(|| missing("language"))?;

    let thumbnail = object(volume_info, "imageLinks")
        .and_then(|links| text(links, "thumbnail"))
        .ok_or_else(|| missing("imageLinks.thumbnail"))?;
    let thumbnail_url = parse_thumbnail(&thumbnail).ok_or_else(|| Error::InvalidField {
        index,
        field: "imageLinks.thumbnail",
        value: thumbnail.clone(),
    })?;

    Ok(Book::new(
        title,
        purchase_url,
        description,
        author,
        language,
        retail_price,
        thumbnail_url,
    ))
}

fn object<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| v.is_object())
}

fn text(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

// Protocol-relative links (`//host/path`) are taken as https.
fn parse_thumbnail(thumbnail: &str) -> Option<Url> {
    match Url::parse(thumbnail) {
        Ok(url) => Some(url),
        Err(_) if thumbnail.starts_with("//") => Url::parse(&format!("https:{thumbnail}")).ok(),
        Err(_) => None,
    }
}

// The API sends a number, but numeric strings are accepted as well.
fn amount(retail_price: &Value) -> Option<f64> {
    let amount = retail_price.get("amount")?;
    amount
        .as_f64()
        .or_else(|| amount.as_str().and_then(|s| s.trim().parse().ok()))
        .filter(|amount: &f64| amount.is_finite())
}
