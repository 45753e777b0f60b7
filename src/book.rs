use reqwest::Url;
use serde::Deserialize;
use serde::Serialize;

/// Priced offer attached to a volume. Amount and currency always travel together.
#[derive(Clone, Debug, PartialEq)]
pub struct RetailPrice {
    pub amount: f64,
    pub currency_code: String,
}

impl RetailPrice {
    /// Decimal text with at least one fractional digit, `10` -> `"10.0"`.
    pub fn formatted_amount(&self) -> String {
        if self.amount.fract() == 0.0 && self.amount.is_finite() {
            format!("{:.1}", self.amount)
        } else {
            self.amount.to_string()
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Book {
    title: String,
    purchase_url: Option<String>,
    description: Option<String>,
    author: Option<String>,
    language: String,
    retail_price: Option<RetailPrice>,
    thumbnail_url: Url,
}

impl Book {
    pub fn new(
        title: String,
        purchase_url: Option<String>,
        description: Option<String>,
        author: Option<String>,
        language: String,
        retail_price: Option<RetailPrice>,
        thumbnail_url: Url,
    ) -> Book {
        Book {
            title,
            purchase_url,
            description,
            author,
            language,
            retail_price,
            thumbnail_url,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn purchase_url(&self) -> &str {
        self.purchase_url.as_deref().unwrap_or_default()
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    pub fn author(&self) -> &str {
        self.author.as_deref().unwrap_or_default()
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn retail_price(&self) -> Option<&RetailPrice> {
        self.retail_price.as_ref()
    }

    pub fn price(&self) -> String {
        self.retail_price
            .as_ref()
            .map(RetailPrice::formatted_amount)
            .unwrap_or_default()
    }

    pub fn currency_code(&self) -> &str {
        self.retail_price
            .as_ref()
            .map(|p| p.currency_code.as_str())
            .unwrap_or_default()
    }

    pub fn thumbnail_url(&self) -> &Url {
        &self.thumbnail_url
    }
}

/// Flat, all-text shape of a [`Book`] used for printing and CSV export.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct BookRecord {
    pub title: String,
    pub author: String,
    pub description: String,
    pub price: String,
    pub currency_code: String,
    pub language: String,
    pub purchase_url: String,
    pub thumbnail_url: String,
}

impl From<&Book> for BookRecord {
    fn from(book: &Book) -> Self {
        BookRecord {
            title: book.title().to_string(),
            author: book.author().to_string(),
            description: book.description().to_string(),
            price: book.price(),
            currency_code: book.currency_code().to_string(),
            language: book.language().to_string(),
            purchase_url: book.purchase_url().to_string(),
            thumbnail_url: book.thumbnail_url().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(retail_price: Option<RetailPrice>) -> Book {
        Book::new(
            "Dune".to_string(),
            None,
            None,
            None,
            "en".to_string(),
            retail_price,
            Url::parse("http://books.google.com/books/content?id=1").unwrap(),
        )
    }

    #[test]
    fn whole_amounts_keep_one_fractional_digit() {
        let price = RetailPrice {
            amount: 10.0,
            currency_code: "USD".to_string(),
        };
        assert_eq!(price.formatted_amount(), "10.0");
    }

    #[test]
    fn fractional_amounts_are_not_padded() {
        let price = RetailPrice {
            amount: 4.99,
            currency_code: "EUR".to_string(),
        };
        assert_eq!(price.formatted_amount(), "4.99");
    }

    #[test]
    fn missing_price_leaves_both_price_and_currency_empty() {
        let book = book(None);
        assert_eq!(book.price(), "");
        assert_eq!(book.currency_code(), "");
    }

    #[test]
    fn record_flattens_optional_fields_to_empty_text() {
        let record = BookRecord::from(&book(Some(RetailPrice {
            amount: 7.5,
            currency_code: "GBP".to_string(),
        })));
        assert_eq!(record.title, "Dune");
        assert_eq!(record.author, "");
        assert_eq!(record.purchase_url, "");
        assert_eq!(record.price, "7.5");
        assert_eq!(record.currency_code, "GBP");
        assert_eq!(
            record.thumbnail_url,
            "http://books.google.com/books/content?id=1"
        );
    }
}
