use std::{error::Error, path::PathBuf, time::Duration};

use book_search::{db, export::export_file, BookFetcher, BookRecord, FetchConfig, SearchSession};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Search paid e-books on Google Books.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct App {
    /// Words to search for
    #[arg(required = true)]
    query: Vec<String>,

    /// Volumes endpoint to query
    #[arg(long, env = "BOOK_SEARCH_ENDPOINT", default_value = book_search::SEARCH_ENDPOINT)]
    endpoint: String,

    /// Connect timeout in milliseconds
    #[arg(long, env = "BOOK_SEARCH_CONNECT_TIMEOUT_MS", default_value = "15000")]
    connect_timeout_ms: u64,

    /// Read timeout in milliseconds
    #[arg(long, env = "BOOK_SEARCH_READ_TIMEOUT_MS", default_value = "10000")]
    read_timeout_ms: u64,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Also write the results to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Also save the results into this SQLite library
    #[arg(long, env = "BOOK_SEARCH_DB")]
    db: Option<String>,
}

impl App {
    fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            endpoint: self.endpoint.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            read_timeout: Duration::from_millis(self.read_timeout_ms),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("book_search=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let app = App::parse();
    let query = app.query.join(" ");

    let session = SearchSession::new(BookFetcher::new(app.fetch_config())?);
    session.submit(query.as_str()).await?;
    let books = session.latest().map(|outcome| outcome.books).unwrap_or_default();
    info!("{} books found for {:?}", books.len(), query);

    let records: Vec<BookRecord> = books.iter().map(BookRecord::from).collect();
    if app.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else if records.is_empty() {
        println!("No books found.");
    } else {
        for (idx, record) in records.iter().enumerate() {
            print_record(idx + 1, record);
        }
    }

    if let Some(path) = &app.csv {
        export_file(path, &books)?;
        info!("wrote {} books to {}", books.len(), path.display());
    }

    if let Some(path) = &app.db {
        let conn = db::init_db(path)?;
        for book in &books {
            db::insert_book(&conn, book)?;
        }
        info!("saved {} books to {}", books.len(), path);
    }

    Ok(())
}

fn print_record(number: usize, record: &BookRecord) {
    println!("[{}] {}", number, record.title);
    if !record.author.is_empty() {
        println!("    by {}", record.author);
    }
    if record.price.is_empty() {
        println!("    language: {}", record.language);
    } else {
        println!(
            "    language: {} | price: {} {}",
            record.language, record.price, record.currency_code
        );
    }
    if !record.purchase_url.is_empty() {
        println!("    {}", record.purchase_url);
    }
}
