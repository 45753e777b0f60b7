use std::path::Path;

use csv::Writer;

use crate::book::{Book, BookRecord};
use crate::error::Result;

/// Writes `books` as CSV with a header row.
pub fn export_file<P: AsRef<Path>>(path: P, books: &[Book]) -> Result<()> {
    let mut wtr = Writer::from_path(path)?;
    for book in books {
        wtr.serialize(BookRecord::from(book))?;
    }
    wtr.flush()?;
    Ok(())
}
