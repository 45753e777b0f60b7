use rusqlite::{params, Connection};

use crate::book::{Book, BookRecord};
use crate::error::Result;

/// Opens (or creates) the local library of saved books.
pub fn init_db(db_path: &str) -> Result<Connection> {
    let conn = Connection::open(db_path)?;

    conn.execute(
        "create table if not exists books (
            id integer primary key,
            title text not null,
            author text not null,
            description text not null,
            price text not null,
            currency_code text not null,
            language text not null,
            purchase_url text not null,
            thumbnail_url text not null
        )",
        [],
    )?;

    conn.execute(
        "create unique index if not exists
             idx_title_author on books (title,author)",
        [],
    )?;

    Ok(conn)
}

pub fn get_book(conn: &Connection, book: &Book) -> rusqlite::Result<i64> {
    let mut stmt = conn.prepare(
        "SELECT id FROM books
             where title = (?1)
               and author = (?2)",
    )?;

    stmt.query_row(params![book.title(), book.author()], |row| row.get(0))
}

/// Saves `book` unless a book with the same title and author is already
/// there. Returns the row id either way.
pub fn insert_book(conn: &Connection, book: &Book) -> Result<i64> {
    match get_book(conn, book) {
        Ok(id) => return Ok(id),
        Err(rusqlite::Error::QueryReturnedNoRows) => {}
        Err(x) => return Err(x.into()),
    }

    let record = BookRecord::from(book);
    conn.execute(
        "INSERT INTO books (
                title,
                author,
                description,
                price,
                currency_code,
                language,
                purchase_url,
                thumbnail_url
            )
            values (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            record.title,
            record.author,
            record.description,
            record.price,
            record.currency_code,
            record.language,
            record.purchase_url,
            record.thumbnail_url,
        ],
    )?;

    Ok(conn.last_insert_rowid())
}

pub fn list_books(conn: &Connection) -> Result<Vec<BookRecord>> {
    let mut stmt = conn.prepare(
        "SELECT title, author, description, price, currency_code,
                language, purchase_url, thumbnail_url
           FROM books
          ORDER BY id",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(BookRecord {
            title: row.get(0)?,
            author: row.get(1)?,
            description: row.get(2)?,
            price: row.get(3)?,
            currency_code: row.get(4)?,
            language: row.get(5)?,
            purchase_url: row.get(6)?,
            thumbnail_url: row.get(7)?,
        })
    })?;

    let mut books = vec![];
    for row in rows {
        books.push(row?);
    }
    Ok(books)
}
