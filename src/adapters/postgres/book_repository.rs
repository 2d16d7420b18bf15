use crate::domain::{Book, BookFilter, BookId, Page, PageRequest};
use crate::ports::book_repository::{
    BookReferencedByLoans, BookRepository as BookRepositoryTrait, DuplicateIsbn, Result,
};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use super::escape_like;

fn map_row_to_book(row: &PgRow) -> Book {
    Book {
        id: Some(BookId::from_i64(row.get("id"))),
        isbn: row.get("isbn"),
        title: row.get("title"),
        author: row.get("author"),
    }
}

/// Map an isbn unique violation to [`DuplicateIsbn`]
fn map_save_error(err: sqlx::Error, isbn: &str) -> Box<dyn std::error::Error + Send + Sync> {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Box::new(DuplicateIsbn(isbn.to_string()))
        }
        _ => Box::new(err),
    }
}

/// PostgreSQL implementation of BookRepository
pub struct BookRepository {
    pool: PgPool,
}

impl BookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    /// Insert a new book or update title/author of an existing one
    ///
    /// The isbn column is never updated.
    async fn save(&self, book: Book) -> Result<Book> {
        let row = match book.id {
            None => sqlx::query(
                r#"
                INSERT INTO book (isbn, title, author)
                VALUES ($1, $2, $3)
                RETURNING id, isbn, title, author
                "#,
            )
            .bind(&book.isbn)
            .bind(&book.title)
            .bind(&book.author)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_save_error(e, &book.isbn))?,
            Some(id) => sqlx::query(
                r#"
                UPDATE book
                SET title = $2, author = $3
                WHERE id = $1
                RETURNING id, isbn, title, author
                "#,
            )
            .bind(id.value())
            .bind(&book.title)
            .bind(&book.author)
            .fetch_one(&self.pool)
            .await?,
        };

        Ok(map_row_to_book(&row))
    }

    async fn exists_by_isbn(&self, isbn: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM book WHERE isbn = $1)")
            .bind(isbn)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query("SELECT id, isbn, title, author FROM book WHERE id = $1")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(map_row_to_book))
    }

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        let row = sqlx::query("SELECT id, isbn, title, author FROM book WHERE isbn = $1")
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(map_row_to_book))
    }

    async fn delete(&self, id: BookId) -> Result<()> {
        sqlx::query("DELETE FROM book WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> {
                match &e {
                    sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                        Box::new(BookReferencedByLoans(id))
                    }
                    _ => Box::new(e),
                }
            })?;

        Ok(())
    }

    /// Filtered, paged listing
    ///
    /// Null parameters are ignored; text fields use case-insensitive
    /// substring matching with LIKE wildcards escaped.
    async fn find_all(&self, filter: &BookFilter, page: PageRequest) -> Result<Page<Book>> {
        const WHERE_CLAUSE: &str = r#"
            WHERE ($1::BIGINT IS NULL OR id = $1)
              AND ($2::TEXT IS NULL OR isbn ILIKE '%' || $2 || '%' ESCAPE '\')
              AND ($3::TEXT IS NULL OR title ILIKE '%' || $3 || '%' ESCAPE '\')
              AND ($4::TEXT IS NULL OR author ILIKE '%' || $4 || '%' ESCAPE '\')
        "#;

        let id = filter.id.map(|id| id.value());
        let isbn = filter.isbn.as_deref().map(escape_like);
        let title = filter.title.as_deref().map(escape_like);
        let author = filter.author.as_deref().map(escape_like);

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM book {WHERE_CLAUSE}"))
            .bind(id)
            .bind(&isbn)
            .bind(&title)
            .bind(&author)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query(&format!(
            "SELECT id, isbn, title, author FROM book {WHERE_CLAUSE} ORDER BY id LIMIT $5 OFFSET $6"
        ))
        .bind(id)
        .bind(&isbn)
        .bind(&title)
        .bind(&author)
        .bind(i64::from(page.size()))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        let content = rows.iter().map(map_row_to_book).collect();
        Ok(Page::new(content, page, total as u64))
    }
}
