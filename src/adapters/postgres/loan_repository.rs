use crate::domain::{Book, BookId, Loan, LoanFilter, LoanId, Page, PageRequest};
use crate::ports::loan_repository::{
    LoanRepository as LoanRepositoryTrait, OutstandingLoanExists, Result,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row, postgres::PgRow};

/// Name of the partial unique index guarding "one outstanding loan per book"
const OUTSTANDING_LOAN_INDEX: &str = "loan_one_outstanding_per_book";

const SELECT_LOAN: &str = r#"
    SELECT
        l.id,
        l.customer,
        l.customer_email,
        l.date,
        l.returned,
        b.id AS book_id,
        b.isbn,
        b.title,
        b.author
    FROM loan l
    JOIN book b ON b.id = l.id_book
"#;

fn map_row_to_loan(row: &PgRow) -> Loan {
    Loan {
        id: Some(LoanId::from_i64(row.get("id"))),
        customer: row.get("customer"),
        customer_email: row.get("customer_email"),
        book: Book {
            id: Some(BookId::from_i64(row.get("book_id"))),
            isbn: row.get("isbn"),
            title: row.get("title"),
            author: row.get("author"),
        },
        date: row.get("date"),
        returned: row.get("returned"),
    }
}

/// Map a collision with the outstanding-loan index to [`OutstandingLoanExists`]
fn map_save_error(err: sqlx::Error, book_id: BookId) -> Box<dyn std::error::Error + Send + Sync> {
    match &err {
        sqlx::Error::Database(db)
            if db.is_unique_violation() && db.constraint() == Some(OUTSTANDING_LOAN_INDEX) =>
        {
            Box::new(OutstandingLoanExists(book_id))
        }
        _ => Box::new(err),
    }
}

fn unsaved_book_error() -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        "loan references a book without id",
    ))
}

/// PostgreSQL implementation of LoanRepository
pub struct LoanRepository {
    pool: PgPool,
}

impl LoanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_by_id(&self, id: i64) -> Result<Loan> {
        let row = sqlx::query(&format!("{SELECT_LOAN} WHERE l.id = $1"))
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(map_row_to_loan(&row))
    }
}

#[async_trait]
impl LoanRepositoryTrait for LoanRepository {
    /// Insert or update a loan
    ///
    /// An insert or update that collides with the outstanding-loan index is
    /// reported as [`OutstandingLoanExists`].
    async fn save(&self, loan: Loan) -> Result<Loan> {
        let book_id = loan.book.id.ok_or_else(unsaved_book_error)?;

        let id: i64 = match loan.id {
            None => sqlx::query_scalar(
                r#"
                INSERT INTO loan (customer, customer_email, id_book, date, returned)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id
                "#,
            )
            .bind(&loan.customer)
            .bind(&loan.customer_email)
            .bind(book_id.value())
            .bind(loan.date)
            .bind(loan.returned)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_save_error(e, book_id))?,
            Some(id) => sqlx::query_scalar(
                r#"
                UPDATE loan
                SET customer = $2, customer_email = $3, id_book = $4, date = $5, returned = $6
                WHERE id = $1
                RETURNING id
                "#,
            )
            .bind(id.value())
            .bind(&loan.customer)
            .bind(&loan.customer_email)
            .bind(book_id.value())
            .bind(loan.date)
            .bind(loan.returned)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_save_error(e, book_id))?,
        };

        self.fetch_one_by_id(id).await
    }

    async fn exists_by_book_and_not_returned(&self, book_id: BookId) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM loan
                WHERE id_book = $1 AND returned IS NOT TRUE
            )
            "#,
        )
        .bind(book_id.value())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn find_by_id(&self, id: LoanId) -> Result<Option<Loan>> {
        let row = sqlx::query(&format!("{SELECT_LOAN} WHERE l.id = $1"))
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(map_row_to_loan))
    }

    /// `b.isbn = $1 OR l.customer = $2`; a null parameter never matches
    async fn find_by_book_isbn_or_customer(
        &self,
        filter: &LoanFilter,
        page: PageRequest,
    ) -> Result<Page<Loan>> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM loan l
            JOIN book b ON b.id = l.id_book
            WHERE b.isbn = $1 OR l.customer = $2
            "#,
        )
        .bind(&filter.isbn)
        .bind(&filter.customer)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query(&format!(
            "{SELECT_LOAN} WHERE b.isbn = $1 OR l.customer = $2 ORDER BY l.id LIMIT $3 OFFSET $4"
        ))
        .bind(&filter.isbn)
        .bind(&filter.customer)
        .bind(i64::from(page.size()))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        let content = rows.iter().map(map_row_to_loan).collect();
        Ok(Page::new(content, page, total as u64))
    }

    async fn find_by_book(&self, book_id: BookId, page: PageRequest) -> Result<Page<Loan>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loan WHERE id_book = $1")
            .bind(book_id.value())
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query(&format!(
            "{SELECT_LOAN} WHERE l.id_book = $1 ORDER BY l.id LIMIT $2 OFFSET $3"
        ))
        .bind(book_id.value())
        .bind(i64::from(page.size()))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        let content = rows.iter().map(map_row_to_loan).collect();
        Ok(Page::new(content, page, total as u64))
    }

    async fn find_all_late_loans(&self, cutoff: NaiveDate) -> Result<Vec<Loan>> {
        let rows = sqlx::query(&format!(
            "{SELECT_LOAN} WHERE l.date <= $1 AND (l.returned IS NULL OR l.returned IS FALSE)"
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_loan).collect())
    }
}
