use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::{
    Book, BookFilter, BookId, Loan, LoanFilter, Page, PageRequest, commands::CreateBook,
};

// ============================================================================
// Books
// ============================================================================

/// 書籍登録リクエスト（POST /api/books）
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BookRequest {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    #[serde(default)]
    pub title: String,
    #[validate(length(min = 1, message = "Author must not be empty"))]
    #[serde(default)]
    pub author: String,
    #[validate(length(min = 1, message = "Isbn must not be empty"))]
    #[serde(default)]
    pub isbn: String,
}

impl BookRequest {
    pub fn to_command(&self) -> CreateBook {
        CreateBook {
            isbn: self.isbn.clone(),
            title: self.title.clone(),
            author: self.author.clone(),
        }
    }
}

/// 書籍更新リクエスト（PUT /api/books/:id）
///
/// isbnは変更できないため含まない。
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateBookRequest {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    #[serde(default)]
    pub title: String,
    #[validate(length(min = 1, message = "Author must not be empty"))]
    #[serde(default)]
    pub author: String,
}

/// 書籍レスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookResponse {
    pub id: Option<i64>,
    pub title: String,
    pub author: String,
    pub isbn: String,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id.map(|id| id.value()),
            title: book.title,
            author: book.author,
            isbn: book.isbn,
        }
    }
}

/// 書籍検索のクエリパラメータ（GET /api/books）
#[derive(Debug, Default, Deserialize)]
pub struct BookQuery {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl BookQuery {
    pub fn filter(&self) -> BookFilter {
        BookFilter {
            id: self.id.map(BookId::from_i64),
            isbn: non_empty(&self.isbn),
            title: non_empty(&self.title),
            author: non_empty(&self.author),
        }
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest::of(self.page, self.size)
    }
}

/// ページ指定のみのクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl PageQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::of(self.page, self.size)
    }
}

// ============================================================================
// Loans
// ============================================================================

/// 貸出作成リクエスト（POST /api/loans）
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoanRequest {
    #[validate(length(min = 1, message = "Isbn must not be empty"))]
    #[serde(default)]
    pub isbn: String,
    #[validate(length(min = 1, max = 100, message = "Customer must have 1 to 100 characters"))]
    #[serde(default)]
    pub customer: String,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: Option<String>,
}

/// 返却リクエスト（PATCH /api/loans/:id）
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReturnedLoanRequest {
    pub returned: bool,
}

/// 貸出レスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanResponse {
    pub id: Option<i64>,
    pub isbn: String,
    pub customer: String,
    pub email: Option<String>,
    pub date: NaiveDate,
    pub returned: Option<bool>,
    pub book: BookResponse,
}

impl From<Loan> for LoanResponse {
    fn from(loan: Loan) -> Self {
        Self {
            id: loan.id.map(|id| id.value()),
            isbn: loan.book.isbn.clone(),
            customer: loan.customer,
            email: loan.customer_email,
            date: loan.date,
            returned: loan.returned,
            book: BookResponse::from(loan.book),
        }
    }
}

/// 貸出検索のクエリパラメータ（GET /api/loans）
#[derive(Debug, Default, Deserialize)]
pub struct LoanQuery {
    pub isbn: Option<String>,
    pub customer: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl LoanQuery {
    pub fn filter(&self) -> LoanFilter {
        LoanFilter {
            isbn: self.isbn.clone(),
            customer: self.customer.clone(),
        }
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest::of(self.page, self.size)
    }
}

// ============================================================================
// Paging / errors
// ============================================================================

/// ページ位置情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageableResponse {
    pub page_number: u32,
    pub page_size: u32,
    pub offset: u64,
}

/// ページングレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub pageable: PageableResponse,
    pub total_elements: u64,
    pub total_pages: u64,
    pub size: u32,
    pub number: u32,
    pub number_of_elements: usize,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl<T> PageResponse<T> {
    pub fn from_page<U>(page: Page<U>) -> Self
    where
        T: From<U>,
    {
        let total_pages = page.total_pages();
        let first = page.is_first();
        let last = page.is_last();
        let request = page.request;
        let content: Vec<T> = page.content.into_iter().map(T::from).collect();

        Self {
            pageable: PageableResponse {
                page_number: request.page(),
                page_size: request.size(),
                offset: request.offset(),
            },
            total_elements: page.total_elements,
            total_pages,
            size: request.size(),
            number: request.page(),
            number_of_elements: content.len(),
            first,
            last,
            empty: content.is_empty(),
            content,
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub errors: Vec<String>,
}

impl ErrorResponse {
    pub fn new(errors: Vec<String>) -> Self {
        Self { errors }
    }

    pub fn single(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
        }
    }
}

/// 空文字は未指定として扱う（空白は検索語としてそのまま残す）
fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.is_empty())
}
