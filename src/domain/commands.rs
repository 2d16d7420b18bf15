use chrono::NaiveDate;

use super::Book;

/// コマンド：書籍を登録する
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBook {
    pub isbn: String,
    pub title: String,
    pub author: String,
}

/// コマンド：書籍を貸し出す
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanBook {
    pub book: Book,
    pub customer: String,
    pub customer_email: Option<String>,
    pub borrowed_on: NaiveDate,
}

/// コマンド：isbnを指定して書籍を貸し出す
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowByIsbn {
    pub isbn: String,
    pub customer: String,
    pub customer_email: Option<String>,
    pub borrowed_on: NaiveDate,
}
