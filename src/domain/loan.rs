use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{Book, LoanId};

/// 延滞とみなすまでの日数
pub const OVERDUE_THRESHOLD_DAYS: i64 = 4;

/// 貸出
///
/// `returned`は三値：未設定(`None`) / 未返却(`Some(false)`) / 返却済み(`Some(true)`)。
/// 未設定と未返却はどちらも「貸出中」として扱う。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: Option<LoanId>,
    pub customer: String,
    pub customer_email: Option<String>,
    pub book: Book,
    pub date: NaiveDate,
    pub returned: Option<bool>,
}

impl Loan {
    /// 返却されていない（returnedがnullまたはfalse）
    pub fn is_outstanding(&self) -> bool {
        self.returned != Some(true)
    }
}

/// 書籍を貸し出す（純粋な関数）
///
/// 貸出可否（同じ書籍の未返却貸出がないこと）はアプリケーション層で確認する。
pub fn loan_book(
    book: Book,
    customer: impl Into<String>,
    customer_email: Option<String>,
    borrowed_on: NaiveDate,
) -> Loan {
    Loan {
        id: None,
        customer: customer.into(),
        customer_email,
        book,
        date: borrowed_on,
        returned: None,
    }
}

/// 書籍を返却する（純粋な関数）
///
/// 貸出中かどうかは検証しない。
pub fn return_book(loan: Loan) -> Loan {
    Loan {
        returned: Some(true),
        ..loan
    }
}

/// 延滞判定の基準日
///
/// この日以前に貸し出された未返却の貸出が延滞となる。
pub fn overdue_cutoff(today: NaiveDate, threshold_days: i64) -> NaiveDate {
    today - Duration::days(threshold_days)
}

/// 延滞しているか判定する
pub fn is_overdue(loan: &Loan, today: NaiveDate, threshold_days: i64) -> bool {
    loan.is_outstanding() && loan.date <= overdue_cutoff(today, threshold_days)
}

/// 貸出検索条件
///
/// 書籍のisbn一致 **または** 利用者一致（AND ではない）。
/// 指定されていない条件はどの貸出にも一致しない。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoanFilter {
    pub isbn: Option<String>,
    pub customer: Option<String>,
}

impl LoanFilter {
    pub fn matches(&self, loan: &Loan) -> bool {
        let isbn_matches = self.isbn.as_deref() == Some(loan.book.isbn.as_str());
        let customer_matches = self.customer.as_deref() == Some(loan.customer.as_str());

        isbn_matches || customer_matches
    }
}
