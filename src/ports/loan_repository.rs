use crate::domain::{BookId, Loan, LoanFilter, LoanId, Page, PageRequest};
use async_trait::async_trait;
use chrono::NaiveDate;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 同じ書籍の未返却貸出が既にある（ストア側の一意制約違反）
#[derive(Debug, thiserror::Error)]
#[error("book {0} already has an outstanding loan")]
pub struct OutstandingLoanExists(pub BookId);

/// 貸出ストアポート
#[async_trait]
pub trait LoanRepository: Send + Sync {
    /// 貸出を保存する
    ///
    /// idが`None`なら新規登録、あれば更新。
    /// 登録・更新で同じ書籍の未返却貸出と衝突した場合は[`OutstandingLoanExists`]を返す。
    async fn save(&self, loan: Loan) -> Result<Loan>;

    /// 書籍に未返却（returnedがnullまたはfalse）の貸出があるか
    async fn exists_by_book_and_not_returned(&self, book_id: BookId) -> Result<bool>;

    async fn find_by_id(&self, id: LoanId) -> Result<Option<Loan>>;

    /// 書籍のisbn一致 OR 利用者一致で検索する
    async fn find_by_book_isbn_or_customer(
        &self,
        filter: &LoanFilter,
        page: PageRequest,
    ) -> Result<Page<Loan>>;

    /// 書籍の貸出履歴
    async fn find_by_book(&self, book_id: BookId, page: PageRequest) -> Result<Page<Loan>>;

    /// 延滞貸出
    ///
    /// 貸出日が`cutoff`以前で、returnedがnullまたはfalseの貸出すべて。
    async fn find_all_late_loans(&self, cutoff: NaiveDate) -> Result<Vec<Loan>>;
}
