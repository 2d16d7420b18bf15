use crate::application::ServiceDependencies;
use crate::domain::{
    self, BookId, Loan, LoanFilter, LoanId, Page, PageRequest,
    commands::{BorrowByIsbn, LoanBook},
};
use crate::ports::OutstandingLoanExists;

use super::errors::{LoanApplicationError, Result};

/// 未返却貸出の一意制約違反は`BookAlreadyBorrowed`として返す
fn save_error(e: Box<dyn std::error::Error + Send + Sync>) -> LoanApplicationError {
    if e.is::<OutstandingLoanExists>() {
        LoanApplicationError::BookAlreadyBorrowed
    } else {
        LoanApplicationError::RepositoryError(e)
    }
}

/// 書籍を貸し出す
///
/// ビジネスルール：
/// - 同じ書籍の未返却貸出（returnedがnullまたはfalse）がないこと
///
/// 違反時はストアへの保存を行わない。
///
/// # 並行性
///
/// 確認と保存は不可分ではない。同時リクエストが両方とも確認を通過した場合は
/// ストア側の一意制約（書籍ごとの未返却貸出は1件）で後着が失敗し、
/// 同じ`BookAlreadyBorrowed`として返す。
pub async fn loan_book(deps: &ServiceDependencies, cmd: LoanBook) -> Result<Loan> {
    let book_id = cmd
        .book
        .id
        .ok_or(LoanApplicationError::BookNotFoundForIsbn)?;

    let borrowed = deps
        .loan_repository
        .exists_by_book_and_not_returned(book_id)
        .await
        .map_err(LoanApplicationError::RepositoryError)?;

    if borrowed {
        return Err(LoanApplicationError::BookAlreadyBorrowed);
    }

    let loan = domain::loan::loan_book(cmd.book, cmd.customer, cmd.customer_email, cmd.borrowed_on);

    let saved = deps.loan_repository.save(loan).await.map_err(save_error)?;

    tracing::debug!(loan_id = ?saved.id, book_id = %book_id, customer = %saved.customer, "book loaned");
    Ok(saved)
}

/// isbnで書籍を引いて貸し出す
///
/// isbnに対応する書籍がなければ`BookNotFoundForIsbn`。
pub async fn borrow_by_isbn(deps: &ServiceDependencies, cmd: BorrowByIsbn) -> Result<Loan> {
    let book = deps
        .book_repository
        .find_by_isbn(&cmd.isbn)
        .await
        .map_err(LoanApplicationError::BookRepositoryError)?
        .ok_or(LoanApplicationError::BookNotFoundForIsbn)?;

    loan_book(
        deps,
        LoanBook {
            book,
            customer: cmd.customer,
            customer_email: cmd.customer_email,
            borrowed_on: cmd.borrowed_on,
        },
    )
    .await
}

pub async fn get_loan(deps: &ServiceDependencies, id: LoanId) -> Result<Option<Loan>> {
    deps.loan_repository
        .find_by_id(id)
        .await
        .map_err(LoanApplicationError::RepositoryError)
}

/// 貸出をそのまま保存する
///
/// 同じ書籍の別の未返却貸出と衝突する場合は`BookAlreadyBorrowed`。
pub async fn update_loan(deps: &ServiceDependencies, loan: Loan) -> Result<Loan> {
    deps.loan_repository.save(loan).await.map_err(save_error)
}

/// 書籍を返却する
///
/// returnedをtrueにして保存する。貸出中であったかは検証しない。
pub async fn return_book(deps: &ServiceDependencies, loan: Loan) -> Result<Loan> {
    let returned = update_loan(deps, domain::loan::return_book(loan)).await?;
    tracing::debug!(loan_id = ?returned.id, "book returned");
    Ok(returned)
}

/// IDで貸出を引き、returnedを指定値にする
///
/// 貸出がなければ`LoanNotFound`。
/// 返却済みの貸出を未返却に戻す場合も貸出と同じ規則を適用し、
/// 同じ書籍に別の未返却貸出があれば`BookAlreadyBorrowed`。
pub async fn set_returned(deps: &ServiceDependencies, id: LoanId, returned: bool) -> Result<Loan> {
    let loan = get_loan(deps, id)
        .await?
        .ok_or(LoanApplicationError::LoanNotFound)?;

    if returned {
        return_book(deps, loan).await
    } else {
        if !loan.is_outstanding() {
            // この貸出は返却済みなので、未返却の貸出があればそれは別の貸出
            let book_id = loan
                .book
                .id
                .ok_or(LoanApplicationError::BookNotFoundForIsbn)?;
            let borrowed = deps
                .loan_repository
                .exists_by_book_and_not_returned(book_id)
                .await
                .map_err(LoanApplicationError::RepositoryError)?;

            if borrowed {
                return Err(LoanApplicationError::BookAlreadyBorrowed);
            }
        }

        update_loan(
            deps,
            Loan {
                returned: Some(false),
                ..loan
            },
        )
        .await
    }
}

/// isbn一致 OR 利用者一致で貸出を検索する
pub async fn find_loans(
    deps: &ServiceDependencies,
    filter: &LoanFilter,
    page: PageRequest,
) -> Result<Page<Loan>> {
    deps.loan_repository
        .find_by_book_isbn_or_customer(filter, page)
        .await
        .map_err(LoanApplicationError::RepositoryError)
}

/// 書籍の貸出一覧
pub async fn loans_by_book(
    deps: &ServiceDependencies,
    book_id: BookId,
    page: PageRequest,
) -> Result<Page<Loan>> {
    deps.loan_repository
        .find_by_book(book_id, page)
        .await
        .map_err(LoanApplicationError::RepositoryError)
}
