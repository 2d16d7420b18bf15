mod common;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use rusty_library::application::ServiceDependencies;
use rusty_library::application::book::create_book;
use rusty_library::application::loan::{
    LoanApplicationError, borrow_by_isbn, find_loans, find_overdue_loans, get_loan, loan_book,
    loans_by_book, return_book, set_returned, update_loan,
};
use rusty_library::domain::commands::{BorrowByIsbn, CreateBook, LoanBook};
use rusty_library::domain::loan::OVERDUE_THRESHOLD_DAYS;
use rusty_library::domain::*;
use rusty_library::ports::loan_repository::{self, LoanRepository, OutstandingLoanExists};
use std::sync::Arc;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
}

async fn register_book(deps: &ServiceDependencies, isbn: &str) -> Book {
    create_book(
        deps,
        CreateBook {
            isbn: isbn.to_string(),
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
        },
    )
    .await
    .unwrap()
}

fn loan_cmd(book: &Book, customer: &str, borrowed_on: NaiveDate) -> LoanBook {
    LoanBook {
        book: book.clone(),
        customer: customer.to_string(),
        customer_email: Some(format!("{}@example.com", customer.to_lowercase())),
        borrowed_on,
    }
}

// ============================================================================
// 貸出
// ============================================================================

#[tokio::test]
async fn test_loan_book_success() {
    let ctx = common::in_memory_context();
    let book = register_book(&ctx.deps, "123").await;

    let loan = loan_book(&ctx.deps, loan_cmd(&book, "Harley", today()))
        .await
        .unwrap();

    assert_eq!(loan.id, Some(LoanId::from_i64(1)));
    assert_eq!(loan.book, book);
    assert_eq!(loan.customer, "Harley");
    assert_eq!(loan.date, today());
    assert_eq!(loan.returned, None);
}

#[tokio::test]
async fn test_loan_book_already_borrowed_fails_without_saving() {
    let ctx = common::in_memory_context();
    let book = register_book(&ctx.deps, "123").await;
    loan_book(&ctx.deps, loan_cmd(&book, "Harley", today()))
        .await
        .unwrap();
    assert_eq!(ctx.loan_repository.save_calls(), 1);

    // Act: 未返却のまま別の利用者が借りる
    let result = loan_book(&ctx.deps, loan_cmd(&book, "Someone", today())).await;

    // Assert
    let err = result.unwrap_err();
    assert!(matches!(err, LoanApplicationError::BookAlreadyBorrowed));
    assert_eq!(err.to_string(), "Book already borrowed");
    assert_eq!(ctx.loan_repository.save_calls(), 1);
}

#[tokio::test]
async fn test_loan_book_when_returned_false_is_still_borrowed() {
    let ctx = common::in_memory_context();
    let book = register_book(&ctx.deps, "123").await;
    let loan = loan_book(&ctx.deps, loan_cmd(&book, "Harley", today()))
        .await
        .unwrap();
    set_returned(&ctx.deps, loan.id.unwrap(), false).await.unwrap();

    let result = loan_book(&ctx.deps, loan_cmd(&book, "Someone", today())).await;

    assert!(matches!(
        result.unwrap_err(),
        LoanApplicationError::BookAlreadyBorrowed
    ));
}

#[tokio::test]
async fn test_return_then_borrow_again_succeeds() {
    let ctx = common::in_memory_context();
    let book = register_book(&ctx.deps, "123").await;
    let loan = loan_book(&ctx.deps, loan_cmd(&book, "Harley", today()))
        .await
        .unwrap();

    let returned = return_book(&ctx.deps, loan).await.unwrap();
    assert_eq!(returned.returned, Some(true));

    let again = loan_book(&ctx.deps, loan_cmd(&book, "Someone", today())).await;
    assert!(again.is_ok());
}

#[tokio::test]
async fn test_borrow_by_unknown_isbn_fails() {
    let ctx = common::in_memory_context();

    let result = borrow_by_isbn(
        &ctx.deps,
        BorrowByIsbn {
            isbn: "404".to_string(),
            customer: "Harley".to_string(),
            customer_email: None,
            borrowed_on: today(),
        },
    )
    .await;

    let err = result.unwrap_err();
    assert!(matches!(err, LoanApplicationError::BookNotFoundForIsbn));
    assert_eq!(err.to_string(), "Book not found for passed isbn");
    assert_eq!(ctx.loan_repository.save_calls(), 0);
}

#[tokio::test]
async fn test_borrow_by_isbn_resolves_book() {
    let ctx = common::in_memory_context();
    let book = register_book(&ctx.deps, "123").await;

    let loan = borrow_by_isbn(
        &ctx.deps,
        BorrowByIsbn {
            isbn: "123".to_string(),
            customer: "Harley".to_string(),
            customer_email: None,
            borrowed_on: today(),
        },
    )
    .await
    .unwrap();

    assert_eq!(loan.book.id, book.id);
}

#[tokio::test]
async fn test_get_and_update_loan() {
    let ctx = common::in_memory_context();
    let book = register_book(&ctx.deps, "123").await;
    let loan = loan_book(&ctx.deps, loan_cmd(&book, "Harley", today()))
        .await
        .unwrap();

    let found = get_loan(&ctx.deps, loan.id.unwrap()).await.unwrap().unwrap();
    assert_eq!(found, loan);

    let updated = update_loan(
        &ctx.deps,
        Loan {
            returned: Some(true),
            ..found
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.returned, Some(true));

    let missing = get_loan(&ctx.deps, LoanId::from_i64(99)).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_set_returned_unknown_loan_fails() {
    let ctx = common::in_memory_context();

    let result = set_returned(&ctx.deps, LoanId::from_i64(1), true).await;

    assert!(matches!(
        result.unwrap_err(),
        LoanApplicationError::LoanNotFound
    ));
}

#[tokio::test]
async fn test_reopen_returned_loan_while_book_borrowed_again_fails() {
    let ctx = common::in_memory_context();
    let book = register_book(&ctx.deps, "1234").await;
    let first = loan_book(&ctx.deps, loan_cmd(&book, "Harley", today()))
        .await
        .unwrap();
    set_returned(&ctx.deps, first.id.unwrap(), true).await.unwrap();
    loan_book(&ctx.deps, loan_cmd(&book, "Someone", today()))
        .await
        .unwrap();

    // Act: 返却済みの最初の貸出を未返却に戻す
    let result = set_returned(&ctx.deps, first.id.unwrap(), false).await;

    // Assert: 拒否され、未返却の貸出は1件のまま
    assert!(matches!(
        result.unwrap_err(),
        LoanApplicationError::BookAlreadyBorrowed
    ));
    let history = loans_by_book(&ctx.deps, book.id.unwrap(), PageRequest::default())
        .await
        .unwrap();
    let outstanding = history.content.iter().filter(|l| l.is_outstanding()).count();
    assert_eq!(outstanding, 1);
    assert_eq!(
        get_loan(&ctx.deps, first.id.unwrap()).await.unwrap().unwrap().returned,
        Some(true)
    );
}

#[tokio::test]
async fn test_reopen_returned_loan_when_book_is_free() {
    let ctx = common::in_memory_context();
    let book = register_book(&ctx.deps, "1234").await;
    let loan = loan_book(&ctx.deps, loan_cmd(&book, "Harley", today()))
        .await
        .unwrap();
    set_returned(&ctx.deps, loan.id.unwrap(), true).await.unwrap();

    let reopened = set_returned(&ctx.deps, loan.id.unwrap(), false)
        .await
        .unwrap();

    assert_eq!(reopened.returned, Some(false));
}

#[tokio::test]
async fn test_update_loan_colliding_with_outstanding_loan_fails() {
    let ctx = common::in_memory_context();
    let book = register_book(&ctx.deps, "1234").await;
    let first = loan_book(&ctx.deps, loan_cmd(&book, "Harley", today()))
        .await
        .unwrap();
    let first = return_book(&ctx.deps, first).await.unwrap();
    loan_book(&ctx.deps, loan_cmd(&book, "Someone", today()))
        .await
        .unwrap();

    // 確認を経ずに保存しても、ストアが衝突を拒否する
    let result = update_loan(
        &ctx.deps,
        Loan {
            returned: None,
            ..first
        },
    )
    .await;

    assert!(matches!(
        result.unwrap_err(),
        LoanApplicationError::BookAlreadyBorrowed
    ));
}

// ============================================================================
// 検索
// ============================================================================

#[tokio::test]
async fn test_find_loans_is_union_of_isbn_and_customer() {
    let ctx = common::in_memory_context();
    let book_1234 = register_book(&ctx.deps, "1234").await;
    let book_5678 = register_book(&ctx.deps, "5678").await;
    let book_9999 = register_book(&ctx.deps, "9999").await;

    loan_book(&ctx.deps, loan_cmd(&book_1234, "Someone", today()))
        .await
        .unwrap();
    loan_book(&ctx.deps, loan_cmd(&book_5678, "Harley", today()))
        .await
        .unwrap();
    loan_book(&ctx.deps, loan_cmd(&book_9999, "Nobody", today()))
        .await
        .unwrap();

    let filter = LoanFilter {
        isbn: Some("1234".to_string()),
        customer: Some("Harley".to_string()),
    };
    let page = find_loans(&ctx.deps, &filter, PageRequest::new(0, 10))
        .await
        .unwrap();

    assert_eq!(page.total_elements, 2);
    let isbns: Vec<&str> = page.content.iter().map(|l| l.book.isbn.as_str()).collect();
    assert!(isbns.contains(&"1234"));
    assert!(isbns.contains(&"5678"));
    assert_eq!(page.request.size(), 10);
    assert_eq!(page.request.page(), 0);
}

#[tokio::test]
async fn test_loans_by_book_returns_history() {
    let ctx = common::in_memory_context();
    let book = register_book(&ctx.deps, "123").await;
    let other = register_book(&ctx.deps, "456").await;

    let first = loan_book(&ctx.deps, loan_cmd(&book, "Harley", today()))
        .await
        .unwrap();
    return_book(&ctx.deps, first).await.unwrap();
    loan_book(&ctx.deps, loan_cmd(&book, "Someone", today()))
        .await
        .unwrap();
    loan_book(&ctx.deps, loan_cmd(&other, "Harley", today()))
        .await
        .unwrap();

    let page = loans_by_book(&ctx.deps, book.id.unwrap(), PageRequest::default())
        .await
        .unwrap();

    assert_eq!(page.total_elements, 2);
    assert!(page.content.iter().all(|l| l.book.id == book.id));
}

// ============================================================================
// 延滞検出
// ============================================================================

#[tokio::test]
async fn test_find_overdue_loans_includes_old_and_excludes_recent() {
    let ctx = common::in_memory_context();
    let old_book = register_book(&ctx.deps, "1").await;
    let new_book = register_book(&ctx.deps, "2").await;

    let old = loan_book(
        &ctx.deps,
        loan_cmd(&old_book, "Harley", today() - Duration::days(5)),
    )
    .await
    .unwrap();
    loan_book(&ctx.deps, loan_cmd(&new_book, "Someone", today()))
        .await
        .unwrap();

    let overdue = find_overdue_loans(&ctx.deps, today(), OVERDUE_THRESHOLD_DAYS)
        .await
        .unwrap();

    assert_eq!(overdue, vec![old]);
}

#[tokio::test]
async fn test_find_overdue_loans_excludes_returned() {
    let ctx = common::in_memory_context();
    let book = register_book(&ctx.deps, "1").await;
    let loan = loan_book(
        &ctx.deps,
        loan_cmd(&book, "Harley", today() - Duration::days(10)),
    )
    .await
    .unwrap();
    return_book(&ctx.deps, loan).await.unwrap();

    let overdue = find_overdue_loans(&ctx.deps, today(), OVERDUE_THRESHOLD_DAYS)
        .await
        .unwrap();

    assert!(overdue.is_empty());
}

// ============================================================================
// ストア側の一意制約
// ============================================================================

/// 確認では常に「貸出なし」と答え、保存で一意制約違反を返すストア
///
/// 同時リクエストが両方とも確認を通過した状況を再現する。
struct RacingLoanRepository;

#[async_trait]
impl LoanRepository for RacingLoanRepository {
    async fn save(&self, loan: Loan) -> loan_repository::Result<Loan> {
        Err(Box::new(OutstandingLoanExists(loan.book.id.unwrap())))
    }

    async fn exists_by_book_and_not_returned(
        &self,
        _book_id: BookId,
    ) -> loan_repository::Result<bool> {
        Ok(false)
    }

    async fn find_by_id(&self, _id: LoanId) -> loan_repository::Result<Option<Loan>> {
        Ok(None)
    }

    async fn find_by_book_isbn_or_customer(
        &self,
        _filter: &LoanFilter,
        page: PageRequest,
    ) -> loan_repository::Result<Page<Loan>> {
        Ok(Page::new(vec![], page, 0))
    }

    async fn find_by_book(
        &self,
        _book_id: BookId,
        page: PageRequest,
    ) -> loan_repository::Result<Page<Loan>> {
        Ok(Page::new(vec![], page, 0))
    }

    async fn find_all_late_loans(&self, _cutoff: NaiveDate) -> loan_repository::Result<Vec<Loan>> {
        Ok(vec![])
    }
}

#[tokio::test]
async fn test_store_conflict_is_reported_as_already_borrowed() {
    let ctx = common::in_memory_context();
    let book = register_book(&ctx.deps, "123").await;

    let deps = ServiceDependencies {
        loan_repository: Arc::new(RacingLoanRepository),
        ..ctx.deps.clone()
    };

    let result = loan_book(&deps, loan_cmd(&book, "Harley", today())).await;

    assert!(matches!(
        result.unwrap_err(),
        LoanApplicationError::BookAlreadyBorrowed
    ));
}
