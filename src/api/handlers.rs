use crate::application::{
    ServiceDependencies,
    book::{self, BookApplicationError},
    loan,
};
use crate::domain::{BookId, LoanId, commands::BorrowByIsbn};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Local;
use std::sync::Arc;

use super::{
    error::ApiError,
    extract::ValidatedJson,
    types::{
        BookQuery, BookRequest, BookResponse, LoanQuery, LoanRequest, LoanResponse, PageQuery,
        PageResponse, ReturnedLoanRequest, UpdateBookRequest,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

/// idで書籍を取得し、なければ404
async fn require_book(state: &AppState, id: i64) -> Result<crate::domain::Book, ApiError> {
    book::get_book(&state.service_deps, BookId::from_i64(id))
        .await?
        .ok_or(ApiError::NotFound)
}

// ============================================================================
// Books
// ============================================================================

/// POST /api/books - 書籍を登録
///
/// isbnが登録済みなら400 "Isbn already registered"。
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<BookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    let book = book::create_book(&state.service_deps, req.to_command()).await?;
    Ok((StatusCode::CREATED, Json(BookResponse::from(book))))
}

/// GET /api/books/:id
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = require_book(&state, id).await?;
    Ok(Json(BookResponse::from(book)))
}

/// PUT /api/books/:id - タイトルと著者を更新
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateBookRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = require_book(&state, id)
        .await?
        .with_details(req.title, req.author);

    let updated = book::update_book(&state.service_deps, book).await?;
    Ok(Json(BookResponse::from(updated)))
}

/// DELETE /api/books/:id
///
/// 貸出履歴のある書籍は400 "Book has loans"。
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let book = require_book(&state, id).await?;
    book::delete_book(&state.service_deps, &book).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/books - 条件付き書籍一覧
///
/// クエリパラメータ: id, title, author, isbn, page, size
pub async fn find_books(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookQuery>,
) -> Result<Json<PageResponse<BookResponse>>, ApiError> {
    let page = book::find_books(&state.service_deps, &query.filter(), query.page_request()).await?;
    Ok(Json(PageResponse::from_page(page)))
}

/// GET /api/books/:id/loans - 書籍の貸出一覧
pub async fn loans_by_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse<LoanResponse>>, ApiError> {
    let book = require_book(&state, id).await?;
    let book_id = book.id.ok_or(BookApplicationError::MissingBookId)?;

    let page = loan::loans_by_book(&state.service_deps, book_id, query.page_request()).await?;
    Ok(Json(PageResponse::from_page(page)))
}

// ============================================================================
// Loans
// ============================================================================

/// POST /api/loans - 貸出を作成
///
/// 作成された貸出のidを返す。
///
/// 強制されるビジネスルール:
/// - isbnに対応する書籍が存在すること
/// - 書籍に未返却の貸出がないこと
pub async fn create_loan(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoanRequest>,
) -> Result<(StatusCode, Json<i64>), ApiError> {
    let cmd = BorrowByIsbn {
        isbn: req.isbn,
        customer: req.customer,
        customer_email: req.email,
        borrowed_on: Local::now().date_naive(),
    };

    let loan = loan::borrow_by_isbn(&state.service_deps, cmd).await?;
    let id = loan
        .id
        .ok_or_else(|| ApiError::Internal("saved loan has no id".to_string()))?;

    Ok((StatusCode::CREATED, Json(id.value())))
}

/// PATCH /api/loans/:id - 返却状態を更新
///
/// 返却済みの貸出を未返却に戻すとき、同じ書籍に別の未返却貸出があれば
/// 400 "Book already borrowed"。
pub async fn return_loan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<ReturnedLoanRequest>,
) -> Result<StatusCode, ApiError> {
    loan::set_returned(&state.service_deps, LoanId::from_i64(id), req.returned).await?;
    Ok(StatusCode::OK)
}

/// GET /api/loans - isbnまたは利用者で貸出を検索
///
/// isbn一致 OR customer一致（両方指定時は和集合）。
pub async fn find_loans(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LoanQuery>,
) -> Result<Json<PageResponse<LoanResponse>>, ApiError> {
    let page = loan::find_loans(&state.service_deps, &query.filter(), query.page_request()).await?;
    Ok(Json(PageResponse::from_page(page)))
}
