use crate::domain::{Book, BookFilter, BookId, Page, PageRequest, commands::CreateBook};
use crate::ports::{BookReferencedByLoans, DuplicateIsbn};

use super::errors::{BookApplicationError, Result};
use crate::application::ServiceDependencies;

fn repository_error(e: Box<dyn std::error::Error + Send + Sync>) -> BookApplicationError {
    if e.is::<DuplicateIsbn>() {
        BookApplicationError::IsbnAlreadyRegistered
    } else if e.is::<BookReferencedByLoans>() {
        BookApplicationError::BookHasLoans
    } else {
        BookApplicationError::RepositoryError(e)
    }
}

/// 書籍を登録する
///
/// ビジネスルール：isbnが未登録であること。
/// 登録済みの場合はストアへの保存を行わない。
pub async fn create_book(deps: &ServiceDependencies, cmd: CreateBook) -> Result<Book> {
    let exists = deps
        .book_repository
        .exists_by_isbn(&cmd.isbn)
        .await
        .map_err(BookApplicationError::RepositoryError)?;

    if exists {
        return Err(BookApplicationError::IsbnAlreadyRegistered);
    }

    let book = Book::new(cmd.isbn, cmd.title, cmd.author);
    let saved = deps
        .book_repository
        .save(book)
        .await
        .map_err(repository_error)?;

    tracing::debug!(book_id = ?saved.id, isbn = %saved.isbn, "book registered");
    Ok(saved)
}

pub async fn get_book(deps: &ServiceDependencies, id: BookId) -> Result<Option<Book>> {
    deps.book_repository
        .find_by_id(id)
        .await
        .map_err(BookApplicationError::RepositoryError)
}

pub async fn get_book_by_isbn(deps: &ServiceDependencies, isbn: &str) -> Result<Option<Book>> {
    deps.book_repository
        .find_by_isbn(isbn)
        .await
        .map_err(BookApplicationError::RepositoryError)
}

/// 書籍を削除する
///
/// idのない書籍は`MissingBookId`。
/// 貸出履歴（返却済みを含む）がある書籍は`BookHasLoans`で、削除しない。
pub async fn delete_book(deps: &ServiceDependencies, book: &Book) -> Result<()> {
    let id = book.id.ok_or(BookApplicationError::MissingBookId)?;

    let history = deps
        .loan_repository
        .find_by_book(id, PageRequest::new(0, 1))
        .await
        .map_err(BookApplicationError::RepositoryError)?;

    if history.total_elements > 0 {
        return Err(BookApplicationError::BookHasLoans);
    }

    deps.book_repository
        .delete(id)
        .await
        .map_err(repository_error)?;

    tracing::debug!(book_id = %id, "book deleted");
    Ok(())
}

/// 書籍を更新する
///
/// idのない書籍は`MissingBookId`。
pub async fn update_book(deps: &ServiceDependencies, book: Book) -> Result<Book> {
    if book.id.is_none() {
        return Err(BookApplicationError::MissingBookId);
    }

    deps.book_repository
        .save(book)
        .await
        .map_err(repository_error)
}

pub async fn find_books(
    deps: &ServiceDependencies,
    filter: &BookFilter,
    page: PageRequest,
) -> Result<Page<Book>> {
    deps.book_repository
        .find_all(filter, page)
        .await
        .map_err(BookApplicationError::RepositoryError)
}
