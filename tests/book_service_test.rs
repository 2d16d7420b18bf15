mod common;

use chrono::NaiveDate;
use rusty_library::application::book::{
    BookApplicationError, create_book, delete_book, find_books, get_book, get_book_by_isbn,
    update_book,
};
use rusty_library::application::loan::{loan_book, return_book};
use rusty_library::domain::commands::LoanBook;
use rusty_library::domain::{Book, BookFilter, BookId, PageRequest, commands::CreateBook};

fn create_cmd(isbn: &str, title: &str, author: &str) -> CreateBook {
    CreateBook {
        isbn: isbn.to_string(),
        title: title.to_string(),
        author: author.to_string(),
    }
}

#[tokio::test]
async fn test_create_book_assigns_id() {
    let ctx = common::in_memory_context();

    let book = create_book(&ctx.deps, create_cmd("123", "Dune", "Frank Herbert"))
        .await
        .unwrap();

    assert_eq!(book.id, Some(BookId::from_i64(1)));
    assert_eq!(book.isbn, "123");
    assert_eq!(book.title, "Dune");
    assert_eq!(book.author, "Frank Herbert");
}

#[tokio::test]
async fn test_create_book_with_registered_isbn_fails_without_saving() {
    let ctx = common::in_memory_context();
    create_book(&ctx.deps, create_cmd("123", "Dune", "Frank Herbert"))
        .await
        .unwrap();
    assert_eq!(ctx.book_repository.save_calls(), 1);

    // Act: 同じisbnで登録
    let result = create_book(&ctx.deps, create_cmd("123", "Other", "Someone")).await;

    // Assert: エラーになり、保存は呼ばれない
    let err = result.unwrap_err();
    assert!(matches!(err, BookApplicationError::IsbnAlreadyRegistered));
    assert_eq!(err.to_string(), "Isbn already registered");
    assert_eq!(ctx.book_repository.save_calls(), 1);
}

#[tokio::test]
async fn test_get_book_by_id_and_isbn() {
    let ctx = common::in_memory_context();
    let created = create_book(&ctx.deps, create_cmd("123", "Dune", "Frank Herbert"))
        .await
        .unwrap();

    let by_id = get_book(&ctx.deps, created.id.unwrap()).await.unwrap();
    let by_isbn = get_book_by_isbn(&ctx.deps, "123").await.unwrap();
    let missing = get_book(&ctx.deps, BookId::from_i64(99)).await.unwrap();

    assert_eq!(by_id, Some(created.clone()));
    assert_eq!(by_isbn, Some(created));
    assert_eq!(missing, None);
}

#[tokio::test]
async fn test_delete_book_without_id_fails() {
    let ctx = common::in_memory_context();
    let book = Book::new("123", "Dune", "Frank Herbert");

    let err = delete_book(&ctx.deps, &book).await.unwrap_err();

    assert!(matches!(err, BookApplicationError::MissingBookId));
    assert_eq!(err.to_string(), "Book id can't be null");
}

#[tokio::test]
async fn test_update_book_without_id_fails() {
    let ctx = common::in_memory_context();
    let book = Book::new("123", "Dune", "Frank Herbert");

    let err = update_book(&ctx.deps, book).await.unwrap_err();

    assert!(matches!(err, BookApplicationError::MissingBookId));
    assert_eq!(err.to_string(), "Book id can't be null");
    assert_eq!(ctx.book_repository.save_calls(), 0);
}

#[tokio::test]
async fn test_delete_book_removes_it() {
    let ctx = common::in_memory_context();
    let book = create_book(&ctx.deps, create_cmd("123", "Dune", "Frank Herbert"))
        .await
        .unwrap();

    delete_book(&ctx.deps, &book).await.unwrap();

    assert_eq!(get_book(&ctx.deps, book.id.unwrap()).await.unwrap(), None);
}

#[tokio::test]
async fn test_delete_book_with_loan_history_fails() {
    let ctx = common::in_memory_context();
    let book = create_book(&ctx.deps, create_cmd("123", "Dune", "Frank Herbert"))
        .await
        .unwrap();
    let loan = loan_book(
        &ctx.deps,
        LoanBook {
            book: book.clone(),
            customer: "Harley".to_string(),
            customer_email: None,
            borrowed_on: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
        },
    )
    .await
    .unwrap();
    return_book(&ctx.deps, loan).await.unwrap();

    // 返却済みでも履歴があれば削除しない
    let err = delete_book(&ctx.deps, &book).await.unwrap_err();

    assert!(matches!(err, BookApplicationError::BookHasLoans));
    assert_eq!(err.to_string(), "Book has loans");
    assert_eq!(
        get_book(&ctx.deps, book.id.unwrap()).await.unwrap(),
        Some(book)
    );
}

#[tokio::test]
async fn test_update_book_changes_title_and_author_only() {
    let ctx = common::in_memory_context();
    let book = create_book(&ctx.deps, create_cmd("123", "Dune", "Frank Herbert"))
        .await
        .unwrap();

    // isbnを書き換えても保存されない
    let changed = Book {
        isbn: "999".to_string(),
        ..book.with_details("Dune Messiah", "F. Herbert")
    };
    let updated = update_book(&ctx.deps, changed).await.unwrap();

    assert_eq!(updated.isbn, "123");
    assert_eq!(updated.title, "Dune Messiah");
    assert_eq!(updated.author, "F. Herbert");
}

#[tokio::test]
async fn test_find_books_filters_and_pages() {
    let ctx = common::in_memory_context();
    create_book(&ctx.deps, create_cmd("1", "Dune", "Frank Herbert"))
        .await
        .unwrap();
    create_book(&ctx.deps, create_cmd("2", "Dune Messiah", "Frank Herbert"))
        .await
        .unwrap();
    create_book(&ctx.deps, create_cmd("3", "Foundation", "Isaac Asimov"))
        .await
        .unwrap();

    let filter = BookFilter {
        title: Some("DUNE".to_string()),
        ..Default::default()
    };

    let first = find_books(&ctx.deps, &filter, PageRequest::new(0, 1))
        .await
        .unwrap();
    let second = find_books(&ctx.deps, &filter, PageRequest::new(1, 1))
        .await
        .unwrap();

    assert_eq!(first.total_elements, 2);
    assert_eq!(first.content.len(), 1);
    assert_eq!(first.content[0].title, "Dune");
    assert_eq!(second.content[0].title, "Dune Messiah");

    let all = find_books(&ctx.deps, &BookFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(all.total_elements, 3);
}
