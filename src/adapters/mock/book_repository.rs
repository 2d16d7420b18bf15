use crate::domain::{Book, BookFilter, BookId, Page, PageRequest};
use crate::ports::book_repository::{BookRepository as BookRepositoryTrait, DuplicateIsbn, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Default)]
struct State {
    next_id: i64,
    books: BTreeMap<BookId, Book>,
}

/// In-memory implementation of BookRepository
///
/// Assigns sequential ids starting at 1 and enforces isbn uniqueness like the
/// database column constraint. Counts `save` calls so tests can assert a
/// rejected command never reached the store.
#[derive(Default)]
pub struct BookRepository {
    state: Mutex<State>,
    save_calls: Mutex<usize>,
}

impl BookRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `save` was invoked
    pub fn save_calls(&self) -> usize {
        *self.save_calls.lock().unwrap()
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    async fn save(&self, book: Book) -> Result<Book> {
        *self.save_calls.lock().unwrap() += 1;
        let mut state = self.state.lock().unwrap();

        match book.id {
            None => {
                if state.books.values().any(|b| b.isbn == book.isbn) {
                    return Err(Box::new(DuplicateIsbn(book.isbn)));
                }
                state.next_id += 1;
                let id = BookId::from_i64(state.next_id);
                let saved = Book {
                    id: Some(id),
                    ..book
                };
                state.books.insert(id, saved.clone());
                Ok(saved)
            }
            Some(id) => {
                let stored = state.books.get_mut(&id).ok_or_else(|| {
                    Box::new(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("book {} does not exist", id),
                    )) as Box<dyn std::error::Error + Send + Sync>
                })?;
                stored.title = book.title;
                stored.author = book.author;
                Ok(stored.clone())
            }
        }
    }

    async fn exists_by_isbn(&self, isbn: &str) -> Result<bool> {
        let state = self.state.lock().unwrap();
        Ok(state.books.values().any(|b| b.isbn == isbn))
    }

    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>> {
        Ok(self.state.lock().unwrap().books.get(&id).cloned())
    }

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        let state = self.state.lock().unwrap();
        Ok(state.books.values().find(|b| b.isbn == isbn).cloned())
    }

    async fn delete(&self, id: BookId) -> Result<()> {
        self.state.lock().unwrap().books.remove(&id);
        Ok(())
    }

    async fn find_all(&self, filter: &BookFilter, page: PageRequest) -> Result<Page<Book>> {
        let state = self.state.lock().unwrap();
        let matching = state
            .books
            .values()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();

        Ok(Page::slice(matching, page))
    }
}
