use serde::{Deserialize, Serialize};

use super::BookId;

/// 書籍
///
/// idはストアに保存されるまで`None`。isbnは登録後に変更されない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: Option<BookId>,
    pub isbn: String,
    pub title: String,
    pub author: String,
}

impl Book {
    /// 未保存の書籍を作成
    pub fn new(
        isbn: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            isbn: isbn.into(),
            title: title.into(),
            author: author.into(),
        }
    }

    /// タイトルと著者のみを差し替える（isbnは不変）
    pub fn with_details(self, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            ..self
        }
    }
}

/// 書籍検索条件
///
/// 指定されたフィールドのみで絞り込む。文字列は大文字小文字を区別しない部分一致、
/// idは完全一致。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    pub id: Option<BookId>,
    pub isbn: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
}

impl BookFilter {
    pub fn matches(&self, book: &Book) -> bool {
        let id_matches = self.id.is_none_or(|id| book.id == Some(id));

        id_matches
            && contains_ignore_case(&book.isbn, self.isbn.as_deref())
            && contains_ignore_case(&book.title, self.title.as_deref())
            && contains_ignore_case(&book.author, self.author.as_deref())
    }
}

fn contains_ignore_case(value: &str, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(needle) => value.to_lowercase().contains(&needle.to_lowercase()),
    }
}
