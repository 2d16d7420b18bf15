use crate::domain::{Book, BookFilter, BookId, Page, PageRequest};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 同じisbnの書籍が既に保存されている（ストアの一意制約違反）
#[derive(Debug, thiserror::Error)]
#[error("isbn {0} is already stored")]
pub struct DuplicateIsbn(pub String);

/// 貸出履歴のある書籍は削除できない（ストアの外部キー制約違反）
#[derive(Debug, thiserror::Error)]
#[error("book {0} is referenced by loans")]
pub struct BookReferencedByLoans(pub BookId);

/// 書籍ストアポート
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// 書籍を保存する
    ///
    /// idが`None`なら新規登録して採番したidを設定して返す。
    /// idがあれば既存行を更新する。isbnの一意制約違反は[`DuplicateIsbn`]で返す。
    async fn save(&self, book: Book) -> Result<Book>;

    /// 指定isbnの書籍が存在するか
    async fn exists_by_isbn(&self, isbn: &str) -> Result<bool>;

    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>>;

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>>;

    /// 書籍を削除する
    ///
    /// 存在しないidは何もしない。貸出から参照されている場合は
    /// [`BookReferencedByLoans`]を返す。
    async fn delete(&self, id: BookId) -> Result<()>;

    /// 条件に一致する書籍をページ単位で返す
    ///
    /// 述語は[`BookFilter::matches`]と同じ：指定フィールドのみ、
    /// 大文字小文字を区別しない部分一致（idは完全一致）。id昇順。
    async fn find_all(&self, filter: &BookFilter, page: PageRequest) -> Result<Page<Book>>;
}
