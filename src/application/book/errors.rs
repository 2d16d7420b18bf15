use thiserror::Error;

/// 書籍カタログのエラー
#[derive(Debug, Error)]
pub enum BookApplicationError {
    /// isbnが登録済み（ビジネスルール違反）
    #[error("Isbn already registered")]
    IsbnAlreadyRegistered,

    /// 貸出履歴のある書籍は削除できない（ビジネスルール違反）
    #[error("Book has loans")]
    BookHasLoans,

    /// idのない書籍を削除・更新しようとした（呼び出し側の誤り）
    #[error("Book id can't be null")]
    MissingBookId,

    /// 書籍ストアのエラー
    #[error("Book repository error")]
    RepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, BookApplicationError>;
