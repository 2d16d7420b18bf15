use thiserror::Error;

use crate::application::loan::LoanApplicationError;

/// 延滞通知のエラー
#[derive(Debug, Error)]
pub enum NotificationError {
    /// 延滞貸出の取得に失敗
    #[error("Failed to load overdue loans")]
    LoanError(#[from] LoanApplicationError),

    /// メール送信に失敗
    #[error("Failed to send overdue notice")]
    EmailError(#[source] Box<dyn std::error::Error + Send + Sync>),
}
