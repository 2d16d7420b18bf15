use crate::application::ServiceDependencies;
use crate::domain::{Loan, loan::overdue_cutoff};
use chrono::NaiveDate;

use super::errors::{LoanApplicationError, Result};

/// 延滞貸出の検出
///
/// 貸出日が`today - threshold_days`以前で、まだ返却されていない
/// （returnedがnullまたはfalse）貸出をすべて返す。順序は不定。
pub async fn find_overdue_loans(
    deps: &ServiceDependencies,
    today: NaiveDate,
    threshold_days: i64,
) -> Result<Vec<Loan>> {
    let cutoff = overdue_cutoff(today, threshold_days);

    let loans = deps
        .loan_repository
        .find_all_late_loans(cutoff)
        .await
        .map_err(LoanApplicationError::RepositoryError)?;

    tracing::debug!(%cutoff, count = loans.len(), "overdue loans detected");
    Ok(loans)
}
