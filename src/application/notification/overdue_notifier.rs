use crate::application::{ServiceDependencies, loan::find_overdue_loans};
use crate::domain::loan::OVERDUE_THRESHOLD_DAYS;
use chrono::NaiveDate;

use super::errors::NotificationError;

/// 延滞通知の設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverdueNotice {
    /// 延滞とみなすまでの日数
    pub overdue_days: i64,
    /// 本文
    pub message: String,
}

impl OverdueNotice {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            overdue_days: OVERDUE_THRESHOLD_DAYS,
            message: message.into(),
        }
    }
}

/// 延滞貸出の利用者へ通知する
///
/// 延滞貸出を取得し、メールアドレスのある利用者全員を宛先として
/// 1回の送信でまとめて通知する。再送・重複排除は行わない
/// （延滞が続く限り毎回通知される）。宛先がなければ送信しない。
///
/// ストアの状態は変更しないため、何度呼び出してもよい。
///
/// # 戻り値
/// 通知した宛先の数
pub async fn notify_overdue_loans(
    deps: &ServiceDependencies,
    today: NaiveDate,
    notice: &OverdueNotice,
) -> Result<usize, NotificationError> {
    let loans = find_overdue_loans(deps, today, notice.overdue_days).await?;

    let recipients: Vec<String> = loans
        .into_iter()
        .filter_map(|loan| loan.customer_email)
        .collect();

    if recipients.is_empty() {
        tracing::info!("no overdue loans to notify");
        return Ok(0);
    }

    deps.email_service
        .send_emails(&recipients, &notice.message)
        .await
        .map_err(NotificationError::EmailError)?;

    tracing::info!(recipients = recipients.len(), "overdue notice sent");
    Ok(recipients.len())
}
