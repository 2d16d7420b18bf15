use crate::application::ServiceDependencies;
use chrono::{Local, NaiveDateTime, TimeDelta};
use std::time::Duration;
use tokio::task::JoinHandle;

use super::overdue_notifier::{OverdueNotice, notify_overdue_loans};

/// 次の0時までの待ち時間
pub fn duration_until_next_midnight(now: NaiveDateTime) -> Duration {
    let next_midnight = (now.date() + TimeDelta::days(1)).and_time(chrono::NaiveTime::MIN);

    (next_midnight - now)
        .to_std()
        .unwrap_or(Duration::from_secs(24 * 60 * 60))
}

/// 延滞通知を毎日0時（ローカル時刻）に実行するタスクを起動する
///
/// 失敗はログに残して翌日まで待つ。
pub fn spawn_daily_notifier(deps: ServiceDependencies, notice: OverdueNotice) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let wait = duration_until_next_midnight(Local::now().naive_local());
            tracing::debug!(seconds = wait.as_secs(), "next overdue notice scheduled");
            tokio::time::sleep(wait).await;

            let today = Local::now().date_naive();
            tracing::info!(%today, "running overdue loan notifier");

            if let Err(e) = notify_overdue_loans(&deps, today, &notice).await {
                tracing::error!(error = ?e, "overdue loan notifier failed");
            }
        }
    })
}
