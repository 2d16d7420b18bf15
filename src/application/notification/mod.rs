mod errors;
mod overdue_notifier;
mod scheduler;

pub use errors::NotificationError;
pub use overdue_notifier::{OverdueNotice, notify_overdue_loans};
pub use scheduler::{duration_until_next_midnight, spawn_daily_notifier};
