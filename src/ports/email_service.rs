use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// メール送信ポート
///
/// 件名は実装側で固定。
#[async_trait]
pub trait EmailService: Send + Sync {
    /// 全宛先に1通のメッセージとしてまとめて送る
    async fn send_emails(&self, recipients: &[String], message: &str) -> Result<()>;
}
