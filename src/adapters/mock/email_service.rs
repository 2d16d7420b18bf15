use crate::ports::email_service::{EmailService as EmailServiceTrait, Result};
use async_trait::async_trait;
use std::sync::Mutex;

/// A message captured by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub recipients: Vec<String>,
    pub message: String,
}

/// Mock implementation of EmailService
///
/// Records every dispatch instead of sending it. Can be switched to fail.
#[derive(Default)]
pub struct EmailService {
    sent: Mutex<Vec<SentEmail>>,
    failing: Mutex<bool>,
}

impl EmailService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent sends fail
    pub fn fail_sends(&self) {
        *self.failing.lock().unwrap() = true;
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailServiceTrait for EmailService {
    async fn send_emails(&self, recipients: &[String], message: &str) -> Result<()> {
        if *self.failing.lock().unwrap() {
            return Err("mail transport unavailable".into());
        }

        self.sent.lock().unwrap().push(SentEmail {
            recipients: recipients.to_vec(),
            message: message.to_string(),
        });
        Ok(())
    }
}
