use super::Error;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    ///
    /// Sends html email to single recipient
    ///
    async fn send(&self, to: &str, subject: &str, html_body: String) -> Result<(), Error>;
}
