use super::EmailTemplate;
use serde::{Deserialize, Serialize};

///
/// Single "send an email" job.
///
/// `data` is opaque for the queue, its shape depends on `template_name`.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailJob {
    pub to: String,
    pub subject: String,
    pub template_name: String,
    pub data: serde_json::Value,
}

impl EmailJob {
    pub fn new<T>(
        to: impl Into<String>,
        subject: impl Into<String>,
        template: EmailTemplate,
        data: &T,
    ) -> Result<Self, serde_json::Error>
    where
        T: Serialize,
    {
        Ok(Self {
            to: to.into(),
            subject: subject.into(),
            template_name: template.as_ref().to_string(),
            data: serde_json::to_value(data)?,
        })
    }
}
