use serde::{Deserialize, Serialize};

/// A message handed to the mail worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailData {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub content: String,
    pub template: String,
}
