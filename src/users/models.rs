use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The parts of a user account needed to address a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContact {
    pub id: Uuid,
    pub name: String,
    /// Accounts created before email was mandatory may lack one
    pub email: Option<String>,
}

impl UserContact {
    pub fn new(name: impl Into<String>, email: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email,
        }
    }

    /// Email address if present and non-blank
    pub fn deliverable_email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }
}
