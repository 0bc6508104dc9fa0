//! Usage key identifying whose free-question counter a request draws from.

use std::fmt;

/// Key into the usage tracker.
///
/// A device that has not registered an email counts under its bare device id
/// (the anonymous key). Once an email is known the key becomes
/// `"{device_id}_{email}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UsageKey {
    device_id: String,
    email: Option<String>,
    rendered: String,
}

impl UsageKey {
    pub fn anonymous(device_id: &str) -> Self {
        let device_id = device_id.trim().to_string();
        Self {
            rendered: device_id.clone(),
            device_id,
            email: None,
        }
    }

    pub fn with_email(device_id: &str, email: &str) -> Self {
        let device_id = device_id.trim().to_string();
        let email = email.trim().to_string();
        Self {
            rendered: format!("{}_{}", device_id, email),
            device_id,
            email: Some(email),
        }
    }

    /// Key for a request: email-qualified when a non-blank email was sent.
    pub fn for_request(device_id: &str, email: Option<&str>) -> Self {
        match email.map(str::trim).filter(|e| !e.is_empty()) {
            Some(email) => Self::with_email(device_id, email),
            None => Self::anonymous(device_id),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// `None` for the anonymous key.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn as_str(&self) -> &str {
        &self.rendered
    }
}

impl fmt::Display for UsageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}
