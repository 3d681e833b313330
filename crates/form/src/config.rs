use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::FormError;
use crate::file::{HARD_FILE_CAP, parse_human_size};
use crate::submit::Redirect;

/// Engine-wide settings shared by every form a host mounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Selection-time cap for any file, as a human size string.
    pub max_upload: String,

    /// Where hosts should navigate when authentication is missing or has
    /// expired.
    pub login_path: String,

    /// Delay before that navigation, in milliseconds.
    pub redirect_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_upload: "10MB".into(),
            login_path: "/login".into(),
            redirect_delay_ms: 2000,
        }
    }
}

impl EngineConfig {
    /// Reject settings the engine cannot act on.
    pub fn validate(&self) -> Result<(), FormError> {
        match parse_human_size(&self.max_upload) {
            Some(0) | None => Err(FormError::InvalidConfig {
                key: "max_upload".into(),
                reason: format!("`{}` is not a positive size", self.max_upload),
            }),
            Some(_) => Ok(()),
        }?;
        if self.login_path.trim().is_empty() {
            return Err(FormError::InvalidConfig {
                key: "login_path".into(),
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// The selection-time cap in bytes. Falls back to 10 MB when
    /// `max_upload` does not parse.
    #[must_use]
    pub fn hard_cap_bytes(&self) -> u64 {
        parse_human_size(&self.max_upload)
            .filter(|n| *n > 0)
            .unwrap_or(HARD_FILE_CAP)
    }

    /// The redirect instruction emitted on authentication failures.
    #[must_use]
    pub fn redirect(&self) -> Redirect {
        Redirect {
            to: self.login_path.clone(),
            after: Duration::from_millis(self.redirect_delay_ms),
        }
    }
}
