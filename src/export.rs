//! Instructor download of the raw response log.
//!
//! A plain string comparison against one shared secret. This keeps students
//! from stumbling onto the file; it is not an authentication layer.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::constants::events;

#[derive(Clone, Debug)]
pub struct ExportGate {
    secret: Option<String>,
    log_path: PathBuf,
}

impl ExportGate {
    /// `secret: None` disables export entirely.
    pub fn new(secret: Option<String>, log_path: PathBuf) -> Self {
        Self { secret, log_path }
    }

    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    /// Raw log bytes when the secret matches and the log exists.
    pub fn try_export(&self, submitted: &str) -> Option<Vec<u8>> {
        let secret = self.secret.as_deref()?;
        if submitted != secret {
            warn!(event = events::EXPORT_DENIED, "Export refused: wrong password");
            return None;
        }

        match std::fs::read(&self.log_path) {
            Ok(bytes) => {
                info!(
                    event = events::EXPORT_GRANTED,
                    bytes = bytes.len(),
                    "📥 Exporting {}",
                    self.log_path.display()
                );
                Some(bytes)
            }
            Err(e) => {
                info!("Nothing to export from {}: {}", self.log_path.display(), e);
                None
            }
        }
    }
}
