use crate::{AppResult, registration::Registration};

use std::path::PathBuf;

use tokio::{fs::OpenOptions, io::AsyncWriteExt};
use tracing::{info, instrument};

/// Append-only CSV of accepted registrations.
#[derive(Debug, Clone)]
pub struct RegistrationLog {
    path: PathBuf,
}

impl RegistrationLog {
    /// Log writing to `path`; the file is created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append `name,email,phone\n`.
    #[instrument(skip(self, registration), fields(path = ?self.path))]
    pub async fn append(&self, registration: &Registration) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let row = Self::row(registration);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(row.as_bytes()).await?;
        file.flush().await?;

        info!("Registration saved");
        Ok(())
    }

    /// One CSV line for `registration`.
    pub fn row(registration: &Registration) -> String {
        format!(
            "{},{},{}\n",
            csv_field(&registration.name),
            csv_field(&registration.email),
            csv_field(&registration.phone)
        )
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
