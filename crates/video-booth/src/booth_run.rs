use crate::registration::Registration;

use std::path::PathBuf;

use uuid::Uuid;

/// Everything one customer interaction produced.
///
/// `run_id` correlates the run's log lines; it is regenerated on retake so
/// late results of the discarded take are recognizable.
#[derive(Debug, Clone)]
pub struct BoothRun {
    pub(crate) run_id: Uuid,
    pub(crate) registration: Option<Registration>,
    pub(crate) raw_path: Option<PathBuf>,
    pub(crate) edited_path: Option<PathBuf>,
    pub(crate) server_file_name: Option<String>,
    pub(crate) download_link: Option<String>,
    pub(crate) qr_path: Option<PathBuf>,
}

impl BoothRun {
    /// Fresh run with nothing captured yet.
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            registration: None,
            raw_path: None,
            edited_path: None,
            server_file_name: None,
            download_link: None,
            qr_path: None,
        }
    }

    /// Forget the current take, keeping the registrant.
    pub fn retake(&mut self) {
        *self = Self {
            registration: self.registration.take(),
            ..Self::new()
        };
    }
}

impl Default for BoothRun {
    fn default() -> Self {
        Self::new()
    }
}
