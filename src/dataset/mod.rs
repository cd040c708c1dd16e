//! Datasets served by the dashboard.
//!
//! Every visitor starts on the default dataset. Uploading a CSV file stores
//! the parsed table in memory and points the visitor's session at it with a
//! private cookie, so each browser session can explore its own data.

mod session;
mod store;
mod upload;

use std::sync::Arc;

use axum::extract::FromRef;

use crate::AppState;

pub(crate) use session::{DatasetSource, SessionDataset, get_session_dataset};
pub use store::{DatasetId, DatasetStore};
pub use upload::{reset_dataset, upload_dataset};

/// The state needed for resolving and replacing a session's dataset.
#[derive(Debug, Clone)]
pub struct DatasetState {
    /// The default and uploaded datasets.
    pub datasets: Arc<DatasetStore>,
    /// Whether cookies should only be sent over HTTPS.
    pub secure_cookies: bool,
}

impl FromRef<AppState> for DatasetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            datasets: state.datasets.clone(),
            secure_cookies: state.secure_cookies,
        }
    }
}
