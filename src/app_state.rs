//! Implements a struct that holds the state of the web server.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};

use crate::{dataset::DatasetStore, finance::FinanceTable};

/// Limits on the datasets visitors may upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadConfig {
    /// The number of uploaded datasets kept in memory before the oldest is evicted.
    pub max_uploads: usize,
    /// The largest request body accepted by the upload route, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_uploads: 16,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

/// The state of the web server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// Whether cookies should only be sent over HTTPS.
    pub secure_cookies: bool,

    /// The limits on uploaded datasets.
    pub upload_config: UploadConfig,

    /// The default dataset and the datasets uploaded by visitors.
    pub datasets: Arc<DatasetStore>,
}

impl AppState {
    /// Create a new [AppState].
    ///
    /// `default_dataset` is shown to visitors that have not uploaded a file,
    /// if it is `None` they are asked to upload one.
    /// If `cookie_secret` is `None`, a random key is generated and cookies
    /// from previous runs of the server can no longer be read.
    pub fn new(
        default_dataset: Option<FinanceTable>,
        cookie_secret: Option<&str>,
        secure_cookies: bool,
        upload_config: UploadConfig,
    ) -> Self {
        let cookie_key = match cookie_secret {
            Some(secret) => create_cookie_key(secret),
            None => Key::generate(),
        };

        Self {
            cookie_key,
            secure_cookies,
            upload_config,
            datasets: Arc::new(DatasetStore::new(
                default_dataset,
                upload_config.max_uploads,
            )),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}
