//! State Finance Dashboard is a web app for exploring the finances of US
//! state governments.
//!
//! It loads a CSV table of revenue, expenditure, health spending and
//! education spending per state and year, and serves a single dashboard
//! page with charts and rankings that can be filtered by state and year.
//! Visitors may upload their own CSV file, which replaces the dataset for
//! their browser session only.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod dashboard;
mod dataset;
mod endpoints;
mod finance;
mod html;
mod internal_server_error;
mod not_found;
mod routing;

#[cfg(test)]
mod test_utils;

pub use app_state::{AppState, UploadConfig};
pub use dashboard::{
    DashboardQuery, FilterState, RANKING_SIZE, RankedState, RevenueExpenditure, RevenueRanking,
    Tab, TrendPoint, expenditure_trend, revenue_ranking, revenue_vs_expenditure,
};
pub use dataset::{DatasetId, DatasetStore};
pub use finance::{
    FinanceTable, FinancialRecord, REQUIRED_COLUMNS, load_csv_file, load_csv_str,
    parse_finance_csv,
};
pub use routing::build_router;

use crate::{
    alert::Alert,
    internal_server_error::render_internal_server_error,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The CSV header is missing one or more of [REQUIRED_COLUMNS].
    ///
    /// Every missing column is listed, in the order of [REQUIRED_COLUMNS].
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<&'static str>),

    /// A value in a CSV row could not be parsed.
    ///
    /// `line` is the 1-based line number in the file, the header being line 1.
    #[error("Invalid value \"{value}\" in column \"{column}\" on line {line}")]
    MalformedValue {
        /// The line the value was found on.
        line: u64,
        /// The name of the column the value belongs to.
        column: &'static str,
        /// The raw text of the value.
        value: String,
    },

    /// The CSV had issues that prevented it from being parsed.
    #[error("Could not parse the CSV file: {0}")]
    InvalidCSV(String),

    /// The uploaded file is not a CSV file.
    #[error("File is not a CSV")]
    NotCSV,

    /// The uploaded file is larger than the configured upload limit.
    #[error("File is too large")]
    UploadTooLarge,

    /// The multipart form could not be parsed or did not contain a file.
    #[error("Could not parse multipart form: {0}")]
    MultipartError(String),

    /// A dataset file could not be read from disk.
    #[error("could not read {path}: {message}")]
    FileRead {
        /// The path of the file.
        path: String,
        /// The underlying I/O error message.
        message: String,
    },

    /// Could not acquire the lock for the uploaded datasets.
    #[error("could not acquire the dataset lock")]
    DatasetLockError,
}

impl Error {
    /// Whether the error was caused by the contents of a dataset file.
    fn is_dataset_error(&self) -> bool {
        matches!(
            self,
            Error::MissingColumns(_) | Error::MalformedValue { .. } | Error::InvalidCSV(_)
        )
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::DatasetLockError => render_internal_server_error(Default::default()),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render_internal_server_error(Default::default())
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            error if error.is_dataset_error() => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::Error {
                    message: "Could not load dataset".to_owned(),
                    details: format!(
                        "{error}. The dashboard will keep using the previous dataset."
                    ),
                }
                .into_html(),
            )
                .into_response(),
            Error::NotCSV => (
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: "File type must be CSV.".to_owned(),
                }
                .into_html(),
            )
                .into_response(),
            Error::UploadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                Alert::ErrorSimple {
                    message: "File is too large.".to_owned(),
                }
                .into_html(),
            )
                .into_response(),
            Error::MultipartError(details) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Could not read the uploaded file".to_owned(),
                    details,
                }
                .into_html(),
            )
                .into_response(),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Something went wrong".to_owned(),
                        details:
                            "An unexpected error occurred, check the server logs for more details."
                                .to_owned(),
                    }
                    .into_html(),
                )
                    .into_response()
            }
        }
    }
}
