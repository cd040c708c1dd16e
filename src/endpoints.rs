//! The API endpoints URIs.

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The dashboard page, filtered with the `state`, `year` and `tab` query parameters.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";

/// The route to upload a CSV file that replaces the session's dataset.
pub const DATASET_API: &str = "/api/dataset";
/// The route to switch the session back to the default dataset.
pub const RESET_DATASET_API: &str = "/api/dataset/reset";
