//! Route handlers for replacing a session's dataset with an uploaded CSV file.

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{
        Multipart, State,
        multipart::{Field, MultipartError},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;

use crate::{
    Error,
    alert::Alert,
    dashboard::{DashboardQuery, dashboard_content},
    dataset::{
        DatasetId, DatasetState, SessionDataset,
        session::{invalidate_dataset_cookie, set_dataset_cookie},
    },
    finance::parse_finance_csv,
};

/// The name of the multipart form field holding the CSV file.
pub(crate) const FILE_FIELD: &str = "file";

/// Route handler for uploading a CSV file.
///
/// On success the session is pointed at the new dataset and the dashboard
/// content is returned with the default filters. If the file is rejected, an
/// alert explaining why is returned and the session keeps its previous dataset.
pub async fn upload_dataset(
    State(state): State<DatasetState>,
    jar: PrivateCookieJar,
    mut multipart: Multipart,
) -> Result<Response, Response> {
    let start_time = Instant::now();

    let (file_name, contents) = read_csv_file(&mut multipart)
        .await
        .map_err(Error::into_alert_response)?;

    let table = parse_finance_csv(contents.as_ref())
        .inspect_err(|error| tracing::info!("Rejected dataset \"{file_name}\": {error}"))
        .map_err(Error::into_alert_response)?;

    let id = DatasetId::from_contents(&contents);
    let record_count = table.len();
    let table = state
        .datasets
        .insert(id.clone(), table)
        .map_err(Error::into_alert_response)?;
    let jar = set_dataset_cookie(jar, &id, state.secure_cookies);

    tracing::info!(
        "Loaded dataset {id} from \"{file_name}\" with {record_count} records in {}ms",
        start_time.elapsed().as_millis()
    );

    let alert = Alert::Success {
        message: "File loaded successfully!".to_owned(),
        details: format!("Loaded {record_count} records from {file_name}."),
    };
    let content = dashboard_content(
        &SessionDataset::uploaded(table),
        &DashboardQuery::default(),
        Some(alert),
    );

    Ok((jar, content).into_response())
}

/// Route handler for switching the session back to the default dataset.
pub async fn reset_dataset(
    State(state): State<DatasetState>,
    jar: PrivateCookieJar,
) -> Response {
    let jar = invalidate_dataset_cookie(jar, state.secure_cookies);
    let content = dashboard_content(
        &SessionDataset::default_from(&state.datasets),
        &DashboardQuery::default(),
        None,
    );

    (jar, content).into_response()
}

/// Find the [FILE_FIELD] field in `multipart` and read its file name and contents.
async fn read_csv_file(multipart: &mut Multipart) -> Result<(String, Bytes), Error> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some(FILE_FIELD) {
            return parse_multipart_field(field).await;
        }
    }

    Err(Error::MultipartError("No file was uploaded.".to_owned()))
}

async fn parse_multipart_field(field: Field<'_>) -> Result<(String, Bytes), Error> {
    let file_name = field.file_name().unwrap_or_default().to_owned();
    let is_csv = field.content_type() == Some("text/csv")
        || file_name.to_ascii_lowercase().ends_with(".csv");

    if !is_csv {
        return Err(Error::NotCSV);
    }

    let data = field.bytes().await.map_err(multipart_error)?;

    Ok((file_name, data))
}

fn multipart_error(error: MultipartError) -> Error {
    tracing::debug!("Could not read multipart form: {error}");

    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::UploadTooLarge
    } else {
        Error::MultipartError(error.body_text())
    }
}
