use axum::{body::Body, response::Response};

#[track_caller]
pub(crate) fn assert_content_type(response: &Response<Body>, content_type: &str) {
    let content_type_header = response
        .headers()
        .get("content-type")
        .expect("content-type header missing");
    assert_eq!(content_type_header, content_type);
}

/// Build a `multipart/form-data` body with a single file field.
///
/// Returns the content type header value and the body.
pub(crate) fn multipart_body(
    field_name: &str,
    file_name: &str,
    file_type: &str,
    contents: &str,
) -> (String, Vec<u8>) {
    let boundary = "MY_BOUNDARY123456789";

    let lines = [
        format!("--{boundary}"),
        format!("Content-Disposition: form-data; name=\"{field_name}\"; filename=\"{file_name}\""),
        format!("Content-Type: {file_type}"),
        "".to_owned(),
        contents.to_owned(),
        format!("--{boundary}--"),
    ];

    (
        format!("multipart/form-data; boundary={boundary}"),
        lines.join("\r\n").into_bytes(),
    )
}
