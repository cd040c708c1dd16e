#![allow(missing_docs)]

pub(crate) mod html;
pub(crate) mod http;
pub(crate) mod server;

pub(crate) use html::{assert_valid_html, parse_html_fragment, parse_html_text};
pub(crate) use http::{assert_content_type, multipart_body};
pub(crate) use server::{TEST_CSV, get_test_server, sample_table};
