use axum_test::TestServer;

use crate::{AppState, UploadConfig, build_router, finance::FinanceTable, load_csv_str};

/// A small dataset where Texas has no row for 2001.
pub(crate) const TEST_CSV: &str = "State,Year,Totals.Revenue,Totals.Expenditure,\
    Details.Health.Health Total Expenditure,Details.Education.Education Total
CALIFORNIA,2000,100,90,20,30
TEXAS,2000,80,70,10,15
CALIFORNIA,2001,110,120,22,31
";

pub(crate) fn sample_table() -> FinanceTable {
    load_csv_str(TEST_CSV).expect("Could not load test dataset")
}

/// Create a test server for the full app with `default_dataset`.
pub(crate) fn get_test_server(default_dataset: Option<FinanceTable>) -> TestServer {
    let state = AppState::new(
        default_dataset,
        Some("test secret"),
        false,
        UploadConfig::default(),
    );

    TestServer::try_new(build_router(state)).expect("Could not create test server.")
}
