//! Financial records of US state governments and the CSV loader that
//! produces them.

mod loader;
mod record;

pub use loader::{
    EDUCATION_COLUMN, EXPENDITURE_COLUMN, HEALTH_COLUMN, REQUIRED_COLUMNS, REVENUE_COLUMN,
    STATE_COLUMN, YEAR_COLUMN, load_csv_file, load_csv_str, parse_finance_csv,
};
pub use record::{FinanceTable, FinancialRecord};
