//! Functions to load finance datasets from CSV data.
//!
//! A dataset is a CSV file with a header row. The header must contain every
//! column in [REQUIRED_COLUMNS]; any other columns are ignored. Loading is
//! all-or-nothing: the first problem found aborts the load.

use std::{fs::File, io::Read, path::Path};

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::{
    Error,
    finance::{FinanceTable, FinancialRecord},
};

/// The column holding the state name.
pub const STATE_COLUMN: &str = "State";
/// The column holding the year as an integer.
pub const YEAR_COLUMN: &str = "Year";
/// The column holding total revenue.
pub const REVENUE_COLUMN: &str = "Totals.Revenue";
/// The column holding total expenditure.
pub const EXPENDITURE_COLUMN: &str = "Totals.Expenditure";
/// The column holding total health expenditure.
pub const HEALTH_COLUMN: &str = "Details.Health.Health Total Expenditure";
/// The column holding total education expenditure.
pub const EDUCATION_COLUMN: &str = "Details.Education.Education Total";

/// The columns a dataset must have, in the order they are reported when missing.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    STATE_COLUMN,
    YEAR_COLUMN,
    REVENUE_COLUMN,
    EXPENDITURE_COLUMN,
    HEALTH_COLUMN,
    EDUCATION_COLUMN,
];

/// Load a dataset from the CSV file at `path`.
///
/// # Errors
///
/// Returns [Error::FileRead] if the file cannot be opened, otherwise the
/// errors of [parse_finance_csv].
pub fn load_csv_file(path: impl AsRef<Path>) -> Result<FinanceTable, Error> {
    let path = path.as_ref();

    let file = File::open(path).map_err(|error| Error::FileRead {
        path: path.display().to_string(),
        message: error.to_string(),
    })?;

    let table = parse_finance_csv(file)?;
    tracing::info!(
        "Loaded {} records for {} states and {} years from {}",
        table.len(),
        table.states().len(),
        table.years().len(),
        path.display()
    );

    Ok(table)
}

/// Load a dataset from CSV `text`.
///
/// # Errors
///
/// See [parse_finance_csv].
pub fn load_csv_str(text: &str) -> Result<FinanceTable, Error> {
    parse_finance_csv(text.as_bytes())
}

/// Parse CSV data with a header row into a [FinanceTable].
///
/// Headers and values are trimmed of surrounding whitespace before use.
///
/// # Errors
///
/// Returns:
/// - [Error::MissingColumns] listing every required column absent from the header,
/// - [Error::MalformedValue] if a state name is empty, a year is not an
///   integer or an amount is not a finite number,
/// - [Error::InvalidCSV] if the data is not well-formed CSV, e.g., a row has
///   a different number of fields than the header.
pub fn parse_finance_csv(reader: impl Read) -> Result<FinanceTable, Error> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let headers = reader.headers().map_err(invalid_csv)?.clone();
    let columns = ColumnIndices::find(&headers)?;

    let mut records = Vec::new();

    for row in reader.records() {
        let row = row.map_err(invalid_csv)?;
        records.push(columns.parse_row(&row)?);
    }

    tracing::debug!("Parsed {} rows of finance data", records.len());

    Ok(FinanceTable::new(records))
}

fn invalid_csv(error: csv::Error) -> Error {
    tracing::debug!("Could not parse CSV: {error}");
    Error::InvalidCSV(error.to_string())
}

/// The positions of the required columns in a CSV header.
#[derive(Debug, PartialEq)]
struct ColumnIndices {
    state: usize,
    year: usize,
    revenue: usize,
    expenditure: usize,
    health: usize,
    education: usize,
}

impl ColumnIndices {
    fn find(headers: &StringRecord) -> Result<Self, Error> {
        let mut indices = [0; REQUIRED_COLUMNS.len()];
        let mut missing = Vec::new();

        for (index, column) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
            match headers.iter().position(|header| header == column) {
                Some(position) => *index = position,
                None => missing.push(column),
            }
        }

        if !missing.is_empty() {
            return Err(Error::MissingColumns(missing));
        }

        let [state, year, revenue, expenditure, health, education] = indices;

        Ok(Self {
            state,
            year,
            revenue,
            expenditure,
            health,
            education,
        })
    }

    fn parse_row(&self, row: &StringRecord) -> Result<FinancialRecord, Error> {
        let line = row.position().map_or(0, |position| position.line());
        let field = |index: usize| row.get(index).unwrap_or_default();
        let malformed = |column: &'static str, value: &str| Error::MalformedValue {
            line,
            column,
            value: value.to_owned(),
        };
        let amount = |index: usize, column: &'static str| {
            let value = field(index);

            value
                .parse::<f64>()
                .ok()
                .filter(|amount| amount.is_finite())
                .ok_or_else(|| malformed(column, value))
        };

        let state = field(self.state);
        if state.is_empty() {
            return Err(malformed(STATE_COLUMN, state));
        }

        let year = field(self.year);
        let year = year
            .parse::<i32>()
            .map_err(|_| malformed(YEAR_COLUMN, year))?;

        Ok(FinancialRecord {
            state: state.to_owned(),
            year,
            revenue: amount(self.revenue, REVENUE_COLUMN)?,
            expenditure: amount(self.expenditure, EXPENDITURE_COLUMN)?,
            health_expenditure: amount(self.health, HEALTH_COLUMN)?,
            education_expenditure: amount(self.education, EDUCATION_COLUMN)?,
        })
    }
}
