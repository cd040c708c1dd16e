//! The in-memory representation of a finance dataset.

use std::collections::BTreeSet;

/// One row of the dataset: the finances of a single state in a single year.
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialRecord {
    /// The name of the state, e.g. "CALIFORNIA".
    pub state: String,
    /// The year the figures were reported for.
    pub year: i32,
    /// Total revenue collected by the state government.
    pub revenue: f64,
    /// Total expenditure of the state government.
    pub expenditure: f64,
    /// Total expenditure on health.
    pub health_expenditure: f64,
    /// Total expenditure on education.
    pub education_expenditure: f64,
}

impl FinancialRecord {
    /// Create a record from its fields.
    pub fn new(
        state: &str,
        year: i32,
        revenue: f64,
        expenditure: f64,
        health_expenditure: f64,
        education_expenditure: f64,
    ) -> Self {
        Self {
            state: state.to_owned(),
            year,
            revenue,
            expenditure,
            health_expenditure,
            education_expenditure,
        }
    }
}

/// An immutable snapshot of a loaded dataset.
///
/// Records keep the order of the rows in the source file. The distinct state
/// names and years are computed once when the table is created.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinanceTable {
    records: Vec<FinancialRecord>,
    states: Vec<String>,
    years: Vec<i32>,
}

impl FinanceTable {
    /// Create a table from `records`, kept in the given order.
    pub fn new(records: Vec<FinancialRecord>) -> Self {
        let states = records
            .iter()
            .map(|record| record.state.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_owned)
            .collect();

        let years = records
            .iter()
            .map(|record| record.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Self {
            records,
            states,
            years,
        }
    }

    /// All records in file order.
    pub fn records(&self) -> &[FinancialRecord] {
        &self.records
    }

    /// The distinct state names, sorted alphabetically.
    pub fn states(&self) -> &[String] {
        &self.states
    }

    /// The distinct years, sorted in ascending order.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Whether `state` appears in at least one record.
    pub fn has_state(&self, state: &str) -> bool {
        self.states
            .binary_search_by(|candidate| candidate.as_str().cmp(state))
            .is_ok()
    }

    /// Whether `year` appears in at least one record.
    pub fn has_year(&self, year: i32) -> bool {
        self.years.binary_search(&year).is_ok()
    }

    /// The number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{FinanceTable, FinancialRecord};

    fn test_table() -> FinanceTable {
        FinanceTable::new(vec![
            FinancialRecord::new("TEXAS", 2001, 80.0, 70.0, 10.0, 15.0),
            FinancialRecord::new("CALIFORNIA", 2000, 100.0, 90.0, 20.0, 30.0),
            FinancialRecord::new("TEXAS", 2000, 75.0, 72.0, 9.0, 14.0),
            FinancialRecord::new("ALASKA", 2001, 10.0, 12.0, 1.0, 2.0),
        ])
    }

    #[test]
    fn states_are_distinct_and_sorted() {
        let table = test_table();

        assert_eq!(table.states(), ["ALASKA", "CALIFORNIA", "TEXAS"]);
    }

    #[test]
    fn years_are_distinct_and_sorted() {
        let table = test_table();

        assert_eq!(table.years(), [2000, 2001]);
    }

    #[test]
    fn records_keep_file_order() {
        let table = test_table();

        let states: Vec<_> = table.records().iter().map(|r| r.state.as_str()).collect();
        assert_eq!(states, ["TEXAS", "CALIFORNIA", "TEXAS", "ALASKA"]);
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn membership_checks() {
        let table = test_table();

        assert!(table.has_state("TEXAS"));
        assert!(!table.has_state("texas"));
        assert!(table.has_year(2001));
        assert!(!table.has_year(1999));
    }

    #[test]
    fn empty_table_has_no_selectable_values() {
        let table = FinanceTable::new(Vec::new());

        assert!(table.is_empty());
        assert!(table.states().is_empty());
        assert!(table.years().is_empty());
    }
}
