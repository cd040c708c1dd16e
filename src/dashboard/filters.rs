//! The dashboard's query string: which state, year and tab to show.

use serde::{Deserialize, Serialize};

use crate::{endpoints, finance::FinanceTable};

/// The tabs of the dashboard's main area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    /// Revenue and expenditure of the selected state in the selected year.
    #[default]
    Comparison,
    /// Health and education expenditure of the selected state over time.
    Trends,
    /// The states with the highest and lowest revenue in the selected year.
    Rankings,
}

impl Tab {
    /// Every tab, in display order.
    pub const ALL: [Tab; 3] = [Tab::Comparison, Tab::Trends, Tab::Rankings];

    /// The value of the `tab` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Tab::Comparison => "comparison",
            Tab::Trends => "trends",
            Tab::Rankings => "rankings",
        }
    }

    /// The label shown on the tab.
    pub fn title(self) -> &'static str {
        match self {
            Tab::Comparison => "Revenue vs. Expenditure",
            Tab::Trends => "Expenditure Trends",
            Tab::Rankings => "Revenue Rankings",
        }
    }
}

/// The query parameters accepted by the dashboard route.
///
/// Every parameter is optional. Missing or unknown states and years are
/// replaced by [FilterState::resolve].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardQuery {
    /// The selected state name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// The selected year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// The active tab.
    #[serde(default)]
    pub tab: Tab,
}

impl DashboardQuery {
    /// The query selecting `filter` on `tab`.
    pub fn for_filter(filter: &FilterState, tab: Tab) -> Self {
        Self {
            state: Some(filter.state.clone()),
            year: Some(filter.year),
            tab,
        }
    }

    /// The dashboard URL for this query.
    pub fn to_url(&self) -> String {
        match serde_urlencoded::to_string(self) {
            Ok(query) if !query.is_empty() => format!("{}?{query}", endpoints::DASHBOARD_VIEW),
            Ok(_) => endpoints::DASHBOARD_VIEW.to_owned(),
            Err(error) => {
                tracing::error!("Could not encode dashboard query {self:?}: {error}");
                endpoints::DASHBOARD_VIEW.to_owned()
            }
        }
    }
}

/// The state and year the dashboard is filtered to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    /// One of the table's state names.
    pub state: String,
    /// One of the table's years.
    pub year: i32,
}

impl FilterState {
    /// Pick the filter for `table` from the requested `query`.
    ///
    /// A requested state or year that is missing from the table, or was not
    /// requested at all, is replaced by the first available value. Returns
    /// `None` if the table is empty.
    pub fn resolve(table: &FinanceTable, query: &DashboardQuery) -> Option<Self> {
        let state = query
            .state
            .as_deref()
            .filter(|state| table.has_state(state))
            .or_else(|| table.states().first().map(String::as_str))?;

        let year = query
            .year
            .filter(|year| table.has_year(*year))
            .or_else(|| table.years().first().copied())?;

        Some(Self {
            state: state.to_owned(),
            year,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::finance::{FinanceTable, FinancialRecord};

    use super::{DashboardQuery, FilterState, Tab};

    fn get_test_table() -> FinanceTable {
        FinanceTable::new(vec![
            FinancialRecord::new("TX", 2001, 80.0, 70.0, 10.0, 15.0),
            FinancialRecord::new("CA", 2000, 100.0, 90.0, 20.0, 30.0),
            FinancialRecord::new("CA", 2001, 110.0, 95.0, 22.0, 31.0),
        ])
    }

    #[test]
    fn parses_query_string() {
        let query: DashboardQuery =
            serde_html_form::from_str("state=NEW+YORK&year=2019&tab=rankings").unwrap();

        assert_eq!(
            query,
            DashboardQuery {
                state: Some("NEW YORK".to_owned()),
                year: Some(2019),
                tab: Tab::Rankings,
            }
        );
    }

    #[test]
    fn empty_query_string_uses_defaults() {
        let query: DashboardQuery = serde_html_form::from_str("").unwrap();

        assert_eq!(query, DashboardQuery::default());
        assert_eq!(query.tab, Tab::Comparison);
    }

    #[test]
    fn unknown_tab_is_rejected() {
        let result = serde_html_form::from_str::<DashboardQuery>("tab=pie");

        assert!(result.is_err());
    }

    #[test]
    fn defaults_to_first_state_and_year() {
        let filter = FilterState::resolve(&get_test_table(), &DashboardQuery::default());

        assert_eq!(
            filter,
            Some(FilterState {
                state: "CA".to_owned(),
                year: 2000,
            })
        );
    }

    #[test]
    fn keeps_requested_values_present_in_table() {
        let query = DashboardQuery {
            state: Some("TX".to_owned()),
            year: Some(2001),
            ..Default::default()
        };

        let filter = FilterState::resolve(&get_test_table(), &query).unwrap();

        assert_eq!(filter.state, "TX");
        assert_eq!(filter.year, 2001);
    }

    #[test]
    fn replaces_values_missing_from_table() {
        let query = DashboardQuery {
            state: Some("OHIO".to_owned()),
            year: Some(1999),
            ..Default::default()
        };

        let filter = FilterState::resolve(&get_test_table(), &query).unwrap();

        assert_eq!(filter.state, "CA");
        assert_eq!(filter.year, 2000);
    }

    #[test]
    fn combination_without_row_is_kept() {
        let query = DashboardQuery {
            state: Some("TX".to_owned()),
            year: Some(2000),
            ..Default::default()
        };

        let filter = FilterState::resolve(&get_test_table(), &query).unwrap();

        assert_eq!(filter.state, "TX");
        assert_eq!(filter.year, 2000);
    }

    #[test]
    fn empty_table_has_no_filter() {
        let filter = FilterState::resolve(&FinanceTable::default(), &DashboardQuery::default());

        assert_eq!(filter, None);
    }

    #[test]
    fn url_encodes_every_parameter() {
        let filter = FilterState {
            state: "NEW YORK".to_owned(),
            year: 2019,
        };

        let url = DashboardQuery::for_filter(&filter, Tab::Trends).to_url();

        assert_eq!(url, "/dashboard?state=NEW+YORK&year=2019&tab=trends");
    }

    #[test]
    fn default_query_url_only_has_tab() {
        assert_eq!(
            DashboardQuery::default().to_url(),
            "/dashboard?tab=comparison"
        );
    }
}
