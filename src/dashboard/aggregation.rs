//! Aggregations over a finance table for the dashboard's charts and tables.
//!
//! Every function here is a pure function of the table and the selected
//! filter, and is recomputed for each request.

use std::collections::HashMap;

use crate::{dashboard::filters::FilterState, finance::FinanceTable};

/// The number of states in each of the top and bottom revenue rankings.
pub const RANKING_SIZE: usize = 10;

/// Revenue and expenditure of one state in one year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevenueExpenditure {
    /// Total revenue.
    pub revenue: f64,
    /// Total expenditure.
    pub expenditure: f64,
}

impl RevenueExpenditure {
    /// Revenue minus expenditure, negative for a deficit.
    pub fn balance(&self) -> f64 {
        self.revenue - self.expenditure
    }
}

/// Health and education expenditure of a state in one year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendPoint {
    /// The year the figures were reported for.
    pub year: i32,
    /// Total health expenditure.
    pub health: f64,
    /// Total education expenditure.
    pub education: f64,
}

/// A state and its total revenue in the ranked year.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedState {
    /// The name of the state.
    pub state: String,
    /// The state's total revenue, summed over its rows for the year.
    pub revenue: f64,
}

/// The states with the highest and lowest revenue in a year.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RevenueRanking {
    /// Up to [RANKING_SIZE] states, highest revenue first.
    pub top: Vec<RankedState>,
    /// Up to [RANKING_SIZE] states, lowest revenue first.
    pub bottom: Vec<RankedState>,
}

impl RevenueRanking {
    /// Whether no state reported revenue in the ranked year.
    pub fn is_empty(&self) -> bool {
        self.top.is_empty()
    }
}

/// Get the revenue and expenditure of the state and year in `filter`.
///
/// Returns `None` if no row matches. If several rows match, the first one in
/// file order is used.
pub fn revenue_vs_expenditure(
    table: &FinanceTable,
    filter: &FilterState,
) -> Option<RevenueExpenditure> {
    let mut matches = table
        .records()
        .iter()
        .filter(|record| record.state == filter.state && record.year == filter.year);

    let record = matches.next()?;

    let duplicates = matches.count();
    if duplicates > 0 {
        tracing::warn!(
            "Found {} rows for {} in {}, using the first one",
            duplicates + 1,
            filter.state,
            filter.year
        );
    }

    Some(RevenueExpenditure {
        revenue: record.revenue,
        expenditure: record.expenditure,
    })
}

/// Get the health and education expenditure of `state` for every year, oldest first.
pub fn expenditure_trend(table: &FinanceTable, state: &str) -> Vec<TrendPoint> {
    let mut points: Vec<TrendPoint> = table
        .records()
        .iter()
        .filter(|record| record.state == state)
        .map(|record| TrendPoint {
            year: record.year,
            health: record.health_expenditure,
            education: record.education_expenditure,
        })
        .collect();

    // `sort_by_key` is stable, rows for the same year keep their file order.
    points.sort_by_key(|point| point.year);

    points
}

/// Rank the states by their total revenue in `year`.
///
/// Revenue from duplicate rows for a state is summed. States with equal
/// revenue keep the order they first appear in the file.
pub fn revenue_ranking(table: &FinanceTable, year: i32) -> RevenueRanking {
    let mut ranked: Vec<RankedState> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for record in table.records().iter().filter(|record| record.year == year) {
        match positions.get(record.state.as_str()) {
            Some(&position) => {
                tracing::warn!("Found more than one row for {} in {year}", record.state);
                ranked[position].revenue += record.revenue;
            }
            None => {
                positions.insert(record.state.as_str(), ranked.len());
                ranked.push(RankedState {
                    state: record.state.clone(),
                    revenue: record.revenue,
                });
            }
        }
    }

    ranked.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));

    let top = ranked.iter().take(RANKING_SIZE).cloned().collect();

    let mut bottom = ranked[ranked.len().saturating_sub(RANKING_SIZE)..].to_vec();
    bottom.sort_by(|a, b| a.revenue.total_cmp(&b.revenue));

    RevenueRanking { top, bottom }
}
