//! Dashboard module
//!
//! Provides the single dashboard page: a sidebar to pick a state and year or
//! upload a dataset, and tabs with charts and tables for the selection.

mod aggregation;
mod charts;
mod filters;
mod handlers;
mod tables;

pub use aggregation::{
    RANKING_SIZE, RankedState, RevenueExpenditure, RevenueRanking, TrendPoint, expenditure_trend,
    revenue_ranking, revenue_vs_expenditure,
};
pub use filters::{DashboardQuery, FilterState, Tab};
pub use handlers::get_dashboard_page;
pub(crate) use handlers::dashboard_content;
