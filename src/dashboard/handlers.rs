//! Dashboard HTTP handlers and view rendering.
//!
//! This module contains:
//! - The route handler for displaying the dashboard
//! - HTML view functions for the sidebar, the tabs and each tab's panel
//!
//! The dashboard content lives in the `#dashboard-content` element. Normal
//! requests get the full page, while htmx requests from the filter form,
//! the tab links and the upload form get only the element's new content.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use axum_htmx::HxRequest;
use maud::{Markup, PreEscaped, html};

use crate::{
    alert::Alert,
    dashboard::{
        aggregation::{
            RANKING_SIZE, expenditure_trend, revenue_ranking, revenue_vs_expenditure,
        },
        charts::{
            CHARTS_RUNTIME_SCRIPT, DashboardChart, charts_view, expenditure_trend_chart, ranking_chart,
            revenue_expenditure_chart,
        },
        filters::{DashboardQuery, FilterState, Tab},
        tables::{ranking_table, trend_table},
    },
    dataset::{DatasetSource, DatasetState, SessionDataset, get_session_dataset},
    endpoints,
    finance::{FinanceTable, REQUIRED_COLUMNS},
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, ECHARTS_URL, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, HeadElement, base, format_currency_rounded, loading_spinner,
    },
};

const DASHBOARD_TITLE: &str = "USA State Financial Analysis Dashboard";
const DASHBOARD_CONTENT_ID: &str = "dashboard-content";
const DASHBOARD_CONTENT_TARGET: &str = "#dashboard-content";

const REVENUE_EXPENDITURE_CHART_ID: &str = "revenue-expenditure-chart";
const EXPENDITURE_TREND_CHART_ID: &str = "expenditure-trend-chart";
const TOP_REVENUE_CHART_ID: &str = "top-revenue-chart";
const BOTTOM_REVENUE_CHART_ID: &str = "bottom-revenue-chart";

const TAB_STYLE: &str = "inline-block p-4 rounded-t-lg border-b-2 border-transparent \
    hover:text-gray-600 hover:border-gray-300 dark:hover:text-gray-300";
const ACTIVE_TAB_STYLE: &str = "inline-block p-4 rounded-t-lg border-b-2 \
    text-blue-600 border-blue-600 dark:text-blue-500 dark:border-blue-500";
const PLACEHOLDER_STYLE: &str = "p-4 mb-4 text-sm text-yellow-800 rounded-lg \
    bg-yellow-50 dark:bg-gray-800 dark:text-yellow-300";

/// Display the dashboard for the session's dataset, filtered by the query string.
///
/// Returns the full page for normal requests and only the dashboard content
/// for htmx requests.
pub async fn get_dashboard_page(
    State(state): State<DatasetState>,
    HxRequest(is_htmx_request): HxRequest,
    jar: PrivateCookieJar,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let (session, jar) = match get_session_dataset(&state.datasets, jar, state.secure_cookies) {
        Ok(result) => result,
        Err(error) if is_htmx_request => return error.into_alert_response(),
        Err(error) => return error.into_response(),
    };

    let content = dashboard_content(&session, &query, None);

    if is_htmx_request {
        (jar, content).into_response()
    } else {
        (jar, dashboard_view(&content)).into_response()
    }
}

/// Renders the full dashboard page around `content`.
fn dashboard_view(content: &Markup) -> Markup {
    let content = html!(
        main
            id=(DASHBOARD_CONTENT_ID)
            class="px-2 lg:px-6 py-4 lg:py-8 mx-auto max-w-screen-2xl
                text-gray-900 dark:text-white"
        {
            (content)
        }
    );

    let scripts = [
        HeadElement::ScriptLink(ECHARTS_URL.to_owned()),
        HeadElement::ScriptSource(PreEscaped(CHARTS_RUNTIME_SCRIPT)),
    ];

    base("Dashboard", &scripts, &content)
}

/// Renders the content of the `#dashboard-content` element.
///
/// `alert` is shown above the dashboard, e.g., to confirm an upload.
pub(crate) fn dashboard_content(
    session: &SessionDataset,
    query: &DashboardQuery,
    alert: Option<Alert>,
) -> Markup {
    let table = session.table.as_deref();
    let filter = table.and_then(|table| FilterState::resolve(table, query));

    html!(
        @if let Some(alert) = alert {
            (alert.into_html())
        }

        header class="mb-6"
        {
            h1 class="text-2xl lg:text-3xl font-bold" { (DASHBOARD_TITLE) }

            p class="text-gray-600 dark:text-gray-400"
            {
                "Explore the revenue and expenditure of US state governments.
                Pick a state and year in the sidebar, or upload your own CSV file."
            }
        }

        div class="flex flex-col lg:flex-row gap-6"
        {
            aside class="w-full lg:w-72 shrink-0 space-y-6"
            {
                @if let (Some(table), Some(filter)) = (table, &filter) {
                    (filter_form(table, filter, query.tab))
                }

                (upload_form())
                (dataset_source_view(session.source))
            }

            section class="flex-1 min-w-0"
            {
                @match (table, &filter) {
                    (Some(table), Some(filter)) => {
                        (tab_navigation(filter, query.tab))
                        (tab_panel(table, filter, query.tab))
                    }
                    _ => (no_data_view()),
                }
            }
        }
    )
}

fn filter_form(table: &FinanceTable, filter: &FilterState, tab: Tab) -> Markup {
    let dashboard_route = endpoints::DASHBOARD_VIEW;

    html!(
        form
            id="filter-form"
            action=(dashboard_route)
            method="get"
            hx-get=(dashboard_route)
            hx-trigger="change"
            hx-target=(DASHBOARD_CONTENT_TARGET)
            hx-target-error="#alert-container"
            hx-swap="innerHTML"
            hx-push-url="true"
            class="space-y-4"
        {
            input type="hidden" name="tab" value=(tab.as_str());

            div
            {
                label for="state-select" class=(FORM_LABEL_STYLE) { "State" }

                select id="state-select" name="state" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for state in table.states() {
                        option value=(state) selected[*state == filter.state] { (state) }
                    }
                }
            }

            div
            {
                label for="year-select" class=(FORM_LABEL_STYLE) { "Year" }

                select id="year-select" name="year" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for year in table.years() {
                        option value=(year) selected[*year == filter.year] { (year) }
                    }
                }
            }

            noscript
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Apply" }
            }
        }
    )
}

fn upload_form() -> Markup {
    let upload_route = endpoints::DATASET_API;
    let spinner = loading_spinner();

    html!(
        form
            id="upload-form"
            hx-post=(upload_route)
            enctype="multipart/form-data"
            hx-disabled-elt="#file, #upload-button"
            hx-indicator="#indicator"
            hx-target=(DASHBOARD_CONTENT_TARGET)
            hx-target-error="#alert-container"
            hx-swap="innerHTML"
            class="space-y-4"
        {
            div
            {
                label for="file" class=(FORM_LABEL_STYLE) { "Upload a CSV file" }

                input
                    id="file"
                    type="file"
                    name="file"
                    accept=".csv,text/csv"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" id="upload-button" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (spinner) }
                " Upload"
            }
        }
    )
}

fn dataset_source_view(source: DatasetSource) -> Markup {
    let reset_route = endpoints::RESET_DATASET_API;

    html!(
        div id="dataset-source" class="text-sm text-gray-600 dark:text-gray-400"
        {
            @match source {
                DatasetSource::Default => p { "Showing the default dataset." },
                DatasetSource::Uploaded => {
                    p class="mb-2" { "Showing your uploaded dataset." }

                    button
                        type="button"
                        hx-post=(reset_route)
                        hx-target=(DASHBOARD_CONTENT_TARGET)
                        hx-target-error="#alert-container"
                        hx-swap="innerHTML"
                        class=(BUTTON_SECONDARY_STYLE)
                    {
                        "Use default dataset"
                    }
                }
            }
        }
    )
}

fn tab_navigation(filter: &FilterState, active_tab: Tab) -> Markup {
    html!(
        nav class="mb-4 text-sm font-medium text-center text-gray-500 border-b border-gray-200 dark:text-gray-400 dark:border-gray-700"
        {
            ul class="flex flex-wrap -mb-px" role="tablist"
            {
                @for tab in Tab::ALL {
                    @let url = DashboardQuery::for_filter(filter, tab).to_url();
                    @let is_active = tab == active_tab;

                    li class="me-2" role="presentation"
                    {
                        a
                            href=(url)
                            hx-get=(url)
                            hx-target=(DASHBOARD_CONTENT_TARGET)
                            hx-target-error="#alert-container"
                            hx-swap="innerHTML"
                            hx-push-url="true"
                            role="tab"
                            aria-selected=(is_active)
                            class=(if is_active { ACTIVE_TAB_STYLE } else { TAB_STYLE })
                        {
                            (tab.title())
                        }
                    }
                }
            }
        }
    )
}

fn tab_panel(table: &FinanceTable, filter: &FilterState, tab: Tab) -> Markup {
    let (heading, description, panel) = match tab {
        Tab::Comparison => (
            format!("Revenue vs. Expenditure Analysis for {}", filter.state),
            format!(
                "Comparing total revenue against total expenditure for the year {}.",
                filter.year
            ),
            comparison_panel(table, filter),
        ),
        Tab::Trends => (
            format!("Health & Education Expenditure Trends for {}", filter.state),
            "Visualizing how spending on key sectors has evolved over the years.".to_owned(),
            trends_panel(table, &filter.state),
        ),
        Tab::Rankings => (
            format!("State Revenue Rankings for {}", filter.year),
            format!(
                "Discover the top {RANKING_SIZE} and bottom {RANKING_SIZE} states \
                by total revenue collection."
            ),
            rankings_panel(table, filter.year),
        ),
    };

    html!(
        div id=(format!("{}-panel", tab.as_str())) role="tabpanel"
        {
            h2 class="text-xl font-semibold" { (heading) }
            p class="mb-4 text-gray-600 dark:text-gray-400" { (description) }

            (panel)
        }
    )
}

fn comparison_panel(table: &FinanceTable, filter: &FilterState) -> Markup {
    let Some(values) = revenue_vs_expenditure(table, filter) else {
        return no_data_placeholder(&format!(
            "No data available for {} in {}.",
            filter.state, filter.year
        ));
    };

    let charts = [DashboardChart::new(
        REVENUE_EXPENDITURE_CHART_ID,
        revenue_expenditure_chart(filter, &values),
    )];
    let balance = values.balance();

    html!(
        (charts_view(&charts))

        p id="balance-summary" class="mt-4"
        {
            @if balance > 0.0 {
                (filter.state) " had a surplus of " (format_currency_rounded(balance))
                " in " (filter.year) "."
            } @else if balance < 0.0 {
                (filter.state) " had a deficit of " (format_currency_rounded(balance.abs()))
                " in " (filter.year) "."
            } @else {
                (filter.state) " balanced its budget in " (filter.year) "."
            }
        }
    )
}

fn trends_panel(table: &FinanceTable, state: &str) -> Markup {
    let points = expenditure_trend(table, state);

    if points.is_empty() {
        return no_data_placeholder(&format!("No data available for the state: {state}."));
    }

    let charts = [DashboardChart::new(
        EXPENDITURE_TREND_CHART_ID,
        expenditure_trend_chart(state, &points),
    )];

    html!(
        (charts_view(&charts))

        div class="mt-4" { (trend_table(&points)) }
    )
}

fn rankings_panel(table: &FinanceTable, year: i32) -> Markup {
    let ranking = revenue_ranking(table, year);

    if ranking.is_empty() {
        return no_data_placeholder(&format!("No data available for the year: {year}."));
    }

    let top_title = format!("Top {} States by Revenue", ranking.top.len());
    let bottom_title = format!("Bottom {} States by Revenue", ranking.bottom.len());
    let subtitle = year.to_string();

    let charts = [
        DashboardChart::new(
            TOP_REVENUE_CHART_ID,
            ranking_chart(&top_title, &subtitle, &ranking.top),
        ),
        DashboardChart::new(
            BOTTOM_REVENUE_CHART_ID,
            ranking_chart(&bottom_title, &subtitle, &ranking.bottom),
        ),
    ];

    html!(
        (charts_view(&charts))

        div class="grid grid-cols-1 xl:grid-cols-2 gap-4 mt-4"
        {
            (ranking_table("top-revenue-table", &format!("{top_title} in {year}"), &ranking.top))
            (ranking_table("bottom-revenue-table", &format!("{bottom_title} in {year}"), &ranking.bottom))
        }
    )
}

fn no_data_placeholder(message: &str) -> Markup {
    html!(
        div class=(PLACEHOLDER_STYLE) role="status" data-placeholder
        {
            (message)
        }
    )
}

/// Renders the prompt shown when there is no data to display.
fn no_data_view() -> Markup {
    html!(
        div id="no-data" class="flex flex-col items-center px-6 py-8 mx-auto"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p class="mb-2"
            {
                "Charts will show up here once you upload a CSV file with the following columns:"
            }

            ul class="list-disc list-inside"
            {
                @for column in REQUIRED_COLUMNS {
                    li { code { (column) } }
                }
            }
        }
    )
}
