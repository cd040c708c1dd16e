//! Chart generation and rendering for the dashboard.
//!
//! This module creates interactive ECharts visualizations for finance data:
//! - **Revenue vs. Expenditure**: two bars for the selected state and year
//! - **Expenditure Trends**: health and education expenditure lines over the years
//! - **Revenue Rankings**: horizontal bars for the top and bottom states by revenue
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered with corresponding HTML containers and JavaScript initialization code.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger},
    series::{Bar, Line},
};
use maud::{Markup, PreEscaped, html};

use crate::dashboard::{
    aggregation::{RankedState, RevenueExpenditure, TrendPoint},
    filters::FilterState,
};

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

impl DashboardChart {
    pub(super) fn new(id: &'static str, chart: Chart) -> Self {
        Self {
            id,
            options: escape_script_text(&chart.to_string()),
        }
    }
}

/// Escapes the characters that could end an inline `<script>` element early.
///
/// State names come from uploaded files, so the chart options may contain
/// any text. The escapes are only valid inside JavaScript string literals,
/// which means the JavaScript functions in the options must not use `<`, `>`
/// or `&`.
fn escape_script_text(text: &str) -> String {
    text.replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

/// Page-level JavaScript that owns every ECharts instance on the dashboard.
///
/// The resize and color scheme listeners are registered once per page load.
/// Charts whose container was swapped out by htmx are disposed the next time
/// a chart is drawn.
pub(super) const CHARTS_RUNTIME_SCRIPT: &str = r#"
    let dashboardCharts = [];
    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
    const chartTheme = () => darkModeMediaQuery.matches ? 'dark' : 'default';

    function drawDashboardChart(id, option) {
        dashboardCharts = dashboardCharts.filter((chart) => {
            if (chart.getDom().isConnected) {
                return true;
            }

            chart.dispose();
            return false;
        });

        const chartDom = document.getElementById(id);
        echarts.getInstanceByDom(chartDom)?.dispose();

        const chart = echarts.init(chartDom);
        chart.setOption(option);
        chart.setTheme(chartTheme());
        dashboardCharts.push(chart);
    }

    window.addEventListener('resize', () => {
        dashboardCharts.forEach((chart) => chart.resize());
    });
    darkModeMediaQuery.addEventListener('change', () => {
        dashboardCharts.forEach((chart) => chart.setTheme(chartTheme()));
    });
"#;

/// Renders the HTML containers for dashboard charts followed by the script
/// that draws them.
///
/// The script is inline so that it also runs when the dashboard content is
/// swapped in by htmx. It relies on [CHARTS_RUNTIME_SCRIPT] being on the page.
pub(super) fn charts_view(charts: &[DashboardChart]) -> Markup {
    html!(
        div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
        {
            @for chart in charts {
                div
                    id=(chart.id)
                    class="min-h-[380px] rounded dark:bg-gray-100"
                {}
            }
        }

        (charts_script(charts))
    )
}

/// Generates the JavaScript that draws each chart into its container.
fn charts_script(charts: &[DashboardChart]) -> Markup {
    let script_content = charts
        .iter()
        .map(|chart| format!(r#"drawDashboardChart("{}", {});"#, chart.id, chart.options))
        .collect::<Vec<_>>()
        .join("\n");

    html!(script { (PreEscaped(script_content)) })
}

pub(super) fn revenue_expenditure_chart(
    filter: &FilterState,
    values: &RevenueExpenditure,
) -> Chart {
    Chart::new()
        .title(
            Title::new()
                .text("Revenue vs. Expenditure")
                .subtext(format!("{} in {}", filter.state, filter.year)),
        )
        .tooltip(currency_tooltip())
        .grid(default_grid())
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(vec!["Revenue", "Expenditure"]),
        )
        .y_axis(currency_axis())
        .series(
            Bar::new()
                .name(filter.state.as_str())
                .data(vec![values.revenue, values.expenditure]),
        )
}

pub(super) fn expenditure_trend_chart(state: &str, points: &[TrendPoint]) -> Chart {
    let labels: Vec<String> = points.iter().map(|point| point.year.to_string()).collect();
    let health: Vec<f64> = points.iter().map(|point| point.health).collect();
    let education: Vec<f64> = points.iter().map(|point| point.education).collect();

    Chart::new()
        .title(
            Title::new()
                .text("Health and Education Expenditure")
                .subtext(state),
        )
        .tooltip(currency_tooltip())
        .legend(Legend::new().top("1%"))
        .grid(default_grid().top(70))
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(currency_axis())
        .series(Line::new().name("Health").data(health))
        .series(Line::new().name("Education").data(education))
}

/// A horizontal bar chart of `states`, drawn top to bottom in the given order.
pub(super) fn ranking_chart(title: &str, subtitle: &str, states: &[RankedState]) -> Chart {
    // Category axes are drawn from the bottom up.
    let labels: Vec<String> = states.iter().rev().map(|state| state.state.clone()).collect();
    let revenues: Vec<f64> = states.iter().rev().map(|state| state.revenue).collect();

    Chart::new()
        .title(Title::new().text(title).subtext(subtitle))
        .tooltip(currency_tooltip())
        .grid(default_grid().top(60))
        .x_axis(currency_axis())
        .y_axis(Axis::new().type_(AxisType::Category).data(labels))
        .series(Bar::new().name("Revenue").data(revenues))
}

fn default_grid() -> Grid {
    Grid::new()
        .left("3%")
        .right("4%")
        .bottom("3%")
        .contain_label(true)
}

fn currency_axis() -> Axis {
    Axis::new()
        .type_(AxisType::Value)
        .axis_label(AxisLabel::new().formatter(currency_formatter()))
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD',
              maximumFractionDigits: 0
            });
            return Number.isFinite(number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}

#[cfg(test)]
mod tests {
    use maud::Markup;
    use scraper::{Html, Selector};
    use serde_json::{Value, json};

    use crate::dashboard::{
        aggregation::{RankedState, RevenueExpenditure, TrendPoint},
        filters::FilterState,
    };

    use super::{
        DashboardChart, charts_view, escape_script_text, expenditure_trend_chart,
        ranking_chart, revenue_expenditure_chart,
    };

    fn to_json(chart: &charming::Chart) -> Value {
        serde_json::to_value(chart).unwrap()
    }

    fn parse(markup: Markup) -> Html {
        Html::parse_fragment(&markup.into_string())
    }

    #[test]
    fn comparison_chart_has_revenue_and_expenditure_bars() {
        let filter = FilterState {
            state: "CA".to_owned(),
            year: 2000,
        };
        let values = RevenueExpenditure {
            revenue: 100.0,
            expenditure: 90.0,
        };

        let chart = to_json(&revenue_expenditure_chart(&filter, &values));

        assert_eq!(chart["series"][0]["type"], "bar");
        assert_eq!(chart["series"][0]["data"], json!([100.0, 90.0]));
    }

    #[test]
    fn trend_chart_has_health_and_education_lines() {
        let points = [
            TrendPoint {
                year: 2000,
                health: 20.0,
                education: 30.0,
            },
            TrendPoint {
                year: 2001,
                health: 21.0,
                education: 31.0,
            },
        ];

        let chart = to_json(&expenditure_trend_chart("CA", &points));

        assert_eq!(chart["series"][0]["type"], "line");
        assert_eq!(chart["series"][0]["name"], "Health");
        assert_eq!(chart["series"][0]["data"], json!([20.0, 21.0]));
        assert_eq!(chart["series"][1]["name"], "Education");
        assert_eq!(chart["series"][1]["data"], json!([30.0, 31.0]));
    }

    #[test]
    fn ranking_chart_lists_first_state_last() {
        let states = [
            RankedState {
                state: "CA".to_owned(),
                revenue: 100.0,
            },
            RankedState {
                state: "TX".to_owned(),
                revenue: 80.0,
            },
        ];

        let chart = to_json(&ranking_chart("Top states", "2000", &states));

        assert_eq!(chart["series"][0]["data"], json!([80.0, 100.0]));
    }

    #[test]
    fn view_has_container_and_script_per_chart() {
        let charts = [
            DashboardChart {
                id: "first-chart",
                options: "{}".to_owned(),
            },
            DashboardChart {
                id: "second-chart",
                options: "{}".to_owned(),
            },
        ];

        let html = parse(charts_view(&charts));

        for id in ["first-chart", "second-chart"] {
            let selector = Selector::parse(&format!("div#{id}")).unwrap();
            assert!(html.select(&selector).next().is_some(), "missing #{id}");
        }
        let script = html
            .select(&Selector::parse("script").unwrap())
            .next()
            .expect("charts should have an init script")
            .inner_html();
        assert!(script.contains(r#"drawDashboardChart("first-chart", {});"#));
        assert!(script.contains(r#"drawDashboardChart("second-chart", {});"#));
    }

    #[test]
    fn script_text_escapes_markup_characters() {
        let escaped = escape_script_text(r#"{"name":"A</script>&<b>"}"#);

        assert_eq!(
            escaped,
            r#"{"name":"A\u003c/script\u003e\u0026\u003cb\u003e"}"#
        );
    }

    #[test]
    fn chart_options_with_markup_stay_in_one_script() {
        let filter = FilterState {
            state: "A</script><script>alert(1)</script>".to_owned(),
            year: 2000,
        };
        let values = RevenueExpenditure {
            revenue: 100.0,
            expenditure: 90.0,
        };
        let charts = [DashboardChart::new(
            "revenue-expenditure-chart",
            revenue_expenditure_chart(&filter, &values),
        )];

        let html = parse(charts_view(&charts));

        let scripts: Vec<_> = html.select(&Selector::parse("script").unwrap()).collect();
        assert_eq!(scripts.len(), 1);
        assert!(!charts[0].options.contains('<'));
    }

    #[test]
    fn currency_formatter_shows_zero_as_an_amount() {
        let points = [TrendPoint {
            year: 2000,
            health: 0.0,
            education: 0.0,
        }];

        let options = expenditure_trend_chart("CA", &points).to_string();

        assert!(options.contains("Number.isFinite(number)"));
        assert!(!options.contains("(number) ?"));
    }
}
