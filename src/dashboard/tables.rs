//! Table views for dashboard data display.
//!
//! Provides HTML tables listing the points behind the trend chart and the
//! states in each revenue ranking.

use maud::{Markup, html};

use crate::{
    dashboard::aggregation::{RankedState, TrendPoint},
    html::{TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, format_currency_rounded},
};

const TABLE_STYLE: &str = "w-full text-sm text-left text-gray-500 dark:text-gray-400";
const NUMBER_CELL_STYLE: &str = "text-right whitespace-nowrap";

/// Renders the health and education expenditure for each year.
pub(super) fn trend_table(points: &[TrendPoint]) -> Markup {
    html! {
        div class="overflow-x-auto rounded-lg shadow"
        {
            table class=(TABLE_STYLE)
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Year" }
                        th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Health" }
                        th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Education" }
                    }
                }

                tbody
                {
                    @for point in points {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            th scope="row" class={(TABLE_CELL_STYLE) " font-medium text-gray-900 dark:text-white"}
                            {
                                (point.year)
                            }
                            td class={(TABLE_CELL_STYLE) " " (NUMBER_CELL_STYLE)}
                            {
                                (format_currency_rounded(point.health))
                            }
                            td class={(TABLE_CELL_STYLE) " " (NUMBER_CELL_STYLE)}
                            {
                                (format_currency_rounded(point.education))
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Renders a ranking as a numbered table of states and their revenue.
///
/// `id` is set on the table so the top and bottom rankings can be told apart.
pub(super) fn ranking_table(id: &str, caption: &str, states: &[RankedState]) -> Markup {
    html! {
        div class="overflow-x-auto rounded-lg shadow"
        {
            table id=(id) class=(TABLE_STYLE)
            {
                caption class="p-4 text-lg font-semibold text-left text-gray-900 bg-white dark:text-white dark:bg-gray-800"
                {
                    (caption)
                }

                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "#" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "State" }
                        th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Revenue" }
                    }
                }

                tbody
                {
                    @for (rank, state) in states.iter().enumerate() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (rank + 1) }
                            th scope="row" class={(TABLE_CELL_STYLE) " font-medium text-gray-900 dark:text-white"}
                            {
                                (state.state)
                            }
                            td class={(TABLE_CELL_STYLE) " " (NUMBER_CELL_STYLE)}
                            {
                                (format_currency_rounded(state.revenue))
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::dashboard::aggregation::{RankedState, TrendPoint};

    use super::{ranking_table, trend_table};

    fn row_text(html: &Html) -> Vec<Vec<String>> {
        let row_selector = Selector::parse("tbody tr").unwrap();
        let cell_selector = Selector::parse("th, td").unwrap();

        html.select(&row_selector)
            .map(|row| {
                row.select(&cell_selector)
                    .map(|cell| cell.text().collect::<String>().trim().to_owned())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn trend_table_has_row_per_year() {
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

        let html = Html::parse_fragment(&trend_table(&points).into_string());

        assert_eq!(
            row_text(&html),
            [["2000", "$20", "$30"], ["2001", "$21", "$31"]]
        );
    }

    #[test]
    fn ranking_table_numbers_states_in_order() {
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

        let html =
            Html::parse_fragment(&ranking_table("top-revenue-table", "Top", &states).into_string());

        assert!(
            html.select(&Selector::parse("table#top-revenue-table").unwrap())
                .next()
                .is_some()
        );
        assert_eq!(
            row_text(&html),
            [["1", "CA", "$100"], ["2", "TX", "$80"]]
        );
    }
}
