//! Alert system for displaying success and error messages to users.
//!
//! Alerts are returned as HTML fragments, either swapped into the
//! `#alert-container` element by htmx or rendered inline above the dashboard.

use maud::{Markup, html};

/// An alert message with its styling.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message with details.
    Success {
        /// The headline.
        message: String,
        /// Text shown under the headline.
        details: String,
    },
    /// An error message with details.
    Error {
        /// The headline.
        message: String,
        /// Text shown under the headline.
        details: String,
    },
    /// An error message without details.
    ErrorSimple {
        /// The headline.
        message: String,
    },
}

const SUCCESS_STYLE: &str = "flex items-start p-4 mb-4 text-sm text-green-800 \
    rounded-lg bg-green-50 dark:bg-gray-800 dark:text-green-400";
const ERROR_STYLE: &str = "flex items-start p-4 mb-4 text-sm text-red-800 \
    rounded-lg bg-red-50 dark:bg-gray-800 dark:text-red-400";

impl Alert {
    /// Render the alert as HTML with a dismiss button.
    pub fn into_html(self) -> Markup {
        let (style, message, details) = match self {
            Alert::Success { message, details } => (SUCCESS_STYLE, message, details),
            Alert::Error { message, details } => (ERROR_STYLE, message, details),
            Alert::ErrorSimple { message } => (ERROR_STYLE, message, String::new()),
        };

        html! {
            div class=(style) role="alert"
            {
                div class="flex-1"
                {
                    p class="font-semibold" { (message) }

                    @if !details.is_empty() {
                        p { (details) }
                    }
                }

                button
                    type="button"
                    aria-label="Dismiss"
                    class="ms-3 font-bold"
                    onclick="this.parentElement.remove()"
                {
                    "×"
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use super::Alert;

    #[test]
    fn renders_message_and_details() {
        let html = Alert::Success {
            message: "File loaded successfully!".to_owned(),
            details: "Loaded 2 records.".to_owned(),
        }
        .into_html()
        .into_string();

        let fragment = Html::parse_fragment(&html);
        let paragraphs: Vec<String> = fragment
            .select(&Selector::parse("p").unwrap())
            .map(|p| p.text().collect())
            .collect();

        assert_eq!(paragraphs, ["File loaded successfully!", "Loaded 2 records."]);
    }

    #[test]
    fn simple_error_has_no_details() {
        let html = Alert::ErrorSimple {
            message: "File type must be CSV.".to_owned(),
        }
        .into_html()
        .into_string();

        let fragment = Html::parse_fragment(&html);
        let count = fragment.select(&Selector::parse("p").unwrap()).count();

        assert_eq!(count, 1);
        assert!(html.contains("text-red-800"));
    }
}
