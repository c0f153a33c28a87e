//! Alert messages that HTMX swaps into the page's alert container.

use maud::{Markup, html};

/// A success or error message with some extra detail for the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    Success { message: String, details: String },
    Error { message: String, details: String },
}

impl Alert {
    pub fn into_html(self) -> Markup {
        let (container_style, message, details) = match self {
            Alert::Success { message, details } => (
                "p-4 mb-4 text-sm text-green-800 rounded-lg bg-green-50 \
                dark:bg-gray-800 dark:text-green-400 shadow-lg",
                message,
                details,
            ),
            Alert::Error { message, details } => (
                "p-4 mb-4 text-sm text-red-800 rounded-lg bg-red-50 \
                dark:bg-gray-800 dark:text-red-400 shadow-lg",
                message,
                details,
            ),
        };

        // Template adapted from https://flowbite.com/docs/components/alerts/
        html! {
            div role="alert" class=(container_style)
            {
                div class="flex items-start justify-between gap-4"
                {
                    div
                    {
                        p class="font-bold" { (message) }

                        @if !details.is_empty() {
                            p { (details) }
                        }
                    }

                    button
                        type="button"
                        aria-label="Close"
                        class="font-bold"
                        onclick="this.closest('[role=alert]').remove()"
                    {
                        "×"
                    }
                }
            }
        }
    }
}
