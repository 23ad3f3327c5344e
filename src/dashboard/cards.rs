//! Summary metric cards and the per-category progress breakdown.

use maud::{Markup, html};

use crate::{
    expense::CategoryStat,
    html::format_currency,
};

/// The label shown when a category row has no matching category.
const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// The fallback bar color when a category row has no color.
const FALLBACK_COLOR: &str = "#9ca3af";

/// Formats a percentage value, avoiding "-0%" display.
fn format_percentage(value: f64) -> String {
    let rounded = value.round();
    if rounded.abs() < 0.5 {
        "0".to_string()
    } else {
        format!("{:+.0}", rounded)
    }
}

/// Renders the total-spending and expense-count cards with deltas against
/// the previous period.
///
/// A period with no prior data shows "New" instead of a percentage, since
/// there is nothing to compare against.
pub(super) fn summary_cards_view(
    current_total: f64,
    previous_total: f64,
    current_count: usize,
    previous_count: usize,
    previous_label: &str,
) -> Markup {
    let spending_delta = if previous_total > 0.0 {
        let variation = (current_total - previous_total) / previous_total * 100.0;
        format!("{}%", format_percentage(variation))
    } else {
        "New".to_string()
    };

    let count_delta = if previous_count > 0 {
        format!("{:+}", current_count as i64 - previous_count as i64)
    } else {
        "New".to_string()
    };

    html! {
        section class="w-full mx-auto mb-4" {
            div class="grid grid-cols-1 sm:grid-cols-2 gap-4" {
                (metric_card("Spending", &format_currency(current_total), &spending_delta, previous_label))
                (metric_card("Expenses", &current_count.to_string(), &count_delta, previous_label))
            }
        }
    }
}

fn metric_card(title: &str, value: &str, delta: &str, delta_label: &str) -> Markup {
    html! {
        div
            class="bg-white dark:bg-gray-800 border border-gray-200
                   dark:border-gray-700 rounded-lg p-4 shadow-md"
        {
            h4 class="text-sm text-gray-600 dark:text-gray-400" { (title) }

            div class="text-3xl font-bold mb-1" { (value) }

            div class="text-sm text-gray-600 dark:text-gray-400"
            {
                (delta) " vs " (delta_label)
            }
        }
    }
}

/// Renders per-category progress bars sized by each category's share of
/// the period total.
pub(super) fn category_progress_view(stats: &[CategoryStat]) -> Markup {
    if stats.is_empty() {
        return html! {
            p class="text-gray-500 dark:text-gray-400"
            {
                "No expenses recorded for this period."
            }
        };
    }

    let period_total: f64 = stats.iter().map(|stat| stat.total).sum();

    html! {
        section class="w-full mx-auto mb-4 space-y-3" {
            @for stat in stats {
                (category_progress_bar(stat, period_total))
            }
        }
    }
}

fn category_progress_bar(stat: &CategoryStat, period_total: f64) -> Markup {
    let percentage = if period_total > 0.0 {
        stat.total / period_total * 100.0
    } else {
        0.0
    };
    let name = stat
        .category_name
        .as_ref()
        .map(|name| name.as_ref())
        .unwrap_or(UNCATEGORIZED_LABEL);
    let color = stat
        .color
        .as_ref()
        .map(|color| color.as_ref())
        .unwrap_or(FALLBACK_COLOR);

    html! {
        div class="bg-gray-50 dark:bg-gray-800 rounded-lg p-3" {
            div class="flex justify-between text-sm font-medium mb-2" {
                span { (name) }
                span { (format_currency(stat.total)) " (" (format!("{percentage:.1}")) "%)" }
            }

            div
                class="w-full bg-gray-200 dark:bg-gray-700 rounded-full h-2.5"
                role="progressbar"
                aria-valuenow=(format!("{percentage:.0}"))
                aria-valuemin="0"
                aria-valuemax="100"
            {
                @if percentage > 0.0 {
                    div
                        class="h-2.5 rounded-full"
                        style=(format!("width: {:.1}%; background-color: {};", percentage.clamp(0.0, 100.0), color))
                    {}
                }
            }
        }
    }
}
