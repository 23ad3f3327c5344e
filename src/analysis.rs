//! Analysis page with per-category spending charts over a period.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    datatype::DataPointItem,
    element::{AxisLabel, AxisType, ItemStyle},
    series::{Bar, Line},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error, endpoints,
    dashboard::{
        DashboardChart, charts_script, currency_formatter, currency_tooltip, date_labels,
        echarts_script_link, pivot_daily_by_category,
    },
    expense::{CategoryStat, get_daily_expenses_by_category, get_stats_by_category},
    html::{FORM_SELECT_STYLE, base},
    navigation::NavBar,
    period::Period,
    timezone::get_local_offset,
};

/// How many categories are preselected for the evolution chart when the
/// user has not picked any.
const DEFAULT_CATEGORY_COUNT: usize = 5;

/// Query parameters for the analysis page.
///
/// `categories` can appear multiple times in the query string, once per
/// selected checkbox.
#[derive(Debug, Default, Deserialize)]
pub struct AnalysisQuery {
    pub period: Option<Period>,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// The state needed for the analysis page.
#[derive(Debug, Clone)]
pub struct AnalysisPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Europe/Paris".
    pub local_timezone: String,
}

impl FromRef<AppState> for AnalysisPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display per-category evolution and breakdown charts for a period.
pub async fn get_analysis_page(
    State(state): State<AnalysisPageState>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let local_timezone = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;
    let today = OffsetDateTime::now_utc().to_offset(local_timezone).date();

    let period = query.period.unwrap_or(Period::Year);
    let range = period.date_ranges(today).current;

    let stats = get_stats_by_category(Some(range.start), Some(range.end), &connection)
        .inspect_err(|error| tracing::error!("Could not get category stats: {error}"))?;

    let available: Vec<String> = stats
        .iter()
        .filter_map(|stat| stat.category_name.as_ref())
        .map(|name| name.to_string())
        .collect();

    let selected: Vec<String> = if query.categories.is_empty() {
        available
            .iter()
            .take(DEFAULT_CATEGORY_COUNT)
            .cloned()
            .collect()
    } else {
        query
            .categories
            .into_iter()
            .filter(|name| {
                available
                    .iter()
                    .any(|available_name| available_name.eq_ignore_ascii_case(name))
            })
            .collect()
    };

    let daily_totals =
        get_daily_expenses_by_category(range.start, range.end, &selected, &connection)
            .inspect_err(|error| {
                tracing::error!("Could not get daily expenses by category: {error}")
            })?;

    let days = date_labels(range.start, range.end);
    let evolution_series = pivot_daily_by_category(&days, &daily_totals);

    // The chart containers are only rendered when there is data, so the
    // init scripts must be skipped too.
    let charts = if stats.is_empty() {
        Vec::new()
    } else {
        vec![
            DashboardChart {
                id: "category-evolution-chart",
                options: category_evolution_chart(&days, &evolution_series).to_string(),
            },
            DashboardChart {
                id: "category-totals-chart",
                options: category_totals_chart(&stats).to_string(),
            },
        ]
    };

    Ok(analysis_view(period, &stats, &selected, &charts).into_response())
}

/// Line chart with one series per selected category.
fn category_evolution_chart(days: &[Date], series: &[(String, Vec<Option<f64>>)]) -> Chart {
    let labels: Vec<String> = days.iter().map(|day| day.to_string()).collect();

    let mut chart = Chart::new()
        .title(
            Title::new()
                .text("Spending by Category")
                .subtext("Per day over the selected period"),
        )
        .tooltip(currency_tooltip())
        .legend(Legend::new().top("8%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top("18%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        );

    for (category, values) in series {
        chart = chart.series(Line::new().name(category).data(values.clone()));
    }

    chart
}

/// Bar chart of category totals, one bar per category in its own color.
fn category_totals_chart(stats: &[CategoryStat]) -> Chart {
    let labels: Vec<String> = stats
        .iter()
        .map(|stat| {
            stat.category_name
                .as_ref()
                .map(|name| name.to_string())
                .unwrap_or_else(|| "Uncategorized".to_owned())
        })
        .collect();

    let data: Vec<DataPointItem> = stats
        .iter()
        .map(|stat| {
            let color = stat
                .color
                .as_ref()
                .map(|color| color.as_ref().to_owned())
                .unwrap_or_else(|| "#9ca3af".to_owned());

            DataPointItem::new(stat.total).item_style(ItemStyle::new().color(color))
        })
        .collect();

    Chart::new()
        .title(Title::new().text("Totals by Category"))
        .tooltip(currency_tooltip())
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(Bar::new().name("Total").data(data))
}

fn analysis_view(
    period: Period,
    stats: &[CategoryStat],
    selected: &[String],
    charts: &[DashboardChart],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::ANALYSIS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        div
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            section class="w-full mx-auto mb-4 flex justify-between flex-wrap items-end"
            {
                h2 class="text-xl font-semibold" { "Analysis: " (period.label()) }
            }

            @if stats.is_empty() {
                p class="text-gray-500 dark:text-gray-400"
                {
                    "No expenses recorded for this period."
                }
            } @else {
                (filter_form_view(period, stats, selected))

                section class="w-full mx-auto mb-4"
                {
                    div class="grid grid-cols-1 gap-4"
                    {
                        @for chart in charts {
                            div
                                id=(chart.id)
                                class="min-h-[380px] rounded dark:bg-gray-100"
                            {}
                        }
                    }
                }
            }
        }
    );

    let scripts = [echarts_script_link(), charts_script(charts)];

    base("Analysis", &scripts, &content)
}

fn filter_form_view(period: Period, stats: &[CategoryStat], selected: &[String]) -> Markup {
    let periods = [
        Period::Day,
        Period::Week,
        Period::Month,
        Period::Year,
        Period::All,
    ];

    html!(
        form
            method="get"
            action=(endpoints::ANALYSIS_VIEW)
            class="w-full bg-gray-50 dark:bg-gray-800 p-4 rounded-lg mb-4 space-y-3"
        {
            select
                name="period"
                onchange="this.form.submit()"
                class=(FORM_SELECT_STYLE)
            {
                @for preset in periods {
                    option
                        value=(preset.as_query_value())
                        selected[preset == period]
                    {
                        (preset.label())
                    }
                }
            }

            p class="text-sm text-gray-600 dark:text-gray-400"
            {
                "Categories to show in the evolution chart:"
            }

            div class="grid grid-cols-2 md:grid-cols-3 lg:grid-cols-4 gap-3"
            {
                @for stat in stats {
                    @if let Some(name) = &stat.category_name {
                        label class="flex items-center space-x-2"
                        {
                            input
                                type="checkbox"
                                name="categories"
                                value=(name)
                                checked[selected.iter().any(|selected_name| selected_name.eq_ignore_ascii_case(name.as_ref()))]
                                onchange="this.form.submit()"
                                class="rounded-sm border-gray-300
                                    text-blue-600 shadow-xs
                                    focus:border-blue-300 focus:ring-3
                                    focus:ring-blue-200/50"
                            ;

                            span { (name) }
                        }
                    }
                }
            }
        }
    )
}

#[cfg(test)]
mod analysis_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use axum_extra::extract::Query;
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::OffsetDateTime;

    use crate::{
        category::{Category, CategoryColor, CategoryName, create_category, create_category_table},
        expense::{Expense, create_expense, create_expense_table},
        test_utils::{assert_valid_html, parse_html_document},
    };

    use super::{AnalysisPageState, AnalysisQuery, get_analysis_page};

    fn get_analysis_state() -> (AnalysisPageState, Category) {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        connection
            .pragma_update(None, "foreign_keys", true)
            .expect("Could not enable foreign keys");
        create_category_table(&connection).expect("Could not create category table");
        create_expense_table(&connection).expect("Could not create expense table");

        let category = create_category(
            CategoryName::new_unchecked("Food"),
            CategoryColor::new_unchecked("#ff7f0e"),
            &connection,
        )
        .expect("Could not create test category");

        (
            AnalysisPageState {
                db_connection: Arc::new(Mutex::new(connection)),
                local_timezone: "Etc/UTC".to_owned(),
            },
            category,
        )
    }

    #[tokio::test]
    async fn analysis_page_loads_with_charts() {
        let (state, category) = get_analysis_state();
        let today = OffsetDateTime::now_utc().date();
        create_expense(
            Expense::build(42.0, category.id, today),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = get_analysis_page(State(state), Query(AnalysisQuery::default()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_chart_exists(&html, "category-evolution-chart");
        assert_chart_exists(&html, "category-totals-chart");
    }

    #[tokio::test]
    async fn analysis_page_shows_empty_state() {
        let (state, _category) = get_analysis_state();

        let response = get_analysis_page(State(state), Query(AnalysisQuery::default()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        let body_text = html.root_element().text().collect::<Vec<_>>().join(" ");
        assert!(body_text.contains("No expenses recorded for this period."));
    }

    #[tokio::test]
    async fn category_checkboxes_reflect_selection() {
        let (state, category) = get_analysis_state();
        let today = OffsetDateTime::now_utc().date();
        {
            let connection = state.db_connection.lock().unwrap();
            let transport = create_category(
                CategoryName::new_unchecked("Transport"),
                CategoryColor::new_unchecked("#2ca02c"),
                &connection,
            )
            .unwrap();
            create_expense(Expense::build(42.0, category.id, today), &connection).unwrap();
            create_expense(Expense::build(10.0, transport.id, today), &connection).unwrap();
        }

        let query = AnalysisQuery {
            period: None,
            categories: vec!["Food".to_string()],
        };
        let response = get_analysis_page(State(state), Query(query)).await.unwrap();

        let html = parse_html_document(response).await;
        let checkbox_selector = Selector::parse("input[type='checkbox'][name='categories']").unwrap();
        let checkboxes: Vec<_> = html.select(&checkbox_selector).collect();
        assert_eq!(checkboxes.len(), 2);

        let checked: Vec<_> = checkboxes
            .iter()
            .filter(|checkbox| checkbox.value().attr("checked").is_some())
            .collect();
        assert_eq!(checked.len(), 1);
        assert_eq!(checked[0].value().attr("value"), Some("Food"));
    }

    #[test]
    fn analysis_query_handles_multiple_categories() {
        // Test multiple values
        let query: AnalysisQuery =
            serde_html_form::from_str("period=month&categories=Food&categories=Transport").unwrap();
        assert_eq!(query.categories, vec!["Food", "Transport"]);

        // Test no values (when no checkboxes are selected)
        let query: AnalysisQuery = serde_html_form::from_str("").unwrap();
        assert_eq!(query.categories, Vec::<String>::new());
    }

    #[track_caller]
    fn assert_chart_exists(html: &Html, chart_id: &str) {
        let selector = Selector::parse(&format!("#{}", chart_id)).unwrap();
        assert!(
            html.select(&selector).next().is_some(),
            "Chart with id '{}' not found",
            chart_id
        );
    }
}
