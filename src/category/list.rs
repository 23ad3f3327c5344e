//! Categories listing page.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, edit_delete_action_links,
    },
    navigation::NavBar,
    category::{Category, count_expenses_per_category, get_all_categories},
};

/// The state needed for the categories listing page.
#[derive(Debug, Clone)]
pub struct CategoriesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoriesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A category with its formatted edit URL for template rendering.
#[derive(Debug, Clone)]
struct CategoryWithEditUrl {
    pub category: Category,
    pub edit_url: String,
    pub expense_count: u32,
}

/// Render the categories listing page with expense counts.
pub async fn get_categories_page(State(state): State<CategoriesPageState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    let expenses_per_category = count_expenses_per_category(&connection)
        .inspect_err(|error| tracing::error!("Could not count expenses per category: {error}"))?;

    let categories_with_edit_urls = categories
        .into_iter()
        .map(|category| {
            let expense_count = *expenses_per_category.get(&category.id).unwrap_or(&0);

            CategoryWithEditUrl {
                edit_url: endpoints::format_endpoint(endpoints::EDIT_CATEGORY_VIEW, category.id),
                category,
                expense_count,
            }
        })
        .collect::<Vec<_>>();

    Ok(categories_view(&categories_with_edit_urls).into_response())
}

fn categories_view(categories: &[CategoryWithEditUrl]) -> Markup {
    let new_category_route = endpoints::NEW_CATEGORY_VIEW;
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();

    let table_row = |category_with_url: &CategoryWithEditUrl| {
        let delete_url = endpoints::format_endpoint(
            endpoints::DELETE_CATEGORY,
            category_with_url.category.id,
        );
        let confirm_message = format!(
            "Are you sure you want to delete '{}'?",
            category_with_url.category.name
        );

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    (color_swatch(category_with_url.category.color.as_ref()))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    span class="font-semibold text-gray-900 dark:text-white"
                    {
                        (category_with_url.category.name)
                    }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (category_with_url.expense_count)
                }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &category_with_url.edit_url,
                            &delete_url,
                            &confirm_message,
                            "closest tr",
                            "delete",
                        ))
                    }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Categories" }

                    a href=(new_category_route) class=(LINK_STYLE)
                    {
                        "Create Category"
                    }
                }

                section class="dark:bg-gray-800 lg:max-w-5xl lg:w-full lg:mx-auto"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Color"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Name"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Expenses"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Actions"
                                }
                            }
                        }

                        tbody
                        {
                            @for category_with_url in categories {
                                (table_row(category_with_url))
                            }

                            @if categories.is_empty() {
                                tr
                                {
                                    td
                                        colspan="4"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No categories created yet. "
                                        a href=(new_category_route) class=(LINK_STYLE)
                                        {
                                            "Create your first category"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Categories", &[], &content)
}

fn color_swatch(color: &str) -> Markup {
    html!(
        span
            class="inline-block h-5 w-5 rounded border border-gray-300 dark:border-gray-600"
            style=(format!("background-color: {color};"))
        {}
    )
}

#[cfg(test)]
mod categories_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use rusqlite::Connection;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        category::{
            CategoryColor, CategoryName, create_category, create_category_table,
            get_categories_page, list::CategoriesPageState,
        },
        expense::{Expense, create_expense, create_expense_table},
        test_utils::{assert_valid_html, parse_html_document},
    };

    fn get_categories_page_state() -> CategoriesPageState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        connection
            .pragma_update(None, "foreign_keys", true)
            .expect("Could not enable foreign keys");
        create_category_table(&connection).expect("Could not create category table");
        create_expense_table(&connection).expect("Could not create expense table");

        CategoriesPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn lists_categories_with_expense_counts() {
        let state = get_categories_page_state();
        {
            let connection = state.db_connection.lock().unwrap();
            let food = create_category(
                CategoryName::new_unchecked("Food"),
                CategoryColor::new_unchecked("#ff7f0e"),
                &connection,
            )
            .unwrap();
            create_category(
                CategoryName::new_unchecked("Transport"),
                CategoryColor::new_unchecked("#2ca02c"),
                &connection,
            )
            .unwrap();
            create_expense(
                Expense::build(10.0, food.id, date!(2024 - 01 - 01)),
                &connection,
            )
            .unwrap();
        }

        let response = get_categories_page(State(state)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let row_selector = Selector::parse("tbody tr").unwrap();
        let rows: Vec<_> = html.select(&row_selector).collect();
        assert_eq!(rows.len(), 2);

        let first_row_text = rows[0].text().collect::<Vec<_>>().join(" ");
        assert!(first_row_text.contains("Food"));
        assert!(first_row_text.contains('1'));
    }

    #[tokio::test]
    async fn shows_empty_state_without_categories() {
        let state = get_categories_page_state();

        let response = get_categories_page(State(state)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let body_text = html.root_element().text().collect::<Vec<_>>().join(" ");
        assert!(body_text.contains("No categories created yet."));
    }
}
