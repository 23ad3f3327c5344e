//! Category management for classifying expenses.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;

pub use create::{create_category_endpoint, get_new_category_page};
pub use db::{
    count_expenses_per_category, create_category, create_category_table, delete_category,
    delete_category_reassign, get_all_categories, get_category, merge_categories,
    seed_default_categories, update_category,
};
pub use delete::{delete_category_endpoint, reassign_category_endpoint};
pub use domain::{Category, CategoryColor, CategoryId, CategoryName, DEFAULT_CATEGORIES};
pub use edit::{get_edit_category_page, merge_category_endpoint, update_category_endpoint};
pub use list::get_categories_page;
