//! Database operations for categories.

use std::collections::HashMap;

use rusqlite::{Connection, Row, Transaction, TransactionBehavior};

use crate::{
    Error,
    category::{Category, CategoryColor, CategoryId, CategoryName, domain::DEFAULT_CATEGORIES},
};

/// Create a category and return it with its generated ID.
///
/// # Errors
/// This function will return an [Error::DuplicateCategoryName] if a category
/// with the same name (ignoring case) already exists, or an [Error::SqlError]
/// if there is some other SQL error.
pub fn create_category(
    name: CategoryName,
    color: CategoryColor,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .execute(
            "INSERT INTO category (name, color) VALUES (?1, ?2);",
            (name.as_ref(), color.as_ref()),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateCategoryName(name.to_string()),
            error => error.into(),
        })?;

    let id = connection.last_insert_rowid();

    Ok(Category { id, name, color })
}

/// Retrieve a single category by ID.
pub fn get_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name, color FROM category WHERE id = :id;")?
        .query_row(&[(":id", &category_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all categories ordered alphabetically by name, ignoring case.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, color FROM category ORDER BY name ASC;")?
        .query_map([], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Update a category's name and color.
///
/// This is a plain rename/recolor: renaming a category to the name of
/// another existing category is rejected. Use [merge_categories] to combine
/// two categories deliberately.
///
/// # Errors
/// This function will return an:
/// - [Error::DuplicateCategoryName] if `new_name` belongs to a different category,
/// - [Error::UpdateMissingCategory] if `category_id` does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_category(
    category_id: CategoryId,
    new_name: CategoryName,
    new_color: CategoryColor,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection
        .execute(
            "UPDATE category SET name = ?1, color = ?2 WHERE id = ?3",
            (new_name.as_ref(), new_color.as_ref(), category_id),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateCategoryName(new_name.to_string()),
            error => error.into(),
        })?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCategory);
    }

    Ok(())
}

/// Delete a category that has no expenses referencing it.
///
/// # Errors
/// This function will return an:
/// - [Error::CategoryInUse] reporting the number of referencing expenses if there are any,
/// - [Error::DeleteMissingCategory] if the category doesn't exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_category(category_id: CategoryId, connection: &Connection) -> Result<(), Error> {
    let count: u32 = connection.query_row(
        "SELECT COUNT(id) FROM expense WHERE category_id = ?1",
        [category_id],
        |row| row.get(0),
    )?;

    if count > 0 {
        return Err(Error::CategoryInUse { count });
    }

    let rows_affected = connection.execute("DELETE FROM category WHERE id = ?1", [category_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

/// Reassign all of a category's expenses to another category, then delete it.
///
/// Both steps run in a single transaction: either the expenses move and the
/// source category is removed, or nothing changes.
///
/// # Errors
/// This function will return an:
/// - [Error::SameCategory] if `source_id` and `target_id` are the same,
/// - [Error::NotFound] if `target_id` does not refer to a category,
/// - [Error::DeleteMissingCategory] if `source_id` does not refer to a category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_category_reassign(
    source_id: CategoryId,
    target_id: CategoryId,
    connection: &Connection,
) -> Result<(), Error> {
    if source_id == target_id {
        return Err(Error::SameCategory);
    }

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    get_category(target_id, &transaction)?;

    transaction.execute(
        "UPDATE expense SET category_id = ?1 WHERE category_id = ?2",
        (target_id, source_id),
    )?;

    let rows_affected = transaction.execute("DELETE FROM category WHERE id = ?1", [source_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    transaction.commit()?;

    Ok(())
}

/// Merge a category into another: reassign all of the source's expenses to
/// the target, optionally rename and recolor the target, then delete the
/// source.
///
/// The whole sequence runs in a single transaction and rolls back on any
/// failure, so expenses are never left pointing at a deleted category.
///
/// # Errors
/// This function will return an:
/// - [Error::SameCategory] if `source_id` and `target_id` are the same,
/// - [Error::NotFound] if either category does not exist,
/// - [Error::DuplicateCategoryName] if `new_name` belongs to a third category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn merge_categories(
    source_id: CategoryId,
    target_id: CategoryId,
    new_name: Option<CategoryName>,
    new_color: Option<CategoryColor>,
    connection: &Connection,
) -> Result<(), Error> {
    if source_id == target_id {
        return Err(Error::SameCategory);
    }

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    get_category(source_id, &transaction)?;
    let target = get_category(target_id, &transaction)?;

    transaction.execute(
        "UPDATE expense SET category_id = ?1 WHERE category_id = ?2",
        (target_id, source_id),
    )?;

    transaction.execute("DELETE FROM category WHERE id = ?1", [source_id])?;

    let name = new_name.unwrap_or(target.name);
    let color = new_color.unwrap_or(target.color);

    // The source row is gone by now, so a collision here means a third
    // category already has the requested name.
    transaction
        .execute(
            "UPDATE category SET name = ?1, color = ?2 WHERE id = ?3",
            (name.as_ref(), color.as_ref(), target_id),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateCategoryName(name.to_string()),
            error => error.into(),
        })?;

    transaction.commit()?;

    Ok(())
}

/// Count the expenses referencing each category.
///
/// Categories without expenses are absent from the map.
pub fn count_expenses_per_category(
    connection: &Connection,
) -> Result<HashMap<CategoryId, u32>, Error> {
    let result: Result<HashMap<CategoryId, u32>, rusqlite::Error> = connection
        .prepare("SELECT category_id, COUNT(1) FROM expense GROUP BY category_id")?
        .query_map((), |row| {
            let category_id = row.get(0)?;
            let count = row.get(1)?;

            Ok((category_id, count))
        })?
        .collect();

    result.map_err(Error::from)
}

/// Insert the default category set, skipping names that already exist.
///
/// Safe to run on every startup: existing rows are left untouched, so a
/// recolored or renamed category keeps the user's changes.
pub fn seed_default_categories(connection: &Connection) -> Result<(), rusqlite::Error> {
    let mut statement =
        connection.prepare("INSERT OR IGNORE INTO category (name, color) VALUES (?1, ?2)")?;

    for (name, color) in DEFAULT_CATEGORIES {
        statement.execute((name, color))?;
    }

    Ok(())
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL COLLATE NOCASE UNIQUE,
            color TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_category_name ON category(name);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let raw_color: String = row.get(2)?;

    Ok(Category {
        id,
        name: CategoryName::new_unchecked(&raw_name),
        color: CategoryColor::new_unchecked(&raw_color),
    })
}
