//! Category business logic - Handles the tag vocabulary attached to valid names.
//!
//! Names are unique case-insensitively. Deleting a category detaches it from
//! every valid name that carried it; the valid names themselves are kept.

use super::{
    names::{name_key, normalize_name},
    unique_violation_or,
};
use crate::{
    config::categories::CategoryConfig,
    entities::{Category, ValidNameCategory, category, valid_name_category},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Result of deleting a category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedCategory {
    /// The removed category
    pub category: category::Model,
    /// How many valid names lost the reference
    pub detached: u64,
}

/// Retrieves all categories, ordered alphabetically by name.
pub async fn get_all_categories(db: &DatabaseConnection) -> Result<Vec<category::Model>> {
    Category::find()
        .order_by_asc(category::Column::NameKey)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a category by its unique ID.
pub async fn get_category_by_id(
    db: &DatabaseConnection,
    category_id: i64,
) -> Result<Option<category::Model>> {
    Category::find_by_id(category_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a category by name, ignoring case and surrounding whitespace.
pub async fn get_category_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<category::Model>> {
    Category::find()
        .filter(category::Column::NameKey.eq(name_key(name)))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Checks a `#rgb` / `#rrggbb` color, substituting the default when absent or blank.
fn normalize_color(color: Option<String>) -> Result<String> {
    let Some(color) = color.as_deref().map(str::trim).filter(|c| !c.is_empty()) else {
        return Ok(category::DEFAULT_COLOR.to_string());
    };

    let valid = color
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()));
    if valid {
        Ok(color.to_string())
    } else {
        Err(Error::validation(format!("Invalid color: {color}")))
    }
}

/// Creates a new category.
///
/// # Errors
/// Returns an error if:
/// - The name is empty or whitespace-only
/// - The color is not a hex color
/// - A category with the same name (ignoring case) exists
/// - The database insert fails
pub async fn create_category(
    db: &DatabaseConnection,
    name: String,
    color: Option<String>,
) -> Result<category::Model> {
    let name = normalize_name(&name).ok_or_else(|| Error::validation("Category name is required"))?;
    let color = normalize_color(color)?;

    if get_category_by_name(db, &name).await?.is_some() {
        return Err(Error::DuplicateCategory { name });
    }

    let now = chrono::Utc::now().naive_utc();
    let category = category::ActiveModel {
        name_key: Set(name_key(&name)),
        name: Set(name.clone()),
        color: Set(color),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = category
        .insert(db)
        .await
        .map_err(|e| unique_violation_or(e, || Error::DuplicateCategory { name }))?;
    info!("Created category {} (id {})", created.name, created.id);
    Ok(created)
}

/// Deletes a category and removes it from every valid name that references it.
///
/// Both steps run in one database transaction.
pub async fn delete_category(db: &DatabaseConnection, category_id: i64) -> Result<DeletedCategory> {
    let txn = db.begin().await?;

    let category = Category::find_by_id(category_id)
        .one(&txn)
        .await?
        .ok_or(Error::CategoryNotFound { id: category_id })?;

    let detached = ValidNameCategory::delete_many()
        .filter(valid_name_category::Column::CategoryId.eq(category_id))
        .exec(&txn)
        .await?
        .rows_affected;

    Category::delete_by_id(category_id).exec(&txn).await?;
    txn.commit().await?;

    info!(
        "Deleted category {} (id {}), detached from {} valid names",
        category.name, category.id, detached
    );
    Ok(DeletedCategory { category, detached })
}

/// Creates every configured category that does not exist yet. Returns how many were created.
pub async fn seed_categories(db: &DatabaseConnection, seeds: &[CategoryConfig]) -> Result<usize> {
    let mut created = 0;
    for seed in seeds {
        if get_category_by_name(db, &seed.name).await?.is_some() {
            continue;
        }
        create_category(db, seed.name.clone(), seed.color.clone()).await?;
        created += 1;
    }
    Ok(created)
}
