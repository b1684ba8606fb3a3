//! Valid name business logic - Handles the curated list of medicine names.
//!
//! This module provides functions for creating, retrieving, updating, and deleting
//! valid names, managing their category links, and attaching images. Name
//! uniqueness is case-insensitive and backed by the `name_key` unique index.

use super::{
    names::{name_key, normalize_name, normalize_units},
    unique_violation_or,
};
use crate::{
    entities::{
        Category, ValidName, ValidNameCategory, category, valid_name, valid_name::UnitList,
        valid_name_category,
    },
    errors::{Error, Result},
    storage::{ImageStore, ImageUpload, StoredImage},
};
use sea_orm::{
    QueryOrder, Set, TransactionTrait,
    prelude::*,
    sea_query::{Expr, LikeExpr},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A valid name with its categories populated, as returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidNameView {
    /// Unique identifier
    pub id: i64,
    /// Canonical spelling
    pub name: String,
    /// Attached categories, sorted by name
    pub categories: Vec<category::Model>,
    /// Unit list
    pub units: Vec<String>,
    /// Local relative path or remote URL of the image
    pub image_path: Option<String>,
    /// Provider-assigned image identifier
    pub image_public_id: Option<String>,
    /// Whether an image is attached
    pub has_image: bool,
    /// Creation time
    pub created_at: DateTime,
    /// Last modification time
    pub updated_at: DateTime,
}

impl ValidNameView {
    /// Combines a valid name with its categories.
    #[must_use]
    pub fn from_parts(model: valid_name::Model, mut categories: Vec<category::Model>) -> Self {
        categories.sort_by(|a, b| a.name_key.cmp(&b.name_key));
        Self {
            id: model.id,
            name: model.name,
            categories,
            units: model.units.0,
            image_path: model.image_path,
            image_public_id: model.image_public_id,
            has_image: model.has_image,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Partial update of a valid name; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidNameUpdate {
    /// New canonical spelling
    #[serde(default)]
    pub name: Option<String>,
    /// Full replacement list of category ids
    #[serde(default)]
    pub categories: Option<Vec<i64>>,
    /// Full replacement unit list
    #[serde(default)]
    pub units: Option<Vec<String>>,
}

const LIKE_ESCAPE: char = '\\';

/// `LIKE` pattern matching `term` literally anywhere in the column.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Retrieves all valid names with their categories, ordered alphabetically.
///
/// When `search` is given, only names containing it (ignoring case) are returned.
pub async fn list_valid_names(
    db: &DatabaseConnection,
    search: Option<&str>,
) -> Result<Vec<ValidNameView>> {
    let mut query = ValidName::find().order_by_asc(valid_name::Column::NameKey);
    if let Some(term) = search.map(name_key).filter(|term| !term.is_empty()) {
        let pattern = LikeExpr::new(contains_pattern(&term)).escape(LIKE_ESCAPE);
        query =
            query.filter(Expr::col((ValidName, valid_name::Column::NameKey)).like(pattern));
    }

    let rows = query.find_with_related(Category).all(db).await?;
    Ok(rows
        .into_iter()
        .map(|(model, categories)| ValidNameView::from_parts(model, categories))
        .collect())
}

/// Retrieves a valid name by id with its categories.
///
/// # Errors
/// Returns [`Error::ValidNameNotFound`] if no valid name has this id.
pub async fn get_valid_name(db: &DatabaseConnection, valid_name_id: i64) -> Result<ValidNameView> {
    let model = ValidName::find_by_id(valid_name_id)
        .one(db)
        .await?
        .ok_or(Error::ValidNameNotFound { id: valid_name_id })?;
    let categories = model.find_related(Category).all(db).await?;
    Ok(ValidNameView::from_parts(model, categories))
}

/// Finds a valid name by name, ignoring case and surrounding whitespace.
pub async fn get_valid_name_by_name<C>(db: &C, name: &str) -> Result<Option<valid_name::Model>>
where
    C: ConnectionTrait,
{
    ValidName::find()
        .filter(valid_name::Column::NameKey.eq(name_key(name)))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Inserts a valid name with no categories and no image, unless the name is taken.
///
/// `name` must already be trimmed and non-empty.
pub(crate) async fn insert_valid_name<C>(
    db: &C,
    name: String,
    units: Vec<String>,
) -> Result<valid_name::Model>
where
    C: ConnectionTrait,
{
    if get_valid_name_by_name(db, &name).await?.is_some() {
        return Err(Error::DuplicateName { name });
    }

    let now = chrono::Utc::now().naive_utc();
    let valid_name = valid_name::ActiveModel {
        name_key: Set(name_key(&name)),
        name: Set(name.clone()),
        units: Set(UnitList(normalize_units(units))),
        image_path: Set(None),
        image_public_id: Set(None),
        has_image: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    valid_name
        .insert(db)
        .await
        .map_err(|e| unique_violation_or(e, || Error::DuplicateName { name }))
}

/// Creates a valid name directly, without a raw record.
///
/// # Errors
/// Returns an error if:
/// - The name is empty or whitespace-only
/// - A valid name with the same name (ignoring case) exists
/// - The database insert fails
pub async fn create_valid_name(
    db: &DatabaseConnection,
    name: String,
    units: Vec<String>,
) -> Result<ValidNameView> {
    let name = normalize_name(&name).ok_or_else(|| Error::validation("Name is required"))?;
    let created = insert_valid_name(db, name, units).await?;
    info!("Created valid name {} (id {})", created.name, created.id);
    Ok(ValidNameView::from_parts(created, Vec::new()))
}

/// Replaces the category links of a valid name inside an open transaction.
async fn replace_categories<C>(db: &C, valid_name_id: i64, category_ids: Vec<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut ids = category_ids;
    ids.sort_unstable();
    ids.dedup();

    if !ids.is_empty() {
        let known: Vec<i64> = Category::find()
            .filter(category::Column::Id.is_in(ids.clone()))
            .all(db)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();
        let unknown: Vec<String> = ids
            .iter()
            .filter(|id| !known.contains(*id))
            .map(ToString::to_string)
            .collect();
        if !unknown.is_empty() {
            return Err(Error::validation(format!(
                "Unknown category id(s): {}",
                unknown.join(", ")
            )));
        }
    }

    ValidNameCategory::delete_many()
        .filter(valid_name_category::Column::ValidNameId.eq(valid_name_id))
        .exec(db)
        .await?;

    if !ids.is_empty() {
        let links = ids.into_iter().map(|category_id| valid_name_category::ActiveModel {
            valid_name_id: Set(valid_name_id),
            category_id: Set(category_id),
        });
        ValidNameCategory::insert_many(links)
            .exec_without_returning(db)
            .await?;
    }
    Ok(())
}

/// Applies a partial update to a valid name.
///
/// A new name is checked for uniqueness against every other valid name. The
/// category list and unit list, when given, replace the current ones.
///
/// # Errors
/// Returns an error if:
/// - The valid name does not exist
/// - A supplied name is blank or already used by another valid name
/// - A category id does not exist
/// - The database update fails
pub async fn update_valid_name(
    db: &DatabaseConnection,
    valid_name_id: i64,
    update: ValidNameUpdate,
) -> Result<ValidNameView> {
    let txn = db.begin().await?;

    let existing = ValidName::find_by_id(valid_name_id)
        .one(&txn)
        .await?
        .ok_or(Error::ValidNameNotFound { id: valid_name_id })?;
    let mut valid_name: valid_name::ActiveModel = existing.into();

    let mut new_name = None;
    if let Some(name) = update.name {
        let name = normalize_name(&name).ok_or_else(|| Error::validation("Name cannot be empty"))?;
        let taken = ValidName::find()
            .filter(valid_name::Column::NameKey.eq(name_key(&name)))
            .filter(valid_name::Column::Id.ne(valid_name_id))
            .one(&txn)
            .await?;
        if taken.is_some() {
            return Err(Error::DuplicateName { name });
        }
        valid_name.name_key = Set(name_key(&name));
        valid_name.name = Set(name.clone());
        new_name = Some(name);
    }

    if let Some(units) = update.units {
        valid_name.units = Set(UnitList(normalize_units(units)));
    }

    if let Some(category_ids) = update.categories {
        replace_categories(&txn, valid_name_id, category_ids).await?;
    }

    valid_name.updated_at = Set(chrono::Utc::now().naive_utc());
    valid_name.update(&txn).await.map_err(|e| {
        unique_violation_or(e, || Error::DuplicateName {
            name: new_name.unwrap_or_default(),
        })
    })?;
    txn.commit().await?;

    info!("Updated valid name {}", valid_name_id);
    get_valid_name(db, valid_name_id).await
}

/// Removes an image, logging instead of failing.
async fn remove_image_quietly(images: &dyn ImageStore, image: &StoredImage) {
    if let Err(e) = images.remove(image).await {
        warn!("Failed to remove image {}: {}", image.path, e);
    }
}

fn stored_image(model: &valid_name::Model) -> Option<StoredImage> {
    model.image_path.as_ref().map(|path| StoredImage {
        path: path.clone(),
        public_id: model.image_public_id.clone(),
    })
}

/// Deletes a valid name and its category links, then removes its image.
///
/// Returns the valid name as it was, categories included. Image removal is
/// best effort: failures are logged and the deletion still succeeds.
pub async fn delete_valid_name(
    db: &DatabaseConnection,
    images: &dyn ImageStore,
    valid_name_id: i64,
) -> Result<ValidNameView> {
    let txn = db.begin().await?;

    let deleted = ValidName::find_by_id(valid_name_id)
        .one(&txn)
        .await?
        .ok_or(Error::ValidNameNotFound { id: valid_name_id })?;
    let categories = deleted.find_related(Category).all(&txn).await?;

    ValidNameCategory::delete_many()
        .filter(valid_name_category::Column::ValidNameId.eq(valid_name_id))
        .exec(&txn)
        .await?;
    ValidName::delete_by_id(valid_name_id).exec(&txn).await?;
    txn.commit().await?;

    if let Some(image) = stored_image(&deleted) {
        remove_image_quietly(images, &image).await;
    }

    info!("Deleted valid name {} (id {})", deleted.name, deleted.id);
    Ok(ValidNameView::from_parts(deleted, categories))
}

/// Attaches an image to a valid name, replacing any previous one.
///
/// The new image is stored first. If the record cannot be updated the new image
/// is removed again; otherwise the previous image is removed (best effort).
pub async fn attach_image(
    db: &DatabaseConnection,
    images: &dyn ImageStore,
    valid_name_id: i64,
    upload: ImageUpload,
) -> Result<ValidNameView> {
    upload.validate()?;

    let existing = ValidName::find_by_id(valid_name_id)
        .one(db)
        .await?
        .ok_or(Error::ValidNameNotFound { id: valid_name_id })?;
    let previous = stored_image(&existing);

    let stored = images.store(upload).await?;

    let mut valid_name: valid_name::ActiveModel = existing.into();
    valid_name.image_path = Set(Some(stored.path.clone()));
    valid_name.image_public_id = Set(stored.public_id.clone());
    valid_name.has_image = Set(true);
    valid_name.updated_at = Set(chrono::Utc::now().naive_utc());

    if let Err(e) = valid_name.update(db).await {
        remove_image_quietly(images, &stored).await;
        return Err(e.into());
    }

    if let Some(previous) = previous.filter(|p| p.path != stored.path) {
        remove_image_quietly(images, &previous).await;
    }

    info!("Attached image {} to valid name {}", stored.path, valid_name_id);
    get_valid_name(db, valid_name_id).await
}
