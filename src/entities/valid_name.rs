//! Valid name entity - The curated, de-duplicated list of medicine names.
//!
//! Each valid name carries a unit list, optional image reference, and a set of
//! categories (through `valid_name_categories`).

use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Units of sale for a medicine (e.g., `["B", "P"]`), stored as a JSON column
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct UnitList(pub Vec<String>);

/// Valid name database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "valid_names")]
pub struct Model {
    /// Unique identifier for the valid name
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Canonical spelling (e.g., "Amoxicillin")
    pub name: String,
    /// Lower-cased, trimmed name; unique
    #[sea_orm(unique)]
    pub name_key: String,
    /// Unit list, duplicates collapsed
    pub units: UnitList,
    /// Local relative path or remote URL of the attached image
    pub image_path: Option<String>,
    /// Identifier assigned by a remote image provider
    pub image_public_id: Option<String>,
    /// Whether an image is attached
    pub has_image: bool,
    /// When the valid name was created
    pub created_at: DateTime,
    /// When the valid name was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between `ValidName` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One valid name has many category links
    #[sea_orm(has_many = "super::valid_name_category::Entity")]
    ValidNameCategories,
}

impl Related<super::valid_name_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ValidNameCategories.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        super::valid_name_category::Relation::Category.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::valid_name_category::Relation::ValidName.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
