//! Category entity - A flat tag vocabulary with a display color.
//!
//! Categories are attached to valid names through the `valid_name_categories`
//! join table. Uniqueness is case-insensitive and enforced by the `name_key` index.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Color assigned to a category when none is supplied
pub const DEFAULT_COLOR: &str = "#10b981";

/// Category database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Unique identifier for the category
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name as entered (e.g., "Antibiotic")
    pub name: String,
    /// Lower-cased, trimmed name; unique
    #[sea_orm(unique)]
    #[serde(skip)]
    pub name_key: String,
    /// Hex display color (e.g., "#10b981")
    pub color: String,
    /// When the category was created
    pub created_at: DateTime,
    /// When the category was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Category and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One category is linked to many valid names
    #[sea_orm(has_many = "super::valid_name_category::Entity")]
    ValidNameCategories,
}

impl Related<super::valid_name_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ValidNameCategories.def()
    }
}

impl Related<super::valid_name::Entity> for Entity {
    fn to() -> RelationDef {
        super::valid_name_category::Relation::ValidName.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::valid_name_category::Relation::Category.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
