//! Join table between valid names and categories.

use sea_orm::entity::prelude::*;

/// One category attached to one valid name
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "valid_name_categories")]
pub struct Model {
    /// Linked valid name
    #[sea_orm(primary_key, auto_increment = false)]
    pub valid_name_id: i64,
    /// Linked category
    #[sea_orm(primary_key, auto_increment = false)]
    pub category_id: i64,
}

/// Defines relationships between the link and both sides
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each link belongs to one valid name
    #[sea_orm(
        belongs_to = "super::valid_name::Entity",
        from = "Column::ValidNameId",
        to = "super::valid_name::Column::Id",
        on_delete = "Cascade"
    )]
    ValidName,
    /// Each link belongs to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "Cascade"
    )]
    Category,
}

impl Related<super::valid_name::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ValidName.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
