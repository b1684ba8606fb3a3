//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod category;
pub mod valid_name;
pub mod valid_name_category;

// Re-export specific types to avoid conflicts
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use valid_name::{Column as ValidNameColumn, Entity as ValidName, Model as ValidNameModel};
pub use valid_name_category::{
    Column as ValidNameCategoryColumn, Entity as ValidNameCategory,
    Model as ValidNameCategoryModel,
};
