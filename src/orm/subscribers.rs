//! SeaORM Entity for subscribers table

use super::ads::Category;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "subscribers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub user_id: i32,
    /// JSON array of category identifiers, e.g. `["tanks","heals"]`.
    #[sea_orm(column_type = "Text")]
    pub categories: String,
}

impl Model {
    /// Decodes the stored category list, skipping identifiers no longer in the fixed set.
    pub fn category_list(&self) -> Vec<Category> {
        let raw: Vec<String> = match serde_json::from_str(&self.categories) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Malformed categories for subscriber {}: {}", self.id, e);
                return Vec::new();
            }
        };
        raw.iter().filter_map(|c| c.parse().ok()).collect()
    }
}

/// Encodes a category list for storage.
pub fn encode_categories(categories: &[Category]) -> String {
    let ids: Vec<&str> = categories.iter().map(|c| c.as_str()).collect();
    serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_owned())
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
