//! SeaORM Entity for ads table

use sea_orm::entity::prelude::*;
use sea_orm::Iterable;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed set of board categories.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[sea_orm(string_value = "tanks")]
    Tanks,
    #[sea_orm(string_value = "heals")]
    Heals,
    #[sea_orm(string_value = "dd")]
    Dd,
    #[sea_orm(string_value = "merchants")]
    Merchants,
    #[sea_orm(string_value = "guildmasters")]
    Guildmasters,
    #[sea_orm(string_value = "questgivers")]
    Questgivers,
    #[sea_orm(string_value = "blacksmiths")]
    Blacksmiths,
    #[sea_orm(string_value = "tanners")]
    Tanners,
    #[sea_orm(string_value = "potionmakers")]
    Potionmakers,
    #[sea_orm(string_value = "spellmasters")]
    Spellmasters,
}

impl Category {
    /// Identifier used in forms, URLs and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Tanks => "tanks",
            Category::Heals => "heals",
            Category::Dd => "dd",
            Category::Merchants => "merchants",
            Category::Guildmasters => "guildmasters",
            Category::Questgivers => "questgivers",
            Category::Blacksmiths => "blacksmiths",
            Category::Tanners => "tanners",
            Category::Potionmakers => "potionmakers",
            Category::Spellmasters => "spellmasters",
        }
    }

    /// Human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Tanks => "Tanks",
            Category::Heals => "Healers",
            Category::Dd => "Damage dealers",
            Category::Merchants => "Merchants",
            Category::Guildmasters => "Guild masters",
            Category::Questgivers => "Quest givers",
            Category::Blacksmiths => "Blacksmiths",
            Category::Tanners => "Tanners",
            Category::Potionmakers => "Potion makers",
            Category::Spellmasters => "Spell masters",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an identifier outside the fixed category set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category: {}", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_owned()))
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "ads")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub author_id: i32,
    pub title: String,
    /// Rich text body, stored as submitted.
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub category: Category,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AuthorId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Author,
    #[sea_orm(has_many = "super::responses::Entity")]
    Responses,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::responses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Responses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
