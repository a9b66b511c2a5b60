//! Poll entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "poll")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Option labels (JSON array of strings, at least 2)
    #[sea_orm(column_type = "Json")]
    pub options: JsonValue,

    /// Only verified/strong users may answer when set
    #[sea_orm(default_value = false)]
    pub require_verification: bool,

    /// Whether the poll carries a real-world action
    #[sea_orm(default_value = false)]
    pub is_actionable: bool,

    pub created_at: DateTimeWithTimeZone,

    /// When the poll stops accepting answers (null = open-ended)
    #[sea_orm(nullable)]
    pub closed_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Decode the JSON option labels.
    pub fn option_labels(&self) -> Result<Vec<String>, serde_json::Error> {
        serde_json::from_value(self.options.clone())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::answer::Entity")]
    Answer,
}

impl Related<super::answer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Answer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
