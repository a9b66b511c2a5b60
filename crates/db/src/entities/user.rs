//! User entity.
//!
//! Users are identified by an opaque token and resolved through a
//! third-party fingerprinting service; there are no passwords.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Weak fingerprint (visitor ID from the identification provider)
    #[sea_orm(nullable, indexed)]
    pub fingerprint_id: Option<String>,

    /// Strong fingerprint; non-NULL means the user is verified
    #[sea_orm(nullable)]
    pub strong_fingerprint_id: Option<String>,

    /// Last IP address seen for this user
    #[sea_orm(nullable)]
    pub ip_address: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Whether this user has been promoted to verified/strong status.
    #[must_use]
    pub const fn is_strong(&self) -> bool {
        self.strong_fingerprint_id.is_some()
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
