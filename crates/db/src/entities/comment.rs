//! Comment entity.
//!
//! A thread is not a stored entity of its own: it is the set of comments
//! sharing a `thread_id`, ordered by `thread_position`. Position 0 is the
//! thread root and its `poll_answer` snapshot fixes the thread's side of
//! the debate. Comments are append-only; only the vote counters mutate.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Author user ID
    #[sea_orm(indexed)]
    pub user_id: String,

    /// Poll this discussion belongs to
    #[sea_orm(indexed)]
    pub poll_id: String,

    /// Snapshot of the author's poll answer at comment time
    pub poll_answer: String,

    /// Thread this comment belongs to
    #[sea_orm(indexed)]
    pub thread_id: String,

    /// 0-based position within the thread, unique per thread
    pub thread_position: i32,

    /// Upvote count (denormalized)
    #[sea_orm(default_value = 0)]
    pub upvotes: i32,

    /// Downvote count (denormalized)
    #[sea_orm(default_value = 0)]
    pub downvotes: i32,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Whether this comment is a thread root.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.thread_position == 0
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::poll::Entity",
        from = "Column::PollId",
        to = "super::poll::Column::Id",
        on_delete = "Cascade"
    )]
    Poll,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::poll::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Poll.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
