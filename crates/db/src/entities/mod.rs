//! Database entities.

#![allow(missing_docs)]

pub mod answer;
pub mod comment;
pub mod poll;
pub mod user;
pub mod vote;

pub use answer::Entity as Answer;
pub use comment::Entity as Comment;
pub use poll::Entity as Poll;
pub use user::Entity as User;
pub use vote::Entity as Vote;
