//! Database repositories.

#![allow(missing_docs)]

pub mod answer;
pub mod comment;
pub mod poll;
pub mod user;
pub mod vote;

pub use answer::AnswerRepository;
pub use comment::CommentRepository;
pub use poll::PollRepository;
pub use user::{UserIdentityPatch, UserRepository};
pub use vote::VoteRepository;
