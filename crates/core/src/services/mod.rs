//! Business logic services.

pub mod answer;
pub mod comment;
pub mod discussion;
pub mod identity;
pub mod poll;
pub mod vote;

pub use answer::AnswerService;
pub use comment::CommentService;
pub use discussion::DiscussionService;
pub use identity::{
    FingerprintIdentity, FingerprintResolver, HttpFingerprintResolver, IdentityService,
    SharedFingerprintResolver,
};
pub use poll::{CreatePollInput, PollService};
pub use vote::{VoteCounts, VoteService};
