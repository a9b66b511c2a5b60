//! API middleware and shared state.

use quorum_core::{
    AnswerService, CommentService, DiscussionService, IdentityService, PollService, VoteService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub poll_service: PollService,
    pub answer_service: AnswerService,
    pub comment_service: CommentService,
    pub discussion_service: DiscussionService,
    pub vote_service: VoteService,
    pub identity_service: IdentityService,
}
