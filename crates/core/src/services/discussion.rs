//! Discussion service.
//!
//! Routes a user into the opposing debate that needs them most: among the
//! threads rooted in the opposite answer, the one with the fewest comments
//! wins, ties going to the oldest root.

use std::collections::HashMap;

use quorum_common::{AppError, AppResult};
use quorum_db::{
    entities::comment,
    repositories::{AnswerRepository, CommentRepository, PollRepository},
};

/// Discussion service for business logic.
#[derive(Clone)]
pub struct DiscussionService {
    comment_repo: CommentRepository,
    answer_repo: AnswerRepository,
    poll_repo: PollRepository,
}

impl DiscussionService {
    /// Create a new discussion service.
    #[must_use]
    pub const fn new(
        comment_repo: CommentRepository,
        answer_repo: AnswerRepository,
        poll_repo: PollRepository,
    ) -> Self {
        Self {
            comment_repo,
            answer_repo,
            poll_repo,
        }
    }

    /// Find the least-replied thread arguing against the user's answer.
    ///
    /// The opposite answer is the first poll option differing from the
    /// user's own. Candidate threads are those whose root comment carries
    /// that answer; the thread with the fewest comments wins, ties broken
    /// by earliest root creation time. Returns the full thread in position
    /// order.
    pub async fn find_least_replied_opposing_thread(
        &self,
        poll_id: &str,
        user_id: &str,
    ) -> AppResult<Vec<comment::Model>> {
        let poll = self.poll_repo.get_by_id(poll_id).await?;

        let answer = self
            .answer_repo
            .find_by_user_and_poll(user_id, poll_id)
            .await?
            .ok_or_else(|| {
                AppError::PreconditionFailed(
                    "User has not answered this poll yet".to_string(),
                )
            })?;

        let options = poll
            .option_labels()
            .map_err(|e| AppError::Internal(format!("Poll options are not a string array: {e}")))?;

        let Some(opposite) = options.iter().find(|o| **o != answer.answer) else {
            return Err(AppError::ThreadNotFound(format!(
                "no opposing thread on poll {poll_id}"
            )));
        };

        // Single snapshot of the poll's comments keeps counting and
        // selection consistent.
        let comments = self.comment_repo.find_by_poll(poll_id).await?;

        let mut threads: HashMap<String, Vec<comment::Model>> = HashMap::new();
        for comment in comments {
            threads
                .entry(comment.thread_id.clone())
                .or_default()
                .push(comment);
        }

        let selected = threads
            .into_values()
            .filter(|thread| {
                thread
                    .first()
                    .is_some_and(|root| root.is_root() && root.poll_answer == *opposite)
            })
            .min_by(|a, b| {
                a.len()
                    .cmp(&b.len())
                    .then_with(|| a[0].created_at.cmp(&b[0].created_at))
            });

        selected.map_or_else(
            || {
                Err(AppError::ThreadNotFound(format!(
                    "no opposing thread on poll {poll_id}"
                )))
            },
            |thread| {
                tracing::debug!(
                    poll_id = %poll_id,
                    user_id = %user_id,
                    thread_id = %thread[0].thread_id,
                    comments = thread.len(),
                    "Selected least-replied opposing thread"
                );
                Ok(thread)
            },
        )
    }
}
