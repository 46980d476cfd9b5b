//! Comment service implementation

use crate::database::DatabaseService;
use crate::models::{Comment, CommentWithAuthor, User};
use crate::services::event::EventService;
use crate::utils::errors::{EventHubError, Result};

const MAX_COMMENT_LENGTH: usize = 2000;

#[derive(Clone)]
pub struct CommentService {
    db: DatabaseService,
    events: EventService,
}

impl CommentService {
    pub fn new(db: DatabaseService, events: EventService) -> Self {
        Self { db, events }
    }

    pub async fn list(&self, viewer: &User, event_id: i64) -> Result<Vec<CommentWithAuthor>> {
        self.events.get(viewer, event_id).await?;
        self.db.comments.list_for_event(event_id).await
    }

    pub async fn create(&self, author: &User, event_id: i64, content: &str) -> Result<Comment> {
        self.events.get(author, event_id).await?;

        let content = content.trim();
        if content.is_empty() || content.chars().count() > MAX_COMMENT_LENGTH {
            return Err(EventHubError::Validation(format!(
                "Comment must be between 1 and {} characters",
                MAX_COMMENT_LENGTH
            )));
        }

        self.db.comments.create(event_id, author.id, content).await
    }

    /// Delete a comment; its author or the event organizer may do so
    pub async fn delete(&self, user: &User, event_id: i64, comment_id: i64) -> Result<()> {
        let comment = self.db.comments
            .find_by_id(comment_id)
            .await?
            .filter(|c| c.event_id == event_id)
            .ok_or_else(|| EventHubError::not_found("Comment", comment_id))?;

        if comment.user_id != user.id {
            let event = self.db.require_event(event_id).await?;
            if event.organizer_id != user.id {
                return Err(EventHubError::Forbidden("You can only delete your own comments".to_string()));
            }
        }

        self.db.comments.delete(comment_id).await?;
        Ok(())
    }
}
