//! Comment service.
//!
//! Comment threads are capped at two levels: top-level comments and direct
//! replies. Deleting a comment that has replies tombstones it in place so
//! the thread keeps its shape; childless comments are removed outright.

use crate::services::notification::NotificationService;
use aho_corasick::AhoCorasick;
use coterie_common::{AppError, AppResult, IdGenerator};
use coterie_db::{
    entities::{
        comment::{self, DELETED_PLACEHOLDER},
        notification::NotificationKind,
        user,
    },
    repositories::{
        CommentLikeRepository, CommentRepository, PostRepository, UserRepository,
    },
};
use sea_orm::Set;
use serde::Serialize;
use serde_json::json;
use std::collections::{HashMap, HashSet};

/// Number of replies shown under each top-level comment. A bounded preview,
/// not full pagination of replies.
const REPLY_PREVIEW_LIMIT: u64 = 3;

/// Content validation rules for comments.
#[derive(Clone)]
pub struct ContentRules {
    max_length: usize,
    blocklist: AhoCorasick,
}

impl ContentRules {
    /// Build rules from configuration.
    pub fn new(max_length: usize, blocked_terms: &[String]) -> AppResult<Self> {
        let blocklist = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(blocked_terms)
            .map_err(|e| AppError::Internal(format!("Invalid blocklist: {e}")))?;
        Ok(Self {
            max_length,
            blocklist,
        })
    }

    /// Validate comment content, returning the trimmed text.
    pub fn validate<'a>(&self, content: &'a str) -> AppResult<&'a str> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(AppError::ContentValidation(
                "Comment content cannot be empty".to_string(),
            ));
        }
        if trimmed.chars().count() > self.max_length {
            return Err(AppError::ContentValidation(format!(
                "Comment exceeds {} characters",
                self.max_length
            )));
        }
        if self.blocklist.is_match(trimmed) {
            return Err(AppError::ContentValidation(
                "Comment contains blocked terms".to_string(),
            ));
        }
        Ok(trimmed)
    }
}

/// A comment annotated for a specific viewer.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    pub username: String,
    pub avatar_url: Option<String>,
    pub parent_id: Option<String>,
    pub content: String,
    pub reply_count: i32,
    pub like_count: i32,
    pub is_deleted: bool,
    pub has_liked: bool,
    pub is_author: bool,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

/// A top-level comment with a bounded preview of its replies.
#[derive(Debug, Clone, Serialize)]
pub struct CommentThread {
    pub comment: CommentView,
    /// Up to three newest replies, in chronological order.
    pub replies: Vec<CommentView>,
}

/// A freshly created comment plus the hashtags found in its content.
///
/// Tag indexing itself is external; the tags are handed back so the caller
/// can forward them.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub comment: comment::Model,
    pub hashtags: Vec<String>,
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    comment_like_repo: CommentLikeRepository,
    post_repo: PostRepository,
    user_repo: UserRepository,
    notifications: NotificationService,
    rules: ContentRules,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub fn new(
        comment_repo: CommentRepository,
        comment_like_repo: CommentLikeRepository,
        post_repo: PostRepository,
        user_repo: UserRepository,
        notifications: NotificationService,
        rules: ContentRules,
    ) -> Self {
        Self {
            comment_repo,
            comment_like_repo,
            post_repo,
            user_repo,
            notifications,
            rules,
            id_gen: IdGenerator::new(),
        }
    }

    /// Add a comment or reply to a post.
    ///
    /// Replies are allowed only under top-level comments: a reply whose
    /// parent itself has a parent is rejected. A parent on a different post
    /// is rejected as well.
    pub async fn add_comment(
        &self,
        user_id: &str,
        post_id: &str,
        content: &str,
        parent_id: Option<&str>,
    ) -> AppResult<NewComment> {
        let content = self.rules.validate(content)?;
        let post = self.post_repo.get_by_id(post_id).await?;

        let parent = match parent_id {
            Some(pid) => {
                let parent = self.comment_repo.get_by_id(pid).await?;
                if parent.post_id != post_id {
                    return Err(AppError::InvalidState(
                        "Parent comment belongs to a different post".to_string(),
                    ));
                }
                if parent.parent_id.is_some() {
                    return Err(AppError::InvalidState(
                        "Maximum comment depth reached".to_string(),
                    ));
                }
                Some(parent)
            }
            None => None,
        };

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post_id.to_string()),
            user_id: Set(user_id.to_string()),
            parent_id: Set(parent_id.map(ToString::to_string)),
            content: Set(content.to_string()),
            reply_count: Set(0),
            like_count: Set(0),
            is_deleted: Set(false),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.comment_repo.create(model).await?;

        // The comment row is durable; counter and notification writes are
        // best-effort from here on
        if let Some(ref parent) = parent
            && let Err(e) = self.comment_repo.increment_reply_count(&parent.id).await
        {
            tracing::warn!(error = %e, parent_id = %parent.id, "Failed to bump reply counter");
        }
        if let Err(e) = self.post_repo.increment_comments_count(post_id).await {
            tracing::warn!(error = %e, post_id, "Failed to bump post comment counter");
        }

        self.fan_out(&created, &post.owner_id, parent.as_ref(), content)
            .await;

        let mut hashtags: Vec<String> =
            coterie_text::extract_hashtags(content).into_iter().collect();
        hashtags.sort_unstable();

        Ok(NewComment {
            comment: created,
            hashtags,
        })
    }

    /// Delete a comment.
    ///
    /// A comment with replies is tombstoned in place; a childless comment is
    /// removed and the post's comment counter decremented. Tombstones keep
    /// counting toward the post's comment total.
    pub async fn delete_comment(&self, user_id: &str, comment_id: &str) -> AppResult<()> {
        let target = self.comment_repo.get_by_id(comment_id).await?;

        if target.user_id != user_id {
            return Err(AppError::Unauthorized(
                "Comment belongs to another user".to_string(),
            ));
        }

        if target.reply_count > 0 {
            self.comment_repo.soft_delete(comment_id).await
        } else {
            let post_id = target.post_id.clone();
            self.comment_repo.delete(target).await?;
            if let Err(e) = self.post_repo.decrement_comments_count(&post_id).await {
                tracing::warn!(error = %e, post_id, "Failed to lower post comment counter");
            }
            Ok(())
        }
    }

    /// Get a page of a post's top-level comments (newest first), each with a
    /// preview of its newest replies shown in chronological order.
    ///
    /// Tombstoned comments render with redacted content but keep their
    /// position and reply count. An anonymous viewer (`None`) gets
    /// `has_liked` and `is_author` as false throughout.
    pub async fn get_comments(
        &self,
        post_id: &str,
        limit: u64,
        offset: u64,
        viewer_id: Option<&str>,
    ) -> AppResult<Vec<CommentThread>> {
        self.post_repo.get_by_id(post_id).await?;

        let top_level = self.comment_repo.find_top_level(post_id, limit, offset).await?;

        let mut all = top_level.clone();
        let mut replies_by_parent: HashMap<String, Vec<comment::Model>> = HashMap::new();
        for parent in &top_level {
            if parent.reply_count > 0 {
                let mut replies = self
                    .comment_repo
                    .find_newest_replies(&parent.id, REPLY_PREVIEW_LIMIT)
                    .await?;
                // Fetched newest first; shown oldest first
                replies.reverse();
                all.extend(replies.iter().cloned());
                replies_by_parent.insert(parent.id.clone(), replies);
            }
        }

        let authors = self.load_authors(&all).await?;
        let liked = self.load_liked_ids(viewer_id, &all).await?;

        Ok(top_level
            .into_iter()
            .map(|c| {
                let replies = replies_by_parent
                    .remove(&c.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|r| self.build_view(r, viewer_id, &authors, &liked))
                    .collect();
                CommentThread {
                    comment: self.build_view(c, viewer_id, &authors, &liked),
                    replies,
                }
            })
            .collect())
    }

    /// Best-effort notification fan-out for a new comment: post owner,
    /// parent-comment owner on replies, and every resolvable mention.
    async fn fan_out(
        &self,
        created: &comment::Model,
        post_owner_id: &str,
        parent: Option<&comment::Model>,
        content: &str,
    ) {
        let metadata = json!({ "comment_id": created.id });

        self.notify(
            post_owner_id,
            &created.user_id,
            NotificationKind::Comment,
            &created.post_id,
            metadata.clone(),
        )
        .await;

        if let Some(parent) = parent
            && parent.user_id != post_owner_id
        {
            self.notify(
                &parent.user_id,
                &created.user_id,
                NotificationKind::Comment,
                &created.post_id,
                metadata.clone(),
            )
            .await;
        }

        let mentions: Vec<String> = coterie_text::extract_mentions(content).into_iter().collect();
        if mentions.is_empty() {
            return;
        }

        match self.user_repo.find_by_usernames(&mentions).await {
            Ok(mentioned) => {
                for target in mentioned {
                    self.notify(
                        &target.id,
                        &created.user_id,
                        NotificationKind::Mention,
                        &created.post_id,
                        metadata.clone(),
                    )
                    .await;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to resolve mentioned users");
            }
        }
    }

    async fn notify(
        &self,
        recipient_id: &str,
        actor_id: &str,
        kind: NotificationKind,
        target_id: &str,
        metadata: serde_json::Value,
    ) {
        if let Err(e) = self
            .notifications
            .create(recipient_id, actor_id, kind, Some(target_id), metadata)
            .await
        {
            tracing::warn!(error = %e, recipient_id, "Failed to write comment notification");
        }
    }

    async fn load_authors(
        &self,
        comments: &[comment::Model],
    ) -> AppResult<HashMap<String, user::Model>> {
        let ids: Vec<String> = comments
            .iter()
            .map(|c| c.user_id.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        Ok(self
            .user_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect())
    }

    async fn load_liked_ids(
        &self,
        viewer_id: Option<&str>,
        comments: &[comment::Model],
    ) -> AppResult<HashSet<String>> {
        let Some(viewer_id) = viewer_id else {
            return Ok(HashSet::new());
        };
        let ids: Vec<String> = comments.iter().map(|c| c.id.clone()).collect();
        Ok(self
            .comment_like_repo
            .find_liked_comment_ids(viewer_id, &ids)
            .await?
            .into_iter()
            .collect())
    }

    fn build_view(
        &self,
        model: comment::Model,
        viewer_id: Option<&str>,
        authors: &HashMap<String, user::Model>,
        liked: &HashSet<String>,
    ) -> CommentView {
        let author = authors.get(&model.user_id);
        let content = if model.is_deleted {
            DELETED_PLACEHOLDER.to_string()
        } else {
            model.content
        };
        CommentView {
            has_liked: liked.contains(&model.id),
            is_author: viewer_id == Some(model.user_id.as_str()),
            username: author.map_or_else(|| "deleted_user".to_string(), |a| a.username.clone()),
            avatar_url: author.and_then(|a| a.avatar_url.clone()),
            id: model.id,
            post_id: model.post_id,
            user_id: model.user_id,
            parent_id: model.parent_id,
            content,
            reply_count: model.reply_count,
            like_count: model.like_count,
            is_deleted: model.is_deleted,
            created_at: model.created_at,
        }
    }
}
