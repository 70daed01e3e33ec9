//! Follow service.
//!
//! Follow edges live in a single table with a `pending`/`active` state. The
//! active edges are the source of truth for "who follows whom"; the counters
//! on the user rows are a cache updated alongside each transition.

use crate::services::notification::NotificationService;
use coterie_common::{AppError, AppResult, IdGenerator};
use coterie_db::{
    entities::{
        follow::{self, FollowState},
        notification::NotificationKind,
        user,
    },
    repositories::{BlockRepository, FollowRepository, PairInsert, UserRepository},
};
use sea_orm::Set;
use serde::Serialize;
use serde_json::json;

/// Relationship status between two users, as seen from the follower side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowStatus {
    None,
    Pending,
    Active,
}

impl From<FollowState> for FollowStatus {
    fn from(state: FollowState) -> Self {
        match state {
            FollowState::Pending => Self::Pending,
            FollowState::Active => Self::Active,
        }
    }
}

/// Resolution of a pending follow request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestAction {
    Accept,
    Decline,
}

/// Follow service for business logic.
#[derive(Clone)]
pub struct FollowService {
    follow_repo: FollowRepository,
    block_repo: BlockRepository,
    user_repo: UserRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl FollowService {
    /// Create a new follow service.
    #[must_use]
    pub const fn new(
        follow_repo: FollowRepository,
        block_repo: BlockRepository,
        user_repo: UserRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            follow_repo,
            block_repo,
            user_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Follow a user.
    ///
    /// If the target account is private this creates a pending request
    /// instead of an active edge. Repeating the call for an existing pair is
    /// a no-op that reports the pair's current status.
    pub async fn follow(&self, follower_id: &str, target_id: &str) -> AppResult<FollowStatus> {
        if follower_id == target_id {
            return Err(AppError::SelfOperation);
        }

        if self
            .block_repo
            .is_blocked_between(follower_id, target_id)
            .await?
        {
            return Err(AppError::PrivacyForbidden(
                "A block exists between these users".to_string(),
            ));
        }

        // Idempotency: an existing edge in either state reports its status
        if let Some(existing) = self.follow_repo.find_by_pair(follower_id, target_id).await? {
            return Ok(existing.state.into());
        }

        let target = self.user_repo.get_by_id(target_id).await?;

        let state = if target.is_private {
            FollowState::Pending
        } else {
            FollowState::Active
        };

        let model = follow::ActiveModel {
            id: Set(self.id_gen.generate()),
            follower_id: Set(follower_id.to_string()),
            following_id: Set(target_id.to_string()),
            state: Set(state.clone()),
            created_at: Set(chrono::Utc::now().into()),
        };

        // A concurrent call may have inserted the pair since the check above;
        // the unique index turns that race into a duplicate report
        let inserted = match self.follow_repo.insert(model).await? {
            PairInsert::Inserted(edge) => edge,
            PairInsert::Duplicate => {
                let existing = self
                    .follow_repo
                    .find_by_pair(follower_id, target_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::Internal("Follow edge vanished after duplicate insert".to_string())
                    })?;
                return Ok(existing.state.into());
            }
        };

        match inserted.state {
            FollowState::Pending => {
                self.notify(
                    target_id,
                    follower_id,
                    NotificationKind::FollowRequest,
                    None,
                )
                .await;
                Ok(FollowStatus::Pending)
            }
            FollowState::Active => {
                self.apply_follow_counters(follower_id, target_id).await;
                self.notify(target_id, follower_id, NotificationKind::Follow, None)
                    .await;
                Ok(FollowStatus::Active)
            }
        }
    }

    /// Unfollow a user. Succeeds as a no-op when no edge exists.
    ///
    /// Only an active edge carries counter weight, so removing a pending
    /// request leaves the counters untouched.
    pub async fn unfollow(&self, follower_id: &str, target_id: &str) -> AppResult<()> {
        if follower_id == target_id {
            return Err(AppError::SelfOperation);
        }

        let removed = self
            .follow_repo
            .delete_by_pair(follower_id, target_id)
            .await?;

        if let Some(edge) = removed
            && edge.state == FollowState::Active
        {
            self.revert_follow_counters(follower_id, target_id).await;
        }

        Ok(())
    }

    /// Accept or decline a pending follow request aimed at `target_id`.
    pub async fn respond_to_request(
        &self,
        target_id: &str,
        follower_id: &str,
        action: RequestAction,
    ) -> AppResult<FollowStatus> {
        let edge = self
            .follow_repo
            .find_by_pair(follower_id, target_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No follow request from {follower_id}"))
            })?;

        if edge.state != FollowState::Pending {
            return Err(AppError::InvalidState(
                "Follow request is not pending".to_string(),
            ));
        }

        match action {
            RequestAction::Accept => {
                self.follow_repo.activate(&edge.id).await?;
                self.apply_follow_counters(follower_id, target_id).await;
                // Tell the requester their request went through
                self.notify(follower_id, target_id, NotificationKind::Follow, None)
                    .await;
                Ok(FollowStatus::Active)
            }
            RequestAction::Decline => {
                self.follow_repo
                    .delete_by_pair(follower_id, target_id)
                    .await?;
                Ok(FollowStatus::None)
            }
        }
    }

    /// Current relationship status for a pair.
    pub async fn check_status(&self, follower_id: &str, target_id: &str) -> AppResult<FollowStatus> {
        Ok(self
            .follow_repo
            .find_by_pair(follower_id, target_id)
            .await?
            .map_or(FollowStatus::None, |edge| edge.state.into()))
    }

    /// Get the followers of a user, hydrated (newest first, keyset pagination).
    pub async fn get_followers(
        &self,
        user_id: &str,
        viewer_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<user::Model>> {
        self.check_follow_visibility(user_id, viewer_id).await?;

        let edges = self.follow_repo.find_followers(user_id, limit, until_id).await?;
        let ids: Vec<String> = edges.into_iter().map(|e| e.follower_id).collect();
        self.user_repo.find_by_ids(&ids).await
    }

    /// Get the users a user follows, hydrated (newest first, keyset pagination).
    pub async fn get_following(
        &self,
        user_id: &str,
        viewer_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<user::Model>> {
        self.check_follow_visibility(user_id, viewer_id).await?;

        let edges = self.follow_repo.find_following(user_id, limit, until_id).await?;
        let ids: Vec<String> = edges.into_iter().map(|e| e.following_id).collect();
        self.user_repo.find_by_ids(&ids).await
    }

    /// Get the pending follow requests aimed at a user, hydrated.
    pub async fn get_pending_requests(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<user::Model>> {
        let edges = self
            .follow_repo
            .find_pending_received(user_id, limit, until_id)
            .await?;
        let ids: Vec<String> = edges.into_iter().map(|e| e.follower_id).collect();
        self.user_repo.find_by_ids(&ids).await
    }

    /// A private account's follow lists are visible only to the owner and to
    /// accepted followers.
    async fn check_follow_visibility(&self, user_id: &str, viewer_id: &str) -> AppResult<()> {
        if user_id == viewer_id {
            return Ok(());
        }

        let user = self.user_repo.get_by_id(user_id).await?;
        if !user.is_private {
            return Ok(());
        }

        if self.follow_repo.is_following(viewer_id, user_id).await? {
            return Ok(());
        }

        Err(AppError::Unauthorized(
            "This account is private".to_string(),
        ))
    }

    // The edge row is the source of truth; counter failures after a durable
    // edge write are logged, never re-raised
    async fn apply_follow_counters(&self, follower_id: &str, target_id: &str) {
        if let Err(e) = self.user_repo.increment_following_count(follower_id).await {
            tracing::warn!(error = %e, follower_id, "Failed to bump following counter");
        }
        if let Err(e) = self.user_repo.increment_followers_count(target_id).await {
            tracing::warn!(error = %e, target_id, "Failed to bump followers counter");
        }
    }

    async fn revert_follow_counters(&self, follower_id: &str, target_id: &str) {
        if let Err(e) = self.user_repo.decrement_following_count(follower_id).await {
            tracing::warn!(error = %e, follower_id, "Failed to lower following counter");
        }
        if let Err(e) = self.user_repo.decrement_followers_count(target_id).await {
            tracing::warn!(error = %e, target_id, "Failed to lower followers counter");
        }
    }

    async fn notify(
        &self,
        recipient_id: &str,
        actor_id: &str,
        kind: NotificationKind,
        target_id: Option<&str>,
    ) {
        if let Err(e) = self
            .notifications
            .create(recipient_id, actor_id, kind, target_id, json!({}))
            .await
        {
            tracing::warn!(error = %e, recipient_id, "Failed to write follow notification");
        }
    }
}
