//! Notification service.
//!
//! Single entry point for the fan-out triggered by follows, likes, comments
//! and mentions. Writing a notification is a best-effort side channel: the
//! callers log failures and never abort the primary action.

use coterie_common::{AppError, AppResult, IdGenerator};
use coterie_db::{
    entities::{
        notification::{self, NotificationKind},
        user,
    },
    repositories::{NotificationRepository, UserRepository},
};
use sea_orm::Set;
use serde::Serialize;
use std::collections::HashMap;

/// Placeholder actor name when the triggering user no longer exists.
const DELETED_ACTOR: &str = "deleted_user";

/// A notification hydrated with its actor's identity.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationView {
    pub id: String,
    pub actor_id: String,
    pub actor_username: String,
    pub actor_avatar_url: Option<String>,
    pub kind: NotificationKind,
    pub target_id: Option<String>,
    pub metadata: serde_json::Value,
    pub is_read: bool,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(notification_repo: NotificationRepository, user_repo: UserRepository) -> Self {
        Self {
            notification_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a notification.
    ///
    /// Returns `Ok(None)` without writing anything when the recipient is the
    /// actor; users never get notified about their own actions.
    pub async fn create(
        &self,
        recipient_id: &str,
        actor_id: &str,
        kind: NotificationKind,
        target_id: Option<&str>,
        metadata: serde_json::Value,
    ) -> AppResult<Option<notification::Model>> {
        if recipient_id == actor_id {
            return Ok(None);
        }

        let model = notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            recipient_id: Set(recipient_id.to_string()),
            actor_id: Set(actor_id.to_string()),
            kind: Set(kind),
            target_id: Set(target_id.map(ToString::to_string)),
            metadata: Set(metadata),
            is_read: Set(false),
            created_at: Set(chrono::Utc::now().into()),
        };

        let created = self.notification_repo.create(model).await?;
        Ok(Some(created))
    }

    /// List a user's notifications (newest first) with hydrated actors.
    ///
    /// Actors whose accounts have since been removed are rendered under a
    /// placeholder name rather than dropped from the list.
    pub async fn list(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<NotificationView>> {
        let notifications = self
            .notification_repo
            .find_by_user(user_id, limit, offset)
            .await?;

        let actor_ids: Vec<String> = notifications
            .iter()
            .map(|n| n.actor_id.clone())
            .collect::<std::collections::HashSet<_>>()
            .into_iter()
            .collect();

        let actors: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&actor_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        Ok(notifications
            .into_iter()
            .map(|n| {
                let actor = actors.get(&n.actor_id);
                NotificationView {
                    id: n.id,
                    actor_id: n.actor_id,
                    actor_username: actor
                        .map_or_else(|| DELETED_ACTOR.to_string(), |a| a.username.clone()),
                    actor_avatar_url: actor.and_then(|a| a.avatar_url.clone()),
                    kind: n.kind,
                    target_id: n.target_id,
                    metadata: n.metadata,
                    is_read: n.is_read,
                    created_at: n.created_at,
                }
            })
            .collect())
    }

    /// Mark a single notification as read.
    ///
    /// Only the recipient may toggle read state.
    pub async fn mark_as_read(&self, user_id: &str, notification_id: &str) -> AppResult<()> {
        let notification = self
            .notification_repo
            .find_by_id(notification_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Notification {notification_id}")))?;

        if notification.recipient_id != user_id {
            return Err(AppError::Unauthorized(
                "Notification belongs to another user".to_string(),
            ));
        }

        self.notification_repo.mark_as_read(notification_id).await
    }

    /// Mark all of a user's notifications as read. Returns the number updated.
    pub async fn mark_all_as_read(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.mark_all_as_read(user_id).await
    }

    /// Count unread notifications.
    pub async fn count_unread(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(user_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;
    use std::sync::Arc;

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            username_lower: username.to_lowercase(),
            name: None,
            bio: None,
            avatar_url: None,
            is_private: false,
            followers_count: 0,
            following_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_notification(id: &str, recipient_id: &str, actor_id: &str) -> notification::Model {
        notification::Model {
            id: id.to_string(),
            recipient_id: recipient_id.to_string(),
            actor_id: actor_id.to_string(),
            kind: NotificationKind::Like,
            target_id: Some("post1".to_string()),
            metadata: json!({}),
            is_read: false,
            created_at: Utc::now().into(),
        }
    }

    fn service_with(
        notification_db: Arc<sea_orm::DatabaseConnection>,
        user_db: Arc<sea_orm::DatabaseConnection>,
    ) -> NotificationService {
        NotificationService::new(
            NotificationRepository::new(notification_db),
            UserRepository::new(user_db),
        )
    }

    #[tokio::test]
    async fn test_self_notification_suppressed() {
        // No query results queued: any database access would panic the mock
        let notification_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(notification_db, user_db);
        let result = service
            .create("user1", "user1", NotificationKind::Like, Some("post1"), json!({}))
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_create_for_other_user() {
        let created = create_test_notification("n1", "user2", "user1");
        let notification_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[created]])
                .into_connection(),
        );
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(notification_db, user_db);
        let result = service
            .create("user2", "user1", NotificationKind::Like, Some("post1"), json!({}))
            .await
            .unwrap();

        let model = result.unwrap();
        assert_eq!(model.recipient_id, "user2");
        assert_eq!(model.actor_id, "user1");
    }

    #[tokio::test]
    async fn test_list_hydrates_actors_with_fallback() {
        let n1 = create_test_notification("n1", "user1", "user2");
        let n2 = create_test_notification("n2", "user1", "ghost");
        let notification_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[n1, n2]])
                .into_connection(),
        );
        // Only user2 still exists
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("user2", "alice")]])
                .into_connection(),
        );

        let service = service_with(notification_db, user_db);
        let views = service.list("user1", 20, 0).await.unwrap();

        assert_eq!(views.len(), 2);
        let by_actor: std::collections::HashMap<_, _> = views
            .iter()
            .map(|v| (v.actor_id.clone(), v.actor_username.clone()))
            .collect();
        assert_eq!(by_actor["user2"], "alice");
        assert_eq!(by_actor["ghost"], "deleted_user");
    }

    #[tokio::test]
    async fn test_mark_as_read_rejects_other_users() {
        let n1 = create_test_notification("n1", "user1", "user2");
        let notification_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[n1]])
                .into_connection(),
        );
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(notification_db, user_db);
        let result = service.mark_as_read("intruder", "n1").await;

        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_mark_as_read_missing_notification() {
        let notification_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<notification::Model>::new()])
                .into_connection(),
        );
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = service_with(notification_db, user_db);
        let result = service.mark_as_read("user1", "nope").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
