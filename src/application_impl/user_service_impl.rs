use crate::application_port::{UserError, UserService};
use crate::domain_model::*;
use crate::domain_port::{NewUserRecord, UserPatch, UserRepo};
use crate::logger::*;
use crate::server::EventPublisher;
use chrono::{DateTime, SubsecRound, Utc};
use std::sync::Arc;

/// Millisecond precision, the finest the document store keeps, so the
/// timestamps returned to a caller are the ones a later read sees.
fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

pub struct RealUserService {
    user_repo: Arc<dyn UserRepo>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl RealUserService {
    pub fn new(
        user_repo: Arc<dyn UserRepo>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> RealUserService {
        RealUserService {
            user_repo,
            event_publisher,
        }
    }

    /// At most once: a failed publish is logged and dropped, the mutation
    /// it reports on stays committed.
    async fn notify(&self, event: UserEvent) {
        let topic = event.topic();
        let user_id = event.user_id();
        if let Err(e) = self.event_publisher.publish(topic, user_id.as_str()).await {
            warn!(topic, %user_id, "event dropped: {e}");
        }
    }
}

#[async_trait::async_trait]
impl UserService for RealUserService {
    async fn create_user(&self, profile: UserProfile) -> Result<User, UserError> {
        let now = now_millis();
        let record = NewUserRecord {
            profile,
            created_at: now,
            updated_at: now,
        };

        let id = self.user_repo.create(&record).await?;
        self.notify(UserEvent::Created(id.clone())).await;

        Ok(User {
            id,
            profile: record.profile,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    async fn get_user_by_id(&self, id: &UserId) -> Result<User, UserError> {
        self.user_repo.get_by_id(id).await
    }

    async fn update_user(&self, id: &UserId, profile: UserProfile) -> Result<(), UserError> {
        let patch = UserPatch {
            profile,
            updated_at: now_millis(),
        };

        self.user_repo.update(id, &patch).await?;
        self.notify(UserEvent::Updated(id.clone())).await;
        Ok(())
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), UserError> {
        self.user_repo.delete(id).await?;
        self.notify(UserEvent::Deleted(id.clone())).await;
        Ok(())
    }

    async fn list_users(
        &self,
        filter: UserFilter,
        page: PageRequest,
    ) -> Result<Vec<User>, UserError> {
        debug!(
            filtered = !filter.is_empty(),
            page = page.page(),
            page_size = page.page_size(),
            "list users"
        );
        self.user_repo
            .list(&filter, page.skip(), page.limit())
            .await
    }
}
