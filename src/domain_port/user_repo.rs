use crate::application_port::UserError;
use crate::domain_model::*;
use chrono::{DateTime, Utc};

/// A user as the service hands it to the store for insertion.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub profile: UserProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full replacement of the mutable part of a stored user.
#[derive(Debug, Clone)]
pub struct UserPatch {
    pub profile: UserProfile,
    pub updated_at: DateTime<Utc>,
}

/// Durable storage of users.
///
/// Implementations are shared across every request handler and must be
/// safe for concurrent use. Writes to the same id race with
/// last-write-wins semantics; there is no version check.
#[async_trait::async_trait]
pub trait UserRepo: Send + Sync {
    /// Inserts and returns the store-assigned id.
    async fn create(&self, user: &NewUserRecord) -> Result<UserId, UserError>;

    /// `InvalidId` for an id the store cannot parse, `NotFound` for a
    /// well-formed id with no record.
    async fn get_by_id(&self, id: &UserId) -> Result<User, UserError>;

    /// Applies `skip`/`limit` after filtering. No sort key is imposed.
    async fn list(&self, filter: &UserFilter, skip: u64, limit: i64)
        -> Result<Vec<User>, UserError>;

    /// Overwrites every profile field plus `updated_at`. A well-formed id
    /// that matches nothing is not reported.
    async fn update(&self, id: &UserId, patch: &UserPatch) -> Result<(), UserError>;

    /// A well-formed id that matches nothing is not reported.
    async fn delete(&self, id: &UserId) -> Result<(), UserError>;
}
