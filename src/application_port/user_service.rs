use crate::domain_model::{PageRequest, User, UserFilter, UserId, UserProfile};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserError {
    #[error("invalid user id: {0}")]
    InvalidId(String),
    #[error("user not found")]
    NotFound,
    #[error("store error: {0}")]
    Store(String),
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

/// User directory operations shared by every transport.
///
/// Implementations hold no per-request state and must be safe to call
/// from any number of tasks at once. Mutations that succeed emit one
/// domain event each (`user.created`, `user.updated`, `user.deleted`)
/// on a best-effort basis; a lost event never fails the mutation.
#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Stamps both timestamps with the current time, persists, and
    /// returns the stored user with its new id.
    async fn create_user(&self, profile: UserProfile) -> Result<User, UserError>;

    async fn get_user_by_id(&self, id: &UserId) -> Result<User, UserError>;

    /// Replaces every profile field of the stored user with `profile`,
    /// including empty ones, and refreshes `updated_at`. `created_at` is
    /// left as it was.
    async fn update_user(&self, id: &UserId, profile: UserProfile) -> Result<(), UserError>;

    async fn delete_user(&self, id: &UserId) -> Result<(), UserError>;

    /// Returns an empty vec, not an error, when nothing matches.
    async fn list_users(&self, filter: UserFilter, page: PageRequest)
        -> Result<Vec<User>, UserError>;
}
