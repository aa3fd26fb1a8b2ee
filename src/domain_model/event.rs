use super::UserId;

pub const USER_CREATED: &str = "user.created";
pub const USER_UPDATED: &str = "user.updated";
pub const USER_DELETED: &str = "user.deleted";

/// Notification emitted after a successful mutation. The body on the wire
/// is the bare user id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserEvent {
    Created(UserId),
    Updated(UserId),
    Deleted(UserId),
}

impl UserEvent {
    pub fn topic(&self) -> &'static str {
        match self {
            UserEvent::Created(_) => USER_CREATED,
            UserEvent::Updated(_) => USER_UPDATED,
            UserEvent::Deleted(_) => USER_DELETED,
        }
    }

    pub fn user_id(&self) -> &UserId {
        match self {
            UserEvent::Created(id) | UserEvent::Updated(id) | UserEvent::Deleted(id) => id,
        }
    }
}
