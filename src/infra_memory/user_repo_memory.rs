use crate::application_port::UserError;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::infra_mongo::{parse_object_id, to_user_id};
use bson::oid::ObjectId;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Process-local user store. Ids are object ids like the document store
/// hands out, and listing follows id order.
#[derive(Debug, Default)]
pub struct MemoryUserRepo {
    users: RwLock<BTreeMap<ObjectId, User>>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<ObjectId, User>>, UserError> {
        self.users
            .read()
            .map_err(|_| UserError::Store("user map lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<ObjectId, User>>, UserError> {
        self.users
            .write()
            .map_err(|_| UserError::Store("user map lock poisoned".into()))
    }
}

#[async_trait::async_trait]
impl UserRepo for MemoryUserRepo {
    async fn create(&self, user: &NewUserRecord) -> Result<UserId, UserError> {
        let oid = ObjectId::new();
        let id = to_user_id(oid);
        self.write()?.insert(
            oid,
            User {
                id: id.clone(),
                profile: user.profile.clone(),
                created_at: user.created_at,
                updated_at: user.updated_at,
            },
        );
        Ok(id)
    }

    async fn get_by_id(&self, id: &UserId) -> Result<User, UserError> {
        let oid = parse_object_id(id)?;
        self.read()?.get(&oid).cloned().ok_or(UserError::NotFound)
    }

    async fn list(
        &self,
        filter: &UserFilter,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<User>, UserError> {
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(0);

        Ok(self
            .read()?
            .values()
            .filter(|u| filter.matches(&u.profile))
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn update(&self, id: &UserId, patch: &UserPatch) -> Result<(), UserError> {
        let oid = parse_object_id(id)?;
        if let Some(user) = self.write()?.get_mut(&oid) {
            user.profile = patch.profile.clone();
            user.updated_at = patch.updated_at;
        }
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        let oid = parse_object_id(id)?;
        self.write()?.remove(&oid);
        Ok(())
    }
}
