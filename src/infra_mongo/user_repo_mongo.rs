use super::document::*;
use super::util::*;
use crate::application_port::UserError;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use futures_util::TryStreamExt;
use mongodb::options::FindOptions;
use mongodb::{Collection, Database};

fn store_error(op: &'static str) -> impl FnOnce(mongodb::error::Error) -> UserError {
    move |e| {
        warn!(op, "user store error: {e}");
        UserError::Store(e.to_string())
    }
}

pub struct MongoUserRepo {
    collection: Collection<UserDocument>,
}

impl MongoUserRepo {
    pub fn new(db: &Database, collection: &str) -> Self {
        MongoUserRepo {
            collection: db.collection(collection),
        }
    }
}

#[async_trait::async_trait]
impl UserRepo for MongoUserRepo {
    async fn create(&self, user: &NewUserRecord) -> Result<UserId, UserError> {
        let result = self
            .collection
            .insert_one(UserDocument::from(user), None)
            .await
            .map_err(store_error("insert user"))?;

        result
            .inserted_id
            .as_object_id()
            .map(to_user_id)
            .ok_or_else(|| UserError::Store(format!("unexpected id: {}", result.inserted_id)))
    }

    async fn get_by_id(&self, id: &UserId) -> Result<User, UserError> {
        let oid = parse_object_id(id)?;
        let doc = self
            .collection
            .find_one(id_query(oid), None)
            .await
            .map_err(store_error("fetch user"))?
            .ok_or(UserError::NotFound)?;
        User::try_from(doc)
    }

    async fn list(
        &self,
        filter: &UserFilter,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<User>, UserError> {
        let options = FindOptions::builder().skip(skip).limit(limit).build();
        let docs: Vec<UserDocument> = self
            .collection
            .find(filter_query(filter), options)
            .await
            .map_err(store_error("list users"))?
            .try_collect()
            .await
            .map_err(store_error("read user cursor"))?;

        docs.into_iter().map(User::try_from).collect()
    }

    async fn update(&self, id: &UserId, patch: &UserPatch) -> Result<(), UserError> {
        let oid = parse_object_id(id)?;
        let result = self
            .collection
            .update_one(id_query(oid), replace_update(patch), None)
            .await
            .map_err(store_error("update user"))?;
        if result.matched_count == 0 {
            debug!(%id, "update matched no user");
        }
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        let oid = parse_object_id(id)?;
        let result = self
            .collection
            .delete_one(id_query(oid), None)
            .await
            .map_err(store_error("delete user"))?;
        if result.deleted_count == 0 {
            debug!(%id, "delete matched no user");
        }
        Ok(())
    }
}
