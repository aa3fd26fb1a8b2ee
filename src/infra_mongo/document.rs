use crate::application_port::UserError;
use crate::domain_model::*;
use crate::domain_port::*;
use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use bson::{Bson, Document};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const ID: &str = "_id";
pub const FIRST_NAME: &str = "firstname";
pub const LAST_NAME: &str = "lastname";
pub const NICKNAME: &str = "nickname";
pub const PASSWORD: &str = "password";
pub const EMAIL: &str = "email";
pub const COUNTRY: &str = "country";
pub const CREATED_AT: &str = "createdat";
pub const UPDATED_AT: &str = "updatedat";

/// Stored shape of a user. Field names are lowercase without separators
/// to stay readable against existing collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(rename = "firstname", default)]
    pub first_name: String,
    #[serde(rename = "lastname", default)]
    pub last_name: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub country: String,
    #[serde(rename = "createdat", default, with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedat", default, with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl From<&NewUserRecord> for UserDocument {
    fn from(record: &NewUserRecord) -> Self {
        let profile = record.profile.clone();
        UserDocument {
            id: None,
            first_name: profile.first_name,
            last_name: profile.last_name,
            nickname: profile.nickname,
            password: profile.password,
            email: profile.email,
            country: profile.country,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl TryFrom<UserDocument> for User {
    type Error = UserError;

    fn try_from(doc: UserDocument) -> Result<Self, Self::Error> {
        let oid = doc
            .id
            .ok_or_else(|| UserError::Store("stored user has no _id".into()))?;
        Ok(User {
            id: super::to_user_id(oid),
            profile: UserProfile {
                first_name: doc.first_name,
                last_name: doc.last_name,
                nickname: doc.nickname,
                password: doc.password,
                email: doc.email,
                country: doc.country,
            },
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        })
    }
}

pub fn id_query(oid: ObjectId) -> Document {
    let mut query = Document::new();
    query.insert(ID, oid);
    query
}

pub fn filter_query(filter: &UserFilter) -> Document {
    let mut query = Document::new();
    let fields = [
        (FIRST_NAME, &filter.first_name),
        (LAST_NAME, &filter.last_name),
        (NICKNAME, &filter.nickname),
        (COUNTRY, &filter.country),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            query.insert(key, value.as_str());
        }
    }
    query
}

/// `$set` of every profile field plus `updatedat`. Empty strings are
/// written too, so fields the caller left out are cleared. `_id` and
/// `createdat` are never touched.
pub fn replace_update(patch: &UserPatch) -> Document {
    let profile = &patch.profile;
    let mut set = Document::new();
    set.insert(FIRST_NAME, profile.first_name.as_str());
    set.insert(LAST_NAME, profile.last_name.as_str());
    set.insert(NICKNAME, profile.nickname.as_str());
    set.insert(PASSWORD, profile.password.as_str());
    set.insert(EMAIL, profile.email.as_str());
    set.insert(COUNTRY, profile.country.as_str());
    set.insert(UPDATED_AT, bson::DateTime::from_chrono(patch.updated_at));

    let mut update = Document::new();
    update.insert("$set", Bson::Document(set));
    update
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_query_only_has_present_fields() {
        let filter = UserFilter::from_parts(
            Some("John".into()),
            None,
            Some(String::new()),
            Some("USA".into()),
        );
        let query = filter_query(&filter);

        assert_eq!(query.len(), 2);
        assert_eq!(query.get_str(FIRST_NAME).unwrap(), "John");
        assert_eq!(query.get_str(COUNTRY).unwrap(), "USA");
        assert!(filter_query(&UserFilter::default()).is_empty());
    }

    #[test]
    fn replace_update_clears_omitted_fields_but_not_created_at() {
        let patch = UserPatch {
            profile: UserProfile {
                first_name: "John Updated".into(),
                ..Default::default()
            },
            updated_at: Utc::now(),
        };
        let update = replace_update(&patch);
        let set = update.get_document("$set").unwrap();

        assert_eq!(set.get_str(FIRST_NAME).unwrap(), "John Updated");
        assert_eq!(set.get_str(NICKNAME).unwrap(), "");
        assert_eq!(set.get_str(COUNTRY).unwrap(), "");
        assert!(set.get_datetime(UPDATED_AT).is_ok());
        assert!(!set.contains_key(CREATED_AT));
        assert!(!set.contains_key(ID));
    }

    #[test]
    fn document_round_trips_through_bson() {
        let now = Utc::now();
        let record = NewUserRecord {
            profile: UserProfile {
                first_name: "John".into(),
                email: "john@example.com".into(),
                ..Default::default()
            },
            created_at: now,
            updated_at: now,
        };
        let mut doc = UserDocument::from(&record);
        doc.id = Some(ObjectId::new());

        let raw = bson::to_document(&doc).unwrap();
        assert_eq!(raw.get_str(FIRST_NAME).unwrap(), "John");
        assert!(raw.get_datetime(CREATED_AT).is_ok());

        let back: UserDocument = bson::from_document(raw).unwrap();
        let user = User::try_from(back).unwrap();
        assert_eq!(user.profile, record.profile);
        assert_eq!(user.id.as_str().len(), 24);
        // BSON dates keep milliseconds only.
        assert_eq!(user.created_at.timestamp_millis(), now.timestamp_millis());
    }

    #[test]
    fn missing_id_is_a_store_error() {
        let doc = UserDocument {
            id: None,
            first_name: String::new(),
            last_name: String::new(),
            nickname: String::new(),
            password: String::new(),
            email: String::new(),
            country: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(matches!(User::try_from(doc), Err(UserError::Store(_))));
    }
}
