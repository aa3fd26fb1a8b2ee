use crate::application_port::UserError;
use crate::domain_model::UserId;
use bson::oid::ObjectId;

pub fn parse_object_id(id: &UserId) -> Result<ObjectId, UserError> {
    ObjectId::parse_str(id.as_str()).map_err(|_| UserError::InvalidId(id.to_string()))
}

pub fn to_user_id(oid: ObjectId) -> UserId {
    UserId(oid.to_hex())
}
