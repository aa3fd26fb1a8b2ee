use super::error::*;
use crate::application_port::{UserError, UserService};
use crate::domain_model::{PageRequest, UserFilter, UserId, UserProfile};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use warp::http::StatusCode;
use warp::reject;

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: &'static str,
}

pub async fn create_user(
    body: UserProfile,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user = user_service
        .create_user(body)
        .await
        .map_err(|e| ApiErrorCode::from_user_error(e, "Failed to create user"))
        .map_err(reject::custom)?;

    Ok(warp::reply::with_status(
        warp::reply::json(&user),
        StatusCode::CREATED,
    ))
}

pub async fn get_user(
    id: String,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user = user_service
        .get_user_by_id(&UserId(id))
        .await
        .map_err(|e| match e {
            // A malformed id cannot name a user.
            UserError::InvalidId(_) => ApiErrorCode::NotFound,
            e => ApiErrorCode::from_user_error(e, "Failed to fetch user"),
        })
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&user))
}

pub async fn update_user(
    id: String,
    body: UserProfile,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    user_service
        .update_user(&UserId(id), body)
        .await
        .map_err(|e| ApiErrorCode::from_user_error(e, "Failed to update user"))
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&MessageResponse {
        message: "User updated successfully",
    }))
}

pub async fn delete_user(
    id: String,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    user_service
        .delete_user(&UserId(id))
        .await
        .map_err(|e| ApiErrorCode::from_user_error(e, "Failed to delete user"))
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&MessageResponse {
        message: "User deleted successfully",
    }))
}

/// Paging values stay strings so that garbage falls back to the defaults
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nickname: Option<String>,
    pub country: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl ListUsersQuery {
    fn into_parts(self) -> (UserFilter, PageRequest) {
        let parse = |v: Option<String>| v.and_then(|v| v.trim().parse::<i64>().ok());
        let page = PageRequest::new(parse(self.page), parse(self.page_size));
        let filter =
            UserFilter::from_parts(self.first_name, self.last_name, self.nickname, self.country);
        (filter, page)
    }
}

pub async fn list_users(
    query: ListUsersQuery,
    list_timeout: Duration,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let (filter, page) = query.into_parts();

    let users = tokio::time::timeout(list_timeout, user_service.list_users(filter, page))
        .await
        .unwrap_or(Err(UserError::DeadlineExceeded))
        .map_err(|e| ApiErrorCode::from_user_error(e, "Failed to list users"))
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&users))
}
