use crate::application_port::UserError;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::{error, warn};
use warp::filters::body::BodyDeserializeError;
use warp::http::StatusCode;
use warp::reject::{MethodNotAllowed, PayloadTooLarge};
use warp::{Rejection, reject};

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

fn reply(status: StatusCode, message: impl Into<String>) -> warp::reply::WithStatus<warp::reply::Json> {
    let body = ErrorBody {
        error: message.into(),
    };
    warp::reply::with_status(warp::reply::json(&body), status)
}

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    if let Some(err) = err.find::<ApiErrorCode>() {
        Ok(reply(err.status(), err.to_string()))
    } else if let Some(err) = err.find::<BodyDeserializeError>() {
        Ok(reply(StatusCode::BAD_REQUEST, err.to_string()))
    } else if err.find::<PayloadTooLarge>().is_some() {
        Ok(reply(StatusCode::PAYLOAD_TOO_LARGE, "Payload too large"))
    } else if err.is_not_found() {
        Ok(reply(StatusCode::NOT_FOUND, "Not found"))
    } else if err.find::<MethodNotAllowed>().is_some() {
        Ok(reply(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"))
    } else {
        error!("unhandled rejection: {:?}", err);
        Ok(reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Unhandled error: {:?}", err),
        ))
    }
}

#[derive(Debug, Clone, Error)]
pub enum ApiErrorCode {
    #[error("{0}")]
    BadRequest(String),
    #[error("User not found")]
    NotFound,
    #[error("{0}")]
    Internal(String),
}

impl ApiErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Maps a service error, using `context` as the message for failures
    /// whose details stay in the log.
    pub fn from_user_error(error: UserError, context: &str) -> ApiErrorCode {
        match error {
            UserError::InvalidId(_) => ApiErrorCode::BadRequest(error.to_string()),
            UserError::NotFound => ApiErrorCode::NotFound,
            UserError::Store(_) | UserError::DeadlineExceeded => {
                warn!("{context}: {error}");
                ApiErrorCode::Internal(context.to_owned())
            }
        }
    }
}

impl reject::Reject for ApiErrorCode {}
