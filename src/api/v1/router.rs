use super::error::recover_error;
use super::handler;
use crate::application_port::UserService;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use warp::Filter;

const MAX_BODY_BYTES: u64 = 64 * 1024;

/// `/api/v1` with error recovery and request logging.
pub fn api_filter(
    user_service: Arc<dyn UserService>,
    list_timeout: Duration,
) -> impl Filter<Extract = (impl warp::Reply,), Error = Infallible> + Clone {
    warp::path("api")
        .and(warp::path("v1"))
        .and(routes(user_service, list_timeout))
        .recover(recover_error)
        .with(warp::log("user_directory::http"))
}

pub fn routes(
    user_service: Arc<dyn UserService>,
    list_timeout: Duration,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let create = warp::post()
        .and(warp::path("users"))
        .and(warp::path::end())
        .and(json_body())
        .and(with(user_service.clone()))
        .and_then(handler::create_user);

    let list = warp::get()
        .and(warp::path("users"))
        .and(warp::path::end())
        .and(warp::query::<handler::ListUsersQuery>())
        .and(with_value(list_timeout))
        .and(with(user_service.clone()))
        .and_then(handler::list_users);

    let get = warp::get()
        .and(warp::path!("users" / String))
        .and(with(user_service.clone()))
        .and_then(handler::get_user);

    let update = warp::put()
        .and(warp::path!("users" / String))
        .and(json_body())
        .and(with(user_service.clone()))
        .and_then(handler::update_user);

    let delete = warp::delete()
        .and(warp::path!("users" / String))
        .and(with(user_service))
        .and_then(handler::delete_user);

    create.or(list).or(get).or(update).or(delete)
}

fn json_body<T>() -> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone
where
    T: serde::de::DeserializeOwned + Send,
{
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn with_value<T>(value: T) -> impl Filter<Extract = (T,), Error = Infallible> + Clone
where
    T: Clone + Send + Sync,
{
    warp::any().map(move || value.clone())
}
