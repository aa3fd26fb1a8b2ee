//! Both transports against one shared service instance.

use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tonic::Request;
use user_directory::api;
use user_directory::application_impl::RealUserService;
use user_directory::application_port::UserService;
use user_directory::domain_model::{USER_CREATED, USER_DELETED, USER_UPDATED, User};
use user_directory::grpc::proto::user_service_server::UserService as UserServiceRpc;
use user_directory::grpc::{self, UserGrpcService, proto};
use user_directory::infra_memory::MemoryUserRepo;
use user_directory::server::FakeEventPublisher;
use warp::http::StatusCode;

struct Harness {
    service: Arc<dyn UserService>,
    publisher: Arc<FakeEventPublisher>,
}

fn harness() -> Harness {
    let publisher = Arc::new(FakeEventPublisher::new());
    let service: Arc<dyn UserService> = Arc::new(RealUserService::new(
        Arc::new(MemoryUserRepo::new()),
        publisher.clone(),
    ));
    Harness { service, publisher }
}

#[tokio::test]
async fn user_lifecycle_across_both_transports() {
    let h = harness();
    let rest = api::v1::api_filter(h.service.clone(), Duration::from_secs(10));
    let rpc = UserGrpcService::new(h.service.clone());

    // Create over gRPC.
    let id = rpc
        .create_user(Request::new(proto::User {
            first_name: "John".into(),
            last_name: "Doe".into(),
            nickname: "jdoe".into(),
            email: "john@example.com".into(),
            country: "USA".into(),
            ..Default::default()
        }))
        .await
        .unwrap()
        .into_inner()
        .id;
    assert!(!id.is_empty());

    // Read over REST.
    let resp = warp::test::request()
        .path(&format!("/api/v1/users/{id}"))
        .reply(&rest)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: User = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(fetched.profile.nickname, "jdoe");
    assert_eq!(fetched.profile.email, "john@example.com");
    assert_eq!(fetched.created_at, fetched.updated_at);

    // Partial body over REST clears the rest.
    let resp = warp::test::request()
        .method("PUT")
        .path(&format!("/api/v1/users/{id}"))
        .json(&json!({"first_name": "John Updated", "last_name": "Doe Updated"}))
        .reply(&rest)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let user = rpc
        .get_user(Request::new(proto::UserId { id: id.clone() }))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(user.first_name, "John Updated");
    assert_eq!(user.nickname, "");
    assert_eq!(user.email, "");
    assert_eq!(user.country, "");
    assert_eq!(user.created_at, fetched.created_at.to_rfc3339());

    // Delete over gRPC, gone for REST.
    rpc.delete_user(Request::new(proto::UserId { id: id.clone() }))
        .await
        .unwrap();
    let resp = warp::test::request()
        .path(&format!("/api/v1/users/{id}"))
        .reply(&rest)
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let events: Vec<_> = h
        .publisher
        .published()
        .into_iter()
        .map(|e| (e.topic, e.message))
        .collect();
    assert_eq!(
        events,
        vec![
            (USER_CREATED.to_owned(), id.clone()),
            (USER_UPDATED.to_owned(), id.clone()),
            (USER_DELETED.to_owned(), id),
        ]
    );
}

#[tokio::test]
async fn country_filter_never_leaks_other_countries() {
    let h = harness();
    let rest = api::v1::api_filter(h.service.clone(), Duration::from_secs(10));

    for (name, country) in [("John", "USA"), ("Jean", "Canada")] {
        let resp = warp::test::request()
            .method("POST")
            .path("/api/v1/users")
            .json(&json!({"first_name": name, "country": country}))
            .reply(&rest)
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = warp::test::request()
        .path("/api/v1/users?country=USA")
        .reply(&rest)
        .await;
    let body: Value = serde_json::from_slice(resp.body()).unwrap();
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["first_name"], "John");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_on_both_transports() {
    let h = harness();
    let rest = api::v1::api_filter(h.service.clone(), Duration::from_secs(10));
    let rpc = Arc::new(UserGrpcService::new(h.service.clone()));

    let mut tasks = Vec::new();
    for i in 0..20 {
        let rest = rest.clone();
        tasks.push(tokio::spawn(async move {
            let resp = warp::test::request()
                .method("POST")
                .path("/api/v1/users")
                .json(&json!({"nickname": format!("rest{i}")}))
                .reply(&rest)
                .await;
            assert_eq!(resp.status(), StatusCode::CREATED);
        }));
        let rpc = rpc.clone();
        tasks.push(tokio::spawn(async move {
            rpc.create_user(Request::new(proto::User {
                nickname: format!("rpc{i}"),
                ..Default::default()
            }))
            .await
            .unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let users = rpc
        .list_users(Request::new(proto::ListUsersRequest {
            filter: None,
            page: 1,
            page_size: 100,
        }))
        .await
        .unwrap()
        .into_inner()
        .users;
    assert_eq!(users.len(), 40);
    assert_eq!(h.publisher.published().len(), 40);
}

async fn http_get(addr: std::net::SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

#[tokio::test]
async fn both_listeners_drain_on_cancellation() {
    let h = harness();
    let cancel = CancellationToken::new();

    let rest = api::v1::api_filter(h.service.clone(), Duration::from_secs(10));
    let (http_addr, http_server) = warp::serve(rest)
        .try_bind_with_graceful_shutdown(([127, 0, 0, 1], 0), cancel.clone().cancelled_owned())
        .unwrap();
    let http = tokio::spawn(http_server);

    let grpc_addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let grpc = tokio::spawn(grpc::serve(
        h.service.clone(),
        grpc_addr,
        true,
        cancel.clone().cancelled_owned(),
    ));

    let response = http_get(http_addr, "/api/v1/users").await;
    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.ends_with("[]"), "{response}");

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), http)
        .await
        .expect("http listener did not stop")
        .unwrap();
    tokio::time::timeout(Duration::from_secs(5), grpc)
        .await
        .expect("grpc listener did not stop")
        .unwrap()
        .unwrap();
}
