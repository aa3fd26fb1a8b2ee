use super::proto;
use super::proto::user_service_server::{UserService as UserServiceRpc, UserServiceServer};
use crate::application_port::UserService;
use crate::domain_model::*;
use crate::logger::*;
use std::net::SocketAddr;
use std::sync::Arc;
use tonic::{Request, Response, Status};

impl From<proto::User> for UserProfile {
    fn from(user: proto::User) -> Self {
        UserProfile {
            first_name: user.first_name,
            last_name: user.last_name,
            nickname: user.nickname,
            password: user.password,
            email: user.email,
            country: user.country,
        }
    }
}

impl From<User> for proto::User {
    fn from(user: User) -> Self {
        proto::User {
            id: user.id.0,
            first_name: user.profile.first_name,
            last_name: user.profile.last_name,
            nickname: user.profile.nickname,
            password: user.profile.password,
            email: user.profile.email,
            country: user.profile.country,
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

impl From<proto::UserFilter> for UserFilter {
    fn from(filter: proto::UserFilter) -> Self {
        UserFilter::from_parts(
            Some(filter.first_name),
            Some(filter.last_name),
            Some(filter.nickname),
            Some(filter.country),
        )
    }
}

pub struct UserGrpcService {
    user_service: Arc<dyn UserService>,
}

impl UserGrpcService {
    pub fn new(user_service: Arc<dyn UserService>) -> Self {
        Self { user_service }
    }

    pub fn into_server(self) -> UserServiceServer<Self> {
        UserServiceServer::new(self)
    }
}

#[tonic::async_trait]
impl UserServiceRpc for UserGrpcService {
    async fn create_user(
        &self,
        request: Request<proto::User>,
    ) -> Result<Response<proto::UserId>, Status> {
        let profile = UserProfile::from(request.into_inner());
        let user = self.user_service.create_user(profile).await?;
        Ok(Response::new(proto::UserId { id: user.id.0 }))
    }

    async fn get_user(
        &self,
        request: Request<proto::UserId>,
    ) -> Result<Response<proto::User>, Status> {
        let id = UserId(request.into_inner().id);
        let user = self.user_service.get_user_by_id(&id).await?;
        Ok(Response::new(user.into()))
    }

    async fn update_user(
        &self,
        request: Request<proto::User>,
    ) -> Result<Response<proto::Empty>, Status> {
        let mut user = request.into_inner();
        let id = UserId(std::mem::take(&mut user.id));
        self.user_service.update_user(&id, user.into()).await?;
        Ok(Response::new(proto::Empty {}))
    }

    async fn delete_user(
        &self,
        request: Request<proto::UserId>,
    ) -> Result<Response<proto::Empty>, Status> {
        let id = UserId(request.into_inner().id);
        self.user_service.delete_user(&id).await?;
        Ok(Response::new(proto::Empty {}))
    }

    async fn list_users(
        &self,
        request: Request<proto::ListUsersRequest>,
    ) -> Result<Response<proto::ListUsersResponse>, Status> {
        let request = request.into_inner();
        let filter = request.filter.map(UserFilter::from).unwrap_or_default();
        let page = PageRequest::new(Some(request.page), Some(request.page_size));

        let users = self.user_service.list_users(filter, page).await?;
        Ok(Response::new(proto::ListUsersResponse {
            users: users.into_iter().map(proto::User::from).collect(),
        }))
    }
}

/// Serves until `shutdown` resolves, then stops accepting and lets
/// in-flight calls finish.
pub async fn serve(
    user_service: Arc<dyn UserService>,
    address: SocketAddr,
    reflection: bool,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    let reflection = if reflection {
        Some(
            tonic_reflection::server::Builder::configure()
                .register_encoded_file_descriptor_set(proto::FILE_DESCRIPTOR_SET)
                .build()?,
        )
    } else {
        None
    };

    info!(%address, "grpc server listening");
    tonic::transport::Server::builder()
        .add_service(UserGrpcService::new(user_service).into_server())
        .add_optional_service(reflection)
        .serve_with_shutdown(address, shutdown)
        .await?;
    info!("grpc server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::RealUserService;
    use crate::application_port::UserError;
    use crate::infra_memory::MemoryUserRepo;
    use crate::server::FakeEventPublisher;
    use tonic::Code;

    fn grpc() -> UserGrpcService {
        UserGrpcService::new(Arc::new(RealUserService::new(
            Arc::new(MemoryUserRepo::new()),
            Arc::new(FakeEventPublisher::new()),
        )))
    }

    fn john() -> proto::User {
        proto::User {
            first_name: "John".into(),
            last_name: "Doe".into(),
            nickname: "jdoe".into(),
            password: "secret".into(),
            email: "john@example.com".into(),
            country: "USA".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips_fields() {
        let svc = grpc();
        let id = svc
            .create_user(Request::new(john()))
            .await
            .unwrap()
            .into_inner()
            .id;
        assert!(!id.is_empty());

        let user = svc
            .get_user(Request::new(proto::UserId { id: id.clone() }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(user.id, id);
        assert_eq!(user.first_name, "John");
        assert_eq!(user.password, "secret");
        assert_eq!(user.created_at, user.updated_at);
        assert!(chrono::DateTime::parse_from_rfc3339(&user.created_at).is_ok());
    }

    #[tokio::test]
    async fn update_with_omitted_fields_clears_them() {
        let svc = grpc();
        let id = svc
            .create_user(Request::new(john()))
            .await
            .unwrap()
            .into_inner()
            .id;

        svc.update_user(Request::new(proto::User {
            id: id.clone(),
            first_name: "John Updated".into(),
            last_name: "Doe Updated".into(),
            ..Default::default()
        }))
        .await
        .unwrap();

        let user = svc
            .get_user(Request::new(proto::UserId { id }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(user.first_name, "John Updated");
        assert_eq!(user.last_name, "Doe Updated");
        assert_eq!(user.nickname, "");
        assert_eq!(user.email, "");
        assert_eq!(user.country, "");
    }

    #[tokio::test]
    async fn errors_map_to_status_codes() {
        let svc = grpc();

        let status = svc
            .get_user(Request::new(proto::UserId { id: "bad".into() }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);

        let status = svc
            .get_user(Request::new(proto::UserId {
                id: "64b7f0c2a1b2c3d4e5f60718".into(),
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::NotFound);

        let status = svc
            .delete_user(Request::new(proto::UserId { id: String::new() }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);

        let status = Status::from(UserError::Store("connection refused".into()));
        assert_eq!(status.code(), Code::Internal);

        let status = Status::from(UserError::DeadlineExceeded);
        assert_eq!(status.code(), Code::DeadlineExceeded);
    }

    #[tokio::test]
    async fn list_normalizes_paging_and_filters() {
        let svc = grpc();
        svc.create_user(Request::new(john())).await.unwrap();
        svc.create_user(Request::new(proto::User {
            first_name: "Jane".into(),
            country: "Canada".into(),
            ..Default::default()
        }))
        .await
        .unwrap();

        let all = svc
            .list_users(Request::new(proto::ListUsersRequest::default()))
            .await
            .unwrap()
            .into_inner()
            .users;
        assert_eq!(all.len(), 2);

        let usa = svc
            .list_users(Request::new(proto::ListUsersRequest {
                filter: Some(proto::UserFilter {
                    country: "USA".into(),
                    ..Default::default()
                }),
                page: 0,
                page_size: 0,
            }))
            .await
            .unwrap()
            .into_inner()
            .users;
        assert_eq!(usa.len(), 1);
        assert_eq!(usa[0].first_name, "John");
        assert!(!usa[0].created_at.is_empty());
    }
}
