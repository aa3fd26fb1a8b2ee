//! gRPC transport. Field mapping only; all behavior lives in
//! [`crate::application_port::UserService`].

mod error;
mod handler;

pub use handler::*;

pub mod proto {
    tonic::include_proto!("user_service");

    pub const FILE_DESCRIPTOR_SET: &[u8] =
        tonic::include_file_descriptor_set!("user_service_descriptor");
}
