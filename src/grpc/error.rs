use crate::application_port::UserError;
use tonic::Status;

impl From<UserError> for Status {
    fn from(error: UserError) -> Self {
        match error {
            UserError::InvalidId(_) => Status::invalid_argument(error.to_string()),
            UserError::NotFound => Status::not_found(error.to_string()),
            UserError::Store(_) => Status::internal(error.to_string()),
            UserError::DeadlineExceeded => Status::deadline_exceeded(error.to_string()),
        }
    }
}
