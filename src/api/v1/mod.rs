mod error;
mod handler;
mod router;

pub use error::recover_error;
pub use router::{api_filter, routes};
