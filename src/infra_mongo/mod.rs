mod client;
mod document;
mod user_repo_mongo;
mod util;

pub use client::*;
pub use document::*;
pub use user_repo_mongo::*;
pub use util::*;
