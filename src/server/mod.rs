mod event_publisher_fake;
mod event_publisher_impl;
mod port;
mod retry;
mod server;

pub use event_publisher_fake::*;
pub use event_publisher_impl::*;
pub use port::*;
pub use retry::*;
pub use server::*;
