//! Layered settings: a TOML file, then `USER_DIRECTORY__*` variables, then
//! the flat `MONGO_URI`, `DB` and `RABBITMQ_URI` variables.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
