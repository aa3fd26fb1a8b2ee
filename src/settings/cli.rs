use super::Parser;

#[derive(Parser, Debug)]
#[command(version, about = "User directory service (REST + gRPC)")]
pub struct Cli {
    /// Path to a TOML settings file.
    #[arg(long)]
    pub settings: Option<String>,
}
