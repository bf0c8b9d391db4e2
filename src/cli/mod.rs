use clap::{Args, Parser, Subcommand};

use crate::config::Settings;

pub mod import;
pub mod report;
pub mod serve;
pub mod user;

pub use import::run_import;
pub use report::{run_digest, run_feed, run_summary};
pub use serve::run_serve;
pub use user::run_user_add;

#[derive(Parser)]
#[command(name = "vosscrm")]
#[command(about = "Personal CRM backend with a prioritized action feed")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the REST API and the background scheduler
    Serve(ServeArgs),
    /// Print the action feed as JSON
    Feed,
    /// Print the dashboard summary as JSON
    Summary,
    /// Build and send the morning digest
    Digest(DigestArgs),
    /// Import companies and leaders from a prospect CSV
    Import(ImportArgs),
    /// Manage notification recipients
    #[command(subcommand)]
    User(UserCommands),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(short, long, env = "VOSS_BIND", default_value = "127.0.0.1:8000")]
    pub bind: String,
}

#[derive(Args)]
pub struct DigestArgs {
    /// Send even if the digest already went out today
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ImportArgs {
    /// CSV file with one company per row
    pub file: String,
    #[arg(short, long)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Add a user
    Add(UserAddArgs),
}

#[derive(Args)]
pub struct UserAddArgs {
    pub username: String,
    /// Telegram chat that receives digests and reminders
    #[arg(short, long)]
    pub telegram_chat_id: Option<String>,
}
