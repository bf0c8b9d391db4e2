pub mod api;
pub mod cli;
pub mod clock;
pub mod config;
pub mod crm;
pub mod db;
pub mod feed;
pub mod jobs;
pub mod models;
pub mod store;

pub use crm::Crm;
pub use db::Database;
