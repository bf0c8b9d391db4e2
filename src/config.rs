//! Runtime settings.
//!
//! Every setting can come from a flag or an environment variable; `.env` in
//! the working directory is loaded before parsing.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::clock::SystemClock;
use crate::crm::Crm;
use crate::db::Database;
use crate::jobs::{LogNotifier, Notifier, TelegramNotifier};
use crate::store::DEFAULT_TTL_SECS;

#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// SQLite database file [default: <config dir>/vosscrm/crm.db]
    #[arg(long = "db", env = "VOSS_DB_PATH", global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Bearer token required on /api routes
    #[arg(long, env = "API_TOKEN", global = true, hide_env_values = true)]
    pub api_token: Option<String>,

    /// Telegram bot token used for notifications
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", global = true, hide_env_values = true)]
    pub telegram_bot_token: Option<String>,

    /// Send notifications through Telegram instead of the log
    #[arg(long, env = "TELEGRAM_ENABLED", global = true)]
    pub telegram_enabled: bool,

    /// Seconds a cached sheet read stays valid
    #[arg(long, env = "CACHE_TTL_SECS", global = true, default_value_t = DEFAULT_TTL_SECS)]
    pub cache_ttl_secs: i64,

    /// Allowed CORS origins, comma separated [default: any]
    #[arg(long, env = "CORS_ORIGINS", global = true, value_delimiter = ',')]
    pub cors_origins: Vec<String>,
}

impl Settings {
    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.db_path {
            Some(path) => Ok(path.clone()),
            None => Database::default_path(),
        }
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cache_ttl_secs.max(0))
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_origins
            .iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect()
    }

    /// Open the file-backed store on the system clock.
    pub fn open_crm(&self) -> Result<Crm> {
        let path = self.db_path()?;
        info!(path = %path.display(), "opening database");
        Crm::open(path, Arc::new(SystemClock), self.cache_ttl())
    }

    /// Telegram when enabled and configured, otherwise the log.
    pub fn notifier(&self) -> Result<Arc<dyn Notifier>> {
        if !self.telegram_enabled {
            return Ok(Arc::new(LogNotifier));
        }
        match self.telegram_bot_token.as_deref().filter(|t| !t.trim().is_empty()) {
            Some(token) => Ok(Arc::new(TelegramNotifier::new(token)?)),
            None => {
                warn!("TELEGRAM_ENABLED is set but TELEGRAM_BOT_TOKEN is empty; logging notifications instead");
                Ok(Arc::new(LogNotifier))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        settings: Settings,
    }

    fn parse(args: &[&str]) -> Settings {
        let mut argv = vec!["vosscrm"];
        argv.extend_from_slice(args);
        TestCli::try_parse_from(argv).unwrap().settings
    }

    #[test]
    fn test_flags() {
        let s = parse(&[
            "--db",
            "/tmp/crm.db",
            "--cache-ttl-secs",
            "5",
            "--cors-origins",
            "http://a.test, http://b.test,",
        ]);
        assert_eq!(s.db_path().unwrap(), PathBuf::from("/tmp/crm.db"));
        assert_eq!(s.cache_ttl(), chrono::Duration::seconds(5));
        assert_eq!(s.cors_origins(), vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_negative_ttl_clamped() {
        let s = parse(&["--cache-ttl-secs=-3"]);
        assert_eq!(s.cache_ttl(), chrono::Duration::zero());
    }

    #[test]
    fn test_enabled_without_token_falls_back() {
        let mut s = parse(&[]);
        s.telegram_enabled = true;
        s.telegram_bot_token = Some("  ".to_string());
        assert!(s.notifier().is_ok());
    }
}
