use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::{self, AppState};
use crate::config::Settings;
use crate::jobs::{spawn_scheduler, Jobs};

/// Run the API server with the scheduler on a background thread. Returns
/// after Ctrl+C once the scheduler has stopped.
pub fn run_serve(settings: &Settings, bind: &str) -> Result<()> {
    let crm = settings.open_crm()?;
    let notifier = settings.notifier()?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let scheduler = spawn_scheduler(Jobs::new(crm.clone(), notifier), Arc::clone(&shutdown))?;

    if settings.api_token.as_deref().map_or(true, |t| t.trim().is_empty()) {
        warn!("API_TOKEN is not set; the API is open to anyone who can reach {}", bind);
    }

    let state = Arc::new(
        AppState::new(crm)
            .with_api_token(settings.api_token.clone())
            .with_cors_origins(settings.cors_origins()),
    );

    let runtime = tokio::runtime::Runtime::new()?;
    let served = runtime.block_on(api::serve(state, bind));

    shutdown.store(true, Ordering::SeqCst);
    if scheduler.join().is_err() {
        warn!("scheduler thread panicked");
    }
    info!("server stopped");
    served
}
