//! HTTP boundary for dialogue runs

mod assets;
mod handlers;
mod types;

pub use handlers::create_router;

use crate::dialogue::DialogueOrchestrator;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<DialogueOrchestrator>,
    /// Held for the duration of a run so runs never overlap
    pub run_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(orchestrator: DialogueOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            run_lock: Arc::new(Mutex::new(())),
        }
    }
}
