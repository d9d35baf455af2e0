use std::time::Duration;

use notify::format::escape_html;
use tracing::{error, info, warn};

use crate::engine::Engine;
use crate::error::EngineError;

pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(30);

/// Keeps an [`Engine`] running: every fault is reported, followed by a
/// backoff and a rebuild from scratch.
pub struct Supervisor {
    engine: Engine,
    backoff: Duration,
    online_notice: Option<String>,
}

impl Supervisor {
    pub fn new(engine: Engine, backoff: Duration) -> Self {
        Self {
            engine,
            backoff,
            online_notice: None,
        }
    }

    /// Announce `notice` every time a generation has taken its initial
    /// snapshot and started its loops.
    pub fn with_online_notice(mut self, notice: impl Into<String>) -> Self {
        self.online_notice = Some(notice.into());
        self
    }

    /// Never returns; cancel the future to stop.
    pub async fn run(&self) {
        let mut generation: u64 = 0;
        loop {
            generation += 1;
            info!(generation, "starting engine");
            let fault = self.run_once().await;
            self.recover(&fault).await;
        }
    }

    /// Run one engine generation until its first fault.
    pub async fn run_once(&self) -> EngineError {
        match self.engine.start().await {
            Ok(mut handle) => {
                if let Some(notice) = &self.online_notice {
                    self.engine.dispatcher().dispatch(notice).await;
                }
                let fault = handle.wait_for_fault().await;
                handle.shutdown();
                fault
            }
            Err(e) => e,
        }
    }

    /// Count and announce `fault`, then wait out the backoff.
    pub async fn recover(&self, fault: &EngineError) {
        error!(error = %fault, "engine stopped");
        let dispatcher = self.engine.dispatcher();
        dispatcher.counters().record_error();

        let notice = format!("Xyrabot Is Paused (Reason: {})", escape_html(&fault.to_string()));
        if dispatcher.dispatch(&notice).await.failed {
            warn!("fault notice not delivered");
        }

        info!(backoff_secs = self.backoff.as_secs(), "restarting after backoff");
        tokio::time::sleep(self.backoff).await;
    }
}
