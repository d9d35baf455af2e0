//! Wiring of one engine generation: initial snapshot, the three loops and
//! the handle that reports the first of them to fail.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use common::PauseGate;
use futures::FutureExt;
use market::MarketFeed;
use notify::AlertDispatcher;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::detector::DetectionLoop;
use crate::error::EngineError;
use crate::maintenance::{MaintenanceTracker, MaintenanceView};
use crate::pulse::{PriceChangePulse, PumpDumpPulse, Thresholds};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub price_change: Thresholds,
    pub price_change_interval: Duration,
    pub pump_dump: Thresholds,
    pub pump_dump_interval: Duration,
    /// Span after which pump/dump baselines return to the initial snapshot.
    pub pump_dump_window: Duration,
    pub maintenance_interval: Duration,
}

pub struct Engine {
    feed: Arc<dyn MarketFeed>,
    dispatcher: AlertDispatcher,
    pause: PauseGate,
    config: EngineConfig,
}

type TaskExit = (&'static str, Result<(), String>);

impl Engine {
    pub fn new(
        feed: Arc<dyn MarketFeed>,
        dispatcher: AlertDispatcher,
        pause: PauseGate,
        config: EngineConfig,
    ) -> Self {
        Self {
            feed,
            dispatcher,
            pause,
            config,
        }
    }

    pub fn dispatcher(&self) -> &AlertDispatcher {
        &self.dispatcher
    }

    /// Fetch a fresh initial snapshot and spawn every loop on the current
    /// runtime. Nothing is carried over from a previous generation.
    pub async fn start(&self) -> Result<EngineHandle, EngineError> {
        let initial = self
            .feed
            .fetch_snapshot()
            .await
            .ok_or(EngineError::InitialSnapshotUnavailable)?;
        let initial = Arc::new(initial);
        info!(instruments = initial.len(), "initial snapshot taken");

        let cfg = self.config;
        let view = MaintenanceView::new();
        let mut tasks = JoinSet::new();

        let price_change = DetectionLoop::new(
            PriceChangePulse::new(cfg.price_change, cfg.price_change_interval),
            &initial,
            self.feed.clone(),
            self.dispatcher.clone(),
            view.clone(),
            self.pause.clone(),
        );
        spawn_guarded(&mut tasks, "price_change", price_change.run());

        let pump_dump = DetectionLoop::new(
            PumpDumpPulse::new(
                cfg.pump_dump,
                cfg.pump_dump_interval,
                cfg.pump_dump_window,
                initial.clone(),
            ),
            &initial,
            self.feed.clone(),
            self.dispatcher.clone(),
            view.clone(),
            self.pause.clone(),
        );
        spawn_guarded(&mut tasks, "pump_dump", pump_dump.run());

        let tracker = MaintenanceTracker::new(
            self.feed.clone(),
            view.clone(),
            self.dispatcher.clone(),
            self.pause.clone(),
            cfg.maintenance_interval,
        );
        spawn_guarded(&mut tasks, "maintenance", tracker.run());

        Ok(EngineHandle { tasks, view })
    }
}

fn spawn_guarded<F>(tasks: &mut JoinSet<TaskExit>, name: &'static str, task: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    tasks.spawn(async move {
        let result = AssertUnwindSafe(task).catch_unwind().await;
        (name, result.map_err(panic_reason))
    });
}

fn panic_reason(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Running engine generation. Dropping the handle aborts every loop.
pub struct EngineHandle {
    tasks: JoinSet<TaskExit>,
    view: MaintenanceView,
}

impl EngineHandle {
    pub fn maintenance(&self) -> &MaintenanceView {
        &self.view
    }

    /// Resolves with the first fault. The loops never end on their own, so
    /// any exit is one.
    pub async fn wait_for_fault(&mut self) -> EngineError {
        let fault = match self.tasks.join_next().await {
            Some(Ok((detector, Ok(())))) => EngineError::DetectorStopped { detector },
            Some(Ok((detector, Err(reason)))) => EngineError::DetectorPanicked { detector, reason },
            Some(Err(e)) => EngineError::Join(e.to_string()),
            None => EngineError::Join("no running tasks".to_string()),
        };
        error!(error = %fault, "engine fault");
        fault
    }

    pub fn shutdown(&mut self) {
        self.tasks.abort_all();
    }
}
