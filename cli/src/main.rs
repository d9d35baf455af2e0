mod cli;
mod commands;
mod config;
mod setup;

use std::io;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use common::logger::init_logger;
use common::{Counters, PauseGate};
use market::indodax::{FeedLimits, IndodaxClient, IndodaxFeed};
use monitor::{Engine, Supervisor};
use notify::{AlertDispatcher, TelegramChannel};
use tracing::{info, warn};

use crate::cli::Cli;
use crate::commands::{CommandHandler, run_command_poller};
use crate::config::AppConfig;

fn load_or_setup(cli: &Cli) -> anyhow::Result<AppConfig> {
    let existing = if cli.setup {
        None
    } else {
        AppConfig::load(&cli.config)?
    };

    let mut cfg = match existing {
        Some(cfg) => cfg,
        None => {
            info!(path = %cli.config.display(), "running first-time setup");
            let cfg = setup::prompt_config(&mut io::stdin().lock(), &mut io::stdout())?;
            cfg.save(&cli.config)?;
            cfg
        }
    };

    cfg.apply_env_overrides();
    cfg.validate()?;
    Ok(cfg)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger("xyrabot", cli.json_logs);

    let cfg = load_or_setup(&cli).context("loading configuration")?;
    info!(
        threshold_percent = cfg.threshold_percent,
        threshold_price_idr = cfg.threshold_price_idr,
        threshold_volume_change = cfg.threshold_volume_change,
        interval = cfg.interval,
        volume_threshold = cfg.volume_threshold,
        "configuration loaded"
    );

    let counters = Counters::default();
    let pause = PauseGate::new();

    let telegram = TelegramChannel::new(
        cfg.telegram_api_url.clone(),
        cfg.bot_token.clone(),
        cfg.chat_id.clone(),
    )?;
    let dispatcher = AlertDispatcher::new(Arc::new(telegram.clone()), counters.clone());

    let client = IndodaxClient::new(cfg.api_base_url.clone())?;
    let feed = Arc::new(IndodaxFeed::new(client, FeedLimits::default()));

    let engine = Engine::new(feed, dispatcher.clone(), pause.clone(), cfg.engine_config());
    let supervisor =
        Supervisor::new(engine, cfg.restart_backoff()).with_online_notice("Xyrabot Is Online");

    let handler = CommandHandler::new(cfg.admin_chat_id(), pause, counters);
    let commands = tokio::spawn(run_command_poller(telegram, handler));

    tokio::select! {
        _ = supervisor.run() => {
            warn!("supervisor exited");
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("shutdown signal received");
        }
    }

    commands.abort();
    dispatcher.dispatch("Xyrabot is shutting down").await;

    Ok(())
}
