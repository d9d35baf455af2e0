use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[clap(name = "xyrabot", version, about = "Indodax market anomaly alerts over Telegram")]
pub struct Cli {
    /// Configuration file; created by the interactive setup when missing
    #[clap(long, default_value = "config.json")]
    pub config: PathBuf,

    /// Emit logs as JSON lines
    #[clap(long)]
    pub json_logs: bool,

    /// Run the interactive setup even if the configuration file exists
    #[clap(long)]
    pub setup: bool,
}
