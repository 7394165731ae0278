use crate::config::Config;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "ableton-rpc",
    version,
    about = "Show the open Ableton Live project as Discord rich presence"
)]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Discord application client id
    #[arg(long, value_name = "ID")]
    pub client_id: Option<String>,

    /// Status file written by the Live script
    #[arg(long, value_name = "FILE")]
    pub status_file: Option<PathBuf>,

    /// Don't listen for `toggle` on stdin
    #[arg(long)]
    pub no_stdin: bool,

    /// Write the effective configuration to the config file and exit
    #[arg(long)]
    pub save_config: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Command-line values win over the config file.
    pub fn apply(&self, config: &mut Config) {
        if let Some(client_id) = &self.client_id {
            config.client_id = client_id.clone();
        }
        if let Some(status_file) = &self.status_file {
            config.status_file = Some(status_file.clone());
        }
    }

    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
