pub use clap::Parser;

use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "medseal")]
#[command(about = "Seal, sign and deliver medical records to published public keys")]
#[command(version)]
pub struct Args {
    /// Daemon API to talk to (defaults to localhost on the configured port)
    #[arg(long, global = true)]
    pub remote: Option<Url>,

    /// Path to the medseal config directory (defaults to ~/.medseal)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}
