//! Command-line arguments with clap.

use crate::config::ServerConfig;
use clap::Parser;
use guestbook_core::StorageConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "guestbook-server")]
#[command(about = "Guestbook HTTP server with an archival entry store")]
#[command(version)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "GUESTBOOK_CONFIG", default_value = "guestbook.toml")]
    pub config: PathBuf,

    /// Listen address
    #[arg(short, long, env = "GUESTBOOK_LISTEN")]
    pub listen: Option<String>,

    /// Directory holding the active log and archive chunks
    #[arg(long, env = "GUESTBOOK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory of static files to serve alongside the API
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Maximum entries kept in the active log
    #[arg(long)]
    pub max_active_entries: Option<usize>,

    /// Log level, used when RUST_LOG is unset
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    /// Flags given on the command line or through the environment, as a
    /// config layer to merge over the file.
    pub fn overrides(&self) -> ServerConfig {
        ServerConfig {
            listen: self.listen.clone(),
            data_dir: self.data_dir.clone(),
            static_dir: self.static_dir.clone(),
            log_level: self.log_level.clone(),
            storage: StorageConfig {
                max_active_entries: self.max_active_entries,
                anonymous_name: None,
            },
        }
    }
}
