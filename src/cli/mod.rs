pub mod commands;
pub mod logging;
pub mod output;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::app_config::ConfigLayer;
use crate::core::models::desired_state::{DesiredState, KeyType};

/// Converge a GnuPG keyring to a declared key state.
#[derive(Parser, Debug)]
#[command(name = "gpg-reconcile", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// TOML file with key settings; command-line options override it
    #[arg(long, global = true, env = "GPG_RECONCILE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose output (log every attempt)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode: only show errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Bring the key to the desired state
    Apply {
        #[command(flatten)]
        run: RunArgs,
        /// Append a JSON record of the run to this file
        #[arg(long, env = "GPG_RECONCILE_TRACE_FILE")]
        trace_file: Option<PathBuf>,
    },

    /// Show whether the key is present and what apply would do
    Status {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Show past runs recorded in a trace file
    History {
        /// Trace file written by `apply --trace-file`
        #[arg(long, env = "GPG_RECONCILE_TRACE_FILE")]
        trace_file: PathBuf,
        /// Filter by key id or key file
        #[arg(long)]
        key: Option<String>,
        /// Filter runs since this date (ISO 8601)
        #[arg(long)]
        since: Option<String>,
        /// Show last N runs
        #[arg(long)]
        last: Option<usize>,
    },
}

/// Options describing one key and how to converge it.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Key id to manage (e.g. 0x3804BB82D39DC0E3)
    #[arg(long, env = "GPG_RECONCILE_KEY_ID")]
    pub key_id: Option<String>,

    /// File holding the key material to import
    #[arg(long)]
    pub key_file: Option<PathBuf>,

    /// Kind of key material: private or public
    #[arg(long)]
    pub key_type: Option<KeyType>,

    /// Desired state: present, latest (alias refreshed) or absent
    #[arg(long)]
    pub state: Option<DesiredState>,

    /// Keyserver hostname or hkp(s):// URL. Repeat to add fallbacks
    #[arg(long = "server")]
    pub servers: Vec<String>,

    /// Rounds through the keyserver list before giving up
    #[arg(long)]
    pub tries: Option<u32>,

    /// Seconds to wait after a failed attempt
    #[arg(long)]
    pub delay: Option<f64>,

    /// Keyserver timeout in seconds, passed to gpg
    #[arg(long)]
    pub gpg_timeout: Option<u64>,

    /// gpg binary name or path
    #[arg(long, env = "GPG_RECONCILE_GPG")]
    pub gpg: Option<String>,

    /// Check mode: pass --dry-run to every gpg command
    #[arg(long)]
    pub check: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    /// The command-line settings as a config layer. The trace file is
    /// left to the config file, `apply` sets it on top.
    pub fn to_layer(&self) -> ConfigLayer {
        ConfigLayer {
            key_id: self.key_id.clone(),
            key_file: self.key_file.clone(),
            key_type: self.key_type,
            state: self.state,
            servers: (!self.servers.is_empty()).then(|| self.servers.clone()),
            tries: self.tries,
            delay: self.delay,
            gpg_timeout: self.gpg_timeout,
            gpg: self.gpg.clone(),
            trace_file: None,
            check_mode: self.check.then_some(true),
        }
    }
}
