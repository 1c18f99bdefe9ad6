//! Command-line arguments and the HTTP configuration derived from them.

use std::time::Duration;

use clap::Parser;
use users_core::http::DEFAULT_BASE_URL;
use users_core::HttpConfig;

/// Manage the users of a REST fixture from the terminal.
#[derive(Parser, Debug)]
#[command(name = "users-admin", version)]
pub struct Cli {
    /// Base URL of the users API.
    #[arg(long, env = "USERS_API_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[arg(long, env = "USERS_API_TIMEOUT", default_value_t = 10)]
    pub timeout_secs: u64,

    /// Increase log verbosity (-v warn, -vv info, -vvv debug, -vvvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig::new(&self.base_url).with_timeout(Duration::from_secs(self.timeout_secs))
    }
}
