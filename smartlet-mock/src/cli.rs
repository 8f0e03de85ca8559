use clap::{ArgAction, Parser};

/// Command line overrides for the simulator
#[derive(Debug, Clone, Default, PartialEq, Eq, Parser)]
#[command(name = "smartlet_mock", version)]
#[command(about = "Simulate a fleet of Smartlet nodes reporting power readings to a collector")]
pub struct CliArgs {
    /// IP address of the collector (e.g. "192.168.0.1"). Without it the
    /// simulator waits for the collector's announcement
    #[arg(short, long, value_name = "IP")]
    pub server: Option<String>,

    /// Number of Smartlet clients to simulate
    #[arg(short, long, value_name = "N", allow_negative_numbers = true)]
    pub num_clients: Option<i64>,

    /// Time between power updates in milliseconds
    #[arg(short = 't', long = "update-time", value_name = "MS")]
    pub update_time_ms: Option<u64>,

    /// Read settings from this file instead of `configs/{RUN_MODE}`
    #[arg(short, long = "config", value_name = "PATH")]
    pub config_path: Option<String>,

    /// Run in verbose mode (repeat for more output)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl CliArgs {
    /// Log level implied by `-v`, if given
    pub fn log_level(&self) -> Option<&'static str> {
        match self.verbose {
            0 => None,
            1 => Some("debug"),
            _ => Some("trace"),
        }
    }
}
