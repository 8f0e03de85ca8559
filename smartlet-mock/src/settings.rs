use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::cli::CliArgs;
use crate::error::{Error, Result};

/// Upper bound on the number of simulated nodes
pub const MAX_CLIENTS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collector {
    pub address: Option<String>,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discovery {
    pub group: Ipv4Addr,
    pub port: u16,
    pub attempt_timeout_ms: u64,
    pub max_attempts: Option<u32>,
    pub buffer_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    pub num_clients: i64,
    pub update_time_ms: u64,
    pub node_id_offset: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub logger: Logger,
    pub collector: Collector,
    pub discovery: Discovery,
    pub simulation: Simulation,
}

impl Settings {
    /// Loads the layered settings. Call [`Settings::validate`] before use.
    pub fn new(args: &CliArgs) -> Result<Self> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        let mut builder = Config::builder().add_source(File::from_str(
            include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../configs/default.toml")),
            FileFormat::Toml,
        ));

        builder = match &args.config_path {
            Some(path) => builder.add_source(File::from(normalize_path(path)?)),
            None => builder.add_source(File::with_name(&format!("configs/{run_mode}")).required(false)),
        };

        builder = builder
            .add_source(
                Environment::with_prefix("SMARTLET")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("collector.address", args.server.clone())?
            .set_override_option("simulation.num_clients", args.num_clients)?
            .set_override_option("simulation.update_time_ms", args.update_time_ms)?
            .set_override_option("logger.level", args.log_level().map(String::from))?;

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Rejects settings the simulator cannot run with and clamps the fleet
    /// size to [`MAX_CLIENTS`].
    pub fn validate(&mut self) -> Result<()> {
        if self.simulation.num_clients < 1 {
            return Err(Error::Config(format!(
                "at least 1 node is required to run, got {}",
                self.simulation.num_clients
            )));
        }

        if self.simulation.num_clients > MAX_CLIENTS as i64 {
            tracing::warn!(
                "Number of desired clients is too large ({}), setting to maximum ({})",
                self.simulation.num_clients,
                MAX_CLIENTS
            );
            self.simulation.num_clients = MAX_CLIENTS as i64;
        }

        if self.simulation.update_time_ms == 0 {
            return Err(Error::Config("update time must be positive".into()));
        }

        if self.discovery.attempt_timeout_ms == 0 {
            return Err(Error::Config(
                "discovery attempt timeout must be positive".into(),
            ));
        }

        self.collector_address()?;

        Ok(())
    }

    /// Collector address supplied through configuration, if any
    pub fn collector_address(&self) -> Result<Option<IpAddr>> {
        match self.collector.address.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(address) => address.parse::<IpAddr>().map(Some).map_err(|_| {
                Error::Config(format!(
                    "'{address}' does not represent a valid network address"
                ))
            }),
        }
    }

    pub fn num_clients(&self) -> usize {
        self.simulation.num_clients.clamp(0, MAX_CLIENTS as i64) as usize
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.simulation.update_time_ms)
    }
}

fn normalize_path(path: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(path);

    Ok(if path_buf.is_absolute() {
        path_buf
    } else {
        env::current_dir()
            .map_err(|e| Error::Config(e.to_string()))?
            .join(&path_buf)
    })
}
