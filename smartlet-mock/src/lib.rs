use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio_util::sync::CancellationToken;

use crate::discovery::DiscoveryPolicy;
use crate::error::{Error, Result};
use crate::node::Fleet;
use crate::observer::TracingObserver;
use crate::scheduler::CycleScheduler;
use crate::settings::Settings;
use crate::transport::{Endpoint, SessionTransport};

pub mod cli;
pub mod discovery;
pub mod error;
pub mod node;
pub mod observer;
pub mod scheduler;
pub mod settings;
pub mod transport;

/// Runs one simulated session: locate the collector, connect, then report
/// readings for every node until `shutdown` fires or the session breaks.
pub async fn run(settings: &Settings, shutdown: CancellationToken) -> Result<()> {
    let fleet = Fleet::new(settings.num_clients(), settings.simulation.node_id_offset)?;

    let endpoint = match settings.collector_address()? {
        Some(ip) => Endpoint::new(ip, settings.collector.port),
        None => {
            let policy = DiscoveryPolicy::from(&settings.discovery);
            let mut listener = discovery::bind_listener(&policy).await?;

            discovery::discover_collector(
                &mut listener,
                &policy,
                settings.collector.port,
                &shutdown,
            )
            .await?
        }
    };

    let transport = tokio::select! {
        biased;
        _ = shutdown.cancelled() => return Err(Error::Cancelled),
        transport = SessionTransport::connect(endpoint) => transport?,
    };

    let mut scheduler = CycleScheduler::new(
        transport,
        fleet,
        settings.update_interval(),
        StdRng::from_os_rng(),
        TracingObserver,
    );

    scheduler.run(&shutdown).await
}
