//! The per-interval loop driving every simulated node.
//!
//! A cycle sends one reading per node, then spends whatever is left of the
//! update interval waiting for the collector. The interval is a budget: the
//! time taken by sends and by each receive is subtracted before the next
//! wait is armed, so the cadence does not drift with I/O latency.

use std::fmt::Debug;
use std::time::Duration;

use embedded_io_async::{ErrorType, Read, Write};
use rand::Rng;
use smartlet_api::Message;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::node::Fleet;
use crate::observer::MessageObserver;
use crate::transport::SessionTransport;

/// Start of the current cycle and the interval it has to fit in
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    started: Instant,
    interval: Duration,
}

impl SessionClock {
    pub fn start(interval: Duration) -> Self {
        Self {
            started: Instant::now(),
            interval,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Time left in the cycle, `None` once the budget is spent
    pub fn remaining(&self) -> Option<Duration> {
        self.interval
            .checked_sub(self.elapsed())
            .filter(|remaining| !remaining.is_zero())
    }
}

/// What happened during one cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub sent: usize,
    pub received: usize,
    pub malformed: usize,
    /// Deadline armed for each blocking receive, in order
    pub budgets: Vec<Duration>,
}

impl CycleReport {
    pub fn receive_calls(&self) -> usize {
        self.budgets.len()
    }

    /// Budget the waiting phase started with, if it was entered at all
    pub fn initial_budget(&self) -> Option<Duration> {
        self.budgets.first().copied()
    }
}

pub struct CycleScheduler<IO, R, O> {
    transport: SessionTransport<IO>,
    fleet: Fleet,
    interval: Duration,
    rng: R,
    observer: O,
    cycles: u64,
}

impl<IO, R, O> CycleScheduler<IO, R, O>
where
    IO: Read + Write + ErrorType,
    IO::Error: Debug,
    R: Rng,
    O: MessageObserver,
{
    pub fn new(
        transport: SessionTransport<IO>,
        fleet: Fleet,
        interval: Duration,
        rng: R,
        observer: O,
    ) -> Self {
        Self {
            transport,
            fleet,
            interval,
            rng,
            observer,
            cycles: 0,
        }
    }

    pub fn transport(&self) -> &SessionTransport<IO> {
        &self.transport
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Number of cycles started so far
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Runs cycles back to back until `shutdown` fires or the session breaks.
    pub async fn run(&mut self, shutdown: &CancellationToken) -> Result<()> {
        tracing::info!(
            "Simulating {} nodes against {} every {:?}",
            self.fleet.len(),
            self.transport.peer(),
            self.interval
        );

        while !shutdown.is_cancelled() {
            let report = self.run_cycle(shutdown).await?;

            tracing::debug!(
                "Cycle {} finished: {} sent, {} received, {} malformed, {} waits",
                self.cycles,
                report.sent,
                report.received,
                report.malformed,
                report.receive_calls()
            );
        }

        Ok(())
    }

    /// Runs one sending phase followed by one waiting phase.
    ///
    /// A failed send aborts the cycle before any later node is serviced and
    /// before the waiting phase. Cancellation only cuts the waiting phase
    /// short.
    pub async fn run_cycle(&mut self, shutdown: &CancellationToken) -> Result<CycleReport> {
        let clock = SessionClock::start(self.interval);
        let mut report = CycleReport::default();
        self.cycles += 1;

        for node in self.fleet.nodes() {
            let frame = node.reading(&mut self.rng).encode();
            self.transport.send(node.id(), &frame).await?;
            report.sent += 1;
        }

        while let Some(budget) = clock.remaining() {
            report.budgets.push(budget);

            let received = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                received = self.transport.receive_frame(budget) => received,
            };

            match received {
                Ok(frame) => match Message::decode(&frame) {
                    Ok(message) => {
                        report.received += 1;
                        self.observer.on_message(&message, &frame);
                    }
                    Err(e) => {
                        report.malformed += 1;
                        self.observer.on_malformed(&frame, e);
                    }
                },
                // The wait covered the rest of the interval
                Err(Error::Timeout) => break,
                Err(e) => return Err(e),
            }
        }

        if report.budgets.is_empty() {
            tracing::warn!(
                "Sending took {:?}, longer than the {:?} update interval; skipping wait",
                clock.elapsed(),
                self.interval
            );
        }

        Ok(report)
    }
}
