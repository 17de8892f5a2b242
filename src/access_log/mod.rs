//! In-memory access log.
//!
//! Entries are appended by whoever observes proxied traffic and drained
//! periodically by an [`AccessLogDumper`] into a caller supplied printer.


use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::interval_at;
use tokio::time::Instant;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::trace;

use crate::AccessLogConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessLogEntry {
    pub node_id: String,
    pub upstream_cluster: String,
    pub path: String,
    pub response_code: u32,
}

impl fmt::Display for AccessLogEntry {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} -> {}",
            self.node_id, self.path, self.response_code, self.upstream_cluster
        )
    }
}

#[derive(Debug, Default)]
pub struct AccessLogBuffer {
    entries: Mutex<Vec<AccessLogEntry>>,
}

impl AccessLogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &self,
        entry: AccessLogEntry,
    ) {
        self.entries.lock().push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drain every buffered entry into `printer`, oldest first.
    ///
    /// Returns the number of entries printed. The lock is released before
    /// printing so recording never waits on the printer.
    pub fn dump<F>(
        &self,
        mut printer: F,
    ) -> usize
    where
        F: FnMut(&AccessLogEntry),
    {
        let entries = std::mem::take(&mut *self.entries.lock());
        for entry in &entries {
            printer(entry);
        }
        entries.len()
    }
}

/// Periodically drains an [`AccessLogBuffer`]
#[derive(Debug)]
pub struct AccessLogDumper {
    buffer: Arc<AccessLogBuffer>,
    interval: Duration,
}

impl AccessLogDumper {
    pub fn new(
        buffer: Arc<AccessLogBuffer>,
        config: &AccessLogConfig,
    ) -> Self {
        Self {
            buffer,
            interval: config.dump_interval(),
        }
    }

    /// Dump every interval until `token` is cancelled.
    ///
    /// Returns the number of dumps performed. Entries still buffered at
    /// cancellation are left in the buffer.
    pub async fn run<F>(
        self,
        token: CancellationToken,
        mut printer: F,
    ) -> usize
    where
        F: FnMut(&AccessLogEntry) + Send,
    {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut dumps = 0;

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!(dumps, "Access log dumper stopped");
                    return dumps;
                }
                _ = ticker.tick() => {
                    let printed = self.buffer.dump(&mut printer);
                    dumps += 1;
                    trace!(printed, "Access log dumped");
                }
            }
        }
    }
}
