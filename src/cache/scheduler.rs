use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::interval_at;
use tokio::time::Instant;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use super::Resource;
use super::ResourceGenerator;
use super::Response;
use super::WatchRegistry;
use crate::proto::DiscoveryRequest;
use crate::DeliveryPolicy;
use crate::DELIVERED_RESPONSES;

/// Periodic producer of one watch
///
/// Ticks every `interval`, asks the generator for a snapshot and hands it to
/// the watch consumer. Both suspension points race the cancellation token, so
/// a consumer that stopped reading never pins the task.
pub(crate) struct UpdateScheduler {
    pub(crate) watch_id: u64,
    pub(crate) request: DiscoveryRequest,
    pub(crate) generator: Arc<ResourceGenerator>,
    pub(crate) registry: Arc<WatchRegistry>,
    pub(crate) interval: Duration,
    pub(crate) policy: DeliveryPolicy,
    pub(crate) sender: mpsc::Sender<Response>,
    pub(crate) token: CancellationToken,
    pub(crate) last_delivered: Option<Vec<Resource>>,
}

impl UpdateScheduler {
    pub(crate) async fn run(mut self) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.token.cancelled() => break,
                _ = self.sender.closed() => {
                    debug!(watch_id = self.watch_id, "Watch consumer dropped");
                    break;
                }
                _ = ticker.tick() => {}
            }

            let Some(response) = self.next_update() else {
                continue;
            };
            let resources = response.resources.clone();

            tokio::select! {
                biased;
                _ = self.token.cancelled() => break,
                sent = self.sender.send(response) => {
                    if sent.is_err() {
                        debug!(watch_id = self.watch_id, "Watch consumer dropped during delivery");
                        break;
                    }
                    DELIVERED_RESPONSES
                        .with_label_values(&[self.request.type_url.as_str()])
                        .inc();
                    trace!(watch_id = self.watch_id, "Snapshot delivered");
                    self.last_delivered = Some(resources);
                }
            }
        }

        self.registry.unregister(self.watch_id);
        trace!(watch_id = self.watch_id, "Watch task stopped");
    }

    /// Generate the snapshot for this tick, if one should be delivered.
    pub(crate) fn next_update(&self) -> Option<Response> {
        match self.generator.generate(&self.request) {
            Ok(Some(response)) => {
                if self.policy == DeliveryPolicy::OnChange
                    && self.last_delivered.as_ref() == Some(&response.resources)
                {
                    trace!(watch_id = self.watch_id, "Snapshot unchanged, skipping delivery");
                    return None;
                }
                Some(response)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(
                    watch_id = self.watch_id,
                    type_url = %self.request.type_url,
                    error = %e,
                    "Snapshot generation failed, skipping tick"
                );
                None
            }
        }
    }
}
