use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tonic::async_trait;
use tracing::info;

use super::Cache;
use super::ResourceGenerator;
use super::Response;
use super::UpdateScheduler;
use super::WatchCancel;
use super::WatchRegistry;
use super::WatchStream;
use crate::proto::DiscoveryRequest;
use crate::CacheConfig;
use crate::DeliveryPolicy;
use crate::Result;
use crate::Settings;
use crate::FETCH_REQUESTS;

/// Cache that regenerates every snapshot on a fixed cadence
///
/// There is no change detection: each watch ticks independently every
/// refresh interval and the generator decides what to serve.
#[derive(Debug, Clone)]
pub struct NaiveCache {
    generator: Arc<ResourceGenerator>,
    registry: Arc<WatchRegistry>,
    refresh_interval: Duration,
    policy: DeliveryPolicy,
}

impl NaiveCache {
    /// Watches of this cache end when `shutdown` is cancelled.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` if the cache settings fail validation
    pub fn new(
        settings: &Settings,
        shutdown: CancellationToken,
    ) -> Result<Self> {
        Self::with_generator(
            &settings.cache,
            Arc::new(ResourceGenerator::new(settings.resources.clone())),
            shutdown,
        )
    }

    /// # Errors
    /// Returns `Error::InvalidConfig` if the refresh interval is zero
    pub fn with_generator(
        config: &CacheConfig,
        generator: Arc<ResourceGenerator>,
        shutdown: CancellationToken,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            generator,
            registry: Arc::new(WatchRegistry::new(shutdown)),
            refresh_interval: config.refresh_interval(),
            policy: config.delivery_policy,
        })
    }

    pub fn generator(&self) -> &Arc<ResourceGenerator> {
        &self.generator
    }

    pub fn registry(&self) -> &Arc<WatchRegistry> {
        &self.registry
    }

    /// Cancel every open watch and wait for their tasks.
    pub async fn shutdown(&self) {
        self.registry.shutdown().await;
    }
}

#[async_trait]
impl Cache for NaiveCache {
    fn create_watch(
        &self,
        request: DiscoveryRequest,
    ) -> (WatchStream, WatchCancel) {
        info!(
            node_id = %request.node_id(),
            type_url = %request.type_url,
            resource_names = ?request.resource_names,
            "Watch request"
        );

        let (id, token) = self.registry.allocate();
        let (sender, receiver) = mpsc::channel(1);

        let scheduler = UpdateScheduler {
            watch_id: id,
            request: request.clone(),
            generator: self.generator.clone(),
            registry: self.registry.clone(),
            interval: self.refresh_interval,
            policy: self.policy,
            sender,
            token: token.clone(),
            last_delivered: None,
        };
        let task = tokio::spawn(scheduler.run());
        self.registry.insert(id, request, token.clone(), task);

        (
            WatchStream::new(id, receiver, token.clone()),
            WatchCancel::new(id, token, self.registry.clone()),
        )
    }

    async fn fetch(
        &self,
        request: DiscoveryRequest,
    ) -> Result<Option<Response>> {
        info!(
            node_id = %request.node_id(),
            type_url = %request.type_url,
            resource_names = ?request.resource_names,
            "Fetch request"
        );
        FETCH_REQUESTS.with_label_values(&[request.type_url.as_str()]).inc();

        self.generator.generate(&request)
    }
}
