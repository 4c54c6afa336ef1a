use super::{InProcessTransport, Transport};
use crate::application::endpoint::ToolEndpoint;
use crate::config::{PeerConfig, PeerTransport};
use crate::domain::PeerId;
use crate::infrastructure::endpoints;
use crate::infrastructure::rpc::RpcDispatcher;
use std::collections::HashMap;
use std::sync::Arc;

/// Builds the transport for one configured peer.
pub trait TransportFactory: Send + Sync {
    fn create(&self, config: &PeerConfig) -> Arc<dyn Transport>;
}

/// Child processes for `process` peers, in-process dispatch for `embedded`
/// ones. Embedded endpoints read their credentials from the environment
/// unless one was supplied with [`with_endpoint`](Self::with_endpoint).
#[derive(Default, Clone)]
pub struct DefaultTransportFactory {
    endpoints: HashMap<PeerId, Arc<dyn ToolEndpoint>>,
}

impl DefaultTransportFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, endpoint: Arc<dyn ToolEndpoint>) -> Self {
        self.endpoints.insert(endpoint.peer(), endpoint);
        self
    }

    fn embedded(&self, peer: PeerId) -> Arc<dyn Transport> {
        let endpoint = self
            .endpoints
            .get(&peer)
            .cloned()
            .unwrap_or_else(|| endpoints::from_env(peer));
        Arc::new(InProcessTransport::new(RpcDispatcher::new(endpoint)))
    }
}

impl TransportFactory for DefaultTransportFactory {
    #[cfg(feature = "native-transport")]
    fn create(&self, config: &PeerConfig) -> Arc<dyn Transport> {
        match &config.transport {
            PeerTransport::Process(spec) => {
                Arc::new(super::ProcessTransport::spawn(config.peer, spec.clone()))
            }
            PeerTransport::Embedded => self.embedded(config.peer),
        }
    }

    #[cfg(not(feature = "native-transport"))]
    fn create(&self, config: &PeerConfig) -> Arc<dyn Transport> {
        if let PeerTransport::Process(spec) = &config.transport {
            tracing::warn!(
                peer = %config.peer,
                command = %spec.command.display(),
                "Process transport not compiled in, running endpoint embedded"
            );
        }
        self.embedded(config.peer)
    }
}
