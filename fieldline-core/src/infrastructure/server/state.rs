use crate::application::aggregator::ContextAggregator;
use crate::application::client::IntegrationClient;
use std::sync::Arc;

pub(crate) struct ServerState {
    client: Arc<IntegrationClient>,
    aggregator: ContextAggregator,
}

impl ServerState {
    pub(crate) fn new(client: Arc<IntegrationClient>) -> Self {
        Self {
            aggregator: ContextAggregator::new(Arc::clone(&client)),
            client,
        }
    }

    pub(crate) fn client(&self) -> Arc<IntegrationClient> {
        Arc::clone(&self.client)
    }

    pub(crate) fn aggregator(&self) -> &ContextAggregator {
        &self.aggregator
    }
}
