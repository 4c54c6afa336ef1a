use super::{CallOptions, Transport, TransportError, bounded, initialize_params, parse_catalog};
use crate::domain::{PeerId, ToolDescriptor};
use crate::infrastructure::rpc::{RpcDispatcher, RpcRequest};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex as AsyncMutex;
use tracing::debug;

/// Runs an endpoint inside this process through the same JSON-RPC dispatch
/// a child process would use.
pub struct InProcessTransport {
    dispatcher: RpcDispatcher,
    connected: AtomicBool,
    id_counter: AtomicU64,
    tool_cache: AsyncMutex<Vec<ToolDescriptor>>,
}

impl InProcessTransport {
    pub fn new(dispatcher: RpcDispatcher) -> Self {
        Self {
            dispatcher,
            connected: AtomicBool::new(false),
            id_counter: AtomicU64::new(1),
            tool_cache: AsyncMutex::new(Vec::new()),
        }
    }

    fn next_id(&self) -> String {
        let id = self.id_counter.fetch_add(1, Ordering::SeqCst);
        format!("req-{id}")
    }

    async fn exchange(&self, method: &str, params: Value) -> Result<Value, TransportError> {
        let peer = self.peer();
        let request = RpcRequest::new(self.next_id(), method, params);
        let response = self
            .dispatcher
            .handle(request)
            .await
            .ok_or_else(|| TransportError::Transport {
                peer,
                message: format!("no response to '{method}'"),
            })?;
        match response.error {
            Some(error) => Err(TransportError::Rpc {
                peer,
                code: error.code,
                message: error.message,
            }),
            None => Ok(response.result.unwrap_or(Value::Null)),
        }
    }
}

#[async_trait]
impl Transport for InProcessTransport {
    fn peer(&self) -> PeerId {
        self.dispatcher.endpoint().peer()
    }

    async fn connect(&self, options: &CallOptions) -> Result<(), TransportError> {
        if self.is_connected() {
            return Ok(());
        }
        let peer = self.peer();
        let catalog = bounded(peer, options, async {
            self.exchange("initialize", initialize_params()).await?;
            self.exchange("tools/list", json!({})).await
        })
        .await?;
        *self.tool_cache.lock().await = parse_catalog(&catalog);
        self.connected.store(true, Ordering::SeqCst);
        debug!(%peer, "Embedded endpoint connected");
        Ok(())
    }

    async fn request(
        &self,
        method: &str,
        params: Value,
        options: &CallOptions,
    ) -> Result<Value, TransportError> {
        let peer = self.peer();
        if !self.is_connected() {
            return Err(TransportError::NotConnected { peer });
        }
        bounded(peer, options, self.exchange(method, params)).await
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.connected.store(false, Ordering::SeqCst);
        self.tool_cache.lock().await.clear();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn tools(&self) -> Vec<ToolDescriptor> {
        self.tool_cache.lock().await.clone()
    }
}
