use super::{CallOptions, Transport, TransportError, bounded, initialize_params, parse_catalog};
use crate::config::ProcessSpec;
use crate::domain::{PeerId, ToolDescriptor};
use crate::infrastructure::rpc::{RpcRequest, RpcResponse};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, Command};
use tokio::sync::{Mutex as AsyncMutex, oneshot};
use tracing::{debug, info, warn};

type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;
type Responder = oneshot::Sender<Result<Value, TransportError>>;

/// Newline-delimited JSON-RPC over the stdio of an endpoint process.
#[derive(Clone)]
pub struct ProcessTransport {
    inner: Arc<Inner>,
}

enum Launch {
    Command(ProcessSpec),
    Stream(AsyncMutex<Option<(BoxedReader, BoxedWriter)>>),
}

struct Inner {
    peer: PeerId,
    launch: Launch,
    lifecycle: AsyncMutex<()>,
    child: AsyncMutex<Option<Child>>,
    writer: AsyncMutex<Option<BufWriter<BoxedWriter>>>,
    pending: AsyncMutex<HashMap<String, Responder>>,
    id_counter: AtomicU64,
    generation: AtomicU64,
    connected: AtomicBool,
    tool_cache: AsyncMutex<Vec<ToolDescriptor>>,
}

impl ProcessTransport {
    /// Spawns `spec` on connect.
    pub fn spawn(peer: PeerId, spec: ProcessSpec) -> Self {
        Self::with_launch(peer, Launch::Command(spec))
    }

    /// Speaks the protocol over an already-open pair of streams. The streams
    /// are consumed by the first `connect`; a closed transport cannot reconnect.
    pub fn over_stream<R, W>(peer: PeerId, reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let streams: (BoxedReader, BoxedWriter) = (Box::new(reader), Box::new(writer));
        Self::with_launch(peer, Launch::Stream(AsyncMutex::new(Some(streams))))
    }

    fn with_launch(peer: PeerId, launch: Launch) -> Self {
        Self {
            inner: Arc::new(Inner {
                peer,
                launch,
                lifecycle: AsyncMutex::new(()),
                child: AsyncMutex::new(None),
                writer: AsyncMutex::new(None),
                pending: AsyncMutex::new(HashMap::new()),
                id_counter: AtomicU64::new(1),
                generation: AtomicU64::new(0),
                connected: AtomicBool::new(false),
                tool_cache: AsyncMutex::new(Vec::new()),
            }),
        }
    }
}

#[async_trait]
impl Transport for ProcessTransport {
    fn peer(&self) -> PeerId {
        self.inner.peer
    }

    async fn connect(&self, options: &CallOptions) -> Result<(), TransportError> {
        self.inner.connect(options).await
    }

    async fn request(
        &self,
        method: &str,
        params: Value,
        options: &CallOptions,
    ) -> Result<Value, TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected {
                peer: self.inner.peer,
            });
        }
        self.inner.call(method, params, options).await
    }

    async fn close(&self) -> Result<(), TransportError> {
        let _guard = self.inner.lifecycle.lock().await;
        self.inner.reset().await;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::SeqCst)
    }

    async fn tools(&self) -> Vec<ToolDescriptor> {
        self.inner.tool_cache.lock().await.clone()
    }
}

impl Inner {
    async fn connect(self: &Arc<Self>, options: &CallOptions) -> Result<(), TransportError> {
        let _guard = self.lifecycle.lock().await;
        if self.connected.load(Ordering::SeqCst) {
            return Ok(());
        }

        let (reader, writer) = self.open().await?;
        *self.writer.lock().await = Some(BufWriter::new(writer));

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let reader_self = Arc::clone(self);
        tokio::spawn(async move {
            reader_self.reader_loop(reader, generation).await;
        });

        match self.initialize_sequence(options).await {
            Ok(()) => {
                self.connected.store(true, Ordering::SeqCst);
                info!(peer = %self.peer, "Endpoint connected");
                Ok(())
            }
            Err(err) => {
                self.reset().await;
                Err(err)
            }
        }
    }

    async fn open(&self) -> Result<(BoxedReader, BoxedWriter), TransportError> {
        match &self.launch {
            Launch::Command(spec) => {
                let mut command = Command::new(&spec.command);
                command
                    .stdin(Stdio::piped())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::inherit())
                    .kill_on_drop(true);
                if let Some(dir) = &spec.workdir {
                    command.current_dir(dir);
                }
                if !spec.args.is_empty() {
                    command.args(&spec.args);
                }
                for (key, value) in &spec.env {
                    command.env(key, value);
                }

                let mut child = command.spawn().map_err(|source| TransportError::Spawn {
                    peer: self.peer,
                    source,
                })?;
                let stdin = child
                    .stdin
                    .take()
                    .ok_or_else(|| self.transport_error("failed to capture endpoint stdin"))?;
                let stdout = child
                    .stdout
                    .take()
                    .ok_or_else(|| self.transport_error("failed to capture endpoint stdout"))?;
                debug!(peer = %self.peer, command = %spec.command.display(), "Spawned endpoint process");
                *self.child.lock().await = Some(child);
                Ok((Box::new(stdout), Box::new(stdin)))
            }
            Launch::Stream(slot) => slot
                .lock()
                .await
                .take()
                .ok_or_else(|| self.transport_error("stream already consumed")),
        }
    }

    async fn initialize_sequence(&self, options: &CallOptions) -> Result<(), TransportError> {
        self.call("initialize", initialize_params(), options).await?;
        self.send_notification("notifications/initialized", json!({}))
            .await?;
        let catalog = self.call("tools/list", json!({}), options).await?;
        *self.tool_cache.lock().await = parse_catalog(&catalog);
        Ok(())
    }

    /// One correlated request. The pending entry never outlives the call.
    async fn call(
        &self,
        method: &str,
        params: Value,
        options: &CallOptions,
    ) -> Result<Value, TransportError> {
        let id = self.next_id();
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id.clone(), tx);

        let request = RpcRequest::new(id.clone(), method, params);
        let result = bounded(self.peer, options, async {
            self.write_message(&request).await?;
            match rx.await {
                Ok(Ok(value)) => Ok(value.get("result").cloned().unwrap_or(Value::Null)),
                Ok(Err(err)) => Err(err),
                Err(_) => Err(TransportError::Terminated { peer: self.peer }),
            }
        })
        .await;

        if result.is_err() {
            self.pending.lock().await.remove(&id);
        }
        result
    }

    async fn refresh_tools(&self, options: &CallOptions) -> Result<(), TransportError> {
        let catalog = self.call("tools/list", json!({}), options).await?;
        *self.tool_cache.lock().await = parse_catalog(&catalog);
        Ok(())
    }

    async fn reader_loop(self: Arc<Self>, reader: BoxedReader, generation: u64) {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(raw)) = lines.next_line().await {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.starts_with('\u{1b}') {
                debug!(peer = %self.peer, line = trimmed, "Skipping ANSI log line from endpoint");
                continue;
            }
            match serde_json::from_str::<Value>(trimmed) {
                Ok(value) => {
                    if let Err(err) = self.process_inbound_message(value).await {
                        warn!(peer = %self.peer, %err, "Failed to process message from endpoint");
                    }
                }
                Err(source) => {
                    warn!(peer = %self.peer, line = trimmed, %source, "Received invalid JSON from endpoint");
                }
            }
        }

        if self.generation.load(Ordering::SeqCst) == generation {
            warn!(peer = %self.peer, "Endpoint closed its output stream");
            self.reset().await;
        }
    }

    async fn process_inbound_message(self: &Arc<Self>, value: Value) -> Result<(), TransportError> {
        match (value.get("id").cloned(), value.get("method").is_some()) {
            (Some(id), true) => self.handle_server_request(id, &value).await,
            (Some(id), false) => {
                self.handle_response(&id, value).await;
                Ok(())
            }
            (None, true) => {
                self.handle_notification(&value);
                Ok(())
            }
            (None, false) => Ok(()),
        }
    }

    async fn handle_response(&self, id: &Value, value: Value) {
        let Some(key) = response_key(id) else {
            return;
        };
        let responder = self.pending.lock().await.remove(&key);
        let Some(sender) = responder else {
            debug!(peer = %self.peer, response_id = key, "Received response for unknown request");
            return;
        };

        let outcome = match value.get("error") {
            Some(error) => Err(TransportError::Rpc {
                peer: self.peer,
                code: error.get("code").and_then(Value::as_i64).unwrap_or(-32000),
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string(),
            }),
            None => Ok(value),
        };
        let _ = sender.send(outcome);
    }

    async fn handle_server_request(&self, id: Value, value: &Value) -> Result<(), TransportError> {
        let method = value
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let response = match method {
            "ping" => RpcResponse::success(Some(id), json!({ "status": "ok" })),
            other => {
                warn!(peer = %self.peer, method = other, "Endpoint sent unsupported request");
                RpcResponse::method_not_found(Some(id), other)
            }
        };
        self.write_message(&response).await
    }

    fn handle_notification(self: &Arc<Self>, value: &Value) {
        let Some(method) = value.get("method").and_then(Value::as_str) else {
            return;
        };
        debug!(peer = %self.peer, method, "Received notification from endpoint");
        if method == "notifications/tools/list_changed" {
            let this = Arc::clone(self);
            tokio::spawn(async move {
                let options = CallOptions::new(crate::config::defaults::request_timeout());
                if let Err(err) = this.refresh_tools(&options).await {
                    warn!(peer = %this.peer, %err, "Failed to refresh tool catalog");
                }
            });
        }
    }

    async fn send_notification(&self, method: &str, params: Value) -> Result<(), TransportError> {
        self.write_message(&RpcRequest::notification(method, params))
            .await
    }

    async fn write_message<T: Serialize>(&self, message: &T) -> Result<(), TransportError> {
        let encoded = serde_json::to_string(message).map_err(|source| TransportError::InvalidJson {
            peer: self.peer,
            source,
        })?;

        let mut writer = self.writer.lock().await;
        let stream = writer
            .as_mut()
            .ok_or(TransportError::NotConnected { peer: self.peer })?;
        stream
            .write_all(encoded.as_bytes())
            .await
            .map_err(|err| self.transport_error(err.to_string()))?;
        stream
            .write_all(b"\n")
            .await
            .map_err(|err| self.transport_error(err.to_string()))?;
        stream
            .flush()
            .await
            .map_err(|err| self.transport_error(err.to_string()))?;
        Ok(())
    }

    /// Drops the channel, stops the child and fails every waiting request.
    async fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.connected.store(false, Ordering::SeqCst);

        if let Some(mut writer) = self.writer.lock().await.take() {
            let _ = writer.shutdown().await;
        }

        if let Some(mut child) = self.child.lock().await.take() {
            if let Err(err) = child.kill().await {
                debug!(peer = %self.peer, %err, "Failed to kill endpoint process (may have already exited)");
            }
            let _ = child.wait().await;
        }

        self.fail_all_pending().await;
        self.tool_cache.lock().await.clear();
    }

    async fn fail_all_pending(&self) {
        let mut pending = self.pending.lock().await;
        for (_, sender) in pending.drain() {
            let _ = sender.send(Err(TransportError::Terminated { peer: self.peer }));
        }
    }

    fn next_id(&self) -> String {
        let id = self.id_counter.fetch_add(1, Ordering::SeqCst);
        format!("req-{id}")
    }

    fn transport_error(&self, message: impl Into<String>) -> TransportError {
        TransportError::Transport {
            peer: self.peer,
            message: message.into(),
        }
    }
}

fn response_key(id: &Value) -> Option<String> {
    match id {
        Value::String(value) => Some(value.clone()),
        Value::Number(num) => Some(num.to_string()),
        _ => None,
    }
}
