//! Test helpers for integration tests
//!
//! Provides utilities for spawning test servers on an ephemeral port and
//! talking to them over HTTP and WebSocket.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use futures_util::{SinkExt, StreamExt};
use reqwest::{Client, Response};
use room_common::{AppConfig, AppError};
use room_gateway::{create_gateway_state, run_server, GatewayState};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

/// How long a client waits for the next frame
const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    state: GatewayState,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<Result<(), AppError>>,
}

impl TestServer {
    /// Start a new test server backed by the in-memory store
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config()).await
    }

    /// Start a test server with custom config
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let state = create_gateway_state(config).await?;

        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let addr = listener.local_addr()?;

        let (shutdown, signal) = oneshot::channel::<()>();
        let handle = tokio::spawn(run_server(listener, state.clone(), async move {
            let _ = signal.await;
        }));

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            state,
            shutdown: Some(shutdown),
            handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// WebSocket endpoint URL
    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// The server's shared state, for assertions
    pub fn state(&self) -> &GatewayState {
        &self.state
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Open a WebSocket connection to `/ws`
    pub async fn connect(&self) -> Result<WsClient> {
        WsClient::connect(&self.ws_url()).await
    }

    /// Trigger graceful shutdown and wait for the server to return
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let joined = tokio::time::timeout(Duration::from_secs(10), &mut self.handle)
            .await
            .context("server did not stop in time")?;
        joined??;
        Ok(())
    }
}

/// Create a test configuration: in-memory store, quick keepalive
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::in_memory();
    config.gateway.host = "127.0.0.1".to_string();
    config.gateway.port = 0;
    config.chat.keepalive_interval_ms = 1_000;
    config
}

/// WebSocket client speaking the room protocol
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    pub async fn connect(url: &str) -> Result<Self> {
        let (stream, _) = tokio_tungstenite::connect_async(url)
            .await
            .with_context(|| format!("failed to connect to {url}"))?;
        Ok(Self { stream })
    }

    pub async fn send_json(&mut self, frame: &Value) -> Result<()> {
        self.stream.send(Message::Text(frame.to_string())).await?;
        Ok(())
    }

    pub async fn send_binary(&mut self, data: Vec<u8>) -> Result<()> {
        self.stream.send(Message::Binary(data)).await?;
        Ok(())
    }

    pub async fn join(&mut self, name: &str) -> Result<()> {
        self.send_json(&json!({"type": "join", "name": name})).await
    }

    pub async fn say(&mut self, content: &str) -> Result<()> {
        self.send_json(&json!({"type": "message", "content": content})).await
    }

    /// Next text frame as JSON, skipping pings
    pub async fn recv_json(&mut self) -> Result<Value> {
        loop {
            match self.next_message().await? {
                Message::Text(text) => return Ok(serde_json::from_str(&text)?),
                Message::Ping(_) | Message::Pong(_) => {}
                other => bail!("expected a text frame, got {other:?}"),
            }
        }
    }

    /// Next frame, which must carry `type == frame_type`
    pub async fn expect(&mut self, frame_type: &str) -> Result<Value> {
        let frame = self.recv_json().await?;
        if frame["type"] != frame_type {
            bail!("expected `{frame_type}` frame, got {frame}");
        }
        Ok(frame)
    }

    /// Wait for the server's close frame
    pub async fn recv_close(&mut self) -> Result<Option<CloseFrame<'static>>> {
        loop {
            match self.next_message().await? {
                Message::Close(frame) => return Ok(frame),
                Message::Text(_) | Message::Ping(_) | Message::Pong(_) => {}
                other => bail!("expected a close frame, got {other:?}"),
            }
        }
    }

    /// Wait for a keepalive ping
    pub async fn recv_ping(&mut self) -> Result<()> {
        loop {
            if let Message::Ping(_) = self.next_message().await? {
                return Ok(());
            }
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }

    async fn next_message(&mut self) -> Result<Message> {
        match tokio::time::timeout(RECV_TIMEOUT, self.stream.next()).await {
            Ok(Some(message)) => Ok(message?),
            Ok(None) => bail!("connection closed"),
            Err(_) => bail!("timed out waiting for a frame"),
        }
    }
}

/// Poll `condition` until it holds or a second passes
pub async fn eventually<F>(mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
