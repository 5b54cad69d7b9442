use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::config::ChordConfig;
use crate::dht::Address;
use crate::dht::PeerRing;
use crate::error::Error;
use crate::error::Result;
use crate::message::Command;
use crate::message::Response;
use crate::transport::RetryPolicy;
use crate::transport::Transport;


#[allow(dead_code)]
pub fn setup_tracing() {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

/// Formatted tracing output, shared with the subscriber that writes it.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .map(|l| l.to_string())
            .collect()
    }

    /// Whether the span `name` logged its return value.
    pub fn returned(&self, name: &str) -> bool {
        let markers = [
            format!(" {name}:"),
            format!(" {name}{{"),
            format!(":{name}:"),
            format!(":{name}{{"),
        ];
        self.lines().iter().any(|l| {
            l.contains("return=") && markers.iter().any(|m| l.contains(m.as_str()))
        })
    }
}

/// Capture TRACE output of the current thread until the guard is dropped.
pub fn capture_trace() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    (logs, tracing::subscriber::set_default(subscriber))
}

/// Fast timings, one attempt per call.
pub fn test_config(log_size: u8) -> ChordConfig {
    ChordConfig {
        log_size,
        successors: 4,
        stabilize_interval: Duration::from_millis(10),
        fix_fingers_interval: Duration::from_millis(10),
        update_successors_interval: Duration::from_millis(10),
        retry: RetryPolicy::new(1, Duration::from_millis(1)),
    }
}

/// All nodes of a test ring live in one process and talk through this registry.
/// Commands and responses go through JSON like on the wire.
#[derive(Default)]
pub struct MemoryTransport {
    nodes: DashMap<Address, Arc<PeerRing>>,
}

impl MemoryTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Build a node on `127.0.0.1:port`, register it, then join through `bootstrap`.
    pub async fn spawn(
        self: &Arc<Self>,
        port: u16,
        bootstrap: Option<u16>,
        log_size: u8,
    ) -> Result<Arc<PeerRing>> {
        let address = Address::new("127.0.0.1", port);
        let dht = Arc::new(PeerRing::new(
            address.clone(),
            bootstrap.map(|p| Address::new("127.0.0.1", p)),
            test_config(log_size),
            self.clone(),
        )?);
        self.nodes.insert(address, dht.clone());
        dht.join().await?;
        Ok(dht)
    }

    /// The node stops answering.
    pub fn kill(&self, address: &Address) {
        self.nodes.remove(address);
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, to: &Address, command: &Command) -> Result<Response> {
        let dht = self
            .nodes
            .get(to)
            .map(|node| node.value().clone())
            .ok_or_else(|| Error::Unreachable(to.clone()))?;
        let raw = serde_json::to_string(command).map_err(Error::Serialize)?;
        let command: Command = serde_json::from_str(&raw).map_err(Error::Deserialize)?;
        let resp = dht.handle_command(command).await?;
        let raw = serde_json::to_string(&resp).map_err(Error::Serialize)?;
        serde_json::from_str(&raw).map_err(Error::Deserialize)
    }
}
