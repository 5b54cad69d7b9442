//! HTTP side of the node: the [Transport] used by the engine to reach other peers, and a small
//! [Client] for the `chord` command line to query a running node.
use std::time::Duration;

use crate::error::Error;
use crate::error::Result;
use crate::prelude::async_trait;
use crate::prelude::chord_core;
use crate::prelude::chord_core::message::IdentifierPayload;
use crate::prelude::chord_core::message::Payload;
use crate::prelude::reqwest;
use crate::prelude::Address;
use crate::prelude::Command;
use crate::prelude::Did;
use crate::prelude::Response;
use crate::prelude::TopoInfo;
use crate::prelude::Transport;

/// Path every chord command is posted to.
pub const CHORD_PATH: &str = "/chord/";
/// Path of the topology snapshot.
pub const STATUS_PATH: &str = "/status";

fn url(address: &Address, path: &str) -> String {
    format!("http://{}{}", address, path)
}

/// JSON over HTTP transport. One `reqwest` client is shared by every outbound call of a node.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport whose calls give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, to: &Address, command: &Command) -> chord_core::error::Result<Response> {
        let resp = self
            .client
            .post(url(to, CHORD_PATH))
            .json(command)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    chord_core::error::Error::Unreachable(to.clone())
                } else {
                    chord_core::error::Error::Transport(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(chord_core::error::Error::Transport(format!(
                "{} answered {} with status {}",
                to,
                command.name(),
                status.as_u16()
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| chord_core::error::Error::Transport(e.to_string()))?;
        serde_json::from_str(&body).map_err(chord_core::error::Error::Deserialize)
    }
}

/// Wrap client output contain raw result and humanreadable display.
pub struct ClientOutput<T> {
    /// Output data.
    pub result: T,
    display: String,
}

impl<T> ClientOutput<T> {
    fn ok(display: String, result: T) -> Result<Self> {
        Ok(Self { result, display })
    }

    /// Print the human readable form to stdout.
    pub fn display(&self) {
        println!("{}", self.display);
    }
}

/// Query a running node from the command line.
#[derive(Clone, Debug)]
pub struct Client {
    endpoint: Address,
    transport: HttpTransport,
}

impl Client {
    /// Client of the node listening on `endpoint`.
    pub fn new(endpoint: Address, timeout: Duration) -> Result<Self> {
        Ok(Self {
            endpoint,
            transport: HttpTransport::new(timeout)?,
        })
    }

    /// Topology snapshot of the node: state, successor, predecessor, successor list and fingers.
    pub async fn status(&self) -> Result<ClientOutput<TopoInfo>> {
        let resp = self
            .transport
            .client
            .get(url(&self.endpoint, STATUS_PATH))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Error::HttpStatusError(resp.status().as_u16()));
        }
        let info: TopoInfo = resp.json().await?;
        let display = serde_json::to_string_pretty(&info).map_err(|_| Error::EncodeError)?;
        ClientOutput::ok(display, info)
    }

    /// Ask the node for the peer responsible for `did`.
    pub async fn lookup(&self, did: Did) -> Result<ClientOutput<Address>> {
        let command = Command::FindSuccessor(IdentifierPayload { identifier: did });
        let resp = self.transport.send(&self.endpoint, &command).await?;
        match resp.data {
            Some(Payload::Address(address)) => {
                ClientOutput::ok(format!("{} -> {}", did, address), address)
            }
            other => Err(Error::CoreError(
                chord_core::error::Error::UnexpectedResponse {
                    command: command.name(),
                    reason: format!("{:?}", other),
                },
            )),
        }
    }
}
