//! YAML configuration of a node.
use std::fs;
use std::io;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::error::Error;
use crate::error::Result;
use crate::prelude::chord_core::config::ChordConfig;
use crate::prelude::chord_core::consts;
use crate::prelude::chord_core::dht::Address;
use crate::prelude::chord_core::transport::RetryPolicy;
use crate::util::ensure_parent_dir;
use crate::util::expand_home;

/// Where `chord init` writes and `chord run` reads the config file.
pub const DEFAULT_CONFIG_PATH: &str = "~/.chord/config.yaml";
/// Loopback, the node is only reachable from this host.
pub const DEFAULT_IP: &str = "127.0.0.1";
/// Port of the first node of the usual local ring.
pub const DEFAULT_PORT: u16 = 9000;
/// in ms
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 3000;

/// Node configuration. Every field may be omitted from the file and then takes its default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Address to listen on, also the identity of the node on the ring.
    pub ip: String,
    /// Port to listen on.
    pub port: u16,
    /// `ip:port` of a ring member to join through.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootstrap: Option<String>,
    /// This node starts a new ring.
    pub is_bootstrap: bool,
    /// The ring holds `2^log_size` identifiers.
    pub log_size: u8,
    /// Length of the successor list.
    pub successors: usize,
    /// in ms
    pub stabilize_interval: u64,
    /// in ms
    pub fix_fingers_interval: u64,
    /// in ms
    pub update_successors_interval: u64,
    /// Attempts of one outbound call.
    pub retry_limit: u32,
    /// in ms, attempt `k` waits `retry_base * 2^k`
    pub retry_base: u64,
    /// in ms, per outbound http call
    pub request_timeout: u64,
    /// Log every chord operation at TRACE.
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ip: DEFAULT_IP.to_string(),
            port: DEFAULT_PORT,
            bootstrap: None,
            is_bootstrap: true,
            log_size: consts::DEFAULT_LOG_SIZE,
            successors: consts::DEFAULT_SUCCESSORS,
            stabilize_interval: consts::DEFAULT_STABILIZE_INTERVAL_MS,
            fix_fingers_interval: consts::DEFAULT_FIX_FINGERS_INTERVAL_MS,
            update_successors_interval: consts::DEFAULT_UPDATE_SUCCESSORS_INTERVAL_MS,
            retry_limit: consts::DEFAULT_RETRY_LIMIT,
            retry_base: consts::DEFAULT_RETRY_BASE_MS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT_MS,
            verbose: false,
        }
    }
}

impl TryFrom<&Config> for ChordConfig {
    type Error = Error;
    fn try_from(config: &Config) -> Result<Self> {
        let chord = ChordConfig {
            log_size: config.log_size,
            successors: config.successors,
            stabilize_interval: Duration::from_millis(config.stabilize_interval),
            fix_fingers_interval: Duration::from_millis(config.fix_fingers_interval),
            update_successors_interval: Duration::from_millis(config.update_successors_interval),
            retry: RetryPolicy::new(config.retry_limit, Duration::from_millis(config.retry_base)),
        };
        chord.validate()?;
        Ok(chord)
    }
}

impl Config {
    /// Address the node listens on.
    pub fn address(&self) -> Address {
        Address::new(self.ip.clone(), self.port)
    }

    /// Bootstrap peer to join through, `None` when this node starts the ring.
    /// A joining node without a bootstrap address is a configuration error.
    pub fn bootstrap_address(&self) -> Result<Option<Address>> {
        if self.is_bootstrap {
            return Ok(None);
        }
        let Some(bootstrap) = self.bootstrap.as_ref() else {
            return Err(Error::InvalidConfig(
                "a node that is not the bootstrap node needs a bootstrap address".to_string(),
            ));
        };
        Address::from_str(bootstrap)
            .map(Some)
            .map_err(|_| Error::InvalidAddress(bootstrap.clone()))
    }

    /// Per call timeout of the http client.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout)
    }

    /// Save as YAML at `path`, creating parent directories. Returns the expanded path.
    pub fn write_fs<P>(&self, path: P) -> Result<String>
    where P: AsRef<std::path::Path> {
        let path = expand_home(path)?;
        ensure_parent_dir(&path)?;
        let f =
            fs::File::create(path.as_path()).map_err(|e| Error::CreateFileError(e.to_string()))?;
        let f_writer = io::BufWriter::new(f);
        serde_yaml::to_writer(f_writer, self).map_err(|_| Error::EncodeError)?;
        Ok(path.to_string_lossy().into_owned())
    }

    /// Load from the YAML file at `path`, a leading `~` is expanded.
    pub fn read_fs<P>(path: P) -> Result<Config>
    where P: AsRef<std::path::Path> {
        let path = expand_home(path)?;
        tracing::debug!("Read config from: {:?}", path);
        let f = fs::File::open(path).map_err(|e| Error::OpenFileError(e.to_string()))?;
        let f_rdr = io::BufReader::new(f);
        Ok(serde_yaml::from_reader(f_rdr)?)
    }
}
