use std::str::FromStr;
use std::sync::Arc;

use chord_node::client::Client;
use chord_node::client::HttpTransport;
use chord_node::config;
use chord_node::endpoint::bind;
use chord_node::endpoint::run_http_api;
use chord_node::logging::init_logging;
use chord_node::logging::LogLevel;
use chord_node::prelude::chord_core::config::ChordConfig;
use chord_node::prelude::chord_core::dht::IdentifierSpace;
use chord_node::prelude::Address;
use chord_node::prelude::PeerRing;
use chord_node::prelude::Stabilizer;
use clap::Args;
use clap::Parser;
use clap::Subcommand;

#[derive(Parser, Debug)]
#[command(about, version, author)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(long, default_value_t = LogLevel::Info, value_enum, env)]
    log_level: LogLevel,
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "kebab-case")]
enum Command {
    #[command(about = "Writes a default configuration file.")]
    Init(InitCommand),
    #[command(about = "Starts a long-running chord node.")]
    Run(RunCommand),
    #[command(
        about = "Show the state of a running node. Include successor, predecessor, successor list and finger table."
    )]
    Inspect(ClientArgs),
    #[command(about = "Asks a running node which peer is responsible for an identifier.")]
    Lookup(LookupCommand),
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[arg(
        long,
        short = 'c',
        env,
        default_value = config::DEFAULT_CONFIG_PATH,
        help = "Config file location"
    )]
    pub config: String,
}

impl ConfigArgs {
    /// The config file, or the defaults when there is none yet.
    fn load(&self) -> anyhow::Result<config::Config> {
        match config::Config::read_fs(self.config.as_str()) {
            Ok(c) => Ok(c),
            Err(chord_node::error::Error::OpenFileError(e)) => {
                tracing::debug!("no config at {}: {}, using defaults", self.config, e);
                Ok(config::Config::default())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Args, Debug)]
struct InitCommand {
    #[arg(
        long,
        default_value = config::DEFAULT_CONFIG_PATH,
        help = "The location of config file"
    )]
    pub location: String,
}

#[derive(Args, Debug)]
struct RunCommand {
    #[arg(long, help = "Listen ip. If not provided, use ip in config file or 127.0.0.1", env)]
    pub ip: Option<String>,

    #[arg(long, short = 'p', help = "Listen port. If not provided, use port in config file or 9000", env)]
    pub port: Option<u16>,

    #[arg(long, short = 'b', help = "ip:port of a ring member to join through", env)]
    pub bootstrap: Option<String>,

    #[arg(long, help = "Start a new ring instead of joining one", env)]
    pub is_bootstrap: bool,

    #[arg(long, short = 'm', help = "The ring holds 2^log_size identifiers", env)]
    pub log_size: Option<u8>,

    #[arg(long, help = "Length of the successor list", env)]
    pub successors: Option<usize>,

    #[arg(long, short = 'v', help = "Trace every chord operation", env)]
    pub verbose: bool,

    #[command(flatten)]
    config_args: ConfigArgs,
}

impl RunCommand {
    fn config(&self) -> anyhow::Result<config::Config> {
        let mut c = self.config_args.load()?;
        if let Some(ip) = self.ip.as_ref() {
            c.ip = ip.clone();
        }
        if let Some(port) = self.port {
            c.port = port;
        }
        if let Some(bootstrap) = self.bootstrap.as_ref() {
            c.bootstrap = Some(bootstrap.clone());
            c.is_bootstrap = false;
        }
        if self.is_bootstrap {
            c.is_bootstrap = true;
        }
        if let Some(log_size) = self.log_size {
            c.log_size = log_size;
        }
        if let Some(successors) = self.successors {
            c.successors = successors;
        }
        c.verbose |= self.verbose;
        Ok(c)
    }
}

#[derive(Args, Debug)]
struct ClientArgs {
    #[arg(
        long,
        short = 'u',
        help = "ip:port of the node. If not provided, use ip and port in config file",
        env
    )]
    endpoint: Option<String>,

    #[command(flatten)]
    config_args: ConfigArgs,
}

impl ClientArgs {
    fn new_client(&self) -> anyhow::Result<(Client, config::Config)> {
        let c = self.config_args.load()?;
        let endpoint = match self.endpoint.as_ref() {
            Some(endpoint) => Address::from_str(endpoint)?,
            None => c.address(),
        };
        Ok((Client::new(endpoint, c.request_timeout())?, c))
    }
}

#[derive(Args, Debug)]
struct LookupCommand {
    #[arg(help = "Identifier to look up, reduced onto the ring of the node")]
    identifier: u64,

    #[command(flatten)]
    client_args: ClientArgs,
}

async fn daemon_run(args: RunCommand, log_level: LogLevel) -> anyhow::Result<()> {
    let c = args.config()?;
    init_logging(if c.verbose { LogLevel::Trace } else { log_level });

    let address = c.address();
    let bootstrap = c.bootstrap_address()?;
    let chord_config = ChordConfig::try_from(&c)?;
    let transport = Arc::new(HttpTransport::new(c.request_timeout())?);
    let dht = Arc::new(PeerRing::new(address.clone(), bootstrap, chord_config, transport)?);
    println!("Did: {}", dht.did);

    let listener = bind(&address)?;
    let server = tokio::spawn(run_http_api(listener, dht.clone()));

    if let Err(e) = dht.join().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }

    let stabilizer = Stabilizer::new(dht.clone());
    tokio::select! {
        res = server => {
            tracing::error!("http server stopped: {:?}", res);
            std::process::exit(1);
        }
        res = stabilizer.run() => {
            if let Err(e) = res {
                tracing::error!("{} leaves the ring: {}", dht.address, e);
            }
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => daemon_run(args, cli.log_level).await,
        Command::Init(args) => {
            init_logging(cli.log_level);
            let path = config::Config::default().write_fs(args.location.as_str())?;
            println!("Your config file has saved to: {}", path);
            Ok(())
        }
        Command::Inspect(args) => {
            init_logging(cli.log_level);
            let (client, _) = args.new_client()?;
            client.status().await?.display();
            Ok(())
        }
        Command::Lookup(args) => {
            init_logging(cli.log_level);
            let (client, c) = args.client_args.new_client()?;
            let did = IdentifierSpace::new(c.log_size)?.did(args.identifier);
            client.lookup(did).await?.display();
            Ok(())
        }
    }
}
