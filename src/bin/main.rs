use clap::Parser;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use tickcast::application::config::loader::ConfigLoader;
use tickcast::application::config::models::Config;
use tickcast::application::config::validator::validate_config;
use tickcast::application::server::BroadcastServer;

/// Relay every line a client sends to all connected clients, with a periodic tick
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// TOML configuration file
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// IPv4 address to bind to
    #[clap(short, long)]
    bind: Option<Ipv4Addr>,

    /// Port to listen on
    #[clap(short, long)]
    port: Option<u16>,

    /// Maximum simultaneous connections
    #[clap(short, long)]
    max_connections: Option<usize>,

    /// Tick broadcast period in milliseconds
    #[clap(short, long)]
    tick_period_ms: Option<u64>,
}

fn load_config(args: &Args) -> tickcast::common::error::Result<Config> {
    let mut config = match &args.config {
        Some(path) => ConfigLoader::load(path)?,
        None => Config::default(),
    };

    if let Some(bind) = args.bind {
        config.bind_address = bind;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(max_connections) = args.max_connections {
        config.max_connections = max_connections;
    }
    if let Some(tick_period_ms) = args.tick_period_ms {
        config.tick_period_ms = tick_period_ms;
    }

    validate_config(&config)?;
    Ok(config)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(c) => c,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    let mut server = match BroadcastServer::new(&config) {
        Ok(s) => s,
        Err(e) => {
            log::error!("Error starting server: {}", e);
            std::process::exit(1);
        }
    };

    // run() has already logged the failure
    if server.run().is_err() {
        std::process::exit(1);
    }
}
