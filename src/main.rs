// src/main.rs
//! Instrument cluster - terminal dashboard fed by a serial GPS receiver

use clap::Parser;
use instrument_cluster::{cluster::Cluster, config::ClusterConfig, error::Result, serial};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "instrument-cluster", version, about)]
struct Args {
    /// Serial device path (overrides the config file)
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate (overrides the config file)
    #[arg(short, long)]
    baud: Option<u32>,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// List available serial ports and exit
    #[arg(long)]
    list_ports: bool,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("instrument-cluster: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    if args.list_ports {
        return serial::list_ports();
    }

    let mut config = ClusterConfig::load(args.config)?;
    config.apply_overrides(args.port, args.baud);

    Cluster::new(config).run().await
}
