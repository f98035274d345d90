use std::net::SocketAddr;

use clap::Parser;
use connect4_bot_utils::{MinimaxBot, DEFAULT_DEPTH};
use tracing::info;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:5000")]
    address: SocketAddr,

    /// How many plies to search after each candidate move
    #[arg(short, long, default_value_t = DEFAULT_DEPTH)]
    depth: u32,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    initialize_logging(args.log_level);

    let listener = tokio::net::TcpListener::bind(args.address).await?;
    info!(address = %args.address, depth = args.depth, "Serving move suggestions");
    suggest_server::serve(listener, MinimaxBot::new(args.depth)).await?;
    Ok(())
}

fn initialize_logging(level: LevelFilter) {
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();

    let filter = Targets::new().with_default(level);

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().event_format(format))
        .with(filter)
        .init();
}
