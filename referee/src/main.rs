use std::path::PathBuf;

use clap::Parser;
use connect4::{FaultPolicy, TurnController};
use referee::{play_match, sources_from_configs, ConsoleView, PlayerConfig, Recorder};
use tracing::{info, warn};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
struct Args {
    /// Paths to the config JSON files of the two players, the first one
    /// moves first
    #[arg(num_args = 2, required = true)]
    player_configs: Vec<PathBuf>,

    /// How many rounds to play
    #[arg(short, long, default_value_t = 1)]
    num_rounds: usize,

    /// Failed attempts after which an automated player loses its turn
    #[arg(short, long, default_value_t = FaultPolicy::default().max_attempts)]
    max_attempts: u32,

    /// Record the exchanges with automated players as JSON files into this directory
    #[arg(short, long)]
    record_games_to_directory: Option<PathBuf>,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    initialize_logging(args.log_level);

    let mut recorder = if let Some(dir_path) = args.record_games_to_directory {
        Some(Recorder::new(dir_path)?)
    } else {
        None
    };

    let player_configs = args
        .player_configs
        .iter()
        .map(|path| PlayerConfig::load(path))
        .collect::<Result<Vec<PlayerConfig>, anyhow::Error>>()?;
    let Ok(player_configs) = <[PlayerConfig; 2]>::try_from(player_configs) else {
        anyhow::bail!("Exactly two player configs are needed");
    };

    let mut sources = sources_from_configs(&player_configs)?;
    let names = player_configs.map(|config| config.nick);
    info!(player_1 = names[0], player_2 = names[1], "Starting match");

    let view = ConsoleView::new(names.clone());
    let policy = FaultPolicy {
        max_attempts: args.max_attempts,
    };
    let mut controller =
        TurnController::new([sources[0].kind(), sources[1].kind()], policy, view);
    println!("{}", controller.board());

    let result = play_match(&mut controller, &mut sources, args.num_rounds, &mut recorder).await;

    for source in sources.iter_mut() {
        if let Err(err) = source.shutdown().await {
            warn!(player = source.name(), %err, "Could not shut down player");
        }
    }

    let match_score = result?;
    let abandoned = if match_score.abandoned > 0 {
        format!("\n- {} abandoned rounds", match_score.abandoned)
    } else {
        String::new()
    };
    eprintln!(
        "End result:\n- {} wins by {}\n- {} wins by {}\n- {} draws{}",
        match_score.wins[0],
        names[0],
        match_score.wins[1],
        names[1],
        match_score.draws,
        abandoned
    );

    Ok(())
}

fn initialize_logging(level: LevelFilter) {
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();

    let filter = Targets::new().with_default(level);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(format)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
