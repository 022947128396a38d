use clap::Parser;
use gamemaster::config::GameConfig;
use gamemaster::report::ReportFormat;
use gamemaster::scenario::Scenario;
use gamemaster::session::Session;
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario file to play, the built-in demo when absent
    #[arg(short = 's', long)]
    scenario: Option<String>,

    /// Seed for reproducible games
    #[arg(long)]
    seed: Option<u64>,

    /// Milliseconds between resolution passes
    #[arg(short = 't', long, default_value = "250")]
    tick_ms: u64,

    /// Servers per player, overrides the scenario
    #[arg(long)]
    servers: Option<usize>,

    /// Report format
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: ReportFormat,

    /// Also read orders from stdin, one per line
    #[arg(short = 'i', long)]
    interactive: bool,

    /// Stop after this many ticks
    #[arg(short = 'm', long)]
    max_ticks: Option<u64>,
}

/// Main-method of the application.
/// Loads the scenario, then drives the session until it ends or Ctrl+C.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let scenario = match &args.scenario {
        Some(path) => {
            info!("Loading scenario from {}", path);
            Scenario::load(path)?
        }
        None => {
            info!("No scenario given, playing the demo");
            Scenario::demo()
        }
    };

    let mut config: GameConfig = scenario.config();
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(servers) = args.servers {
        config.servers_per_player = servers;
    }

    let mut session = Session::from_scenario(&scenario, config).with_max_ticks(args.max_ticks);

    let orders = if args.interactive {
        info!("Reading orders from stdin");
        Some(spawn_stdin_reader())
    } else {
        None
    };

    let period = Duration::from_millis(args.tick_ms.max(1));
    let mut out = std::io::stdout();

    tokio::select! {
        result = session.run(period, orders, args.format, &mut out) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}

/// Forwards stdin lines to the session. The channel closes at end of input.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (sender, receiver) = mpsc::channel::<String>(64);

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => {
                    if sender.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
    });

    receiver
}
