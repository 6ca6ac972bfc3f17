//! Headless card table runner.
//!
//! Drives a [`Table`] at a fixed frame interval, optionally exposing a
//! line-based control console over TCP.

mod config;
mod console;

use std::{
    net::SocketAddr,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use anyhow::Error;
use card_table::{
    board::{DrawList, Vec2},
    objects::{AtlasAsset, Blueprint, ObjectAsset, ObjectFactory, Placement, STANDARD_CARDS},
    table::{FrameOutcome, Table},
};
use config::RunnerConfig;
use ctrlc::set_handler;
use log::{debug, info, warn};
use pico_args::Arguments;
use tokio::{
    net::TcpListener,
    time::{Instant, MissedTickBehavior, interval},
};

const HELP: &str = "\
Run a headless card table

USAGE:
  ct_runner [OPTIONS]

OPTIONS:
  --console    IP:PORT     Control console bind address
                           [default: env CARD_TABLE_CONSOLE_BIND or disabled]
  --layout     PATH        JSON layout placed before the first frame
                           [default: env CARD_TABLE_LAYOUT or built-in]
  --assets     PATH        JSON atlas replacing the standard card sheet
                           [default: env CARD_TABLE_ASSETS]
  --frames     N           Stop after N frames
                           [default: env CARD_TABLE_MAX_FRAMES or unlimited]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  CARD_TABLE_CAPACITY        Maximum number of objects on the board
  CARD_TABLE_TICK_MS         Frame interval in milliseconds
  CARD_TABLE_TASK_BUDGET_MS  Per-task budget before a warning is logged
  CARD_TABLE_CASCADE_LIMIT   Maximum chained state machine events per send
";

struct Args {
    console: Option<SocketAddr>,
    layout: Option<PathBuf>,
    assets: Option<PathBuf>,
    frames: Option<u64>,
}

/// Deck of every standard card beside a hand of five zombies.
fn default_layout() -> Vec<Placement> {
    vec![
        Placement {
            blueprint: Blueprint::deck("draw", &STANDARD_CARDS),
            position: Vec2::new(100.0, 100.0),
        },
        Placement {
            blueprint: Blueprint::hand("player", &["zombies"; 5]),
            position: Vec2::new(400.0, 500.0),
        },
    ]
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        console: pargs.opt_value_from_str("--console")?,
        layout: pargs.opt_value_from_str("--layout")?,
        assets: pargs.opt_value_from_str("--assets")?,
        frames: pargs.opt_value_from_str("--frames")?,
    };

    env_logger::builder().format_target(false).init();

    let config = RunnerConfig::from_env(args.console, args.layout, args.assets, args.frames)?;
    config.validate()?;

    let assets: Arc<dyn ObjectAsset> = match &config.assets_path {
        Some(path) => {
            info!("Loading atlas from {}", path.display());
            Arc::new(AtlasAsset::from_json(&std::fs::read_to_string(path)?)?)
        }
        None => Arc::new(AtlasAsset::standard()),
    };
    let factory = ObjectFactory::new(assets)?;
    let (mut table, control) = Table::new(&config.board, factory)?;

    let layout = match &config.layout_path {
        Some(path) => {
            info!("Loading layout from {}", path.display());
            Placement::layout_from_json(&std::fs::read_to_string(path)?)?
        }
        None => default_layout(),
    };
    let placed = table.populate(&layout)?;
    info!("Placed {} object(s) (capacity {})", placed.len(), config.board.capacity);

    // Catching signals for exit.
    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = Arc::clone(&interrupted);
        set_handler(move || interrupted.store(true, Ordering::SeqCst))?;
    }

    if let Some(bind) = config.console_bind {
        let listener = TcpListener::bind(bind).await?;
        let control = control.clone();
        tokio::spawn(async move {
            if let Err(e) = console::serve(listener, control).await {
                warn!("Control console stopped: {e}");
            }
        });
    }

    let mut ticker = interval(config.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let target = DrawList::new();
    let mut last = Instant::now();

    info!("Running at {:?} per frame", config.tick);
    loop {
        ticker.tick().await;
        if interrupted.load(Ordering::SeqCst) {
            info!("Interrupted");
            break;
        }

        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f64();
        last = now;

        let report = table.tick(dt, &target);
        let calls = target.take();
        if report.outcome == FrameOutcome::Stop {
            info!("Stop requested at frame {}", report.frame);
            break;
        }
        if let Some(topic) = report.topic {
            info!("Frame {}: handled {topic}", report.frame);
        }
        if report.slow_tasks() > 0 {
            warn!("Frame {}: {} task(s) over budget", report.frame, report.slow_tasks());
        }
        debug!(
            "Frame {}: {} command(s), {} spawned, {} returned, {} draw call(s)",
            report.frame,
            report.commands.len(),
            report.effects.spawned.len(),
            report.effects.returned.len(),
            calls.len()
        );

        if config.max_frames.is_some_and(|max| report.frame >= max) {
            info!("Reached frame limit");
            break;
        }
    }

    info!(
        "Stopped after {} frame(s) with {} object(s)",
        table.frame(),
        table.board().registry.len()
    );
    Ok(())
}
