// main.rs - Desktop front-end for the multi-threaded Game of Life engine

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use eframe::egui;
use life_engine::config::DEFAULT_SIZE;
use life_engine::{Pattern, SimConfig};

mod app;    // Screen state and simulation lifecycle
mod ui;     // eframe::App rendering

use app::LifeApp;

#[derive(Parser, Debug)]
#[command(version, about = "Conway's Game of Life on row-band worker threads")]
struct Args {
    /// Side length of the square world
    #[arg(long, default_value_t = DEFAULT_SIZE)]
    size: usize,

    /// Seconds between generations
    #[arg(long, default_value_t = 0.75)]
    delay: f64,

    /// Worker threads (default: one less than the logical cpus)
    #[arg(long)]
    workers: Option<usize>,

    /// Pattern placed in the middle of the world, e.g. "glider"
    #[arg(long)]
    pattern: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = SimConfig::new(args.size, life_engine::config::DEFAULT_STEP_DELAY)
        .with_delay_secs(args.delay)?;
    config.workers = args.workers;
    config.validate().context("invalid world settings")?;

    let initial = match args.pattern.as_deref() {
        Some(name) => {
            let Some(pattern) = Pattern::find(name) else {
                bail!("unknown pattern {name:?}");
            };
            pattern
                .centered(config.size)
                .with_context(|| format!("{} does not fit a {}x{} world", pattern.name, config.size, config.size))?
        }
        None => Vec::new(),
    };

    let runtime = tokio::runtime::Runtime::new().context("failed to start the tokio runtime")?;
    let app = LifeApp::new(config, initial, runtime);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 1000.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Life Simulator",
        options,
        Box::new(move |_cc| Box::new(app)),
    )
    .map_err(|err| anyhow!("window closed with an error: {err}"))
}
