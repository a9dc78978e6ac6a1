// app.rs - Screen state and simulation lifecycle for the viewer

use std::collections::BTreeSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use egui::Color32;
use life_engine::config::delay_from_secs;
use life_engine::{PATTERNS, SimConfig, Simulation};
use log::{error, info, warn};
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Setup,      // world size and delay entry
    Placement,  // painting the initial live cells
    Running,    // generations rendered from snapshots
}

pub struct LifeApp {
    pub screen: Screen,
    pub config: SimConfig,

    pub size_input: String,
    pub delay_input: String,
    pub size_message: Option<String>,
    pub delay_message: Option<String>,
    pub start_message: Option<String>,

    pub placed: BTreeSet<(usize, usize)>,
    pub selected_pattern: usize,
    pub live_color: Color32,
    pub dead_color: Color32,
    random_seed: u32,

    simulation: Option<Arc<Simulation>>,
    runner: Option<JoinHandle<bool>>,
    runtime: Runtime,
}

impl LifeApp {
    pub fn new(config: SimConfig, initial: Vec<(usize, usize)>, runtime: Runtime) -> Self {
        let screen = if initial.is_empty() { Screen::Setup } else { Screen::Placement };
        Self {
            screen,
            size_input: config.size.to_string(),
            delay_input: config.step_delay.as_secs_f64().to_string(),
            config,
            size_message: None,
            delay_message: None,
            start_message: None,
            placed: initial.into_iter().collect(),
            selected_pattern: 0,
            live_color: Color32::BLACK,
            dead_color: Color32::WHITE,
            random_seed: 0,
            simulation: None,
            runner: None,
            runtime,
        }
    }

    pub fn simulation(&self) -> Option<&Simulation> {
        self.simulation.as_deref()
    }

    pub fn apply_size_input(&mut self) {
        match parse_size(&self.size_input) {
            Ok(size) => {
                self.config.size = size;
                self.placed.retain(|&(x, y)| x < size && y < size);
                self.size_message = None;
            }
            Err(message) => self.size_message = Some(message),
        }
    }

    pub fn apply_delay_input(&mut self) {
        match parse_delay(&self.delay_input) {
            Ok(secs) => match delay_from_secs(secs) {
                Ok(delay) => {
                    self.config.step_delay = delay;
                    self.delay_message = None;
                }
                Err(err) => self.delay_message = Some(err.to_string()),
            },
            Err(message) => self.delay_message = Some(message),
        }
    }

    pub fn toggle_cell(&mut self, x: usize, y: usize) {
        if x < self.config.size && y < self.config.size && !self.placed.remove(&(x, y)) {
            self.placed.insert((x, y));
        }
    }

    pub fn clear_cells(&mut self) {
        self.placed.clear();
    }

    pub fn apply_selected_pattern(&mut self) {
        let Some(pattern) = PATTERNS.get(self.selected_pattern) else {
            return;
        };
        match pattern.centered(self.config.size) {
            Some(cells) => {
                self.placed = cells.into_iter().collect();
                self.start_message = None;
            }
            None => {
                self.start_message = Some(format!(
                    "{} does not fit a {}x{} world",
                    pattern.name, self.config.size, self.config.size
                ));
            }
        }
    }

    /// Fills roughly a third of the world from a simple LCG.
    pub fn apply_random_pattern(&mut self) {
        let mut hasher = DefaultHasher::new();
        self.random_seed.hash(&mut hasher);
        let mut seed = hasher.finish();
        self.random_seed = self.random_seed.wrapping_add(1);

        self.placed.clear();
        for x in 0..self.config.size {
            for y in 0..self.config.size {
                seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
                if (seed >> 16) % 3 == 0 {
                    self.placed.insert((x, y));
                }
            }
        }
    }

    /// Builds the engine from the placed cells and runs it on a blocking task.
    pub fn start_simulation(&mut self) {
        let simulation = match Simulation::from_config(&self.config, self.placed.iter().copied()) {
            Ok(simulation) => Arc::new(simulation),
            Err(err) => {
                warn!("cannot start simulation: {err}");
                self.start_message = Some(err.to_string());
                return;
            }
        };

        info!(
            "starting {}x{} world with {} live cells",
            self.config.size,
            self.config.size,
            self.placed.len()
        );
        let runner = Arc::clone(&simulation);
        self.runner = Some(self.runtime.spawn_blocking(move || runner.start()));
        self.simulation = Some(simulation);
        self.start_message = None;
        self.screen = Screen::Running;
    }

    /// Changes the delay of the running simulation; bad values keep the old one.
    pub fn set_running_delay(&mut self, secs: f64) {
        if let Some(simulation) = &self.simulation {
            if simulation.set_step_delay_secs(secs) {
                self.config.step_delay = simulation.step_delay();
            }
        }
    }

    /// Stops the engine and keeps its last whole generation as the new
    /// starting placement.
    pub fn stop_simulation(&mut self) {
        let simulation = self.simulation.take();
        if let Some(simulation) = &simulation {
            simulation.stop();
        }
        // workers may be mid-generation until the runner is joined
        if let Some(runner) = self.runner.take() {
            match self.runtime.block_on(runner) {
                Ok(true) => {}
                Ok(false) => warn!("simulation was already being driven elsewhere"),
                Err(err) => error!("simulation task failed: {err}"),
            }
        }
        if let Some(simulation) = simulation {
            self.placed = simulation.live_cells();
        }
        self.screen = Screen::Setup;
    }

    pub fn back_to_setup(&mut self) {
        self.screen = Screen::Setup;
    }

    pub fn start_placement(&mut self) {
        self.apply_size_input();
        self.apply_delay_input();
        if self.size_message.is_none() && self.delay_message.is_none() {
            self.screen = Screen::Placement;
        }
    }
}

impl Drop for LifeApp {
    fn drop(&mut self) {
        if let Some(simulation) = &self.simulation {
            simulation.stop();
        }
    }
}

/// World size as typed by the user: a positive whole number.
pub fn parse_size(input: &str) -> Result<usize, String> {
    match input.trim().parse::<usize>() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err("World size must be a positive whole number!".to_owned()),
    }
}

/// Delay in seconds as typed by the user; a decimal comma is accepted.
pub fn parse_delay(input: &str) -> Result<f64, String> {
    input
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| "Step delay must be a number!".to_owned())
}
