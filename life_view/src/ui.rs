// ui.rs - Setup, placement and running screens

use std::time::Duration;

use eframe::egui;
use egui::{Color32, Pos2, Rect, Sense, Stroke, Vec2};
use life_engine::PATTERNS;

use crate::app::{LifeApp, Screen};

const BOARD_PIXELS: f32 = 800.0;
const SPACING: f32 = 0.5;

fn tile_size(world_size: usize) -> f32 {
    (BOARD_PIXELS / world_size as f32 - SPACING).clamp(1.0, 20.0)
}

/// Paints a `size x size` board and returns the clicked tile, if any.
fn draw_board(
    ui: &mut egui::Ui,
    size: usize,
    is_alive: impl Fn(usize, usize) -> bool,
    live_color: Color32,
    dead_color: Color32,
    sense: Sense,
) -> Option<(usize, usize)> {
    let box_size = tile_size(size);
    let total_size = Vec2::splat((box_size + SPACING) * size as f32 - SPACING);

    let (response, painter) = ui.allocate_painter(total_size, sense);
    let start_pos = response.rect.min;

    painter.rect_filled(response.rect, 0.0, Color32::GRAY);

    for x in 0..size {
        for y in 0..size {
            // x is the row, y the column
            let pos = egui::pos2(
                start_pos.x + y as f32 * (box_size + SPACING),
                start_pos.y + x as f32 * (box_size + SPACING),
            );
            let rect = Rect::from_min_size(pos, Vec2::splat(box_size));
            let color = if is_alive(x, y) { live_color } else { dead_color };

            painter.rect_filled(rect, 1.0, color);
            if box_size >= 6.0 {
                painter.rect_stroke(rect, 1.0, Stroke::new(0.2, Color32::from_gray(60)));
            }
        }
    }

    if !response.clicked() {
        return None;
    }
    let pointer: Pos2 = response.interact_pointer_pos()?;
    let offset = pointer - start_pos;
    let step = box_size + SPACING;
    let (x, y) = ((offset.y / step) as usize, (offset.x / step) as usize);
    (x < size && y < size).then_some((x, y))
}

/// Seconds slider; values outside the range (e.g. from `--delay`) are kept.
fn delay_slider(ui: &mut egui::Ui, secs: &mut f64) {
    ui.add(
        egui::Slider::new(secs, 0.01..=10.0)
            .logarithmic(true)
            .clamp_to_range(false)
            .suffix(" s"),
    );
}

fn population_line(ui: &mut egui::Ui, live: usize, size: usize) {
    let total = size * size;
    ui.horizontal(|ui| {
        ui.label(format!("Live cells: {}", live));
        ui.label(format!("Dead cells: {}", total - live));
        ui.label(format!("Population: {:.1}%", live as f32 / total as f32 * 100.0));
    });
}

impl LifeApp {
    fn setup_screen(&mut self, ui: &mut egui::Ui) {
        ui.heading("Life Simulator");
        ui.separator();

        ui.label(format!("World size: {}", self.config.size));
        ui.horizontal(|ui| {
            ui.text_edit_singleline(&mut self.size_input);
            if ui.button("Set world size").clicked() {
                self.apply_size_input();
            }
        });
        if let Some(message) = &self.size_message {
            ui.colored_label(Color32::RED, message);
        }

        ui.label(format!("Step delay: {:.3} s", self.config.step_delay.as_secs_f64()));
        ui.horizontal(|ui| {
            ui.text_edit_singleline(&mut self.delay_input);
            if ui.button("Set step delay").clicked() {
                self.apply_delay_input();
            }
        });
        if let Some(message) = &self.delay_message {
            ui.colored_label(Color32::RED, message);
        }

        ui.separator();
        if ui.button("Start placement").clicked() {
            self.start_placement();
        }
    }

    fn placement_screen(&mut self, ui: &mut egui::Ui) {
        ui.heading("Place the living cells");

        ui.horizontal(|ui| {
            if ui.button("▶ Start simulation").clicked() {
                self.start_simulation();
            }
            if ui.button("Back to settings").clicked() {
                self.back_to_setup();
            }
            if ui.button("⏹ Clear").clicked() {
                self.clear_cells();
            }
            if ui.button("🎲 Random").clicked() {
                self.apply_random_pattern();
            }

            ui.separator();

            // Pattern dropdown
            ui.label("Pattern:");
            egui::ComboBox::from_id_source("pattern_selector")
                .selected_text(PATTERNS[self.selected_pattern].name)
                .show_ui(ui, |ui| {
                    for (i, pattern) in PATTERNS.iter().enumerate() {
                        ui.selectable_value(&mut self.selected_pattern, i, pattern.name);
                    }
                });
            if ui.button("Apply Pattern").clicked() {
                self.apply_selected_pattern();
            }
        });

        ui.horizontal(|ui| {
            ui.label("Live:");
            ui.color_edit_button_srgba(&mut self.live_color);
            ui.label("Dead:");
            ui.color_edit_button_srgba(&mut self.dead_color);
        });

        if let Some(message) = &self.start_message {
            ui.colored_label(Color32::RED, message);
        }
        ui.label("Click tiles to toggle them alive/dead.");
        ui.separator();

        let size = self.config.size;
        let placed = &self.placed;
        let clicked = egui::ScrollArea::both()
            .show(ui, |ui| {
                draw_board(
                    ui,
                    size,
                    |x, y| placed.contains(&(x, y)),
                    self.live_color,
                    self.dead_color,
                    Sense::click(),
                )
            })
            .inner;
        if let Some((x, y)) = clicked {
            self.toggle_cell(x, y);
        }

        population_line(ui, self.placed.len(), size);
    }

    fn running_screen(&mut self, ui: &mut egui::Ui) {
        let state = self
            .simulation()
            .map(|sim| (sim.snapshot(), sim.generation(), sim.plan().worker_count()));
        let Some((snapshot, generation, workers)) = state else {
            self.back_to_setup();
            return;
        };

        ui.heading("Life Simulator");
        let mut stop = false;
        let mut delay = self.config.step_delay.as_secs_f64();
        ui.horizontal(|ui| {
            if ui.button("⏹ Stop").clicked() {
                stop = true;
            }
            ui.separator();
            ui.label(format!("Generation: {}", generation));
            ui.label(format!("Workers: {}", workers));
            ui.separator();
            ui.label("Delay:");
            delay_slider(ui, &mut delay);
        });

        if delay != self.config.step_delay.as_secs_f64() {
            self.set_running_delay(delay);
        }

        ui.separator();
        egui::ScrollArea::both().show(ui, |ui| {
            draw_board(
                ui,
                snapshot.size(),
                |x, y| snapshot.is_alive(x, y),
                self.live_color,
                self.dead_color,
                Sense::hover(),
            );
        });
        population_line(ui, snapshot.population(), snapshot.size());

        if stop {
            self.stop_simulation();
        }
    }
}

impl eframe::App for LifeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| match self.screen {
            Screen::Setup => self.setup_screen(ui),
            Screen::Placement => self.placement_screen(ui),
            Screen::Running => self.running_screen(ui),
        });

        // The engine steps on its own threads; poll it for new generations.
        if self.screen == Screen::Running {
            ctx.request_repaint_after(Duration::from_millis(30));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn show_slider(mut secs: f64) -> f64 {
        let ctx = egui::Context::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                delay_slider(ui, &mut secs);
            });
        });
        secs
    }

    #[test]
    fn slider_keeps_out_of_range_delays() {
        assert_eq!(show_slider(30.0), 30.0);
        assert_eq!(show_slider(0.005), 0.005);
        assert_eq!(show_slider(0.75), 0.75);
    }

    #[test]
    fn tiles_shrink_with_the_world() {
        assert_eq!(tile_size(10), 20.0);
        assert!(tile_size(200) < tile_size(50));
        assert_eq!(tile_size(100_000), 1.0);
    }
}
