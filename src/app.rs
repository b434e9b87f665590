//! tonepaint application — UI glue over canvas, palette, fill, sequencer
//! and audio.
//!
//! All shared state lives in this one struct; the sequencer and the
//! pointer handling both run inside `update()`, so they interleave but
//! never overlap.

use crate::audio::AudioEngine;
use crate::canvas::{Canvas, CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::fill::FillEstimator;
use crate::palette::{self, PALETTE, PALETTE_WIDTH};
use crate::repaint::RepaintController;
use crate::sequencer::{Sequencer, SCALE};
use crate::theme;
use egui::{Context, Key, Pos2, Rect, Sense, TextureHandle, Vec2};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Brush stroke thickness in canvas pixels.
const BRUSH_THICKNESS: u32 = 5;

/// Brush tone pitch range, mapped from pointer y. Top of the canvas is
/// the high end.
const BRUSH_PITCH_TOP_HZ: f32 = 800.0;
const BRUSH_PITCH_BOTTOM_HZ: f32 = 200.0;

/// Sequencer note length; short enough to read as a pluck.
const BEAT_NOTE_MS: u32 = 300;

/// Short descending run played on clear, ascending run on save.
const CLEAR_RUN: [u8; 3] = [72, 67, 60];
const SAVE_RUN: [u8; 3] = [60, 67, 72];

/// Exported image name; always written to the same place.
const EXPORT_FILE: &str = "tonepaint.png";

/// Map pointer y to the brush tone frequency (inverted: top = higher).
fn brush_pitch(y: i32) -> f32 {
    let t = (y as f32 / CANVAS_HEIGHT as f32).clamp(0.0, 1.0);
    BRUSH_PITCH_TOP_HZ + t * (BRUSH_PITCH_BOTTOM_HZ - BRUSH_PITCH_TOP_HZ)
}

pub struct TonePaintApp {
    canvas: Canvas,
    texture: Option<TextureHandle>,
    texture_dirty: bool,
    /// Index into PALETTE.
    current_color: usize,
    /// Previous pointer position while a stroke is active.
    last_point: Option<(i32, i32)>,
    fill: FillEstimator,
    sequencer: Sequencer,
    audio: AudioEngine,
    repaint: RepaintController,
    error_msg: Option<String>,
    show_about: bool,
}

impl TonePaintApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let mut canvas = Canvas::new();
        palette::paint_swatches(&mut canvas);
        Self {
            canvas,
            texture: None,
            texture_dirty: true,
            // default color is black, the last swatch
            current_color: PALETTE.len() - 1,
            last_point: None,
            fill: FillEstimator::new((CANVAS_WIDTH - PALETTE_WIDTH) * CANVAS_HEIGHT),
            sequencer: Sequencer::new(Instant::now()),
            audio: AudioEngine::new(),
            repaint: RepaintController::new(Duration::from_millis(33)),
            error_msg: None,
            show_about: false,
        }
    }

    /// Run the beat timer. Called once per frame; the repaint controller
    /// guarantees a frame lands by the next deadline.
    fn pump_sequencer(&mut self) {
        let now = Instant::now();
        let fill = self.fill.percentage();
        if let Some(tick) = self.sequencer.poll(now, fill) {
            for pitch in tick.notes {
                self.audio.play_note(pitch, BEAT_NOTE_MS, tick.volume);
            }
        }
        self.repaint.wake_within(self.sequencer.until_next_tick(now));
    }

    fn clear_canvas(&mut self) {
        self.canvas.clear();
        palette::paint_swatches(&mut self.canvas);
        self.fill.on_clear();
        self.sequencer.reset(Instant::now());
        self.audio.play_run(&CLEAR_RUN, 90, 0.3);
        self.texture_dirty = true;
        self.error_msg = None;
    }

    fn export_path() -> PathBuf {
        dirs::picture_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(EXPORT_FILE)
    }

    fn save_image(&mut self) {
        let path = Self::export_path();
        match self.canvas.export_png(&path) {
            Ok(()) => {
                self.audio.play_run(&SAVE_RUN, 90, 0.3);
                self.error_msg = None;
            }
            Err(e) => {
                eprintln!("failed to export: {}", e);
                self.error_msg = Some(format!("export failed: {}", e));
            }
        }
    }

    fn handle_keys(&mut self, ctx: &Context) {
        let (clear, save) = ctx.input(|i| (i.key_pressed(Key::C), i.key_pressed(Key::S)));
        if clear {
            self.clear_canvas();
        }
        if save {
            self.save_image();
        }
    }

    fn update_texture(&mut self, ctx: &Context) {
        if self.texture_dirty {
            let image = self.canvas.to_texture_data();
            self.texture = Some(ctx.load_texture("canvas", image, egui::TextureOptions::NEAREST));
            self.texture_dirty = false;
        }
    }

    fn handle_pointer(&mut self, canvas_rect: Rect, response: &egui::Response) {
        let Some(pos) = response.interact_pointer_pos() else {
            self.audio.brush_off();
            return;
        };
        let x = (pos.x - canvas_rect.min.x) as i32;
        let y = (pos.y - canvas_rect.min.y) as i32;

        // a clean click never reports drag_started, so check both
        if response.drag_started() || response.clicked() {
            match palette::color_at(x, y) {
                Some(entry) => {
                    self.current_color = entry.index;
                    // each color has its own selection note
                    self.audio.play_note(SCALE[entry.index % 7], 200, 0.3);
                }
                None => self.last_point = Some((x, y)),
            }
        }

        if response.dragged() {
            if x >= PALETTE_WIDTH as i32 {
                if let Some((lx, ly)) = self.last_point {
                    self.canvas.draw_line(
                        lx,
                        ly,
                        x,
                        y,
                        PALETTE[self.current_color].color,
                        BRUSH_THICKNESS,
                    );
                    self.fill.on_stroke();
                    self.texture_dirty = true;
                }
                self.audio.set_brush_pitch(brush_pitch(y));
                self.audio.brush_on();
            } else {
                self.audio.brush_off();
            }
            self.last_point = Some((x, y));
        }

        if response.drag_stopped() {
            self.last_point = None;
            self.audio.brush_off();
        }
    }

    fn render_canvas(&mut self, ui: &mut egui::Ui, ctx: &Context) {
        self.update_texture(ctx);

        let size = Vec2::new(CANVAS_WIDTH as f32, CANVAS_HEIGHT as f32);
        let (canvas_rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());

        if let Some(ref texture) = self.texture {
            ui.painter().image(
                texture.id(),
                canvas_rect,
                Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }

        self.handle_pointer(canvas_rect, &response);
    }

    fn render_menu_bar(&mut self, ui: &mut egui::Ui) {
        theme::menu_bar(ui, |ui| {
            ui.menu_button("file", |ui| {
                if ui.button("save image   s").clicked() {
                    self.save_image();
                    ui.close_menu();
                }
                if ui.button("clear canvas c").clicked() {
                    self.clear_canvas();
                    ui.close_menu();
                }
            });
            ui.menu_button("help", |ui| {
                if ui.button("about tonepaint").clicked() {
                    self.show_about = true;
                    ui.close_menu();
                }
            });
        });
    }

    fn render_about(&mut self, ctx: &Context) {
        egui::Window::new("about tonepaint")
            .collapsible(false)
            .resizable(false)
            .default_width(300.0)
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.heading("tonepaint");
                    ui.label("version 0.1.0");
                    ui.add_space(8.0);
                    ui.label("a drawing toy that plays music");
                });
                ui.add_space(8.0);
                ui.separator();
                ui.add_space(4.0);
                ui.label("click the swatches to pick a color,");
                ui.label("drag to draw. the music speeds up as");
                ui.label("the canvas fills.");
                ui.add_space(4.0);
                ui.label("keys: c clears, s saves a PNG");
                ui.add_space(4.0);
                ui.label("frameworks:");
                ui.label("  egui/eframe (MIT), image-rs (MIT)");
                ui.label("  rodio (MIT)");
                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    if ui.button("ok").clicked() {
                        self.show_about = false;
                    }
                });
            });
    }
}

impl eframe::App for TonePaintApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.pump_sequencer();
        self.handle_keys(ctx);

        egui::TopBottomPanel::top("menu").show(ctx, |ui| self.render_menu_bar(ui));
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            theme::status_bar(
                ui,
                &format!(
                    "{}  |  fill: {:.1}%  |  {:.0} bpm  |  beat {}  {}",
                    PALETTE[self.current_color].name,
                    self.fill.percentage() * 100.0,
                    self.sequencer.bpm(),
                    self.sequencer.beat(),
                    self.error_msg.as_deref().unwrap_or(""),
                ),
            );
        });
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| self.render_canvas(ui, ctx));

        if self.show_about {
            self.render_about(ctx);
        }

        self.repaint.end_frame(ctx);
    }
}
