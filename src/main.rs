//! tonepaint — a drawing toy that plays generative music as the canvas
//! fills up.

mod app;
mod audio;
mod canvas;
mod fill;
mod palette;
mod repaint;
mod sequencer;
mod theme;

use app::TonePaintApp;
use canvas::{CANVAS_HEIGHT, CANVAS_WIDTH};
use eframe::NativeOptions;

fn main() -> eframe::Result<()> {
    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            // canvas plus menu and status bars
            .with_inner_size([CANVAS_WIDTH as f32, CANVAS_HEIGHT as f32 + 72.0])
            .with_resizable(false)
            .with_title("tonepaint"),
        ..Default::default()
    };

    eframe::run_native(
        "tonepaint",
        options,
        Box::new(|cc| {
            theme::apply(&cc.egui_ctx);
            Box::new(TonePaintApp::new(cc))
        }),
    )
}
