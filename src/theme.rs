//! App chrome — style, menu bar, status bar.

use egui::{Rounding, Stroke};

/// Apply the flat, square-cornered look to an egui context.
pub fn apply(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();
    style.visuals = egui::Visuals::light();
    style.visuals.window_rounding = Rounding::ZERO;
    style.visuals.menu_rounding = Rounding::ZERO;
    style.visuals.widgets.noninteractive.rounding = Rounding::ZERO;
    style.visuals.widgets.inactive.rounding = Rounding::ZERO;
    style.visuals.widgets.hovered.rounding = Rounding::ZERO;
    style.visuals.widgets.active.rounding = Rounding::ZERO;
    style.spacing.item_spacing = egui::vec2(6.0, 4.0);
    ctx.set_style(style);
}

/// Menu bar: white bg, 1px bottom border.
pub fn menu_bar<R>(
    ui: &mut egui::Ui,
    add_contents: impl FnOnce(&mut egui::Ui) -> R,
) -> egui::InnerResponse<R> {
    let frame_resp = egui::Frame::none()
        .fill(egui::Color32::WHITE)
        .inner_margin(egui::Margin::symmetric(4.0, 2.0))
        .show(ui, |ui| ui.horizontal(add_contents).inner);
    egui::InnerResponse {
        inner: frame_resp.inner,
        response: frame_resp.response,
    }
}

/// Status bar: white bg, 1px black top border.
pub fn status_bar(ui: &mut egui::Ui, text: &str) {
    egui::Frame::none()
        .fill(egui::Color32::WHITE)
        .stroke(Stroke::new(1.0, egui::Color32::BLACK))
        .inner_margin(egui::Margin::symmetric(8.0, 2.0))
        .show(ui, |ui| {
            ui.label(text);
        });
}
