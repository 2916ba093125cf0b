//! egui overlay: legend, AR controls and the hover tooltip.

use barchart::context::Tooltip;
use barchart::layout::LegendEntry;
use barchart::xr::XR_UNAVAILABLE_HINT;
use egui::{Align2, Color32, Context, RichText};

/// What the user asked for through the overlay this frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UiActions {
    pub toggle_ar: bool,
    pub reload: bool,
}

fn color32(rgb: [f32; 3]) -> Color32 {
    let [r, g, b] = rgb.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    Color32::from_rgb(r, g, b)
}

/// Top-left panel: data source, groups legend, AR button or hint.
pub fn draw_panel(
    ctx: &Context,
    source: &str,
    legend: &[LegendEntry],
    xr_supported: bool,
    presenting: bool,
) -> UiActions {
    let mut actions = UiActions::default();

    egui::Window::new("Population by group")
        .anchor(Align2::LEFT_TOP, [10.0, 10.0])
        .resizable(false)
        .collapsible(true)
        .show(ctx, |ui| {
            ui.label(RichText::new(source).small());
            if ui.small_button("Reload (F5)").clicked() {
                actions.reload = true;
            }

            ui.separator();
            ui.label(RichText::new("Groups").strong());
            for entry in legend {
                ui.horizontal(|ui| {
                    let (rect, _) =
                        ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
                    ui.painter().rect_filled(rect, 0.0, color32(entry.color));
                    ui.label(&entry.label);
                });
            }

            ui.separator();
            if xr_supported {
                let label = if presenting { "STOP AR" } else { "START AR" };
                if ui.button(label).clicked() {
                    actions.toggle_ar = true;
                }
                if presenting {
                    ui.label(RichText::new("Click to place the chart on the reticle.").small());
                }
            } else {
                ui.label(XR_UNAVAILABLE_HINT);
            }
        });

    actions
}

/// Dark floating label at the tooltip position (logical pixels).
pub fn draw_tooltip(ctx: &Context, tooltip: &Tooltip) {
    egui::Area::new(egui::Id::new("bar_tooltip"))
        .fixed_pos(egui::pos2(tooltip.position.x, tooltip.position.y))
        .interactable(false)
        .order(egui::Order::Tooltip)
        .show(ctx, |ui| {
            egui::Frame::none()
                .fill(Color32::from_rgba_unmultiplied(0, 0, 0, 179))
                .rounding(4.0)
                .inner_margin(egui::Margin::symmetric(8.0, 6.0))
                .show(ui, |ui| {
                    ui.label(RichText::new(&tooltip.title).strong().color(Color32::WHITE).size(12.0));
                    ui.label(RichText::new(&tooltip.body).color(Color32::WHITE).size(12.0));
                });
        });
}
