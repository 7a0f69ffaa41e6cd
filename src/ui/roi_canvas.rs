use anyhow::{anyhow, bail, ensure, Context, Result};
use tracing::{debug, error, info, trace, warn};

use egui::{Color32, CornerRadius, Stroke, StrokeKind, Vec2};

use super::ui_types::ClientEdit;

/// Draws the drag canvas for one client edit form and feeds pointer events
/// into its selector. The widget is laid out at the selector's exact canvas
/// size so pointer coordinates map 1:1 onto canvas pixels.
pub fn roi_canvas(ui: &mut egui::Ui, edit: &mut ClientEdit) {
    let (w, h) = edit.selector.canvas_size();
    let size = Vec2::new(w as f32, h as f32);

    let texture = match &edit.canvas_texture {
        Some(texture) => texture,
        None => {
            let image =
                egui::ColorImage::new([w as usize, h as usize], egui::Color32::from_gray(220));

            let texture = ui
                .ctx()
                .load_texture("roi_canvas", image, Default::default());

            edit.canvas_texture = Some(texture);

            edit.canvas_texture.as_ref().unwrap()
        }
    };

    let img = egui::Image::from_texture((texture.id(), size))
        .fit_to_exact_size(size)
        .max_size(size)
        .sense(egui::Sense::click_and_drag());

    let resp = ui.add(img);

    let rect = resp.rect;

    let local = |pos: egui::Pos2| {
        (
            (pos.x - rect.min.x) as f64,
            (pos.y - rect.min.y) as f64,
        )
    };

    if resp.drag_started() {
        if let Some(pos) = resp.interact_pointer_pos() {
            edit.selector.begin_drag(local(pos));
        }
    }

    if resp.dragged() {
        if let Some(pos) = resp.interact_pointer_pos() {
            edit.selector.update_drag(local(pos));
        }
    }

    // egui keeps pointer capture during a drag, so this also fires when the
    // button is released outside the widget.
    if resp.drag_stopped() {
        if let Some(pos) = resp.interact_pointer_pos() {
            edit.selector.end_drag(local(pos));
        }
    }

    if let Some(r) = edit.selector.rect() {
        let painter = ui.painter_at(rect);

        let min = rect.min + Vec2::new(r.x1.min(r.x2) as f32, r.y1.min(r.y2) as f32);
        let max = rect.min + Vec2::new(r.x1.max(r.x2) as f32, r.y1.max(r.y2) as f32);

        painter.rect_stroke(
            egui::Rect::from_min_max(min, max),
            CornerRadius::ZERO,
            Stroke::new(1.0, Color32::RED),
            StrokeKind::Middle,
        );
    }
}
