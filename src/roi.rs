use anyhow::{anyhow, bail, ensure, Context, Result};
use tracing::{debug, error, info, trace, warn};

use serde::{Deserialize, Serialize};

/// A committed region of interest in canvas pixel coordinates.
///
/// Invariant when produced by a drag commit: x1 <= x2 and y1 <= y2.
/// Rects loaded from a persisted record are passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiRect {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl RoiRect {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        RoiRect { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }
}

/// Converts pointer drags over a fixed canvas into a clamped, normalized
/// rectangle. One instance per edit form; holds no toolkit types, so the
/// geometry can be driven directly from tests.
#[derive(Debug, Clone)]
pub struct RoiSelector {
    canvas_size: (f64, f64),
    drag_active: bool,
    anchor: (f64, f64),
    current: (f64, f64),
    rect: Option<RoiRect>,
}

impl RoiSelector {
    pub fn new(canvas_size: (f64, f64)) -> Self {
        RoiSelector {
            canvas_size,
            drag_active: false,
            anchor: (0., 0.),
            current: (0., 0.),
            rect: None,
        }
    }

    /// Resets to the given canvas bounds, dropping any rect and any
    /// in-progress drag.
    pub fn initialize(&mut self, canvas_size: (f64, f64)) {
        self.canvas_size = canvas_size;
        self.drag_active = false;
        self.rect = None;
    }

    pub fn canvas_size(&self) -> (f64, f64) {
        self.canvas_size
    }

    /// The four fields mirrored by the form. `None` means cleared.
    pub fn rect(&self) -> Option<RoiRect> {
        self.rect
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_active
    }

    /// Pointer coordinates can land outside the widget on fast drags, so
    /// every raw point is pulled back onto the nearest canvas boundary.
    pub fn clamp_point(&self, (x, y): (f64, f64)) -> (f64, f64) {
        (x.clamp(0., self.canvas_size.0), y.clamp(0., self.canvas_size.1))
    }

    /// Records the drag anchor. The mirrored fields keep their previous
    /// value until the first move arrives.
    pub fn begin_drag(&mut self, point: (f64, f64)) {
        let point = self.clamp_point(point);
        self.anchor = point;
        self.current = point;
        self.drag_active = true;
    }

    /// Live update while dragging. The fields get the raw anchor/current
    /// pair without reordering; normalization happens at commit.
    pub fn update_drag(&mut self, point: (f64, f64)) {
        if !self.drag_active {
            return;
        }
        self.current = self.clamp_point(point);
        self.rect = Some(RoiRect::new(
            self.anchor.0,
            self.anchor.1,
            self.current.0,
            self.current.1,
        ));
    }

    /// Finalizes the drag: component-wise min/max, floored to whole pixels.
    /// A zero-width or zero-height result is discarded and the fields
    /// cleared instead of committing a degenerate rect.
    pub fn end_drag(&mut self, point: (f64, f64)) {
        if !self.drag_active {
            return;
        }
        self.drag_active = false;
        self.current = self.clamp_point(point);

        let (ax, ay) = self.anchor;
        let (bx, by) = self.current;

        let x1 = ax.min(bx).floor();
        let y1 = ay.min(by).floor();
        let x2 = ax.max(bx).floor();
        let y2 = ay.max(by).floor();

        if x1 == x2 || y1 == y2 {
            self.rect = None;
        } else {
            self.rect = Some(RoiRect::new(x1, y1, x2, y2));
        }
    }

    /// Empties the fields and cancels any in-progress drag.
    pub fn clear(&mut self) {
        self.drag_active = false;
        self.rect = None;
    }

    /// Shows a persisted rect exactly as stored. The record is trusted:
    /// no clamping and no reordering. A missing rect clears instead.
    pub fn load_existing(&mut self, rect: Option<RoiRect>) {
        match rect {
            Some(rect) => {
                self.drag_active = false;
                self.rect = Some(rect);
            }
            None => self.clear(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector() -> RoiSelector {
        RoiSelector::new((640., 480.))
    }

    #[test]
    fn clamps_to_nearest_boundary() {
        let sel = selector();
        assert_eq!(sel.clamp_point((-50., 700.)), (0., 480.));
        assert_eq!(sel.clamp_point((9000., -1.)), (640., 0.));
        assert_eq!(sel.clamp_point((320., 240.)), (320., 240.));
        assert_eq!(sel.clamp_point((0., 0.)), (0., 0.));
    }

    #[test]
    fn commit_normalizes_to_min_max() {
        let mut sel = selector();
        sel.begin_drag((200., 60.));
        sel.update_drag((50., 10.));
        sel.end_drag((50., 10.));
        assert_eq!(sel.rect(), Some(RoiRect::new(50., 10., 200., 60.)));
    }

    #[test]
    fn swapped_y_scenario() {
        // anchor below release in y, left of it in x
        let mut sel = selector();
        sel.begin_drag((50., 60.));
        sel.update_drag((200., 10.));
        sel.end_drag((200., 10.));
        let rect = sel.rect().unwrap();
        assert_eq!(rect.x1, 50.);
        assert_eq!(rect.y1, 10.);
        assert_eq!(rect.x2, 200.);
        assert_eq!(rect.y2, 60.);
    }

    #[test]
    fn zero_width_drag_discarded() {
        let mut sel = selector();
        sel.begin_drag((100., 100.));
        sel.update_drag((100., 300.));
        sel.end_drag((100., 300.));
        assert_eq!(sel.rect(), None);
    }

    #[test]
    fn zero_height_drag_discarded() {
        let mut sel = selector();
        sel.begin_drag((100., 100.));
        sel.end_drag((300., 100.));
        assert_eq!(sel.rect(), None);
    }

    #[test]
    fn click_without_move_discarded() {
        let mut sel = selector();
        sel.begin_drag((42., 42.));
        sel.end_drag((42., 42.));
        assert_eq!(sel.rect(), None);
    }

    #[test]
    fn commit_floors_to_whole_pixels() {
        let mut sel = selector();
        sel.begin_drag((10.7, 20.9));
        sel.update_drag((200.3, 100.2));
        sel.end_drag((200.3, 100.2));
        assert_eq!(sel.rect(), Some(RoiRect::new(10., 20., 200., 100.)));
    }

    #[test]
    fn subpixel_drag_floors_to_zero_area() {
        let mut sel = selector();
        sel.begin_drag((10.2, 50.));
        sel.end_drag((10.8, 90.));
        assert_eq!(sel.rect(), None);
    }

    #[test]
    fn drag_outside_canvas_commits_on_boundary() {
        let mut sel = selector();
        sel.begin_drag((600., 400.));
        sel.update_drag((900., 600.));
        sel.end_drag((900., 600.));
        assert_eq!(sel.rect(), Some(RoiRect::new(600., 400., 640., 480.)));
    }

    #[test]
    fn live_fields_are_unordered() {
        let mut sel = selector();
        sel.begin_drag((200., 200.));
        sel.update_drag((50., 50.));
        assert_eq!(sel.rect(), Some(RoiRect::new(200., 200., 50., 50.)));
        assert!(sel.is_dragging());
    }

    #[test]
    fn begin_drag_keeps_previous_fields() {
        let mut sel = selector();
        sel.load_existing(Some(RoiRect::new(10., 20., 300., 240.)));
        sel.begin_drag((5., 5.));
        assert_eq!(sel.rect(), Some(RoiRect::new(10., 20., 300., 240.)));
    }

    #[test]
    fn clear_is_total_and_idempotent() {
        let mut sel = selector();
        sel.clear();
        assert_eq!(sel.rect(), None);

        sel.load_existing(Some(RoiRect::new(1., 2., 3., 4.)));
        sel.clear();
        assert_eq!(sel.rect(), None);
        sel.clear();
        assert_eq!(sel.rect(), None);
    }

    #[test]
    fn clear_cancels_drag() {
        let mut sel = selector();
        sel.begin_drag((10., 10.));
        sel.update_drag((100., 100.));
        sel.clear();
        assert!(!sel.is_dragging());
        assert_eq!(sel.rect(), None);

        // the cancelled drag must not finalize
        sel.end_drag((200., 200.));
        assert_eq!(sel.rect(), None);
    }

    #[test]
    fn load_existing_is_trusted_verbatim() {
        let mut sel = selector();
        sel.load_existing(Some(RoiRect::new(10., 20., 300., 240.)));
        assert_eq!(sel.rect(), Some(RoiRect::new(10., 20., 300., 240.)));

        // out of bounds and unordered values pass through untouched
        sel.load_existing(Some(RoiRect::new(900., 700., 5., 2.)));
        assert_eq!(sel.rect(), Some(RoiRect::new(900., 700., 5., 2.)));
    }

    #[test]
    fn load_existing_none_clears() {
        let mut sel = selector();
        sel.load_existing(Some(RoiRect::new(10., 20., 300., 240.)));
        sel.load_existing(None);
        assert_eq!(sel.rect(), None);
    }

    #[test]
    fn update_and_end_ignored_when_idle() {
        let mut sel = selector();
        sel.update_drag((100., 100.));
        assert_eq!(sel.rect(), None);
        sel.end_drag((200., 200.));
        assert_eq!(sel.rect(), None);
    }

    #[test]
    fn initialize_resets_state() {
        let mut sel = selector();
        sel.begin_drag((10., 10.));
        sel.update_drag((100., 100.));
        sel.initialize((320., 240.));
        assert!(!sel.is_dragging());
        assert_eq!(sel.rect(), None);
        assert_eq!(sel.canvas_size(), (320., 240.));
        assert_eq!(sel.clamp_point((1000., 1000.)), (320., 240.));
    }

    #[test]
    fn redraw_after_commit_replaces_rect() {
        let mut sel = selector();
        sel.begin_drag((10., 10.));
        sel.end_drag((100., 100.));
        assert_eq!(sel.rect(), Some(RoiRect::new(10., 10., 100., 100.)));

        sel.begin_drag((200., 200.));
        sel.update_drag((400., 300.));
        sel.end_drag((400., 300.));
        assert_eq!(sel.rect(), Some(RoiRect::new(200., 200., 400., 300.)));
    }
}
