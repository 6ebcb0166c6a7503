//! Camera transform between world coordinates and screen cells.
//!
//! [`Viewport`] is an immutable value: every camera operation returns a new
//! viewport and leaves the original untouched. The main loop keeps the
//! current one and replaces it after each pan or zoom.
//!
//! The mapping reserves a fixed screen margin for the rulers (left ruler
//! width on x, one row on y):
//!
//! ```text
//! world  = offset + (screen - margin) / zoom
//! screen = floor((world - offset) * zoom + margin + eps)
//! ```
//!
//! # Examples
//!
//! ```
//! use termglass::Viewport;
//!
//! let vp = Viewport::new(80, 24).with_zoom(2.0);
//! let (wx, wy) = vp.screen_to_world(20, 10);
//! assert_eq!(vp.world_to_screen(wx, wy), (20, 10));
//!
//! // Zooming keeps the anchor under the same screen cell
//! let zoomed = vp.zoomed_around(wx, wy, 1.5);
//! assert_eq!(zoomed.world_to_screen(wx, wy), (20, 10));
//! ```

/// Tolerance added before flooring so exact integer coordinates never flip
/// to the cell below due to rounding.
pub const EPSILON: f64 = 1e-9;

/// Default zoom limits.
pub const DEFAULT_MIN_ZOOM: f64 = 0.1;
pub const DEFAULT_MAX_ZOOM: f64 = 40.0;

/// Immutable camera: zoom, pan offset, screen size and ruler margins.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    zoom: f64,
    offset_x: f64,
    offset_y: f64,
    screen_width: i32,
    screen_height: i32,
    margin_x: i32,
    margin_y: i32,
    min_zoom: f64,
    max_zoom: f64,
}

impl Viewport {
    /// Viewport at zoom 1 with world (0, 0) at the top-left map cell.
    #[must_use]
    pub fn new(screen_width: i32, screen_height: i32) -> Self {
        Self {
            zoom: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            screen_width: screen_width.max(1),
            screen_height: screen_height.max(1),
            margin_x: 4,
            margin_y: 1,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }

    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    #[must_use]
    pub fn offset_x(&self) -> f64 {
        self.offset_x
    }

    #[must_use]
    pub fn offset_y(&self) -> f64 {
        self.offset_y
    }

    /// Screen size in cells as `(width, height)`.
    #[must_use]
    pub fn screen_size(&self) -> (i32, i32) {
        (self.screen_width, self.screen_height)
    }

    /// Ruler margins in cells as `(x, y)`.
    #[must_use]
    pub fn margins(&self) -> (i32, i32) {
        (self.margin_x, self.margin_y)
    }

    /// Zoom limits as `(min, max)`.
    #[must_use]
    pub fn zoom_limits(&self) -> (f64, f64) {
        (self.min_zoom, self.max_zoom)
    }

    /// Same camera on a differently sized screen.
    #[must_use]
    pub fn with_screen_size(self, width: i32, height: i32) -> Self {
        Self {
            screen_width: width.max(1),
            screen_height: height.max(1),
            ..self
        }
    }

    /// Same camera with different ruler margins.
    #[must_use]
    pub fn with_margins(self, margin_x: i32, margin_y: i32) -> Self {
        Self {
            margin_x: margin_x.max(0),
            margin_y: margin_y.max(0),
            ..self
        }
    }

    /// Set the zoom range; the current zoom is clamped into it.
    ///
    /// Non-positive or inverted limits fall back to the defaults.
    #[must_use]
    pub fn with_zoom_limits(self, min: f64, max: f64) -> Self {
        let (min, max) = if min > 0.0 && min <= max && max.is_finite() {
            (min, max)
        } else {
            (DEFAULT_MIN_ZOOM, DEFAULT_MAX_ZOOM)
        };
        Self {
            min_zoom: min,
            max_zoom: max,
            zoom: self.zoom.clamp(min, max),
            ..self
        }
    }

    fn clamp_zoom(&self, zoom: f64) -> f64 {
        if zoom.is_nan() {
            return self.zoom;
        }
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    /// Map a screen cell to world coordinates (top-left corner of the cell).
    #[must_use]
    pub fn screen_to_world(&self, sx: i32, sy: i32) -> (f64, f64) {
        (
            self.offset_x + f64::from(sx - self.margin_x) / self.zoom,
            self.offset_y + f64::from(sy - self.margin_y) / self.zoom,
        )
    }

    /// Unfloored screen position of a world point.
    #[must_use]
    pub fn world_to_screen_exact(&self, wx: f64, wy: f64) -> (f64, f64) {
        (
            (wx - self.offset_x) * self.zoom + f64::from(self.margin_x),
            (wy - self.offset_y) * self.zoom + f64::from(self.margin_y),
        )
    }

    /// Screen cell containing a world point.
    #[must_use]
    pub fn world_to_screen(&self, wx: f64, wy: f64) -> (i32, i32) {
        let (sx, sy) = self.world_to_screen_exact(wx, wy);
        ((sx + EPSILON).floor() as i32, (sy + EPSILON).floor() as i32)
    }

    /// Integer world cell under a screen cell.
    #[must_use]
    pub fn world_cell_under_screen(&self, sx: i32, sy: i32) -> (i64, i64) {
        let (wx, wy) = self.screen_to_world(sx, sy);
        ((wx + EPSILON).floor() as i64, (wy + EPSILON).floor() as i64)
    }

    /// Pan by a world-space delta.
    #[must_use]
    pub fn panned(self, dx: f64, dy: f64) -> Self {
        Self {
            offset_x: self.offset_x + dx,
            offset_y: self.offset_y + dy,
            ..self
        }
    }

    /// Set the pan offset directly.
    #[must_use]
    pub fn with_offset(self, offset_x: f64, offset_y: f64) -> Self {
        Self {
            offset_x,
            offset_y,
            ..self
        }
    }

    /// Set the zoom (clamped); the offset is unchanged.
    #[must_use]
    pub fn with_zoom(self, zoom: f64) -> Self {
        Self {
            zoom: self.clamp_zoom(zoom),
            ..self
        }
    }

    /// Multiply the zoom by `factor` while keeping `(wx, wy)` at the same
    /// screen position.
    #[must_use]
    pub fn zoomed_around(self, wx: f64, wy: f64, factor: f64) -> Self {
        let new_zoom = self.clamp_zoom(self.zoom * factor);
        if new_zoom == self.zoom {
            return self;
        }
        let ratio = self.zoom / new_zoom;
        Self {
            zoom: new_zoom,
            offset_x: wx - (wx - self.offset_x) * ratio,
            offset_y: wy - (wy - self.offset_y) * ratio,
            ..self
        }
    }

    /// Set the zoom to `target` keeping the world point under screen cell
    /// `(sx, sy)` in place.
    #[must_use]
    pub fn reset_zoom_around_screen_point(self, sx: i32, sy: i32, target: f64) -> Self {
        let (wx, wy) = self.screen_to_world(sx, sy);
        let zoom = self.clamp_zoom(target);
        Self {
            zoom,
            offset_x: wx - f64::from(sx - self.margin_x) / zoom,
            offset_y: wy - f64::from(sy - self.margin_y) / zoom,
            ..self
        }
    }

    /// Screen centre cell.
    #[must_use]
    pub fn screen_center(&self) -> (i32, i32) {
        (self.screen_width / 2, self.screen_height / 2)
    }

    /// Pan so that `(wx, wy)` sits at the screen centre.
    #[must_use]
    pub fn centered_on(self, wx: f64, wy: f64) -> Self {
        let (cx, cy) = self.screen_center();
        Self {
            offset_x: wx - f64::from(cx - self.margin_x) / self.zoom,
            offset_y: wy - f64::from(cy - self.margin_y) / self.zoom,
            ..self
        }
    }

    /// World-space extent of the map area (screen minus rulers and status
    /// bar).
    #[must_use]
    pub fn visible_world_size(&self) -> (f64, f64) {
        let map_w = (self.screen_width - self.margin_x).max(1);
        let map_h = (self.screen_height - self.margin_y - 1).max(1);
        (f64::from(map_w) / self.zoom, f64::from(map_h) / self.zoom)
    }

    /// World units covered by one screen cell.
    #[must_use]
    pub fn world_per_cell(&self) -> f64 {
        1.0 / self.zoom
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(80, 24)
    }
}
