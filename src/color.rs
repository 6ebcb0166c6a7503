//! RGB colour type with 8-bit alpha blending.
//!
//! Cells carry opaque [`Rgb`] colours. Transparency exists only at draw
//! time: overlay operations pass an alpha in `0..=255` and the result is
//! composited into the cell with [`Rgb::blend`].
//!
//! # Examples
//!
//! ```
//! use termglass::Rgb;
//!
//! let ruler = Rgb::new(40, 40, 40);
//! let over_white = Rgb::blend(ruler, 120, Rgb::WHITE);
//! assert!(over_white.r > ruler.r);
//! ```

use std::fmt;

/// Opaque 24-bit colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const GRAY: Self = Self::new(180, 180, 180);
    pub const YELLOW: Self = Self::new(255, 220, 0);
    pub const RED: Self = Self::new(220, 40, 40);
    pub const GREEN: Self = Self::new(40, 200, 120);
    pub const BLUE: Self = Self::new(60, 120, 220);

    /// Create a colour from 8-bit components.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Composite `top` over `bottom` with `alpha` in `0..=255`.
    ///
    /// `out = top * alpha + bottom * (1 - alpha)` per channel. Alpha 255 is a
    /// copy of `top`, alpha 0 leaves `bottom` untouched.
    #[must_use]
    pub fn blend(top: Self, alpha: u8, bottom: Self) -> Self {
        match alpha {
            255 => top,
            0 => bottom,
            a => {
                let a = u16::from(a);
                let ia = 255 - a;
                let mix = |t: u8, b: u8| ((u16::from(t) * a + u16::from(b) * ia) / 255) as u8;
                Self {
                    r: mix(top.r, bottom.r),
                    g: mix(top.g, bottom.g),
                    b: mix(top.b, bottom.b),
                }
            }
        }
    }

    /// Linearly interpolate towards `other`; `t` is clamped to `[0, 1]`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| {
            (f64::from(b) - f64::from(a))
                .mul_add(t, f64::from(a))
                .round()
                .clamp(0.0, 255.0) as u8
        };
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }

    /// Perceived brightness in `[0, 1]` (ITU-R BT.601 weights).
    #[must_use]
    pub fn luminance(self) -> f64 {
        (0.299 * f64::from(self.r) + 0.587 * f64::from(self.g) + 0.114 * f64::from(self.b))
            / 255.0
    }

    /// Convert to nearest 16-color (basic ANSI) palette index.
    ///
    /// Returns 0-7 for the normal colours and 8-15 for their bright versions.
    #[must_use]
    pub fn to_16_color(self) -> u8 {
        let r = i32::from(self.r);
        let g = i32::from(self.g);
        let b = i32::from(self.b);

        #[rustfmt::skip]
        const PALETTE: [(i32, i32, i32); 16] = [
            (0, 0, 0),       // 0 Black
            (128, 0, 0),     // 1 Red
            (0, 128, 0),     // 2 Green
            (128, 128, 0),   // 3 Yellow
            (0, 0, 128),     // 4 Blue
            (128, 0, 128),   // 5 Magenta
            (0, 128, 128),   // 6 Cyan
            (192, 192, 192), // 7 White
            (128, 128, 128), // 8 Bright Black
            (255, 0, 0),     // 9 Bright Red
            (0, 255, 0),     // 10 Bright Green
            (255, 255, 0),   // 11 Bright Yellow
            (0, 0, 255),     // 12 Bright Blue
            (255, 0, 255),   // 13 Bright Magenta
            (0, 255, 255),   // 14 Bright Cyan
            (255, 255, 255), // 15 Bright White
        ];

        let mut best_idx = 0;
        let mut min_dist = i32::MAX;
        for (i, &(pr, pg, pb)) in PALETTE.iter().enumerate() {
            let (dr, dg, db) = (r - pr, g - pg, b - pb);
            let dist = dr * dr + dg * dg + db * db;
            if dist < min_dist {
                min_dist = dist;
                best_idx = i;
            }
        }
        best_idx as u8
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}
