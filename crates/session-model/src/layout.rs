//! Screen regions for multi-camera layouts.
//!
//! All coordinates are normalized to `[0.0, 1.0]` range.

use serde::{Deserialize, Serialize};

/// A rectangular region of the output frame.
///
/// Coordinates are normalized: `(0.0, 0.0)` is top-left,
/// `(1.0, 1.0)` is bottom-right of the output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Left edge (normalized).
    pub x: f64,
    /// Top edge (normalized).
    pub y: f64,
    /// Width (normalized).
    pub w: f64,
    /// Height (normalized).
    pub h: f64,
}

/// Named slots a camera can occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Full,
    LeftHalf,
    RightHalf,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Slot {
    /// Overlay quadrants in assignment order.
    pub const OVERLAY_QUADRANTS: [Slot; 3] = [Slot::TopRight, Slot::BottomLeft, Slot::BottomRight];

    pub fn region(self) -> Region {
        match self {
            Self::Full => Region::FULL,
            Self::LeftHalf => Region::new(0.0, 0.0, 0.5, 1.0),
            Self::RightHalf => Region::new(0.5, 0.0, 0.5, 1.0),
            Self::TopRight => Region::new(0.5, 0.0, 0.5, 0.5),
            Self::BottomLeft => Region::new(0.0, 0.5, 0.5, 0.5),
            Self::BottomRight => Region::new(0.5, 0.5, 0.5, 0.5),
        }
    }
}

/// A region resolved to whole output pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// The whole frame.
    pub const FULL: Region = Region {
        x: 0.0,
        y: 0.0,
        w: 1.0,
        h: 1.0,
    };

    /// Create a new region, clamping values to valid range.
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            x: x.clamp(0.0, 1.0),
            y: y.clamp(0.0, 1.0),
            w: w.clamp(0.01, 1.0),
            h: h.clamp(0.01, 1.0),
        }
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        (self.x + self.w).min(1.0)
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        (self.y + self.h).min(1.0)
    }

    /// Area of the region (0.0 to 1.0).
    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    /// Whether two regions share any area.
    pub fn overlaps(&self, other: &Region) -> bool {
        const EPS: f64 = 1e-9;
        self.x < other.right() - EPS
            && other.x < self.right() - EPS
            && self.y < other.bottom() - EPS
            && other.y < self.bottom() - EPS
    }

    /// Resolve to pixels for an output of the given size.
    ///
    /// Dimensions are rounded down to even numbers because yuv420p
    /// encoders reject odd plane sizes.
    pub fn to_pixels(&self, out_w: u32, out_h: u32) -> PixelRect {
        let even = |v: f64| ((v.round() as u32) / 2 * 2).max(2);
        PixelRect {
            x: (self.x * out_w as f64).round() as u32,
            y: (self.y * out_h as f64).round() as u32,
            width: even(self.w * out_w as f64),
            height: even(self.h * out_h as f64),
        }
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::FULL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_quadrants_do_not_overlap_each_other() {
        let quads: Vec<Region> = Slot::OVERLAY_QUADRANTS.iter().map(|s| s.region()).collect();
        for (i, a) in quads.iter().enumerate() {
            for b in quads.iter().skip(i + 1) {
                assert!(!a.overlaps(b));
            }
            assert!(a.overlaps(&Region::FULL));
        }
    }

    #[test]
    fn test_halves_split_the_frame() {
        let left = Slot::LeftHalf.region();
        let right = Slot::RightHalf.region();
        assert!(!left.overlaps(&right));
        assert!((left.area() + right.area() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_to_pixels_keeps_even_dimensions() {
        let rect = Slot::BottomRight.region().to_pixels(1281, 721);
        assert_eq!(rect.x, 641);
        assert_eq!(rect.y, 361);
        assert_eq!(rect.width % 2, 0);
        assert_eq!(rect.height % 2, 0);

        let full = Region::FULL.to_pixels(1280, 960);
        assert_eq!((full.width, full.height), (1280, 960));
    }
}
