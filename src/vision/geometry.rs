// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Bounding boxes and the fixed-ratio eye search regions derived from them

use serde::{Deserialize, Serialize};

/// Horizontal inset applied to both sides of a face box
pub const EYE_SIDE_INSET: f64 = 0.1;
/// Inset from the top of a face box
pub const EYE_TOP_INSET: f64 = 0.2;
/// Inset from the bottom of a face box
pub const EYE_BOTTOM_INSET: f64 = 0.35;

/// Axis-aligned box in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box covering a whole `width` × `height` image
    pub fn at_origin(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Shift this box by an origin, e.g. from region-local to face-local coordinates
    pub fn translate(&self, dx: u32, dy: u32) -> Self {
        Self::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.width,
            self.height,
        )
    }

    /// Overlap of two boxes, `None` when they do not share any pixel
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right <= x || bottom <= y {
            return None;
        }

        Some(Rect::new(x, y, right - x, bottom - y))
    }

    /// Clip this box to a `width` × `height` image
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Rect> {
        self.intersect(&Rect::at_origin(width, height))
    }

    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

fn round_px(value: f64) -> u32 {
    value.round().max(0.0) as u32
}

/// Candidate search boxes for the left and right eye of a face.
///
/// Both boxes sit below the top inset and above the bottom inset, inside the
/// horizontal side insets; the left box starts at the side inset and the right
/// box at the horizontal midpoint. Coordinates are rounded to the nearest pixel.
pub fn eye_regions(face: &Rect) -> (Rect, Rect) {
    let (x, y) = (face.x as f64, face.y as f64);
    let (w, h) = (face.width as f64, face.height as f64);

    let width = round_px(w * (0.5 - EYE_SIDE_INSET));
    let height = round_px(h * (1.0 - EYE_TOP_INSET - EYE_BOTTOM_INSET));
    let top = round_px(y + h * EYE_TOP_INSET);

    let left = Rect::new(round_px(x + w * EYE_SIDE_INSET), top, width, height);
    let right = Rect::new(round_px(x + w * 0.5), top, width, height);

    (left, right)
}
