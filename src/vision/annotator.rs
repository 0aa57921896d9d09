// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Rectangle annotation over nested coordinate frames
//!
//! A [`Canvas`] is a window onto a shared RGB buffer. Annotating a box on a
//! canvas draws into the shared buffer and hands back a child canvas framed on
//! that box, so eye boxes drawn in face-local coordinates also show up in the
//! face image and the full photo.

use image::{imageops, GenericImageView, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;

use super::geometry::Rect;

/// Face outline colour (red)
pub const FACE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
/// Eye outline colour (green)
pub const EYE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
/// Stroke width for both outlines
pub const BOX_THICKNESS: u32 = 4;

pub struct Canvas<'a> {
    image: &'a mut RgbImage,
    frame: Rect,
}

impl<'a> Canvas<'a> {
    /// Canvas covering a whole working image
    pub fn new(image: &'a mut RgbImage) -> Self {
        let frame = Rect::at_origin(image.width(), image.height());
        Self { image, frame }
    }

    /// This canvas' window, in coordinates of the underlying buffer
    pub fn frame(&self) -> Rect {
        self.frame
    }

    pub fn width(&self) -> u32 {
        self.frame.width
    }

    pub fn height(&self) -> u32 {
        self.frame.height
    }

    /// Outline `rect` (canvas-local) and return a canvas framed on it.
    ///
    /// Strokes are clipped to this canvas. The returned canvas is clipped to
    /// this canvas' bounds as well.
    pub fn annotate(&mut self, rect: Rect, color: Rgb<u8>, thickness: u32) -> Canvas<'_> {
        let frame = self.frame;
        {
            let mut view = imageops::crop(
                &mut *self.image,
                frame.x,
                frame.y,
                frame.width,
                frame.height,
            );
            draw_box(&mut *view, rect, color, thickness);
        }

        let child = rect
            .clamp_to(frame.width, frame.height)
            .map(|r| r.translate(frame.x, frame.y))
            .unwrap_or(Rect::new(frame.x, frame.y, 0, 0));

        Canvas {
            image: &mut *self.image,
            frame: child,
        }
    }

    /// Copy of the pixels inside this canvas' window
    pub fn to_image(&self) -> RgbImage {
        self.image
            .view(self.frame.x, self.frame.y, self.frame.width, self.frame.height)
            .to_image()
    }
}

/// Stroke a rectangle outline centred on the box edges.
fn draw_box<C>(canvas: &mut C, rect: Rect, color: Rgb<u8>, thickness: u32)
where
    C: imageproc::drawing::Canvas<Pixel = Rgb<u8>>,
{
    if rect.is_empty() {
        return;
    }

    let outer = (thickness / 2) as i64;
    for step in 0..thickness as i64 {
        // grows outward for positive offsets, inward for negative
        let offset = outer - step;
        let width = rect.width as i64 + 2 * offset;
        let height = rect.height as i64 + 2 * offset;
        if width <= 0 || height <= 0 {
            continue;
        }

        let ring = imageproc::rect::Rect::at(
            (rect.x as i64 - offset) as i32,
            (rect.y as i64 - offset) as i32,
        )
        .of_size(width as u32, height as u32);
        draw_hollow_rect_mut(canvas, ring, color);
    }
}
