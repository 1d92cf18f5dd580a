// src/renderer/mod.rs

//! Software renderer: a CPU-side ARGB framebuffer presented through a native
//! image view.
//!
//! Frame protocol (not enforced): `clear` → `draw_rect`* → `present`.

mod pixel_buffer;

#[cfg(test)]
mod tests;

pub use pixel_buffer::{PixelBuffer, BYTES_PER_PIXEL};

use crate::error::Result;
use crate::platform::{NativeSurface, PlatformWindow};
use log::{debug, info, trace};

/// Draws into a pixel buffer owned by a `W::Surface` and blits it to a `W`.
///
/// Width and height are copied from the window at [`create`](Renderer::create)
/// and never re-read. The renderer does not own any window handle.
pub struct Renderer<W: PlatformWindow> {
    width: u32,
    height: u32,
    surface: W::Surface,
}

impl<W: PlatformWindow> Renderer<W> {
    /// Allocates a zeroed buffer the size of `window` and wraps it in a native
    /// image view. If the view cannot be built, the buffer is freed before the
    /// error is returned.
    pub fn create(window: &W) -> Result<Self> {
        let width = window.width();
        let height = window.height();
        let buffer = PixelBuffer::allocate(width, height)?;
        let surface = window.create_surface(buffer)?;
        info!("Renderer created ({}x{})", width, height);
        Ok(Self {
            width,
            height,
            surface,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The whole buffer, row-major.
    #[inline]
    pub fn pixels(&self) -> &[u32] {
        self.surface.pixels()
    }

    /// The pixel at `(x, y)`, or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels()
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Sets every pixel to `color`.
    pub fn clear(&mut self, color: u32) {
        self.surface.pixels_mut().fill(color);
    }

    /// Fills `[x, x+w) × [y, y+h)` with `color`, clipped to the buffer.
    ///
    /// Non-positive sizes and rectangles entirely off the buffer touch nothing.
    pub fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u32) {
        if w <= 0 || h <= 0 {
            return;
        }
        // i64 so that x + w cannot overflow.
        let x0 = i64::from(x).max(0);
        let y0 = i64::from(y).max(0);
        let x1 = (i64::from(x) + i64::from(w)).min(i64::from(self.width));
        let y1 = (i64::from(y) + i64::from(h)).min(i64::from(self.height));
        if x0 >= x1 || y0 >= y1 {
            trace!("draw_rect({}, {}, {}, {}) is entirely clipped", x, y, w, h);
            return;
        }

        let (x0, x1) = (x0 as usize, x1 as usize);
        let (y0, y1) = (y0 as usize, y1 as usize);
        let stride = self.width as usize;
        for row in self
            .surface
            .pixels_mut()
            .chunks_exact_mut(stride)
            .skip(y0)
            .take(y1 - y0)
        {
            row[x0..x1].fill(color);
        }
    }

    /// Copies the buffer onto the window. Call after the frame's drawing and
    /// before the next `clear`.
    pub fn present(&self, window: &W) {
        window.blit(&self.surface);
    }

    /// Releases the image view, and with it the buffer.
    pub fn destroy(self) {
        debug!("Destroying {}x{} renderer", self.width, self.height);
        drop(self);
    }
}
