// src/renderer/pixel_buffer.rs

use crate::error::{PlatformError, Result};
use log::debug;
use std::alloc::{self, Layout};

/// Size of one packed ARGB pixel in bytes.
pub const BYTES_PER_PIXEL: usize = 4;

/// Row-major `width × height` array of packed ARGB pixels, zero-initialized.
///
/// Rows are tightly packed: the stride is `width * 4` bytes. The buffer is
/// moved into a native surface once and is freed only when that surface drops.
#[derive(Debug)]
pub struct PixelBuffer {
    pixels: Box<[u32]>,
    width: u32,
    height: u32,
}

/// Zeroed slice straight from the allocator, so untouched pages stay
/// unmapped. `None` if the layout is invalid or the allocator refuses.
fn allocate_zeroed(len: usize) -> Option<Box<[u32]>> {
    let layout = Layout::array::<u32>(len).ok()?;
    if layout.size() == 0 {
        return Some(Box::default());
    }
    // SAFETY: layout has non-zero size.
    let ptr = unsafe { alloc::alloc_zeroed(layout) } as *mut u32;
    if ptr.is_null() {
        return None;
    }
    // SAFETY: ptr came from the global allocator with the layout of a
    // `[u32; len]`, and all-zero bytes are valid `u32`s.
    let pixels = unsafe { Vec::from_raw_parts(ptr, len, len) };
    Some(pixels.into_boxed_slice())
}

impl PixelBuffer {
    /// Allocates a zeroed buffer, reporting failure instead of aborting.
    pub fn allocate(width: u32, height: u32) -> Result<Self> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .filter(|len| len.checked_mul(BYTES_PER_PIXEL).is_some())
            .ok_or_else(|| {
                PlatformError::Allocation(format!(
                    "{}x{} pixels overflows the address space",
                    width, height
                ))
            })?;

        let pixels = allocate_zeroed(len).ok_or_else(|| {
            PlatformError::Allocation(format!(
                "{}x{} pixels ({} bytes) could not be allocated",
                width,
                height,
                len * BYTES_PER_PIXEL
            ))
        })?;

        debug!(
            "Allocated {}x{} pixel buffer ({} bytes)",
            width,
            height,
            len * BYTES_PER_PIXEL
        );
        Ok(Self {
            pixels,
            width,
            height,
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

    /// Row stride in bytes.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    #[inline]
    pub fn as_slice(&self) -> &[u32] {
        &self.pixels
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Base address handed to native image constructors. Stable for the
    /// buffer's lifetime because the boxed slice is never reallocated.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut u32 {
        self.pixels.as_mut_ptr()
    }

    #[inline]
    pub fn as_ptr(&self) -> *const u32 {
        self.pixels.as_ptr()
    }
}
