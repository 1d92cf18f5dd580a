// src/platform/x11/surface.rs
#![allow(non_snake_case)] // Allow non-snake case for X11 types

use super::connection::Connection;
use crate::error::{PlatformError, Result};
use crate::platform::NativeSurface;
use crate::renderer::PixelBuffer;
use libc::{c_char, c_int, c_uint};
use log::debug;
use std::ptr;
use x11::xlib;

const RED_MASK: libc::c_ulong = 0x00FF_0000;
const GREEN_MASK: libc::c_ulong = 0x0000_FF00;
const BLUE_MASK: libc::c_ulong = 0x0000_00FF;

/// Byte order of the pixels as the CPU writes them.
#[cfg(target_endian = "little")]
const HOST_BYTE_ORDER: c_int = xlib::LSBFirst;
#[cfg(target_endian = "big")]
const HOST_BYTE_ORDER: c_int = xlib::MSBFirst;

/// A ZPixmap `XImage` whose data pointer aliases the owned [`PixelBuffer`].
///
/// The image is a view, not a copy: pixel writes are picked up by the next
/// `XPutImage`. Xlib would `free()` the data on `XDestroyImage`, so the pointer
/// is detached first and the buffer is released by Rust in the same drop.
#[derive(Debug)]
pub struct X11Surface {
    image: *mut xlib::XImage,
    buffer: PixelBuffer,
}

impl X11Surface {
    pub(super) fn create(connection: &Connection, mut buffer: PixelBuffer) -> Result<Self> {
        let visual = connection.default_visual();
        if visual.is_null() {
            return Err(PlatformError::Surface(
                "screen has no default visual".to_string(),
            ));
        }
        check_visual(visual, connection.default_depth())?;

        let stride = c_int::try_from(buffer.stride()).map_err(|_| {
            PlatformError::Surface(format!("row stride {} exceeds Xlib limits", buffer.stride()))
        })?;

        // SAFETY: display and visual are live; the data pointer stays valid and
        // unmoved for as long as `buffer` lives, which is as long as the image.
        let image = unsafe {
            xlib::XCreateImage(
                connection.display(),
                visual,
                connection.default_depth() as c_uint,
                xlib::ZPixmap,
                0,
                buffer.as_mut_ptr() as *mut c_char,
                buffer.width(),
                buffer.height(),
                32,
                stride,
            )
        };
        if image.is_null() {
            return Err(PlatformError::Surface("XCreateImage returned null".to_string()));
        }

        let surface = Self { image, buffer };
        // SAFETY: image is non-null and exclusively owned by `surface`.
        unsafe {
            check_image_layout((*image).bits_per_pixel)?;
            // Describe the data as the CPU wrote it; XPutImage swaps if the
            // server's order differs.
            (*image).byte_order = HOST_BYTE_ORDER;
            xlib::XInitImage(image);
        }

        debug!(
            "XImage {:p} wraps {}x{} buffer at {:p}",
            image,
            surface.buffer.width(),
            surface.buffer.height(),
            surface.buffer.as_ptr()
        );
        Ok(surface)
    }

    #[inline]
    pub(super) fn image(&self) -> *mut xlib::XImage {
        self.image
    }

    #[inline]
    pub(super) fn width(&self) -> u32 {
        self.buffer.width()
    }

    #[inline]
    pub(super) fn height(&self) -> u32 {
        self.buffer.height()
    }
}

/// Packed `0x00RRGGBB` words can be handed to the server unchanged only on a
/// 24/32-bit TrueColor visual with the standard channel masks.
pub(super) fn check_visual(visual: *mut xlib::Visual, depth: c_int) -> Result<()> {
    // SAFETY: caller checked visual is non-null; it belongs to an open display.
    let (class, red, green, blue) = unsafe {
        (
            (*visual).class,
            (*visual).red_mask,
            (*visual).green_mask,
            (*visual).blue_mask,
        )
    };
    if class != xlib::TrueColor || !(depth == 24 || depth == 32) {
        return Err(PlatformError::Surface(format!(
            "unsupported visual: class {} depth {}",
            class, depth
        )));
    }
    if (red, green, blue) != (RED_MASK, GREEN_MASK, BLUE_MASK) {
        return Err(PlatformError::Surface(format!(
            "unsupported channel masks r={:#x} g={:#x} b={:#x}",
            red, green, blue
        )));
    }
    Ok(())
}

/// The server picks the ZPixmap pixel size; anything but 32 bits would
/// misread the buffer's rows.
pub(super) fn check_image_layout(bits_per_pixel: c_int) -> Result<()> {
    if bits_per_pixel != 32 {
        return Err(PlatformError::Surface(format!(
            "server lays out ZPixmap images at {} bits per pixel, need 32",
            bits_per_pixel
        )));
    }
    Ok(())
}

impl NativeSurface for X11Surface {
    fn pixels(&self) -> &[u32] {
        self.buffer.as_slice()
    }

    fn pixels_mut(&mut self) -> &mut [u32] {
        self.buffer.as_mut_slice()
    }
}

impl Drop for X11Surface {
    fn drop(&mut self) {
        debug!("Destroying XImage {:p}", self.image);
        // SAFETY: image came from XCreateImage and is destroyed only here. The
        // data pointer belongs to `buffer`, so it is detached before Xlib frees
        // the image structure.
        unsafe {
            (*self.image).data = ptr::null_mut();
            xlib::XDestroyImage(self.image);
        }
    }
}
