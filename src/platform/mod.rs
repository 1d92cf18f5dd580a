// src/platform/mod.rs

//! Window lifecycle abstraction.
//!
//! One [`PlatformWindow`] implementation exists per target OS; the binary
//! uses whichever [`NativeWindow`] the build was configured for. The
//! headless backend is always compiled and drives the test suite.
//!
//! Lifecycle: `open` (the window is mapped as part of it) → any number of
//! `poll` / `blit` calls → `close`. `close` consumes the handle, so polling a
//! closed window or closing it twice does not compile.

use crate::error::Result;
use crate::event::{CloseToken, PollStatus};
use crate::renderer::PixelBuffer;
use log::{info, trace};

pub mod headless;
#[cfg(target_os = "linux")]
pub mod x11;
#[cfg(windows)]
pub mod win32;


#[cfg(target_os = "linux")]
pub type NativeWindow = x11::X11Window;
#[cfg(windows)]
pub type NativeWindow = win32::Win32Window;

/// A memory-backed native image view that owns the pixel buffer it wraps.
///
/// Writes through [`pixels_mut`](NativeSurface::pixels_mut) are what the next
/// blit shows; there is no intermediate copy. Dropping the surface releases the
/// native view and the buffer together.
pub trait NativeSurface {
    fn pixels(&self) -> &[u32];
    fn pixels_mut(&mut self) -> &mut [u32];
}

/// Capability interface every window backend implements.
pub trait PlatformWindow: Sized {
    type Surface: NativeSurface;

    /// Connects to the windowing system, creates the window with the given
    /// client size and title, registers the close protocol and shows it.
    ///
    /// On failure every sub-resource acquired so far has been released.
    fn open(width: u32, height: u32, title: &str) -> Result<Self>;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// The token close-request messages must carry to be honored.
    fn close_token(&self) -> CloseToken;

    /// Drains every event already queued, without waiting for new ones.
    ///
    /// Returns [`PollStatus::Exit`] if any drained event was a key press or a
    /// close request carrying [`close_token`](PlatformWindow::close_token).
    fn poll(&mut self) -> PollStatus;

    /// Wraps `buffer` in a native image view compatible with this window.
    ///
    /// The buffer moves into the surface; if construction fails it is freed
    /// before the error is returned.
    fn create_surface(&self, buffer: PixelBuffer) -> Result<Self::Surface>;

    /// Copies the whole surface onto the window's visible area.
    fn blit(&self, surface: &Self::Surface);

    /// Releases the drawing context, destroys the window and closes the
    /// connection, in that order.
    fn close(self) {
        info!("Closing {}x{} window", self.width(), self.height());
        drop(self);
    }
}

/// Closes `window` if there is one; an absent handle is a no-op.
pub fn close_window<W: PlatformWindow>(window: Option<W>) {
    match window {
        Some(window) => window.close(),
        None => trace!("close_window called without a window; nothing to release"),
    }
}

/// Rejects zero-sized windows before any native resource is touched.
pub(crate) fn validate_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(crate::error::PlatformError::WindowCreation(format!(
            "window dimensions must be positive, got {}x{}",
            width, height
        )));
    }
    Ok(())
}
