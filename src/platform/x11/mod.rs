// src/platform/x11/mod.rs
#![allow(non_snake_case)] // Allow non-snake case for X11 types

//! Xlib window backend.
//!
//! - `connection`: RAII wrappers for the display, the window and its GC.
//! - `surface`: the `XImage` view over the renderer's pixel buffer.
//!
//! Events are read with `XPending`/`XNextEvent` only while something is
//! already queued, translated to [`WindowEvent`]s and classified by the shared
//! [`drain_events`].

mod connection;
mod surface;

#[cfg(test)]
mod tests;

use crate::error::{PlatformError, Result};
use crate::event::{drain_events, CloseToken, PollStatus, WindowEvent};
use crate::platform::{validate_dimensions, PlatformWindow};
use crate::renderer::PixelBuffer;
use connection::{Connection, ManagedGc, ManagedWindow};
use libc::c_char;
use log::{debug, info, trace};
use std::ffi::CString;
use std::mem;
use x11::xlib;

pub use surface::X11Surface;

/// An open, mapped X11 window with its graphics context.
#[derive(Debug)]
pub struct X11Window {
    // Drop order: GC, window, connection.
    gc: ManagedGc,
    window: ManagedWindow,
    connection: Connection,
    wm_delete_window: xlib::Atom,
    width: u32,
    height: u32,
}

impl X11Window {
    /// Interns `WM_DELETE_WINDOW` and asks the window manager to deliver it as
    /// a client message instead of killing the connection.
    fn register_close_protocol(connection: &Connection, window: &ManagedWindow) -> Result<xlib::Atom> {
        let display = connection.display();
        // SAFETY: display is open and the name is NUL-terminated.
        let mut atom = unsafe {
            xlib::XInternAtom(
                display,
                b"WM_DELETE_WINDOW\0".as_ptr() as *const c_char,
                xlib::False,
            )
        };
        if atom == 0 {
            return Err(PlatformError::WindowCreation(
                "could not intern WM_DELETE_WINDOW".to_string(),
            ));
        }
        // SAFETY: window is live on this display; the array has exactly one atom.
        let status = unsafe { xlib::XSetWMProtocols(display, window.id(), &mut atom, 1) };
        if status == 0 {
            return Err(PlatformError::WindowCreation(
                "XSetWMProtocols failed for WM_DELETE_WINDOW".to_string(),
            ));
        }
        debug!("WM_PROTOCOLS (WM_DELETE_WINDOW = {}) registered.", atom);
        Ok(atom)
    }
}

impl PlatformWindow for X11Window {
    type Surface = X11Surface;

    fn open(width: u32, height: u32, title: &str) -> Result<Self> {
        validate_dimensions(width, height)?;
        info!("Opening X11 window '{}' ({}x{})", title, width, height);

        let title = CString::new(title).map_err(|_| {
            PlatformError::WindowCreation("window title contains a NUL byte".to_string())
        })?;

        let connection = Connection::open()?;
        let window = ManagedWindow::create(&connection, width, height)?;
        let display = connection.display();

        // SAFETY: display is open and window.id() is a live window on it.
        unsafe {
            xlib::XStoreName(display, window.id(), title.as_ptr());
            xlib::XSelectInput(display, window.id(), xlib::ExposureMask | xlib::KeyPressMask);
        }

        let wm_delete_window = Self::register_close_protocol(&connection, &window)?;
        let gc = ManagedGc::create(&connection, &window)?;

        // SAFETY: as above.
        unsafe {
            xlib::XMapWindow(display, window.id());
            xlib::XFlush(display);
        }
        info!("X11 window {} mapped", window.id());

        Ok(Self {
            gc,
            window,
            connection,
            wm_delete_window,
            width,
            height,
        })
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn close_token(&self) -> CloseToken {
        CloseToken::new(self.wm_delete_window as u64)
    }

    fn poll(&mut self) -> PollStatus {
        let connection = &self.connection;
        let queued = std::iter::from_fn(|| {
            if connection.pending() == 0 {
                return None;
            }
            let mut xevent: xlib::XEvent = unsafe { mem::zeroed() };
            // SAFETY: XPending reported a queued event, so XNextEvent returns
            // without waiting.
            unsafe { xlib::XNextEvent(connection.display(), &mut xevent) };
            Some(translate_event(&xevent))
        });
        drain_events(queued, self.close_token())
    }

    fn create_surface(&self, buffer: PixelBuffer) -> Result<X11Surface> {
        if buffer.width() != self.width || buffer.height() != self.height {
            return Err(PlatformError::Surface(format!(
                "buffer is {}x{} but the window is {}x{}",
                buffer.width(),
                buffer.height(),
                self.width,
                self.height
            )));
        }
        X11Surface::create(&self.connection, buffer)
    }

    fn blit(&self, surface: &X11Surface) {
        trace!("XPutImage {}x{} to window {}", surface.width(), surface.height(), self.window.id());
        // SAFETY: all handles are live; the image was built for this display's
        // default visual and its data buffer is owned by `surface`.
        unsafe {
            xlib::XPutImage(
                self.connection.display(),
                self.window.id(),
                self.gc.raw(),
                surface.image(),
                0,
                0,
                0,
                0,
                surface.width(),
                surface.height(),
            );
            xlib::XFlush(self.connection.display());
        }
    }
}

/// Maps a raw X event onto the three classes the application cares about.
fn translate_event(xevent: &xlib::XEvent) -> WindowEvent {
    match xevent.get_type() {
        xlib::KeyPress => WindowEvent::KeyPress,
        xlib::ClientMessage => {
            // SAFETY: the type tag says this union holds a client message.
            let client_message = unsafe { xevent.client_message };
            let payload = client_message.data.get_long(0) as xlib::Atom;
            WindowEvent::CloseRequest {
                token: CloseToken::new(payload as u64),
            }
        }
        other => {
            trace!("Ignoring X event type {}", other);
            WindowEvent::Other
        }
    }
}
