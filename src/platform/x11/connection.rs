// src/platform/x11/connection.rs
#![allow(non_snake_case)] // Allow non-snake case for X11 types

//! RAII wrappers for the Xlib resources a window holds.
//!
//! Each wrapper releases exactly one resource when dropped. `X11Window`
//! declares them so that the graphics context goes first, then the window,
//! then the display connection; a constructor that bails out with `?`
//! releases whatever was already wrapped in that same order.

use crate::error::{PlatformError, Result};
use libc::c_int;
use log::{debug, info, warn};
use std::ptr;
use x11::xlib;

/// An open connection to the X server, closed on drop.
#[derive(Debug)]
pub(super) struct Connection {
    display: *mut xlib::Display,
    screen: c_int,
}

impl Connection {
    /// Opens the display named by `DISPLAY`.
    pub(super) fn open() -> Result<Self> {
        // SAFETY: a null name tells Xlib to read the DISPLAY environment variable.
        let display = unsafe { xlib::XOpenDisplay(ptr::null()) };
        if display.is_null() {
            let name = std::env::var("DISPLAY").unwrap_or_else(|_| "<unset>".to_string());
            return Err(PlatformError::Connection(format!(
                "XOpenDisplay failed for DISPLAY={}. Is an X server running?",
                name
            )));
        }
        // SAFETY: display is non-null and open.
        let screen = unsafe { xlib::XDefaultScreen(display) };
        info!("X display opened: {:p}, default screen {}", display, screen);
        Ok(Self { display, screen })
    }

    #[inline]
    pub(super) fn display(&self) -> *mut xlib::Display {
        self.display
    }

    #[inline]
    pub(super) fn screen(&self) -> c_int {
        self.screen
    }

    pub(super) fn root(&self) -> xlib::Window {
        // SAFETY: display is open for the lifetime of self.
        unsafe { xlib::XRootWindow(self.display, self.screen) }
    }

    pub(super) fn default_visual(&self) -> *mut xlib::Visual {
        // SAFETY: display is open for the lifetime of self.
        unsafe { xlib::XDefaultVisual(self.display, self.screen) }
    }

    pub(super) fn default_depth(&self) -> c_int {
        // SAFETY: display is open for the lifetime of self.
        unsafe { xlib::XDefaultDepth(self.display, self.screen) }
    }

    /// Number of events already read or buffered; never blocks.
    pub(super) fn pending(&self) -> c_int {
        // SAFETY: display is open for the lifetime of self.
        unsafe { xlib::XPending(self.display) }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        info!("Closing X11 display connection: {:p}", self.display);
        // SAFETY: the pointer came from a successful XOpenDisplay and is closed only here.
        let status = unsafe { xlib::XCloseDisplay(self.display) };
        if status != 0 {
            warn!(
                "XCloseDisplay returned non-zero status: {}. Display may not have closed cleanly.",
                status
            );
        }
    }
}

/// A created X window, destroyed on drop.
#[derive(Debug)]
pub(super) struct ManagedWindow {
    display: *mut xlib::Display,
    id: xlib::Window,
}

impl ManagedWindow {
    /// Creates a simple top-level window; it stays unmapped until the caller maps it.
    pub(super) fn create(connection: &Connection, width: u32, height: u32) -> Result<Self> {
        let display = connection.display();
        let screen = connection.screen();
        // SAFETY: display is open; root, black and white pixels come from the same screen.
        let id = unsafe {
            xlib::XCreateSimpleWindow(
                display,
                connection.root(),
                0,
                0,
                width,
                height,
                1,
                xlib::XBlackPixel(display, screen),
                xlib::XWhitePixel(display, screen),
            )
        };
        if id == 0 {
            return Err(PlatformError::WindowCreation(
                "XCreateSimpleWindow returned no window".to_string(),
            ));
        }
        debug!("X window created (ID: {}), size {}x{}", id, width, height);
        Ok(Self { display, id })
    }

    #[inline]
    pub(super) fn id(&self) -> xlib::Window {
        self.id
    }
}

impl Drop for ManagedWindow {
    fn drop(&mut self) {
        debug!("Destroying X window {}", self.id);
        // SAFETY: the window was created on this display, which outlives it.
        unsafe {
            xlib::XDestroyWindow(self.display, self.id);
        }
    }
}

/// A graphics context bound to one window, freed on drop.
#[derive(Debug)]
pub(super) struct ManagedGc {
    display: *mut xlib::Display,
    gc: xlib::GC,
}

impl ManagedGc {
    pub(super) fn create(connection: &Connection, window: &ManagedWindow) -> Result<Self> {
        let display = connection.display();
        // SAFETY: display is open and window.id() is a live window on it.
        let gc = unsafe { xlib::XCreateGC(display, window.id(), 0, ptr::null_mut()) };
        if gc.is_null() {
            return Err(PlatformError::WindowCreation(
                "XCreateGC returned null".to_string(),
            ));
        }
        debug!("Graphics context created: {:p}", gc);
        Ok(Self { display, gc })
    }

    #[inline]
    pub(super) fn raw(&self) -> xlib::GC {
        self.gc
    }
}

impl Drop for ManagedGc {
    fn drop(&mut self) {
        debug!("Freeing graphics context {:p}", self.gc);
        // SAFETY: the GC was created on this display, which outlives it.
        unsafe {
            xlib::XFreeGC(self.display, self.gc);
        }
    }
}
