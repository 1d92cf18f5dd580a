// src/error.rs

//! Construction-time failures reported by the window backends and the renderer.
//!
//! Every variant is fatal to the caller: the routine that returns it has
//! already released whatever it acquired before the failure point. Per-frame
//! operations (`clear`, `draw_rect`, `present`, `poll`) never produce these.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The display server / windowing subsystem could not be reached.
    #[error("failed to connect to the windowing system: {0}")]
    Connection(String),
    /// The window, its class, or one of its per-window resources could not be created.
    #[error("failed to create window: {0}")]
    WindowCreation(String),
    /// The pixel buffer could not be allocated.
    #[error("failed to allocate pixel buffer: {0}")]
    Allocation(String),
    /// The native image view could not be built over the pixel buffer.
    #[error("failed to create native image surface: {0}")]
    Surface(String),
}

pub type Result<T> = std::result::Result<T, PlatformError>;
