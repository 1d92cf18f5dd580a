// src/lib.rs

//! Open one native window and present a software-rendered ARGB framebuffer
//! into it.
//!
//! - [`platform`]: the window lifecycle/event interface and its backends.
//! - [`renderer`]: the pixel buffer and the clear/draw/present protocol.
//! - [`event`]: the shared close-token and exit classification.
//! - [`app`] and [`config`]: the demo loop the binary runs.

pub mod app;
pub mod color;
pub mod config;
pub mod error;
pub mod event;
pub mod platform;
pub mod renderer;

pub use error::PlatformError;
pub use event::{CloseToken, PollStatus, WindowEvent};
pub use platform::{NativeSurface, PlatformWindow};
pub use renderer::{PixelBuffer, Renderer};
