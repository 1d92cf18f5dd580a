// src/platform/headless.rs

//! In-memory window backend.
//!
//! Nothing is shown anywhere: events come from a scripted queue, blits land in
//! a snapshot of the "visible" surface, and every simulated native resource is
//! recorded in a [`ResourceLedger`] so tests can prove a failed construction
//! released exactly what it had acquired.

use super::{validate_dimensions, NativeSurface, PlatformWindow};
use crate::error::{PlatformError, Result};
use crate::event::{drain_events, CloseToken, PollStatus, WindowEvent};
use crate::renderer::PixelBuffer;
use log::{debug, info, trace};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

/// Close token the headless backend registers unless told otherwise.
pub const HEADLESS_CLOSE_TOKEN: CloseToken = CloseToken::new(0x1D1);

/// Simulated native resources, mirroring what the real backends hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Connection,
    Window,
    DrawingContext,
    ImageView,
}

/// Construction steps at which a failure can be injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Connection,
    Window,
    CloseProtocol,
    DrawingContext,
    Surface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerAction {
    Acquired,
    Released,
}

/// Append-only record of simulated acquisitions and releases.
#[derive(Debug, Default)]
pub struct ResourceLedger {
    entries: RefCell<Vec<(Resource, LedgerAction)>>,
}

impl ResourceLedger {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    fn record(&self, resource: Resource, action: LedgerAction) {
        trace!("Ledger: {:?} {:?}", resource, action);
        self.entries.borrow_mut().push((resource, action));
    }

    fn count(&self, resource: Resource, action: LedgerAction) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|&&entry| entry == (resource, action))
            .count()
    }

    pub fn acquired(&self, resource: Resource) -> usize {
        self.count(resource, LedgerAction::Acquired)
    }

    pub fn released(&self, resource: Resource) -> usize {
        self.count(resource, LedgerAction::Released)
    }

    /// Resources acquired but not yet released.
    pub fn outstanding(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .fold(0isize, |n, (_, action)| match action {
                LedgerAction::Acquired => n + 1,
                LedgerAction::Released => n - 1,
            })
            .max(0) as usize
    }

    /// Releases in the order they happened.
    pub fn release_order(&self) -> Vec<Resource> {
        self.entries
            .borrow()
            .iter()
            .filter(|(_, action)| *action == LedgerAction::Released)
            .map(|(resource, _)| *resource)
            .collect()
    }
}

/// A simulated native handle; releases itself in the ledger on drop.
#[derive(Debug)]
struct Held {
    resource: Resource,
    ledger: Rc<ResourceLedger>,
}

impl Held {
    fn acquire(resource: Resource, ledger: &Rc<ResourceLedger>) -> Self {
        ledger.record(resource, LedgerAction::Acquired);
        Self {
            resource,
            ledger: Rc::clone(ledger),
        }
    }
}

impl Drop for Held {
    fn drop(&mut self) {
        self.ledger.record(self.resource, LedgerAction::Released);
    }
}

/// Knobs for [`HeadlessWindow::open_with`].
#[derive(Debug, Clone)]
pub struct HeadlessOptions {
    pub fail_at: Option<FailAt>,
    pub ledger: Rc<ResourceLedger>,
    pub close_token: CloseToken,
}

impl Default for HeadlessOptions {
    fn default() -> Self {
        Self {
            fail_at: None,
            ledger: ResourceLedger::new(),
            close_token: HEADLESS_CLOSE_TOKEN,
        }
    }
}

/// Window backend with no display behind it.
#[derive(Debug)]
pub struct HeadlessWindow {
    // Field order is release order.
    _drawing_context: Held,
    _window: Held,
    _connection: Held,
    width: u32,
    height: u32,
    title: String,
    close_token: CloseToken,
    fail_surface: bool,
    ledger: Rc<ResourceLedger>,
    events: VecDeque<WindowEvent>,
    visible: RefCell<Vec<u32>>,
    presents: Cell<usize>,
}

impl HeadlessWindow {
    pub fn open_with(width: u32, height: u32, title: &str, options: HeadlessOptions) -> Result<Self> {
        validate_dimensions(width, height)?;
        let HeadlessOptions {
            fail_at,
            ledger,
            close_token,
        } = options;
        let fails = |stage: FailAt| fail_at == Some(stage);

        if fails(FailAt::Connection) {
            return Err(PlatformError::Connection(
                "simulated: display unreachable".to_string(),
            ));
        }
        let connection = Held::acquire(Resource::Connection, &ledger);

        if fails(FailAt::Window) {
            return Err(PlatformError::WindowCreation(
                "simulated: window creation refused".to_string(),
            ));
        }
        let window = Held::acquire(Resource::Window, &ledger);

        if fails(FailAt::CloseProtocol) {
            return Err(PlatformError::WindowCreation(
                "simulated: close protocol could not be registered".to_string(),
            ));
        }

        if fails(FailAt::DrawingContext) {
            return Err(PlatformError::WindowCreation(
                "simulated: drawing context creation refused".to_string(),
            ));
        }
        let drawing_context = Held::acquire(Resource::DrawingContext, &ledger);

        info!(
            "Headless window '{}' opened at {}x{}",
            title, width, height
        );
        Ok(Self {
            _drawing_context: drawing_context,
            _window: window,
            _connection: connection,
            width,
            height,
            title: title.to_string(),
            close_token,
            fail_surface: fails(FailAt::Surface),
            ledger,
            events: VecDeque::new(),
            visible: RefCell::new(Vec::new()),
            presents: Cell::new(0),
        })
    }

    /// Queues an event for the next `poll`.
    pub fn push_event(&mut self, event: WindowEvent) {
        self.events.push_back(event);
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn ledger(&self) -> &Rc<ResourceLedger> {
        &self.ledger
    }

    /// What the last `blit` put on screen (empty before the first one).
    pub fn visible_surface(&self) -> Vec<u32> {
        self.visible.borrow().clone()
    }

    pub fn present_count(&self) -> usize {
        self.presents.get()
    }
}

impl PlatformWindow for HeadlessWindow {
    type Surface = HeadlessSurface;

    fn open(width: u32, height: u32, title: &str) -> Result<Self> {
        Self::open_with(width, height, title, HeadlessOptions::default())
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn close_token(&self) -> CloseToken {
        self.close_token
    }

    fn poll(&mut self) -> PollStatus {
        drain_events(self.events.drain(..), self.close_token)
    }

    fn create_surface(&self, buffer: PixelBuffer) -> Result<HeadlessSurface> {
        if self.fail_surface {
            return Err(PlatformError::Surface(
                "simulated: image view creation refused".to_string(),
            ));
        }
        if buffer.width() != self.width || buffer.height() != self.height {
            return Err(PlatformError::Surface(format!(
                "buffer is {}x{} but the window is {}x{}",
                buffer.width(),
                buffer.height(),
                self.width,
                self.height
            )));
        }
        let view = Held::acquire(Resource::ImageView, &self.ledger);
        debug!("Headless image view created over {}x{} buffer", self.width, self.height);
        Ok(HeadlessSurface {
            _view: view,
            buffer,
        })
    }

    fn blit(&self, surface: &HeadlessSurface) {
        let mut visible = self.visible.borrow_mut();
        visible.clear();
        visible.extend_from_slice(surface.buffer.as_slice());
        self.presents.set(self.presents.get() + 1);
        trace!("Headless blit #{}", self.presents.get());
    }
}

/// Image view over a [`PixelBuffer`]; dropping it frees both.
#[derive(Debug)]
pub struct HeadlessSurface {
    _view: Held,
    buffer: PixelBuffer,
}

impl NativeSurface for HeadlessSurface {
    fn pixels(&self) -> &[u32] {
        self.buffer.as_slice()
    }

    fn pixels_mut(&mut self) -> &mut [u32] {
        self.buffer.as_mut_slice()
    }
}
