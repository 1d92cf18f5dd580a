// src/event.rs

//! Backend-neutral event classification.
//!
//! Each backend translates its native queue entries into [`WindowEvent`]s and
//! hands the whole batch to [`drain_events`]. Keeping the exit decision in one
//! place is what makes the X11 and Win32 backends observably identical.

use log::trace;

/// Opaque value identifying a "please close this window" request.
///
/// On X11 this is the interned `WM_DELETE_WINDOW` atom; on Win32 it is the
/// message id returned by `RegisterWindowMessageW`. It is resolved once at
/// window creation and never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CloseToken(u64);

impl CloseToken {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// The only distinctions any backend makes about a queued event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    /// Any key was pressed.
    KeyPress,
    /// A close-protocol message carrying `token` as its payload.
    CloseRequest { token: CloseToken },
    /// Exposure, focus, mouse, foreign client messages, ...
    Other,
}

impl WindowEvent {
    /// Whether this event asks the application to stop.
    #[inline]
    pub fn requests_exit(&self, registered: CloseToken) -> bool {
        match *self {
            WindowEvent::KeyPress => true,
            WindowEvent::CloseRequest { token } => token == registered,
            WindowEvent::Other => false,
        }
    }
}

/// Result of one `poll`: whether the application loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollStatus {
    #[default]
    Continue,
    Exit,
}

impl PollStatus {
    #[inline]
    pub fn is_exit(self) -> bool {
        self == PollStatus::Exit
    }

    /// `Exit` wins.
    #[inline]
    pub fn merge(self, other: PollStatus) -> PollStatus {
        if self.is_exit() || other.is_exit() {
            PollStatus::Exit
        } else {
            PollStatus::Continue
        }
    }
}

/// Consumes every event in `events` and reports whether any of them requested exit.
///
/// The iterator is always run to completion, so a key press early in the batch
/// does not leave later entries sitting in the native queue.
pub fn drain_events<I>(events: I, registered: CloseToken) -> PollStatus
where
    I: IntoIterator<Item = WindowEvent>,
{
    events
        .into_iter()
        .fold(PollStatus::Continue, |status, event| {
            let verdict = if event.requests_exit(registered) {
                trace!("Event {:?} requests exit", event);
                PollStatus::Exit
            } else {
                trace!("Discarding event {:?}", event);
                PollStatus::Continue
            };
            status.merge(verdict)
        })
}
