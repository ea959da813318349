//! Data types for working with X events
use crate::{core::bindings::KeyCode, Xid};

/// The X events that the window manager reacts to.
///
/// Anything else sent by the X server is dropped by the backend before it reaches us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XEvent {
    /// The output configuration of the X server has changed
    TopologyChanged,
    /// A grabbed key combination was pressed
    KeyPress(KeyCode),
    /// A client window is requesting to be positioned and rendered on the screen
    MapRequest(Xid),
    /// A client window has been closed
    Destroy(Xid),
    /// A client window has been unmapped
    UnmapNotify(Xid),
    /// Part or all of a window needs to be redrawn
    Expose(Xid),
}
