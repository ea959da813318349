//! A small always-on-top window showing the number of the focused workspace.
use crate::{
    pure::{ClientSet, Rect},
    x::{ClientConfig, XConn},
    Result, Xid,
};
use tracing::trace;

/// The width and height of the indicator window in pixels.
pub const INDICATOR_SIZE: u32 = 16;

const LEFT_MARGIN: u32 = 4;
const BOTTOM_OFFSET: u32 = 18;

/// The workspace indicator window.
///
/// It lives in the bottom left corner of whichever monitor holds the focused workspace and
/// is kept above the client windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indicator {
    id: Xid,
}

impl Indicator {
    /// Create the indicator window and draw the current state into it.
    pub fn new<X: XConn>(x: &X, cs: &ClientSet) -> Result<Self> {
        let id = x.create_indicator(Self::placement(cs))?;
        let indicator = Self { id };
        indicator.update(x, cs)?;

        Ok(indicator)
    }

    /// The X window ID of the indicator.
    pub fn id(&self) -> Xid {
        self.id
    }

    /// Where the indicator should be for the given state.
    pub fn placement(cs: &ClientSet) -> Rect {
        let r = cs.monitors().rect(cs.focused_monitor());

        Rect::new(
            r.x + LEFT_MARGIN,
            (r.y + r.h).saturating_sub(BOTTOM_OFFSET),
            INDICATOR_SIZE,
            INDICATOR_SIZE,
        )
    }

    /// The text shown in the indicator: the one-based number of the focused workspace.
    pub fn label(cs: &ClientSet) -> String {
        cs.focused().to_string()
    }

    /// Move the indicator to the focused monitor, raise it and redraw it.
    pub fn update<X: XConn>(&self, x: &X, cs: &ClientSet) -> Result<()> {
        let r = Self::placement(cs);
        trace!(id = %self.id, ?r, "positioning indicator");
        x.set_client_config(self.id, &[ClientConfig::Position(r), ClientConfig::StackTop])?;

        self.redraw(x, cs)
    }

    /// Redraw the label without moving the window.
    pub fn redraw<X: XConn>(&self, x: &X, cs: &ClientSet) -> Result<()> {
        x.draw_indicator(self.id, &Self::label(cs))
    }

    /// Restack the indicator above everything else.
    pub fn raise<X: XConn>(&self, x: &X) -> Result<()> {
        x.set_client_config(self.id, &[ClientConfig::StackTop])
    }

    /// Destroy the indicator window.
    pub fn destroy<X: XConn>(self, x: &X) -> Result<()> {
        x.destroy_indicator(self.id)
    }
}
