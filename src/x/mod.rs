//! Logic for interacting with the X server
use crate::{
    core::{bindings::KeyCode, indicator::Indicator, Visibility},
    pure::{
        geometry::Rect,
        topology::{Monitor, OutputInfo},
        ClientSet,
    },
    Result, Xid,
};
use tracing::{error, trace};

pub mod event;
pub mod mock;

pub use event::XEvent;
pub use mock::MockXConn;

/// On screen configuration options for X clients
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClientConfig {
    /// Absolute size and position on the screen as a [Rect]
    Position(Rect),
    /// Mark this window as stacking above all other windows
    StackTop,
}

/// A handle on a running X11 connection that we can use for issuing X requests.
///
/// XConn is the boundary between the window manager and the display server: everything that
/// gowm needs to query or ask of the X server goes through this trait, which keeps the rest
/// of the crate testable without a running X server.
pub trait XConn {
    /// The ID of the window manager root window.
    fn root(&self) -> Xid;

    /// Take ownership of the root window and subscribe to output change notifications
    /// where the server supports them.
    fn init(&self) -> Result<()>;

    /// The size of the full virtual screen.
    fn screen_size(&self) -> Result<Rect>;
    /// The geometry of each head reported by the legacy multi-monitor extension in the order
    /// that it reports them.
    fn screen_details(&self) -> Result<Vec<Rect>>;
    /// The connected and enabled outputs reported by the multi-output extension.
    fn output_details(&self) -> Result<Vec<OutputInfo>>;

    /// Every key code that produces the given keysym on the current keyboard.
    fn keycodes_for_keysym(&self, keysym: u32) -> Result<Vec<u8>>;
    /// Grab the specified key combinations, intercepting them for processing within
    /// the window manager itself.
    fn grab(&self, key_codes: &[KeyCode]) -> Result<()>;
    /// Release all key grabs held on the root window.
    fn ungrab(&self) -> Result<()>;

    /// Block and wait for the next event from the X server so it can be processed.
    fn next_event(&self) -> Result<XEvent>;
    /// Flush any pending requests to the X server.
    fn flush(&self);

    /// Map the given client window to the screen with its current geometry, making it visible.
    fn map(&self, client: Xid) -> Result<()>;
    /// Unmap the given client window from the screen, hiding it.
    fn unmap(&self, client: Xid) -> Result<()>;
    /// Forcibly kill the client owning the given window.
    fn kill(&self, client: Xid) -> Result<()>;
    /// Set X input focus to be held by the given window.
    fn focus(&self, client: Xid) -> Result<()>;
    /// Set the [ClientConfig] for a given client window.
    fn set_client_config(&self, client: Xid, data: &[ClientConfig]) -> Result<()>;
    /// Reposition the mouse cursor to the given (x, y) coordinates within the specified window.
    fn warp_pointer(&self, id: Xid, x: i16, y: i16) -> Result<()>;

    /// Create and map the always-on-top indicator window at the given position.
    fn create_indicator(&self, r: Rect) -> Result<Xid>;
    /// Clear the indicator window and draw the given label into it.
    fn draw_indicator(&self, id: Xid, label: &str) -> Result<()>;
    /// Destroy the indicator window and any drawing resources associated with it.
    fn destroy_indicator(&self, id: Xid) -> Result<()>;
}

/// Extended functionality for [XConn] impls in order to run the window manager.
pub trait XConnExt: XConn + Sized {
    /// Display a client on the screen at the given position, raised above its peers.
    fn reveal(&self, client: Xid, r: Rect, vis: &mut Visibility) -> Result<()> {
        self.set_client_config(client, &[ClientConfig::Position(r), ClientConfig::StackTop])?;
        self.map(client)?;
        vis.mapped.insert(client);

        Ok(())
    }

    /// Hide a client by unmapping it, recording that we should expect an unmap notification.
    ///
    /// Clients that we have not mapped are left alone.
    fn hide(&self, client: Xid, vis: &mut Visibility) -> Result<()> {
        if !vis.mapped.remove(&client) {
            return Ok(());
        }

        self.unmap(client)?;
        *vis.pending_unmap.entry(client).or_insert(0) += 1;

        Ok(())
    }

    /// Make what is on screen match the given [ClientSet].
    ///
    /// Every occupied workspace is visited: clients on the active workspace of their monitor
    /// are shown filling that monitor and all others are hidden. This is a full
    /// re-synchronisation rather than a diff against the previous state. The indicator is
    /// always repositioned and redrawn afterwards.
    fn apply_layout(
        &self,
        cs: &ClientSet,
        vis: &mut Visibility,
        indicator: Option<&Indicator>,
    ) -> Result<()> {
        for (ws, client) in cs.clients() {
            let m = cs.workspace_monitor(ws);

            if cs.active(m) == ws {
                let r = cs.monitors().rect(m);
                trace!(%client, %ws, ?m, ?r, "revealing client");
                self.reveal(client, r, vis)?;
            } else {
                trace!(%client, %ws, "hiding client");
                self.hide(client, vis)?;
            }
        }

        if let Some(indicator) = indicator {
            indicator.update(self, cs)?;
        }

        Ok(())
    }

    /// Give input focus to the client on the focused workspace, or the root window if the
    /// focused workspace is empty.
    fn focus_current(
        &self,
        cs: &ClientSet,
        vis: &mut Visibility,
        indicator: Option<&Indicator>,
    ) -> Result<()> {
        let client = match cs.focused_client() {
            Some(client) => client,
            None => return self.focus(self.root()),
        };

        self.set_client_config(client, &[ClientConfig::StackTop])?;
        self.map(client)?;
        vis.mapped.insert(client);
        self.focus(client)?;

        if let Some(indicator) = indicator {
            indicator.raise(self)?;
        }

        Ok(())
    }

    /// Warp the mouse cursor to the center of the given monitor.
    fn warp_pointer_to_monitor(&self, cs: &ClientSet, m: Monitor) -> Result<()> {
        let p = cs.monitors().rect(m).midpoint();
        trace!(?m, ?p, "warping pointer to monitor");

        self.warp_pointer(self.root(), p.x as i16, p.y as i16)
    }

    /// Forcibly kill every client in the given list, logging rather than returning errors so
    /// that one missing client does not prevent the others from being cleaned up.
    fn kill_all(&self, clients: &[Xid]) {
        for &client in clients {
            if let Err(e) = self.kill(client) {
                error!(%e, %client, "unable to kill client");
            }
        }
    }
}

// Auto impl XConnExt for all XConn impls
impl<T> XConnExt for T where T: XConn {}
