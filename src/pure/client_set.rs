//! The workspace registry and the rules for assigning workspaces and clients to monitors.
use crate::{
    core::Xid,
    pure::topology::{Monitor, Monitors, N_MONITORS},
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace, warn};

/// The number of workspaces.
pub const N_WORKSPACES: usize = 9;

/// The workspaces that are bound to the external monitor while one is connected.
pub const EXTERNAL_WORKSPACES: [usize; 3] = [0, 7, 8];

/// A workspace identifier in the range `0..N_WORKSPACES`.
///
/// Workspaces are displayed to the user as `1..=9`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ws(usize);

impl Ws {
    /// The workspace with the given index, if it is in range.
    pub fn new(ix: usize) -> Option<Self> {
        if ix < N_WORKSPACES {
            Some(Self(ix))
        } else {
            None
        }
    }

    /// The index of this workspace.
    pub fn index(&self) -> usize {
        self.0
    }

    /// Iterate over all workspaces in order.
    pub fn iter() -> impl Iterator<Item = Ws> {
        (0..N_WORKSPACES).map(Ws)
    }

    /// Whether or not this workspace is bound to the external monitor when one is present.
    pub fn is_external(&self) -> bool {
        EXTERNAL_WORKSPACES.contains(&self.0)
    }

    // Workspaces are statically partitioned so the first of each is always a valid fallback.
    fn first_where(pred: impl Fn(&Ws) -> bool) -> Ws {
        Ws::iter().find(pred).unwrap_or(Ws(0))
    }
}

impl fmt::Display for Ws {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0 + 1)
    }
}

/// What happened to the previous occupant of a workspace when a new client was routed to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Displaced {
    /// The previous occupant was moved to another (empty) workspace
    Moved(Xid, Ws),
    /// Every workspace was occupied: the previous occupant is no longer tracked
    Released(Xid),
}

/// The result of moving the focused client to another workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// The focused workspace was empty or already the target
    Unchanged,
    /// The client moved and focus followed it
    Moved {
        /// The monitor now holding focus if it differs from before
        warp_to: Option<Monitor>,
    },
}

/// Where a new client ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// The workspace now holding the new client
    pub ws: Ws,
    /// The client that previously occupied `ws`, if any
    pub displaced: Option<Displaced>,
}

/// The pure client state for the window manager: which client is held by each workspace,
/// which workspace is visible on each monitor and which workspace has focus.
///
/// Each client appears in at most one workspace slot.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSet {
    slots: [Option<Xid>; N_WORKSPACES],
    active: [Ws; N_MONITORS],
    focused: Ws,
    monitors: Monitors,
}

impl ClientSet {
    /// Create a new, empty [ClientSet] for the given monitor set up.
    pub fn new(monitors: Monitors) -> Self {
        let mut cs = Self {
            slots: [None; N_WORKSPACES],
            active: [Ws(0), Ws::first_where(Ws::is_external)],
            focused: Ws(0),
            monitors,
        };
        cs.reconcile_active_workspaces();

        cs
    }

    /// The current monitor table.
    pub fn monitors(&self) -> &Monitors {
        &self.monitors
    }

    /// Replace the monitor table, returning the previous one.
    ///
    /// Callers are expected to run [ClientSet::reconcile_active_workspaces] afterwards.
    pub fn set_monitors(&mut self, monitors: Monitors) -> Monitors {
        std::mem::replace(&mut self.monitors, monitors)
    }

    /// The client held by the given workspace, if any.
    pub fn client(&self, ws: Ws) -> Option<Xid> {
        self.slots[ws.0]
    }

    /// The client held by the focused workspace, if any.
    pub fn focused_client(&self) -> Option<Xid> {
        self.client(self.focused)
    }

    /// The workspace that currently has input focus.
    pub fn focused(&self) -> Ws {
        self.focused
    }

    /// The monitor holding the focused workspace.
    pub fn focused_monitor(&self) -> Monitor {
        self.workspace_monitor(self.focused)
    }

    /// The workspace currently displayed on the given monitor.
    pub fn active(&self, m: Monitor) -> Ws {
        self.active[m.index()]
    }

    /// Whether or not the given workspace is currently displayed on its monitor.
    pub fn is_visible(&self, ws: Ws) -> bool {
        self.active(self.workspace_monitor(ws)) == ws
    }

    /// The workspace currently holding the given client, found by linear scan.
    pub fn workspace_for_client(&self, client: Xid) -> Option<Ws> {
        Ws::iter().find(|&ws| self.slots[ws.0] == Some(client))
    }

    /// Whether or not the given client is held by any workspace.
    pub fn contains(&self, client: Xid) -> bool {
        self.workspace_for_client(client).is_some()
    }

    /// Iterate over all `(workspace, client)` pairs for occupied workspaces.
    pub fn clients(&self) -> impl Iterator<Item = (Ws, Xid)> + '_ {
        Ws::iter().filter_map(|ws| self.slots[ws.0].map(|c| (ws, c)))
    }

    /// The monitor that the given workspace is bound to under the current monitor count.
    ///
    /// Only external-bound workspaces are placed on the external monitor and only while
    /// it is present: everything else is on the main monitor.
    pub fn workspace_monitor(&self, ws: Ws) -> Monitor {
        if self.monitors.count() >= 2 && ws.is_external() {
            Monitor::External
        } else {
            Monitor::Main
        }
    }

    /// The first empty workspace bound to the given monitor.
    pub fn first_empty_for_monitor(&self, m: Monitor) -> Option<Ws> {
        Ws::iter().find(|&ws| self.workspace_monitor(ws) == m && self.slots[ws.0].is_none())
    }

    /// Re-establish that each monitor displays a workspace bound to it after the monitor
    /// count has changed.
    ///
    /// A monitor whose active workspace no longer belongs to it falls back to a fixed
    /// workspace: the first external-bound workspace for the external monitor and, for the
    /// main monitor, the focused workspace if that is now main-bound or the first main-bound
    /// workspace otherwise. Finally the focused workspace is made active on its monitor.
    ///
    /// Runs in a single pass and is idempotent.
    pub fn reconcile_active_workspaces(&mut self) {
        let main = Monitor::Main.index();
        let ext = Monitor::External.index();

        if self.workspace_monitor(self.active[main]) != Monitor::Main {
            let fallback = if self.workspace_monitor(self.focused) == Monitor::Main {
                self.focused
            } else {
                Ws::first_where(|&ws| self.workspace_monitor(ws) == Monitor::Main)
            };
            self.active[main] = fallback;
        }

        // Kept pointing at an external workspace while the external monitor is absent so
        // that the previous workspace comes back when it is reconnected.
        if !self.active[ext].is_external() {
            self.active[ext] = Ws::first_where(Ws::is_external);
        }

        let m = self.workspace_monitor(self.focused);
        self.active[m.index()] = self.focused;

        trace!(active = ?self.active, focused = %self.focused, "reconciled active workspaces");
    }

    /// Display the target workspace on its monitor and give it focus.
    ///
    /// Returns the monitor now holding focus if it differs from the previously focused one.
    pub fn switch_workspace(&mut self, target: Ws) -> Option<Monitor> {
        let prev = self.focused_monitor();
        let m = self.workspace_monitor(target);
        self.active[m.index()] = target;
        self.focused = target;

        if m != prev {
            Some(m)
        } else {
            None
        }
    }

    /// Move the client on the focused workspace to the target workspace, following it there.
    ///
    /// Any client already on the target is swapped into the focused workspace, which is then
    /// made visible on its own monitor (provided that is not the monitor now holding focus)
    /// so the displaced client stays reachable.
    ///
    /// Nothing changes if the focused workspace is empty or is the target.
    pub fn move_window_to_workspace(&mut self, target: Ws) -> Move {
        let src = self.focused;
        if target == src {
            return Move::Unchanged;
        }

        let client = match self.slots[src.0].take() {
            Some(client) => client,
            None => return Move::Unchanged,
        };
        let displaced = self.slots[target.0].take();
        self.slots[src.0] = displaced;
        self.slots[target.0] = Some(client);

        let src_mon = self.workspace_monitor(src);
        let warp_to = self.switch_workspace(target);

        if displaced.is_some() && src_mon != self.workspace_monitor(target) {
            self.active[src_mon.index()] = src;
        }

        debug!(%client, from = %src, to = %target, ?displaced, "moved client");

        Move::Moved { warp_to }
    }

    /// Choose a workspace for a newly mapped client and insert it there.
    ///
    /// The active workspace of the focused monitor is preferred, followed by the first empty
    /// workspace bound to that monitor. If none are empty the new client takes the active
    /// workspace and its previous occupant is moved to the first empty workspace anywhere,
    /// or released if every workspace is occupied.
    ///
    /// The chosen workspace becomes active on its monitor and focused.
    pub fn route_new_window(&mut self, client: Xid) -> Placement {
        if let Some(ws) = self.workspace_for_client(client) {
            self.switch_workspace(ws);
            return Placement {
                ws,
                displaced: None,
            };
        }

        let m = self.focused_monitor();
        let mut ws = self.active(m);

        if self.slots[ws.0].is_some() {
            if let Some(empty) = self.first_empty_for_monitor(m) {
                ws = empty;
            }
        }

        let displaced = match self.slots[ws.0].replace(client) {
            None => None,
            Some(prev) => match Ws::iter().find(|w| self.slots[w.0].is_none()) {
                Some(empty) => {
                    self.slots[empty.0] = Some(prev);
                    Some(Displaced::Moved(prev, empty))
                }
                None => {
                    warn!(client = %prev, %ws, "all workspaces occupied: releasing client");
                    Some(Displaced::Released(prev))
                }
            },
        };

        self.active[m.index()] = ws;
        self.focused = ws;

        Placement { ws, displaced }
    }

    /// Remove the client on the focused workspace, returning it.
    pub fn remove_focused(&mut self) -> Option<Xid> {
        self.slots[self.focused.0].take()
    }

    /// Remove a client from whichever workspace holds it, returning that workspace.
    pub fn remove_client(&mut self, client: Xid) -> Option<Ws> {
        let ws = self.workspace_for_client(client)?;
        self.slots[ws.0] = None;

        Some(ws)
    }

    /// Remove every client, returning them in workspace order.
    pub fn drain(&mut self) -> Vec<Xid> {
        self.slots.iter_mut().filter_map(Option::take).collect()
    }
}
