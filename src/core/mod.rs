//! Core data structures and user facing functionality for the window manager
use crate::{
    pure::{ClientSet, MainOutputRules, Monitor, Monitors, Rect},
    util::{Detached, Spawn},
    x::{XConn, XConnExt, XEvent},
    Result,
};
use nix::sys::signal::{signal, SigHandler, Signal};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::{
    collections::{HashMap, HashSet},
    fmt,
    ops::Deref,
};
use tracing::{debug, error, info, span, trace, Level};

pub mod bindings;
pub(crate) mod handle;
pub mod indicator;
pub mod topology;

use bindings::{KeyBindings, ModifierKey};
use indicator::Indicator;

/// An X11 ID for a given resource
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct Xid(pub(crate) u32);

impl fmt::Display for Xid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Deref for Xid {
    type Target = u32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<u32> for Xid {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// The compiled-in configuration for the window manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// The RandR output name that is always treated as the main monitor when connected
    pub main_output: String,
    /// Output name prefixes that identify an internal panel
    pub internal_prefixes: Vec<String>,
    /// Held for every binding
    pub primary_modifier: ModifierKey,
    /// Held in addition to the primary modifier for moving windows, killing and quitting
    pub secondary_modifier: ModifierKey,
    /// Program run on primary + `p`. No binding is made when this is `None`.
    pub launcher: Option<String>,
    /// Core X font used to draw the workspace indicator
    pub indicator_font: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            main_output: "eDP-1".to_string(),
            internal_prefixes: ["eDP", "LVDS", "DSI"].map(String::from).to_vec(),
            primary_modifier: ModifierKey::Ctrl,
            secondary_modifier: ModifierKey::Shift,
            launcher: Some("dmenu_run".to_string()),
            indicator_font: "fixed".to_string(),
        }
    }
}

impl Config {
    /// The rules used to pick out the main monitor from the connected outputs.
    pub fn main_output_rules(&self) -> MainOutputRules {
        MainOutputRules {
            name: self.main_output.clone(),
            internal_prefixes: self.internal_prefixes.clone(),
        }
    }
}

/// What the window manager believes the X server is currently displaying.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Visibility {
    pub(crate) mapped: HashSet<Xid>,
    pub(crate) pending_unmap: HashMap<Xid, usize>,
}

impl Visibility {
    /// Whether or not we last left the given client mapped.
    pub fn is_mapped(&self, client: Xid) -> bool {
        self.mapped.contains(&client)
    }

    /// The number of unmap notifications we are still expecting for the given client.
    pub fn pending_unmaps(&self, client: Xid) -> usize {
        self.pending_unmap.get(&client).copied().unwrap_or(0)
    }

    pub(crate) fn forget(&mut self, client: Xid) {
        self.mapped.remove(&client);
        self.pending_unmap.remove(&client);
    }
}

/// Mutable internal state for the window manager
#[derive(Debug)]
pub struct State {
    pub(crate) config: Config,
    pub(crate) client_set: ClientSet,
    pub(crate) vis: Visibility,
    pub(crate) indicator: Option<Indicator>,
    pub(crate) released: Vec<Xid>,
    pub(crate) running: bool,
}

impl State {
    /// The client set holding the workspace and monitor state.
    pub fn client_set(&self) -> &ClientSet {
        &self.client_set
    }

    /// The mapped / pending unmap bookkeeping for managed clients.
    pub fn visibility(&self) -> &Visibility {
        &self.vis
    }

    /// The workspace indicator, once it has been created.
    pub fn indicator(&self) -> Option<&Indicator> {
        self.indicator.as_ref()
    }

    /// Clients that were pushed out of a full workspace table. They are no longer shown but
    /// are still killed on shutdown.
    pub fn released(&self) -> &[Xid] {
        &self.released
    }

    /// The configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether or not the event loop should keep running.
    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// The effect that handling an event had on the window manager state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing changed
    Unchanged,
    /// Internal state changed but nothing on screen needs to be updated
    StateChanged,
    /// The layout was re-applied and focus reset, optionally warping the pointer to the
    /// center of a monitor
    Relayout {
        /// The monitor that now holds focus if it differs from before
        warp_to: Option<Monitor>,
    },
}

impl Outcome {
    /// Combine the outcomes of two handlers run back to back.
    pub fn and(self, other: Outcome) -> Outcome {
        use Outcome::*;

        match (self, other) {
            (Relayout { warp_to: a }, Relayout { warp_to: b }) => Relayout { warp_to: b.or(a) },
            (r @ Relayout { .. }, _) | (_, r @ Relayout { .. }) => r,
            (StateChanged, _) | (_, StateChanged) => StateChanged,
            _ => Unchanged,
        }
    }
}

/// A top level struct holding all of the state required to run as an X11 window manager.
pub struct WindowManager<X: XConn> {
    x: X,
    state: State,
    key_bindings: KeyBindings,
    spawner: Box<dyn Spawn>,
}

impl<X: XConn> fmt::Debug for WindowManager<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowManager")
            .field("state", &self.state)
            .field("key_bindings", &self.key_bindings)
            .field("spawner", &self.spawner)
            .finish()
    }
}

impl<X: XConn> WindowManager<X> {
    /// Construct a new [WindowManager] with the provided config and X connection.
    ///
    /// Key bindings are resolved against the current keyboard mapping at this point so an
    /// error is returned if any bound keysym has no key code.
    pub fn new(config: Config, x: X) -> Result<Self> {
        let key_bindings = KeyBindings::from_config(&config, &x)?;
        let monitors = topology::detect_monitors(&x, &config.main_output_rules())
            .unwrap_or_else(|| Monitors::single(Rect::default()));

        let state = State {
            config,
            client_set: ClientSet::new(monitors),
            vis: Visibility::default(),
            indicator: None,
            released: Vec::new(),
            running: false,
        };

        Ok(Self {
            x,
            state,
            key_bindings,
            spawner: Box::new(Detached),
        })
    }

    /// Replace the default [Spawn] implementation used to run the launcher.
    pub fn with_spawner<S: Spawn + 'static>(mut self, spawner: S) -> Self {
        self.spawner = Box::new(spawner);
        self
    }

    /// The current window manager state.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// The X connection in use.
    pub fn x(&self) -> &X {
        &self.x
    }

    /// Take ownership of the root window, create the indicator and grab our key bindings.
    ///
    /// This must be called before processing any events.
    pub fn init(&mut self) -> Result<()> {
        let x = &self.x;
        let state = &mut self.state;

        debug!("taking ownership of the root window");
        x.init()?;

        // ignore SIGCHILD and allow child / inherited processes to be inherited by pid1
        debug!("registering SIGCHILD signal handler");
        if let Err(e) = unsafe { signal(Signal::SIGCHLD, SigHandler::SigIgn) } {
            error!(%e, "unable to set signal handler");
        }

        topology::sync(x, &mut state.client_set, &state.config.main_output_rules());
        state.indicator = Some(Indicator::new(x, &state.client_set)?);

        debug!("grabbing key bindings");
        x.grab(&self.key_bindings.grabs())?;

        x.apply_layout(&state.client_set, &mut state.vis, state.indicator.as_ref())?;
        x.focus_current(&state.client_set, &mut state.vis, state.indicator.as_ref())?;
        x.flush();
        state.running = true;

        info!(monitors = ?state.client_set.monitors(), "gowm initialised");

        Ok(())
    }

    /// Start the window manager and run it until told to exit.
    ///
    /// Errors from handling individual events are logged and the loop continues: only
    /// losing the connection to the X server is fatal.
    pub fn run(mut self) -> Result<()> {
        self.init()?;

        let res = self.event_loop();
        self.shutdown();

        res
    }

    fn event_loop(&mut self) -> Result<()> {
        while self.state.running {
            let res = match self.x.next_event() {
                Ok(event) => self.handle_xevent(event),
                Err(e) => Err(e),
            };

            match res {
                Ok(_) => (),
                Err(e) if e.is_fatal() => {
                    error!(%e, "lost connection to the X server");
                    return Err(e);
                }
                Err(e) => error!(%e, "error handling event"),
            }

            self.x.flush();
        }

        Ok(())
    }

    /// Process a single [XEvent], applying any resulting layout changes.
    ///
    /// Key presses and map requests first re-check the monitor set up so that they are
    /// handled against the current topology.
    pub fn handle_xevent(&mut self, event: XEvent) -> Result<Outcome> {
        let span = span!(target: "gowm", Level::DEBUG, "XEvent", ?event);
        let _enter = span.enter();

        let x = &self.x;
        let state = &mut self.state;
        let rules = state.config.main_output_rules();

        let (synced, outcome) = match event {
            XEvent::TopologyChanged => (
                Outcome::Unchanged,
                handle::topology_changed(&rules, state, x)?,
            ),

            XEvent::KeyPress(code) => {
                let synced = handle::topology_changed(&rules, state, x)?;
                apply(synced, state, x)?;
                let spawner = &*self.spawner;
                let outcome = handle::keypress(code, &self.key_bindings, spawner, state, x)?;

                (synced, outcome)
            }

            XEvent::MapRequest(client) => {
                let synced = handle::topology_changed(&rules, state, x)?;
                apply(synced, state, x)?;

                (synced, handle::map_request(client, state, x)?)
            }

            XEvent::Destroy(client) => (Outcome::Unchanged, handle::destroy(client, state)),
            XEvent::UnmapNotify(client) => {
                (Outcome::Unchanged, handle::unmap_notify(client, state))
            }
            XEvent::Expose(id) => (Outcome::Unchanged, handle::expose(id, state, x)?),
        };

        apply(outcome, state, x)?;
        trace!(?synced, ?outcome, "event handled");

        Ok(synced.and(outcome))
    }

    /// Release everything that we hold on the X server: every tracked client is killed, the
    /// indicator is destroyed and our key grabs are released.
    pub fn shutdown(&mut self) {
        let mut clients = self.state.client_set.drain();
        clients.append(&mut self.state.released);
        info!(n_clients = clients.len(), "shutting down");
        self.x.kill_all(&clients);

        if let Some(indicator) = self.state.indicator.take() {
            if let Err(e) = indicator.destroy(&self.x) {
                error!(%e, "unable to destroy indicator");
            }
        }

        if let Err(e) = self.x.ungrab() {
            error!(%e, "unable to release key grabs");
        }

        self.state.vis = Visibility::default();
        self.state.running = false;
        self.x.flush();
    }
}

// Push the result of handling an event out to the X server
fn apply<X: XConn>(outcome: Outcome, state: &mut State, x: &X) -> Result<()> {
    if let Outcome::Relayout { warp_to } = outcome {
        let cs = &state.client_set;
        x.apply_layout(cs, &mut state.vis, state.indicator.as_ref())?;
        x.focus_current(cs, &mut state.vis, state.indicator.as_ref())?;

        if let Some(m) = warp_to {
            x.warp_pointer_to_monitor(cs, m)?;
        }
    }

    Ok(())
}
