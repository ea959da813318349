//! Querying the X server for the current monitor set up and folding it into the client set.
use crate::{
    pure::{ClientSet, MainOutputRules, Monitor, Monitors},
    x::XConn,
};
use bitflags::bitflags;
use strum::IntoEnumIterator;
use tracing::{debug, info, warn};

bitflags! {
    /// What changed as a result of a topology sync
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Changes: u8 {
        /// The number of monitors changed
        const COUNT    = 0b001;
        /// The geometry of at least one monitor changed
        const GEOMETRY = 0b010;
        /// The workspace displayed on at least one monitor changed
        const ACTIVE   = 0b100;
    }
}

/// Work out the current monitor table from the X server.
///
/// Failing extension queries degrade the result rather than failing it: without the legacy
/// head list we use the RandR output geometries directly and without RandR we have no way
/// of picking out the main output so the first head is used. `None` is only returned if
/// the size of the screen itself is unavailable.
pub fn detect_monitors<X: XConn>(x: &X, rules: &MainOutputRules) -> Option<Monitors> {
    let screen = match x.screen_size() {
        Ok(r) => r,
        Err(e) => {
            warn!(%e, "unable to fetch screen size");
            return None;
        }
    };

    let outputs = x.output_details().unwrap_or_else(|e| {
        debug!(%e, "output details unavailable");
        vec![]
    });

    let heads = x.screen_details().unwrap_or_else(|e| {
        debug!(%e, "screen details unavailable: falling back to output geometry");
        outputs.iter().map(|o| o.r).collect()
    });

    Some(Monitors::resolve(screen, &heads, &outputs, rules))
}

/// Refresh the monitor table held in `cs` and re-establish the workspace to monitor binding.
///
/// Returns the set of [Changes] so that callers can decide whether or not a relayout is
/// required.
pub fn sync<X: XConn>(x: &X, cs: &mut ClientSet, rules: &MainOutputRules) -> Changes {
    let monitors = match detect_monitors(x, rules) {
        Some(monitors) => monitors,
        None => return Changes::empty(),
    };

    let active_before: Vec<_> = Monitor::iter().map(|m| cs.active(m)).collect();
    let prev = cs.set_monitors(monitors);
    cs.reconcile_active_workspaces();
    let active_after: Vec<_> = Monitor::iter().map(|m| cs.active(m)).collect();

    let mut changes = Changes::empty();
    if prev.count() != monitors.count() {
        changes |= Changes::COUNT;
    }
    if prev.iter().any(|m| prev.rect(m) != monitors.rect(m)) {
        changes |= Changes::GEOMETRY;
    }
    if active_before != active_after {
        changes |= Changes::ACTIVE;
    }

    if changes.contains(Changes::COUNT) {
        info!(n_monitors = monitors.count(), ?monitors, "monitor count changed");
    } else if !changes.is_empty() {
        debug!(?changes, ?monitors, "monitor table updated");
    }

    changes
}
