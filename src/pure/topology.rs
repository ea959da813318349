//! The monitor table and the rules for deciding which physical output is which monitor.
//!
//! Two X extensions are involved in working out the current monitor set up and they do not
//! agree on how outputs are identified:
//!
//!   - RandR knows about named outputs, whether or not they are connected and which one the
//!     server considers to be primary. We use it to decide which output is the "main" one.
//!   - Xinerama gives a flat list of head geometries that matches what the server is
//!     actually displaying. We use it for the final monitor geometries.
//!
//! The two are bridged by geometry: the Xinerama head with the largest overlap with the
//! main RandR output becomes the main monitor.
use crate::pure::geometry::Rect;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::EnumIter;

/// The maximum number of monitors that we manage.
pub const N_MONITORS: usize = 2;

/// One of the (at most two) monitors that workspaces are bound to.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter)]
pub enum Monitor {
    /// The internal / primary output. This always exists.
    Main,
    /// The first other output, present only while a second usable output is detected.
    External,
}

impl Monitor {
    /// The index of this monitor in per-monitor tables.
    pub fn index(&self) -> usize {
        match self {
            Monitor::Main => 0,
            Monitor::External => 1,
        }
    }

    /// The monitor with the given index, if there is one.
    pub fn from_index(ix: usize) -> Option<Self> {
        match ix {
            0 => Some(Monitor::Main),
            1 => Some(Monitor::External),
            _ => None,
        }
    }
}

/// A connected and enabled output as reported by the RandR extension.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputInfo {
    /// The name the server uses for this output, e.g. "eDP-1" or "HDMI-2"
    pub name: String,
    /// The geometry of the CRTC driving this output
    pub r: Rect,
    /// Whether or not the server has declared this to be the primary output
    pub primary: bool,
}

/// How to identify the main output among the available RandR outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainOutputRules {
    /// An exact output name that always wins if present
    pub name: String,
    /// Name prefixes used by internal panels, consulted after the primary output flag
    pub internal_prefixes: Vec<String>,
}

impl MainOutputRules {
    /// Pick the geometry of the main output from the given outputs.
    ///
    /// In priority order: an exact name match, the server declared primary output, the first
    /// output whose name looks like an internal panel.
    pub fn main_output_rect(&self, outputs: &[OutputInfo]) -> Option<Rect> {
        let is_internal = |o: &&OutputInfo| {
            self.internal_prefixes
                .iter()
                .any(|p| o.name.starts_with(p.as_str()))
        };

        outputs
            .iter()
            .find(|o| o.name == self.name)
            .or_else(|| outputs.iter().find(|o| o.primary))
            .or_else(|| outputs.iter().find(is_internal))
            .map(|o| o.r)
    }
}

/// The current geometry of each monitor and how many of them there are.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Monitors {
    rects: [Rect; N_MONITORS],
    count: usize,
}

impl Monitors {
    /// A single monitor covering the given region.
    pub fn single(r: Rect) -> Self {
        Self {
            rects: [r, Rect::default()],
            count: 1,
        }
    }

    /// A main and external monitor.
    pub fn dual(main: Rect, external: Rect) -> Self {
        Self {
            rects: [main, external],
            count: 2,
        }
    }

    /// Work out the monitor table from the current server state.
    ///
    /// `screen` is the full virtual screen, `heads` the Xinerama head geometries in scan order
    /// and `outputs` the connected, enabled RandR outputs. Anything short of two heads means
    /// that we are running with a single monitor spanning the whole screen.
    pub fn resolve(
        screen: Rect,
        heads: &[Rect],
        outputs: &[OutputInfo],
        rules: &MainOutputRules,
    ) -> Self {
        if heads.len() < 2 {
            return Self::single(screen);
        }

        let main_ix = match rules.main_output_rect(outputs) {
            Some(main) => best_overlap(heads, &main),
            None => 0,
        };

        match heads.iter().enumerate().find(|&(i, _)| i != main_ix) {
            Some((_, &ext)) => Self::dual(heads[main_ix], ext),
            None => Self::single(screen),
        }
    }

    /// The number of monitors currently available.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether or not the given monitor currently exists.
    pub fn is_present(&self, m: Monitor) -> bool {
        m.index() < self.count
    }

    /// The geometry of the given monitor.
    ///
    /// Asking for a monitor that is not present returns the main monitor's geometry.
    pub fn rect(&self, m: Monitor) -> Rect {
        if self.is_present(m) {
            self.rects[m.index()]
        } else {
            self.rects[Monitor::Main.index()]
        }
    }

    /// Iterate over the monitors that are currently present.
    pub fn iter(&self) -> impl Iterator<Item = Monitor> + '_ {
        (0..self.count).filter_map(Monitor::from_index)
    }
}

// Index of the head with the largest overlap with `target`: the first one wins ties.
fn best_overlap(heads: &[Rect], target: &Rect) -> usize {
    let mut best = (0, None);

    for (i, h) in heads.iter().enumerate() {
        let area = h.overlap_area(target);
        if best.1.map_or(true, |a| area > a) {
            best = (i, Some(area));
        }
    }

    best.0
}
