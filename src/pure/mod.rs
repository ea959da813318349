//! Side effect free management of internal window manager state
//!
//! Everything in this module operates on plain data: the X server is never consulted.
pub mod client_set;
pub mod geometry;
pub mod topology;

#[doc(inline)]
pub use client_set::{ClientSet, Displaced, Move, Placement, Ws, N_WORKSPACES};
#[doc(inline)]
pub use geometry::{Point, Rect};
#[doc(inline)]
pub use topology::{MainOutputRules, Monitor, Monitors, OutputInfo, N_MONITORS};
