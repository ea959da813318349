//! # gowm: a minimal workspace window manager for X11
//!
//! gowm manages at most one visible client window per workspace. Nine workspaces are shared
//! between (at most) two physical outputs: the "main" output (typically the internal laptop
//! panel) and an "external" output. A fixed subset of the workspaces is bound to the external
//! output whenever one is connected and every other workspace lives on the main output.
//!
//! The crate is split the same way as the window manager itself:
//!
//!   - [pure] holds the data model and the assignment rules. Nothing in there talks to the
//!     X server, which makes it straightforward to test.
//!   - [x] describes what we need from the X server as the [XConn][x::XConn] trait, along
//!     with the layout logic that turns the pure state into X requests.
//!   - [core] holds the [WindowManager][core::WindowManager] event loop and the handlers for
//!     each event kind.
//!   - [x11rb] (behind the default `x11rb` feature) is the real backend.
#![warn(
    clippy::complexity,
    clippy::correctness,
    clippy::style,
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    rust_2018_idioms,
    rustdoc::all
)]

pub mod core;
pub mod pure;
pub mod util;
pub mod x;
#[cfg(feature = "x11rb")]
pub mod x11rb;

#[doc(inline)]
pub use crate::core::{Config, Outcome, State, WindowManager, Xid};

/// Error variants from the core gowm library.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An operation was attempted on a client that we are not tracking
    #[error("{0} is not a known client")]
    UnknownClient(Xid),

    /// A key in the command table could not be mapped to a key code on the current keyboard
    #[error("no key code is mapped to keysym {keysym:#x}")]
    UnknownKeysym {
        /// The keysym that we were unable to find
        keysym: u32,
    },

    /// Substructure redirection for the root window was refused by the X server
    #[error("unable to take ownership of the root window: is another window manager running?")]
    OtherWmRunning,

    /// A required X extension is not supported by the X server
    #[error("the X server does not support the {0} extension")]
    MissingExtension(&'static str),

    /// An IO error was encountered when spawning an external process
    #[error(transparent)]
    Io(#[from] std::io::Error),

    // Conditionally compiled error variants
    /// Unable to establish a connection to the X server
    #[cfg(feature = "x11rb")]
    #[error(transparent)]
    X11rbConnect(#[from] ::x11rb::errors::ConnectError),

    /// The connection to the X server broke
    #[cfg(feature = "x11rb")]
    #[error(transparent)]
    X11rbConnection(#[from] ::x11rb::errors::ConnectionError),

    /// Could not get a reply to an X request
    #[cfg(feature = "x11rb")]
    #[error(transparent)]
    X11rbReplyError(#[from] ::x11rb::errors::ReplyError),

    /// Could not get a reply to an X request or could not generate an id
    #[cfg(feature = "x11rb")]
    #[error(transparent)]
    X11rbReplyOrIdError(#[from] ::x11rb::errors::ReplyOrIdError),

    /// An error reported asynchronously by the X server
    #[cfg(feature = "x11rb")]
    #[error("X11 error: {0:?}")]
    X11rbX11Error(::x11rb::x11_utils::X11Error),
}

impl Error {
    /// Whether or not this error means that the event loop can not continue.
    ///
    /// Everything other than a broken connection to the X server is recoverable: the
    /// next event we receive will re-synchronise our state.
    pub fn is_fatal(&self) -> bool {
        match self {
            #[cfg(feature = "x11rb")]
            Error::X11rbConnect(_) | Error::X11rbConnection(_) => true,
            #[cfg(feature = "x11rb")]
            Error::X11rbReplyError(::x11rb::errors::ReplyError::ConnectionError(_)) => true,
            _ => false,
        }
    }
}

/// A Result where the error type is a gowm [Error]
pub type Result<T> = std::result::Result<T, Error>;
