//! subtlety: a manually-tiling, keyboard-driven X11 window manager core.
//!
//! This crate implements the window-management engine described in the
//! project specification: the client/tag/view/gravity/screen data model,
//! the tag matcher, gravity placement and tiling, the layering comparator,
//! the grab/keychain dispatcher, the event dispatcher, the focus engine and
//! the EWMH/ICCCM protocol surface. The X server itself, the user-script
//! interpreter and panel/font rendering are external collaborators: this
//! crate only specifies the interfaces it consumes from them (see
//! [`x::XConn`]).

pub mod builtin;
pub mod config;
pub mod core;
pub mod extensions;
pub mod pure;
pub mod x;

#[cfg(feature = "x11rb")]
pub mod x11rb;

pub use crate::core::{WindowManager, Xid};

/// The crate-wide error type.
///
/// Recoverable, per-client or per-request errors (a stale X window, a
/// malformed property) are logged and absorbed at the call site that owns
/// the policy decision; only failures that leave the window manager unable
/// to continue running propagate out of the main loop.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Could not establish or maintain the connection to the X server.
    #[error("unable to connect to the X display: {0}")]
    Display(String),

    /// The WM selection is already owned and the previous owner did not
    /// exit within the bounded retry window.
    #[error("WM_S{screen} is already owned and the previous owner did not exit")]
    SelectionTaken {
        /// The screen number whose selection is contested.
        screen: usize,
    },

    /// Startup configuration did not define any gravities.
    #[error("no gravities are defined: at least one is required")]
    NoGravities,

    /// Startup configuration did not define any tags beyond the default.
    #[error("no tags are defined: at least the default tag is required")]
    NoTags,

    /// A configuration value was missing, malformed, or referenced an
    /// object that does not exist.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A matcher, grab, or tag referenced a gravity that is not registered.
    #[error("unknown gravity: {0}")]
    UnknownGravity(String),

    /// A reference was made to a view that is not registered.
    #[error("unknown view: {0}")]
    UnknownView(String),

    /// A reference was made to a tag that is not registered.
    #[error("unknown tag: {0}")]
    UnknownTag(String),

    /// A lookup was attempted for a client window that the registry does
    /// not know about.
    #[error("unknown client window: {0:?}")]
    UnknownClient(Xid),

    /// A lookup was attempted for a screen index that is out of range.
    #[error("unknown screen index: {0}")]
    UnknownScreen(usize),

    /// An invalid regular expression was supplied to a matcher.
    #[error("invalid matcher regex: {0}")]
    Regex(#[from] regex::Error),

    /// An underlying X11 protocol error.
    #[error("X11 protocol error: {0}")]
    X11(String),

    /// A mock [`x::XConn`] method was called without a test implementation.
    #[cfg(test)]
    #[error("called an unimplemented mock XConn method")]
    UnimplementedMock,

    /// Wrapped I/O error, e.g. from spawning a program or watching a file.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapped TOML deserialization error from loading a config file.
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}

/// The crate-wide [`Result`] alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Install the default `tracing` subscriber, honoring `RUST_LOG` / the
/// `-l`/`-D` CLI flags. Intended to be called once from `main`.
pub fn init_logging(default_directive: &str) {
    use tracing_subscriber::{filter::EnvFilter, fmt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    fmt().with_env_filter(filter).compact().init();
}
