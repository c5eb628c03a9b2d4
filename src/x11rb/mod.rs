//! A concrete [`crate::x::XConn`] implementation backed by the `x11rb`
//! crate: a thin struct wrapping the connection plus an interned atom
//! table, with one inherent impl block for request plumbing and a trait
//! impl that is pure translation.

pub mod atom;
pub mod conn;

pub use conn::X11rbConn;

/// Errors specific to talking to the server through `x11rb`, folded into
/// [`crate::Error::X11`] at the call site via `.to_string()`.
#[derive(thiserror::Error, Debug)]
pub enum X11rbError {
    #[error(transparent)]
    Connect(#[from] ::x11rb::errors::ConnectError),

    #[error(transparent)]
    Connection(#[from] ::x11rb::errors::ConnectionError),

    #[error(transparent)]
    Reply(#[from] ::x11rb::errors::ReplyError),

    #[error(transparent)]
    ReplyOrId(#[from] ::x11rb::errors::ReplyOrIdError),

    #[error("neither RandR nor Xinerama is available on this display")]
    NoScreenBackend,

    #[error("selection owned by window {0}")]
    SelectionTaken(u32),
}

pub type Result<T> = std::result::Result<T, X11rbError>;

impl From<X11rbError> for crate::Error {
    fn from(e: X11rbError) -> Self {
        crate::Error::X11(e.to_string())
    }
}
