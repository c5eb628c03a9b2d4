//! Logic for interacting with the X server: the [XConn] trait is the sole
//! interface the core depends on, narrowed to the primitives this window
//! manager actually issues (no reparenting, no frame windows — the core
//! manages client windows directly).

pub mod atom;
pub mod event;
pub mod property;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockXConn, StubXConn};

pub use atom::Atom;
pub use event::XEvent;
pub use property::{MotifHints, Prop, Strut, WmHints, WmNormalHints, WmState};

use bitflags::bitflags;

use crate::core::Xid;
use crate::pure::{Point, Rect};
use crate::Result;

/// The subset of `XGetWindowAttributes` the core consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowAttributes {
    pub override_redirect: bool,
    pub geom: Rect,
}

bitflags! {
    /// Pointer-button grab masks. `click_to_focus` installs both via a
    /// bitwise-OR of press and release, rather than the `>` that would
    /// silently evaluate to zero and grab nothing.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ButtonMask: u8 {
        const PRESS   = 0b01;
        const RELEASE = 0b10;
    }
}

/// The primitive operations the core issues against the display. A
/// concrete connection (see [`crate::x11rb`]) implements this directly; a
/// [`mock::MockXConn`] stands in for tests.
pub trait XConn {
    /// The window manager's root window.
    fn root(&self) -> Result<Xid>;
    /// Physical output geometries, via Xrandr/Xinerama/single-screen
    /// fallback.
    fn screen_details(&self) -> Result<Vec<Rect>>;
    /// The current pointer position, and the client window (if any) it is
    /// over.
    fn pointer_location(&self) -> Result<(Point, Option<Xid>)>;

    /// Flush queued requests without waiting for a reply.
    fn flush(&self) -> Result<()>;
    /// Block until every queued request has been processed by the server.
    /// Called at well-defined join points: after a batch of property
    /// updates, screen configuration, or EWMH publication.
    fn sync(&self) -> Result<()>;
    /// Block for the next event, or a readable extension-watch fd.
    fn next_event(&self) -> Result<XEvent>;

    /// Grab a single `(code, state)` key combination on `window`.
    fn grab_key(&self, window: Xid, code: u32, state: u16) -> Result<()>;
    /// Release every key grab previously installed on `window`.
    fn ungrab_keys(&self, window: Xid) -> Result<()>;
    /// Grab a button combination with the given press/release mask.
    fn grab_button(&self, window: Xid, code: u32, state: u16, mask: ButtonMask) -> Result<()>;
    /// Release every button grab on `window`.
    fn ungrab_buttons(&self, window: Xid) -> Result<()>;
    /// Install the transient `AnyKey`/`AnyModifier` grab used while a
    /// keychain is armed.
    fn grab_any_key(&self, window: Xid) -> Result<()>;
    /// Grab the pointer and the server for the duration of an interactive
    /// drag.
    fn grab_pointer_and_server(&self) -> Result<()>;
    fn ungrab_pointer_and_server(&self) -> Result<()>;

    /// Every top-level window already present at startup (initial scan).
    fn existing_windows(&self) -> Result<Vec<Xid>>;
    fn window_attributes(&self, window: Xid) -> Result<WindowAttributes>;
    /// Install the standard client input event mask.
    fn set_input_mask(&self, window: Xid) -> Result<()>;
    fn add_to_save_set(&self, window: Xid) -> Result<()>;
    fn remove_from_save_set(&self, window: Xid) -> Result<()>;

    fn get_wm_class(&self, window: Xid) -> Result<Option<(String, String)>>;
    fn get_wm_name(&self, window: Xid) -> Result<Option<String>>;
    fn get_net_wm_name(&self, window: Xid) -> Result<Option<String>>;
    fn get_wm_window_role(&self, window: Xid) -> Result<Option<String>>;
    fn get_wm_client_leader(&self, window: Xid) -> Result<Option<Xid>>;
    fn get_wm_protocols(&self, window: Xid) -> Result<Vec<Atom>>;
    fn get_wm_normal_hints(&self, window: Xid) -> Result<Option<WmNormalHints>>;
    fn get_wm_hints(&self, window: Xid) -> Result<Option<WmHints>>;
    fn get_motif_hints(&self, window: Xid) -> Result<Option<MotifHints>>;
    fn get_net_wm_window_type(&self, window: Xid) -> Result<Vec<Atom>>;
    fn get_net_wm_state(&self, window: Xid) -> Result<Vec<Atom>>;
    fn get_net_wm_strut(&self, window: Xid) -> Result<Option<Strut>>;
    fn get_wm_transient_for(&self, window: Xid) -> Result<Option<Xid>>;
    fn get_xembed_info(&self, window: Xid) -> Result<Option<(u32, u32)>>;

    fn set_wm_state(&self, window: Xid, state: WmState) -> Result<()>;
    fn set_net_wm_state(&self, window: Xid, atoms: &[Atom]) -> Result<()>;
    fn set_net_wm_desktop(&self, window: Xid, idx: u32) -> Result<()>;
    fn set_net_frame_extents(&self, window: Xid, border: u32) -> Result<()>;
    fn set_cardinal_prop(&self, window: Xid, atom: Atom, values: &[u32]) -> Result<()>;
    fn set_string_prop(&self, window: Xid, atom: Atom, values: &[String]) -> Result<()>;
    fn set_window_prop(&self, window: Xid, atom: Atom, values: &[Xid]) -> Result<()>;
    /// Write an `ATOM[]`-typed property (e.g. `_NET_SUPPORTED`), distinct
    /// from [`XConn::set_cardinal_prop`] because a pager reading the wire
    /// type matters for EWMH compliance even though both marshal as u32s.
    fn set_atom_prop(&self, window: Xid, atom: Atom, values: &[Atom]) -> Result<()>;
    fn delete_property(&self, window: Xid, atom: Atom) -> Result<()>;

    fn map(&self, window: Xid) -> Result<()>;
    fn unmap(&self, window: Xid) -> Result<()>;
    fn configure(&self, window: Xid, geom: Rect) -> Result<()>;
    fn set_border_width(&self, window: Xid, px: u32) -> Result<()>;
    fn set_border_color(&self, window: Xid, pixel: u32) -> Result<()>;
    /// Restack `order` bottom-first via a single `XRestackWindows` call.
    fn restack(&self, order: &[Xid]) -> Result<()>;
    fn kill_client(&self, window: Xid) -> Result<()>;
    fn set_input_focus(&self, window: Xid) -> Result<()>;
    fn send_client_message(&self, window: Xid, message_type: Atom, data: [u32; 5]) -> Result<()>;
    /// Send a `WM_PROTOCOLS` ClientMessage naming `protocol` (e.g.
    /// `WM_DELETE_WINDOW`, `WM_TAKE_FOCUS`). Split out
    /// from [`XConn::send_client_message`] because encoding the protocol atom
    /// into `data[0]` needs the connection's own atom table, which the core
    /// never sees directly.
    fn send_protocol(&self, window: Xid, protocol: Atom) -> Result<()>;
    fn warp_pointer(&self, window: Xid, x: i32, y: i32) -> Result<()>;

    /// Claim `selection`, returning the previous owner window if it was
    /// already held.
    fn claim_selection(&self, selection: Atom, owner: Xid) -> Result<Option<Xid>>;
    fn selection_owner(&self, selection: Atom) -> Result<Option<Xid>>;

    /// `fork`/`exec` `/bin/sh -c command` via `setsid`, never blocking the
    /// caller beyond the fork itself.
    fn spawn(&self, command: &str) -> Result<()>;
}

/// Higher-level operations built purely from [XConn] primitives plus the
/// pure modules: the seam where `Registry`/`State` mutation and X side
/// effects meet.
pub trait XConnExt: XConn + Sized {
    /// Re-enumerate screens, recompute every screen's work area from strut
    /// clients, recompute the visibility caches, and arrange every alive
    /// client (`configure()`).
    fn configure_screens(
        &self,
        state: &mut crate::core::State,
        hooks: &crate::core::hooks::HookBus,
    ) -> Result<()> {
        crate::core::handle::configure_screens(self, state, hooks)
    }
}

impl<T> XConnExt for T where T: XConn {}
