//! The X event surface the dispatcher multiplexes over, narrowed to the
//! handful of event types this window manager actually reacts to.

use crate::core::Xid;
use crate::pure::Rect;

/// One event read off the X connection (or synthesized by an extension
/// watch / sublet socket becoming readable).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XEvent {
    /// Root window reconfigured: screen layout may have changed.
    ConfigureNotifyRoot,
    /// A client's geometry changed outside of our own request.
    ConfigureNotify { window: Xid, geom: Rect },
    /// A client asked to be repositioned/resized.
    ConfigureRequest {
        window: Xid,
        geom: Rect,
        value_mask: ConfigureValueMask,
    },
    /// The pointer entered a client window.
    EnterNotify { window: Xid },
    /// A not-yet-known window wants to be mapped.
    MapRequest { window: Xid },
    /// A known client (or tray icon) was destroyed.
    DestroyNotify { window: Xid },
    /// A known client (or tray icon) was unmapped.
    UnmapNotify { window: Xid },
    /// A ClientMessage arrived, targeting `window` with the given type atom
    /// and raw data words.
    ClientMessage {
        window: Xid,
        message_type: crate::x::Atom,
        data: [u32; 5],
    },
    /// A property changed on `window`; `atom` names which one.
    PropertyNotify {
        window: Xid,
        atom: crate::x::Atom,
    },
    /// `SelectionClear` fired for the selection named by `selection`.
    SelectionClear { selection: crate::x::Atom },
    /// A grabbed key was pressed.
    KeyPress { code: u32, state: u16 },
    /// A grabbed mouse button was pressed.
    ButtonPress { code: u32, state: u16, window: Xid },
    /// The pointer moved while a button drag was in progress.
    MotionNotify { x: i32, y: i32 },
    /// A grabbed mouse button was released.
    ButtonRelease,
    /// An extension watch fd (file or sublet socket) became readable.
    ExtensionReady { token: usize },
}

impl std::fmt::Display for XEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            XEvent::ConfigureNotifyRoot => "ConfigureNotifyRoot",
            XEvent::ConfigureNotify { .. } => "ConfigureNotify",
            XEvent::ConfigureRequest { .. } => "ConfigureRequest",
            XEvent::EnterNotify { .. } => "EnterNotify",
            XEvent::MapRequest { .. } => "MapRequest",
            XEvent::DestroyNotify { .. } => "DestroyNotify",
            XEvent::UnmapNotify { .. } => "UnmapNotify",
            XEvent::ClientMessage { .. } => "ClientMessage",
            XEvent::PropertyNotify { .. } => "PropertyNotify",
            XEvent::SelectionClear { .. } => "SelectionClear",
            XEvent::KeyPress { .. } => "KeyPress",
            XEvent::ButtonPress { .. } => "ButtonPress",
            XEvent::MotionNotify { .. } => "MotionNotify",
            XEvent::ButtonRelease => "ButtonRelease",
            XEvent::ExtensionReady { .. } => "ExtensionReady",
        };
        f.write_str(name)
    }
}

bitflags::bitflags! {
    /// Which fields of a `ConfigureRequest` the client actually supplied.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ConfigureValueMask: u8 {
        const X      = 0b0_0001;
        const Y      = 0b0_0010;
        const WIDTH  = 0b0_0100;
        const HEIGHT = 0b0_1000;
    }
}
