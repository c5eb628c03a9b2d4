//! The fixed atom table interned at startup: every EWMH/ICCCM atom this
//! window manager reads or writes, plus the private `SUBTLE_*` properties
//! it publishes for the panel and sublet extensions.

use strum_macros::{AsRefStr, EnumIter, EnumString};

use crate::core::registry::ClientMode;

/// Every property/ClientMessage/selection atom the core reads, writes or
/// interns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumString, EnumIter)]
pub enum Atom {
    #[strum(serialize = "ATOM")]
    Atom,
    #[strum(serialize = "CARDINAL")]
    Cardinal,
    #[strum(serialize = "MANAGER")]
    Manager,
    #[strum(serialize = "UTF8_STRING")]
    Utf8String,
    #[strum(serialize = "WINDOW")]
    Window,

    // ICCCM
    #[strum(serialize = "WM_CLASS")]
    WmClass,
    #[strum(serialize = "WM_CLIENT_LEADER")]
    WmClientLeader,
    #[strum(serialize = "WM_DELETE_WINDOW")]
    WmDeleteWindow,
    #[strum(serialize = "WM_HINTS")]
    WmHints,
    #[strum(serialize = "WM_NAME")]
    WmName,
    #[strum(serialize = "WM_NORMAL_HINTS")]
    WmNormalHints,
    #[strum(serialize = "WM_PROTOCOLS")]
    WmProtocols,
    #[strum(serialize = "WM_S0")]
    WmS0,
    #[strum(serialize = "WM_STATE")]
    WmState,
    #[strum(serialize = "WM_TAKE_FOCUS")]
    WmTakeFocus,
    #[strum(serialize = "WM_TRANSIENT_FOR")]
    WmTransientFor,
    #[strum(serialize = "WM_WINDOW_ROLE")]
    WmWindowRole,
    #[strum(serialize = "_MOTIF_WM_HINTS")]
    MotifWmHints,

    // EWMH root properties
    #[strum(serialize = "_NET_ACTIVE_WINDOW")]
    NetActiveWindow,
    #[strum(serialize = "_NET_CLIENT_LIST")]
    NetClientList,
    #[strum(serialize = "_NET_CLIENT_LIST_STACKING")]
    NetClientListStacking,
    #[strum(serialize = "_NET_CLOSE_WINDOW")]
    NetCloseWindow,
    #[strum(serialize = "_NET_CURRENT_DESKTOP")]
    NetCurrentDesktop,
    #[strum(serialize = "_NET_DESKTOP_GEOMETRY")]
    NetDesktopGeometry,
    #[strum(serialize = "_NET_DESKTOP_NAMES")]
    NetDesktopNames,
    #[strum(serialize = "_NET_DESKTOP_VIEWPORT")]
    NetDesktopViewport,
    #[strum(serialize = "_NET_FRAME_EXTENTS")]
    NetFrameExtents,
    #[strum(serialize = "_NET_MOVERESIZE_WINDOW")]
    NetMoveresizeWindow,
    #[strum(serialize = "_NET_NUMBER_OF_DESKTOPS")]
    NetNumberOfDesktops,
    #[strum(serialize = "_NET_RESTACK_WINDOW")]
    NetRestackWindow,
    #[strum(serialize = "_NET_SUPPORTED")]
    NetSupported,
    #[strum(serialize = "_NET_SUPPORTING_WM_CHECK")]
    NetSupportingWmCheck,
    #[strum(serialize = "_NET_SYSTEM_TRAY_OPCODE")]
    NetSystemTrayOpcode,
    #[strum(serialize = "_NET_SYSTEM_TRAY_S0")]
    NetSystemTrayS0,
    #[strum(serialize = "_NET_WM_DESKTOP")]
    NetWmDesktop,
    #[strum(serialize = "_NET_WM_NAME")]
    NetWmName,
    #[strum(serialize = "_NET_WM_PID")]
    NetWmPid,
    #[strum(serialize = "_NET_WM_STATE")]
    NetWmState,
    #[strum(serialize = "_NET_WM_STATE_ABOVE")]
    NetWmStateAbove,
    #[strum(serialize = "_NET_WM_STATE_DEMANDS_ATTENTION")]
    NetWmStateDemandsAttention,
    #[strum(serialize = "_NET_WM_STATE_FULLSCREEN")]
    NetWmStateFullscreen,
    #[strum(serialize = "_NET_WM_STATE_STICKY")]
    NetWmStateSticky,
    #[strum(serialize = "_NET_WM_STRUT")]
    NetWmStrut,
    #[strum(serialize = "_NET_WM_WINDOW_TYPE")]
    NetWmWindowType,
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_DESKTOP")]
    NetWmWindowTypeDesktop,
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_DOCK")]
    NetWmWindowTypeDock,
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_TOOLBAR")]
    NetWmWindowTypeToolbar,
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_SPLASH")]
    NetWmWindowTypeSplash,
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_DIALOG")]
    NetWmWindowTypeDialog,
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_NORMAL")]
    NetWmWindowTypeNormal,
    #[strum(serialize = "_NET_WORKAREA")]
    NetWorkarea,
    #[strum(serialize = "_XEMBED_INFO")]
    XEmbedInfo,

    // Private extension properties
    #[strum(serialize = "SUBTLE_CLIENT_FLAGS")]
    SubtleClientFlags,
    #[strum(serialize = "SUBTLE_CLIENT_GRAVITY")]
    SubtleClientGravity,
    #[strum(serialize = "SUBTLE_CLIENT_SCREEN")]
    SubtleClientScreen,
    #[strum(serialize = "SUBTLE_CLIENT_TAGS")]
    SubtleClientTags,
    #[strum(serialize = "SUBTLE_GRAVITY_LIST")]
    SubtleGravityList,
    #[strum(serialize = "SUBTLE_RELOAD")]
    SubtleReload,
    #[strum(serialize = "SUBTLE_RESTART")]
    SubtleRestart,
    #[strum(serialize = "SUBTLE_QUIT")]
    SubtleQuit,
    #[strum(serialize = "SUBTLE_SCREEN_PANELS")]
    SubtleScreenPanels,
    #[strum(serialize = "SUBTLE_SCREEN_VIEWS")]
    SubtleScreenViews,
    #[strum(serialize = "SUBTLE_TAG_LIST")]
    SubtleTagList,
    #[strum(serialize = "SUBTLE_VIEW_TAGS")]
    SubtleViewTags,
    #[strum(serialize = "SUBTLE_VISIBLE_TAGS")]
    SubtleVisibleTags,
    #[strum(serialize = "SUBTLE_VISIBLE_VIEWS")]
    SubtleVisibleViews,
}

/// Root properties published unconditionally at startup, independent of
/// runtime state.
pub const NET_SUPPORTED: &[Atom] = &[
    Atom::NetActiveWindow,
    Atom::NetClientList,
    Atom::NetClientListStacking,
    Atom::NetCloseWindow,
    Atom::NetCurrentDesktop,
    Atom::NetDesktopGeometry,
    Atom::NetDesktopNames,
    Atom::NetDesktopViewport,
    Atom::NetFrameExtents,
    Atom::NetMoveresizeWindow,
    Atom::NetNumberOfDesktops,
    Atom::NetRestackWindow,
    Atom::NetSupported,
    Atom::NetSupportingWmCheck,
    Atom::NetWmDesktop,
    Atom::NetWmName,
    Atom::NetWmState,
    Atom::NetWmStateAbove,
    Atom::NetWmStateDemandsAttention,
    Atom::NetWmStateFullscreen,
    Atom::NetWmStateSticky,
    Atom::NetWmStrut,
    Atom::NetWmWindowType,
    Atom::NetWorkarea,
];

/// `translate_client_mode`/`translate_wm_state` are the sole authority on
/// the mapping between `_NET_WM_STATE` atoms and internal [ClientMode]
/// bits. The match is exhaustive over every mode bit even
/// though only `full`/`float`/`stick`/`urgent` have an externally-visible
/// atom; `resize`/`zaphod`/`fixed`/`borderless` are internal-only and
/// contribute nothing to the wire state: round-tripping through
/// [translate_wm_state] preserves `modes ∩ {full, float, stick, urgent}`
/// and drops the rest.
pub fn translate_client_mode(modes: ClientMode) -> Vec<Atom> {
    let mut atoms = Vec::new();
    if modes.contains(ClientMode::FULL) {
        atoms.push(Atom::NetWmStateFullscreen);
    }
    if modes.contains(ClientMode::FLOAT) {
        atoms.push(Atom::NetWmStateAbove);
    }
    if modes.contains(ClientMode::STICK) {
        atoms.push(Atom::NetWmStateSticky);
    }
    if modes.contains(ClientMode::URGENT) {
        atoms.push(Atom::NetWmStateDemandsAttention);
    }
    atoms
}

/// The inverse of [translate_client_mode]: atoms with no internal
/// counterpart are ignored rather than rejected
/// "clamp to safe range, prefer the most conservative interpretation".
pub fn translate_wm_state(atoms: &[Atom]) -> ClientMode {
    let mut modes = ClientMode::empty();
    for atom in atoms {
        match atom {
            Atom::NetWmStateFullscreen => modes |= ClientMode::FULL,
            Atom::NetWmStateAbove => modes |= ClientMode::FLOAT,
            Atom::NetWmStateSticky => modes |= ClientMode::STICK,
            Atom::NetWmStateDemandsAttention => modes |= ClientMode::URGENT,
            _ => {}
        }
    }
    modes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn every_atom_round_trips_through_its_wire_name() {
        for atom in Atom::iter() {
            let name: &str = atom.as_ref();
            assert_eq!(Atom::from_str(name), Ok(atom));
        }
    }

    #[test]
    fn wm_state_round_trip_preserves_externally_visible_modes() {
        let modes = ClientMode::FULL | ClientMode::STICK | ClientMode::URGENT | ClientMode::RESIZE;
        let atoms = translate_client_mode(modes);
        let back = translate_wm_state(&atoms);
        assert_eq!(back, modes & (ClientMode::FULL | ClientMode::FLOAT | ClientMode::STICK | ClientMode::URGENT));
    }

    #[test]
    fn empty_modes_translate_to_no_atoms() {
        assert!(translate_client_mode(ClientMode::empty()).is_empty());
    }
}
