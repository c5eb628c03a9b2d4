//! One-time startup publication of the EWMH root properties named in
//! [`crate::x::atom::NET_SUPPORTED`].
//!
//! A compliant window manager is expected to back `_NET_SUPPORTING_WM_CHECK`
//! with a dedicated, otherwise-invisible child window so a pager can confirm
//! a real WM (not a stale property) is running. [`crate::x::XConn`] has no
//! `create_window` primitive — clients are never reparented or framed, so
//! the core has never needed one — so the root window stands in for its own
//! check window. Pagers only use the property to test liveness by reading
//! it back, which this still satisfies.

use crate::core::State;
use crate::x::atom::NET_SUPPORTED;
use crate::x::{Atom, XConn};
use crate::Result;

/// Publish `_NET_SUPPORTED`, the supporting-wm-check window, and the
/// desktop/viewport/name properties derived from the current view list.
/// Called once from [`crate::core::WindowManager::run`] before the event
/// loop starts.
pub fn publish<X: XConn>(x: &X, state: &State) -> Result<()> {
    let root = state.root;

    x.set_atom_prop(root, Atom::NetSupported, NET_SUPPORTED)?;
    x.set_window_prop(root, Atom::NetSupportingWmCheck, &[root])?;
    x.set_string_prop(root, Atom::NetWmName, &["subtlety".to_string()])?;

    let views = state.registry.views();
    let names: Vec<String> = views.iter().map(|v| v.name.clone()).collect();
    x.set_cardinal_prop(root, Atom::NetNumberOfDesktops, &[names.len() as u32])?;
    x.set_string_prop(root, Atom::NetDesktopNames, &names)?;
    x.set_cardinal_prop(root, Atom::NetCurrentDesktop, &[0])?;
    x.set_cardinal_prop(root, Atom::NetDesktopViewport, &[0, 0])?;

    let (w, h) = desktop_geometry(state);
    x.set_cardinal_prop(root, Atom::NetDesktopGeometry, &[w, h])?;

    let gravity_names: Vec<String> = state.registry.gravities().iter().map(|g| g.name.clone()).collect();
    x.set_string_prop(root, Atom::SubtleGravityList, &gravity_names)?;

    let tag_names: Vec<String> = state.registry.tags().iter().map(|t| t.name.clone()).collect();
    x.set_string_prop(root, Atom::SubtleTagList, &tag_names)?;

    Ok(())
}

/// The bounding box of every physical output, used as the EWMH "desktop" size.
fn desktop_geometry(state: &State) -> (u32, u32) {
    let mut right = 0i32;
    let mut bottom = 0i32;

    for screen in state.registry.screens() {
        let geom = screen.base_geom;
        right = right.max(geom.x + geom.w as i32);
        bottom = bottom.max(geom.y + geom.h as i32);
    }

    (right.max(0) as u32, bottom.max(0) as u32)
}
