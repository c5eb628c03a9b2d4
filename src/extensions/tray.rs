//! System-tray selection handling: claiming `_NET_SYSTEM_TRAY_S0` and
//! adopting the icon windows that subsequently dock with
//! `_NET_SYSTEM_TRAY_OPCODE` ClientMessages. As with the window manager
//! selection itself, this crate targets a single X screen, so only `S0` is
//! ever claimed (see [`crate::core::WindowManager::run`]'s selection
//! handling).
//!
//! Icon windows are never reparented into a tray bar here — rendering a
//! tray is an external-collaborator concern (no compositor, no panel
//! drawing engine) — so this module only tracks which windows are tray
//! icons and keeps the registry's [`crate::core::registry::Tray`] entries in
//! sync with their lifetime.

use crate::core::registry::ScreenId;
use crate::core::{State, Xid};
use crate::x::{Atom, XConn};
use crate::Result;

/// Claim the tray selection for `screen_id`, returning whether it was
/// acquired (the selection may already be held by a previous tray manager
/// that hasn't yet relinquished it).
pub fn claim<X: XConn>(x: &X, state: &State, screen_id: ScreenId) -> Result<bool> {
    let _ = screen_id;
    let previous = x.claim_selection(Atom::NetSystemTrayS0, state.root)?;
    Ok(previous.is_none())
}

/// Record `window` as a docked tray icon on `screen_id` and map it. Called
/// when a `_NET_SYSTEM_TRAY_OPCODE` ClientMessage requests docking.
pub fn adopt<X: XConn>(x: &X, state: &mut State, window: Xid, screen_id: ScreenId) -> Result<()> {
    state.registry.add_tray(window, screen_id);
    x.add_to_save_set(window)?;
    x.map(window)?;
    Ok(())
}

/// Drop the registry entry for a tray icon that has been withdrawn or
/// destroyed. The selection itself is released implicitly when the owning
/// window disappears, the same mechanism `WM_S0` relies on.
pub fn withdraw(state: &mut State, window: Xid) {
    state.registry.remove_tray(window);
}
