//! The event dispatcher and the client/view/screen procedures it drives:
//! adoption, tagging, mode toggling, gravity-based arrangement, the focus
//! engine and the layering sort.

use crate::core::bindings::{normalize_state, ChainOutcome};
use crate::core::queue::{DeferredMessage, TypeTag};
use crate::core::registry::{
    Callback, Client, ClientLifecycle, ClientMode, GravityId, ObjectRef, Registry, ScreenId,
    TagId, ViewId, DEFAULT_TAG,
};
use crate::core::{actions, hooks, State, WindowManager};
use crate::pure::gravity::{resize, ResizePolicy};
use crate::pure::layering::{self, Layer, StackOrder};
use crate::pure::tag::{check, MatchSubject};
use crate::pure::Rect;
use crate::x::atom::{translate_client_mode, translate_wm_state};
use crate::x::{Atom, XConn, XEvent};
use crate::core::registry::{ClientId, WindowType};
use crate::core::Xid;
use crate::Result;
use crate::x::event::ConfigureValueMask;
use crate::x::property::WmState;

// -- visibility / geometry helpers --------------------------------------

/// Whether `client` is currently visible: its tags intersect its home
/// screen's current view, or it is sticky, or it is a desktop-type window
/// (always shown, always lowered).
pub(crate) fn is_client_visible(registry: &Registry, client: &Client) -> bool {
    if client.is_dead() {
        return false;
    }
    if client.window_type == WindowType::Desktop || client.is_sticky() {
        return true;
    }
    let Some(screen) = registry.screen(client.screen_id) else {
        return false;
    };
    let Some(view) = registry.view(screen.view_id) else {
        return false;
    };
    client.tags & view.tags != 0
}

fn effective_gravity(client: &Client, view_id: ViewId) -> GravityId {
    client.gravities.get(view_id.0).copied().unwrap_or(client.gravity_id)
}

fn client_layer(c: &Client) -> Layer {
    if c.window_type == WindowType::Desktop {
        Layer::Desktop
    } else if c.is_full() {
        Layer::Full
    } else if c.is_floating() {
        Layer::Float
    } else {
        Layer::Tiled
    }
}

fn zaphod_bounds(registry: &Registry) -> Rect {
    let mut screens = registry.screens().iter();
    let Some(first) = screens.next() else {
        return Rect::default();
    };

    let mut min_x = first.base_geom.x;
    let mut min_y = first.base_geom.y;
    let mut max_x = first.base_geom.x + first.base_geom.w as i32;
    let mut max_y = first.base_geom.y + first.base_geom.h as i32;

    for s in screens {
        min_x = min_x.min(s.base_geom.x);
        min_y = min_y.min(s.base_geom.y);
        max_x = max_x.max(s.base_geom.x + s.base_geom.w as i32);
        max_y = max_y.max(s.base_geom.y + s.base_geom.h as i32);
    }

    Rect::new(min_x, min_y, (max_x - min_x) as u32, (max_y - min_y) as u32)
}

fn write_geom<X: XConn>(x: &X, state: &mut State, id: ClientId, geom: Rect) -> Result<()> {
    let window = match state.registry.client_mut(id) {
        Some(c) => {
            c.geom = geom;
            c.window
        }
        None => return Ok(()),
    };
    x.configure(window, geom)
}

/// Refresh the `SUBTLE_CLIENT_*` private properties plus `_NET_WM_DESKTOP`.
/// `_NET_WM_DESKTOP` has no exact analogue in a tag-based model; a sticky
/// client is published as `0xFFFFFFFF` (the EWMH convention for pinned
/// windows), everything else as its home screen's current view index.
fn publish_client_state<X: XConn>(x: &X, state: &State, id: ClientId) -> Result<()> {
    const ALL_DESKTOPS: u32 = 0xFFFF_FFFF;

    let Some(client) = state.registry.client(id) else {
        return Ok(());
    };
    let window = client.window;

    x.set_cardinal_prop(window, Atom::SubtleClientTags, &[client.tags])?;
    x.set_cardinal_prop(window, Atom::SubtleClientFlags, &[client.mode.bits() as u32])?;
    x.set_cardinal_prop(window, Atom::SubtleClientGravity, &[client.gravity_id.0 as u32])?;
    x.set_cardinal_prop(window, Atom::SubtleClientScreen, &[client.screen_id.0 as u32])?;

    let desktop = if client.is_sticky() {
        ALL_DESKTOPS
    } else {
        state.registry.screen(client.screen_id).map(|s| s.view_id.0 as u32).unwrap_or(0)
    };
    x.set_net_wm_desktop(window, desktop)
}

/// `arrange(client, gravity, screen)`: full/float/desktop-dock/tiled
/// branches. Every branch republishes the
/// `SUBTLE_CLIENT_*`/`_NET_WM_DESKTOP` properties so a panel always sees the
/// client's current gravity/screen/tags even when only its geometry changed.
pub(crate) fn arrange<X: XConn>(x: &X, state: &mut State, id: ClientId) -> Result<()> {
    let Some(client) = state.registry.client(id).cloned() else {
        return Ok(());
    };
    if client.is_dead() {
        return Ok(());
    }
    let Some(screen) = state.registry.screen(client.screen_id).cloned() else {
        return Ok(());
    };
    let bounds = screen.work_geom;

    if client.is_full() {
        let geom = if client.mode.contains(ClientMode::ZAPHOD) {
            zaphod_bounds(&state.registry)
        } else {
            screen.base_geom
        };
        write_geom(x, state, id, geom)?;
        return publish_client_state(x, state, id);
    }

    if matches!(client.window_type, WindowType::Desktop | WindowType::Dock) {
        write_geom(x, state, id, bounds)?;
        return publish_client_state(x, state, id);
    }

    let honor_globally = state.flags.honor_size_hints;

    if client.is_floating() {
        let policy = ResizePolicy {
            honor_size_hints_globally: honor_globally,
            is_floating: true,
            has_resize_mode: client.mode.contains(ClientMode::RESIZE),
            is_full: false,
            is_dock: false,
            is_fixed: client.mode.contains(ClientMode::FIXED),
        };
        let geom = resize(client.geom, &bounds, &client.size_hints, policy);
        write_geom(x, state, id, geom)?;
        return publish_client_state(x, state, id);
    }

    let view_id = screen.view_id;
    let gravity_id = effective_gravity(&client, view_id);
    tile_gravity(x, state, client.screen_id, view_id, gravity_id)?;
    publish_client_state(x, state, id)
}

/// `tile(gravity, screen)`: collect every tiled client on `screen_id` that
/// shares `gravity_id` on `view_id`, divide the screen's work area among
/// them along the gravity's tile axis (or place each independently if the
/// gravity has no tile axis).
fn tile_gravity<X: XConn>(
    x: &X,
    state: &mut State,
    screen_id: ScreenId,
    view_id: ViewId,
    gravity_id: GravityId,
) -> Result<()> {
    let Some(gravity) = state.registry.gravity(gravity_id).cloned() else {
        return Ok(());
    };
    let Some(screen) = state.registry.screen(screen_id) else {
        return Ok(());
    };
    let bounds = screen.work_geom;
    let view_tags = state.registry.view(view_id).map(|v| v.tags).unwrap_or(0);
    let honor_globally = state.flags.honor_size_hints;

    let siblings: Vec<ClientId> = state
        .registry
        .clients()
        .filter(|c| {
            c.screen_id == screen_id
                && !c.is_floating()
                && !c.is_full()
                && !matches!(c.window_type, WindowType::Desktop | WindowType::Dock)
                && effective_gravity(c, view_id) == gravity_id
                && (c.tags & view_tags != 0 || c.is_sticky())
        })
        .map(|c| c.id)
        .collect();

    if let Some(direction) = gravity.spec.tile {
        let slots: Vec<crate::pure::gravity::TileSlot<ClientId>> =
            siblings.iter().map(|&id| crate::pure::gravity::TileSlot { id }).collect();
        let placed = crate::pure::gravity::tile(&slots, &bounds, direction);

        for (id, geom) in placed {
            let hints = state.registry.client(id).map(|c| c.size_hints).unwrap_or_default();
            let policy = ResizePolicy {
                honor_size_hints_globally: honor_globally,
                is_floating: false,
                has_resize_mode: false,
                is_full: false,
                is_dock: false,
                is_fixed: false,
            };
            let geom = resize(geom, &bounds, &hints, policy);
            write_geom(x, state, id, geom)?;
        }
    } else {
        for id in siblings {
            let Some(hints) = state.registry.client(id).map(|c| c.size_hints) else {
                continue;
            };
            let geom = crate::pure::gravity::geometry_of(&gravity.spec, &bounds);
            let policy = ResizePolicy {
                honor_size_hints_globally: honor_globally,
                is_floating: false,
                has_resize_mode: false,
                is_full: false,
                is_dock: false,
                is_fixed: false,
            };
            let geom = resize(geom, &bounds, &hints, policy);
            write_geom(x, state, id, geom)?;
        }
    }

    Ok(())
}

fn publish_client_lists<X: XConn>(x: &X, state: &State) -> Result<()> {
    let windows: Vec<Xid> = state.registry.clients().map(|c| c.window).collect();
    x.set_window_prop(state.root, Atom::NetClientList, &windows)?;

    let stacking: Vec<Xid> = state.registry.stacking_order().map(|c| c.window).collect();
    x.set_window_prop(state.root, Atom::NetClientListStacking, &stacking)
}

fn publish_screen_views<X: XConn>(x: &X, state: &State) -> Result<()> {
    let values: Vec<u32> = state.registry.screens().iter().map(|s| s.view_id.0 as u32).collect();
    x.set_cardinal_prop(state.root, Atom::SubtleScreenViews, &values)
}

/// Refresh every root `SUBTLE_*` property that tracks something dynamic
/// (visibility masks, panel windows, per-view tags) plus `_NET_WORKAREA`.
/// The static lists (`SUBTLE_GRAVITY_LIST`, `SUBTLE_TAG_LIST`) are published
/// once from
/// [`crate::extensions::ewmh::publish`]; these change whenever a view's
/// tags, a screen's work area, or visibility recomputes.
fn publish_root_lists<X: XConn>(x: &X, state: &State) -> Result<()> {
    let view_tags: Vec<u32> = state.registry.views().iter().map(|v| v.tags).collect();
    x.set_cardinal_prop(state.root, Atom::SubtleViewTags, &view_tags)?;
    x.set_cardinal_prop(state.root, Atom::SubtleVisibleTags, &[state.visible_tags])?;
    x.set_cardinal_prop(state.root, Atom::SubtleVisibleViews, &[state.visible_views])?;

    let mut panels: Vec<Xid> = Vec::new();
    for screen in state.registry.screens() {
        panels.push(screen.panel1.unwrap_or(state.root));
        panels.push(screen.panel2.unwrap_or(state.root));
    }
    x.set_window_prop(state.root, Atom::SubtleScreenPanels, &panels)?;

    let desktops = state.registry.views().len().max(1);
    let mut workarea = Vec::with_capacity(desktops * 4);
    for view in state.registry.views() {
        let geom = state
            .registry
            .screens()
            .iter()
            .find(|s| s.view_id == view.id)
            .map(|s| s.work_geom)
            .or_else(|| state.registry.screens().first().map(|s| s.work_geom))
            .unwrap_or_default();
        workarea.extend_from_slice(&[geom.x as u32, geom.y as u32, geom.w, geom.h]);
    }
    if workarea.is_empty() {
        workarea = vec![0, 0, 0, 0];
    }
    x.set_cardinal_prop(state.root, Atom::NetWorkarea, &workarea)?;

    publish_screen_views(x, state)
}

fn warp_to_client<X: XConn>(x: &X, state: &State, id: ClientId) -> Result<()> {
    let Some(client) = state.registry.client(id) else {
        return Ok(());
    };
    let mid = client.geom.midpoint();
    x.warp_pointer(client.window, mid.x - client.geom.x, mid.y - client.geom.y)
}

/// `configure()`: recompute visibility, map/unmap and arrange every client
/// accordingly. Fires the process-wide `tile` hook once at
/// the end, since this is the one pass that (re)tiles every gravity on every
/// screen (hook type list).
pub fn configure_screens<X: XConn>(x: &X, state: &mut State, hooks: &hooks::HookBus) -> Result<()> {
    state.recompute_visibility();

    let client_ids: Vec<ClientId> = state.registry.clients().map(|c| c.id).collect();

    for id in client_ids {
        let Some(client) = state.registry.client(id) else {
            continue;
        };
        let window = client.window;
        let visible = is_client_visible(&state.registry, client);

        if visible {
            if !state.mapped.contains(&window) {
                x.map(window)?;
                state.mapped.insert(window);
            }
            x.set_wm_state(window, WmState::Normal)?;
            arrange(x, state, id)?;

            let urgent = state
                .registry
                .client(id)
                .map(|c| c.mode.contains(ClientMode::URGENT))
                .unwrap_or(false);
            if urgent && !state.flags.skip_urgent_warp {
                warp_to_client(x, state, id)?;
            }
        } else {
            if state.mapped.remove(&window) {
                *state.pending_unmap.entry(window).or_insert(0) += 1;
                x.unmap(window)?;
            }
            x.set_wm_state(window, WmState::Withdrawn)?;
        }
    }

    publish_client_lists(x, state)?;
    publish_root_lists(x, state)?;
    x.set_cardinal_prop(state.root, Atom::NetCurrentDesktop, &[0])?;

    hooks.call(hooks::HookMask::TILE, &hooks::HookSubject::None);

    Ok(())
}

/// `restack()`: re-sort the registry's stacking order via the layering
/// comparator, clear every per-client restack direction, then push the new
/// bottom-first order to the server in one `XRestackWindows` call.
pub(crate) fn restack<X: XConn>(wm: &mut WindowManager<X>) -> Result<()> {
    let mut entries: Vec<(ClientId, Layer, Option<StackOrder>)> = wm
        .state
        .registry
        .stacking_order()
        .map(|c| (c.id, client_layer(c), c.restack_dir))
        .collect();

    layering::restack(&mut entries, |e| e.1, |e| e.2, |e| e.0, |e| e.2 = None);

    let order: Vec<ClientId> = entries.iter().map(|e| e.0).collect();
    for &id in &order {
        if let Some(c) = wm.state.registry.client_mut(id) {
            c.restack_dir = None;
        }
    }
    wm.state.registry.set_stacking_order(order.clone());

    let windows: Vec<Xid> = order
        .iter()
        .filter_map(|&id| wm.state.registry.client(id).map(|c| c.window))
        .collect();
    wm.x.restack(&windows)
}

/// `focus(client, warp)`: the 8-step focus engine.
pub(crate) fn focus<X: XConn>(wm: &mut WindowManager<X>, id: ClientId, warp: bool) -> Result<()> {
    let Some(client) = wm.state.registry.client(id).cloned() else {
        return Ok(());
    };
    if client.is_dead() || !is_client_visible(&wm.state.registry, &client) {
        return Ok(());
    }

    let window = client.window;

    if let Some(c) = wm.state.registry.client_mut(id) {
        c.mode.remove(ClientMode::URGENT);
    }
    wm.state.urgent_tags = wm
        .state
        .registry
        .clients()
        .filter(|c| c.mode.contains(ClientMode::URGENT))
        .fold(0, |acc, c| acc | c.tags);

    if let Some(prev_window) = wm.state.focus.current() {
        if prev_window != window {
            if let Some(prev) = wm.state.registry.client_by_window(prev_window) {
                if prev.window_type != WindowType::Desktop {
                    wm.x.set_border_color(prev_window, wm.config.normal_border)?;
                }
            }
        }
    }

    if client.window_type != WindowType::Desktop {
        wm.x.set_border_color(window, wm.config.focused_border)?;
    }

    if client.lifecycle.contains(ClientLifecycle::FOCUS_TAKES_MSG) {
        wm.x.send_protocol(window, Atom::WmTakeFocus)?;
    } else {
        wm.x.set_input_focus(window)?;
    }

    wm.state.focus.push(window);
    install_focus_grabs(wm, window)?;

    if let Some(view_id) = wm.state.registry.screen(client.screen_id).map(|s| s.view_id) {
        if let Some(view) = wm.state.registry.view_mut(view_id) {
            view.focus_hint = Some(window);
        }
    }

    wm.config
        .hooks
        .call(hooks::HookMask::CLIENT_FOCUS, &hooks::HookSubject::Client { id, window });

    if warp {
        warp_to_client(&wm.x, &wm.state, id)?;
    }

    Ok(())
}

fn install_focus_grabs<X: XConn>(wm: &WindowManager<X>, focused: Xid) -> Result<()> {
    if !wm.state.flags.click_to_focus {
        return Ok(());
    }
    for c in wm.state.registry.clients() {
        if c.window == focused {
            wm.x.ungrab_buttons(c.window)?;
        } else {
            wm.x.grab_button(
                c.window,
                0,
                0,
                crate::x::ButtonMask::PRESS | crate::x::ButtonMask::RELEASE,
            )?;
        }
    }
    Ok(())
}

/// `next(screen, jump)`: the 3-pass focus-discovery algorithm. `jump`
/// permits falling back to another screen's clients only as a last resort
/// when nothing on `screen_id` qualifies — this is an intentional contract,
/// not a bug, and must not be "simplified" into ignoring `screen_id`.
pub(crate) fn next<X: XConn>(
    wm: &WindowManager<X>,
    screen_id: ScreenId,
    jump: bool,
) -> Option<ClientId> {
    let current = wm.state.focus.current();
    let registry = &wm.state.registry;

    let mut history = wm.state.focus.iter();
    history.next();
    for &window in history {
        if let Some(client) = registry.client_by_window(window) {
            if client.screen_id == screen_id
                && !client.is_dead()
                && is_client_visible(registry, client)
            {
                return Some(client.id);
            }
        }
    }

    let stacking_top_first: Vec<&Client> = registry.stacking_order().collect::<Vec<_>>().into_iter().rev().collect();

    for client in &stacking_top_first {
        if client.screen_id == screen_id
            && is_client_visible(registry, client)
            && Some(client.window) != current
        {
            return Some(client.id);
        }
    }

    if jump && registry.screens().len() > 1 {
        for client in &stacking_top_first {
            if is_client_visible(registry, client) && Some(client.window) != current {
                return Some(client.id);
            }
        }
    }

    None
}

/// `view.focus(view, screen, swap, do_focus)`.
pub(crate) fn view_focus<X: XConn>(
    wm: &mut WindowManager<X>,
    screen_id: ScreenId,
    view_id: ViewId,
    swap: bool,
    do_focus: bool,
) -> Result<()> {
    let other_screen = wm
        .state
        .registry
        .screens()
        .iter()
        .find(|s| s.id != screen_id && s.view_id == view_id)
        .map(|s| s.id);

    if swap {
        if let Some(other) = other_screen {
            let this_view = wm.state.registry.screen(screen_id).map(|s| s.view_id);
            if let Some(this_view) = this_view {
                if let Some(s) = wm.state.registry.screen_mut(other) {
                    s.view_id = this_view;
                }
            }
        }
    }

    if let Some(s) = wm.state.registry.screen_mut(screen_id) {
        s.view_id = view_id;
    }

    configure_screens(&wm.x, &mut wm.state, &wm.config.hooks)?;

    if do_focus {
        let hint = wm.state.registry.view(view_id).and_then(|v| v.focus_hint);
        let target = hint.and_then(|w| wm.state.registry.client_by_window(w)).map(|c| c.id);
        match target {
            Some(id) => focus(wm, id, !wm.state.flags.skip_pointer_warp)?,
            None => {
                if let Some(id) = next(wm, screen_id, false) {
                    focus(wm, id, false)?;
                }
            }
        }
    }

    wm.config
        .hooks
        .call(hooks::HookMask::VIEW_FOCUS, &hooks::HookSubject::View { id: view_id });

    Ok(())
}

/// `toggle_modes(client, mask, allow_set_gravity)`.
/// `allow_set_gravity` gates the stick-entry gravity propagation step, which
/// only makes sense when the caller already owns a settled gravity
/// assignment (not, say, mid-adoption before retagging has run).
pub(crate) fn toggle_modes<X: XConn>(
    wm: &mut WindowManager<X>,
    id: ClientId,
    mut mask: ClientMode,
    allow_set_gravity: bool,
) -> Result<()> {
    let Some(client) = wm.state.registry.client(id).cloned() else {
        return Ok(());
    };
    if client.is_dead() {
        return Ok(());
    }

    if mask.contains(ClientMode::FULL) && !client.mode.contains(ClientMode::FULL) {
        let screen_size = wm
            .state
            .registry
            .screen(client.screen_id)
            .map(|s| (s.base_geom.w, s.base_geom.h));
        if client.size_hints.is_fixed() && client.size_hints.min != screen_size {
            mask.remove(ClientMode::FULL);
        }
    }

    let new_mode = client.mode ^ mask;
    let entering = new_mode & !client.mode;
    let leaving = client.mode & !new_mode;
    let window = client.window;

    if let Some(c) = wm.state.registry.client_mut(id) {
        c.mode = new_mode;
    }

    if allow_set_gravity && entering.contains(ClientMode::STICK) {
        let gravity_id = client.gravity_id;
        let untagged_views: Vec<usize> = wm
            .state
            .registry
            .views()
            .iter()
            .filter(|v| v.tags & client.tags == 0)
            .map(|v| v.id.0)
            .collect();

        if let Some(c) = wm.state.registry.client_mut(id) {
            for idx in &untagged_views {
                if let Some(slot) = c.gravities.get_mut(*idx) {
                    *slot = gravity_id;
                }
            }
        }

        if !client.mode.contains(ClientMode::STICK_SCREEN) {
            if let Some(focused_window) = wm.state.focus.current() {
                let focused_screen =
                    wm.state.registry.client_by_window(focused_window).map(|c| c.screen_id);
                if let Some(screen_id) = focused_screen {
                    if let Some(c) = wm.state.registry.client_mut(id) {
                        c.screen_id = screen_id;
                    }
                }
            }
        }
    }

    if entering.intersects(ClientMode::FULL | ClientMode::BORDERLESS) {
        wm.x.set_border_width(window, 0)?;
        wm.x.set_net_frame_extents(window, 0)?;
    }
    if leaving.intersects(ClientMode::FULL | ClientMode::BORDERLESS)
        && !new_mode.intersects(ClientMode::FULL | ClientMode::BORDERLESS)
    {
        wm.x.set_border_width(window, wm.config.border_width)?;
        wm.x.set_net_frame_extents(window, wm.config.border_width)?;
    }

    if entering.contains(ClientMode::CENTER) {
        let bounds = wm
            .state
            .registry
            .client(id)
            .and_then(|c| wm.state.registry.screen(c.screen_id))
            .map(|s| s.work_geom);
        if let Some(bounds) = bounds {
            if let Some(c) = wm.state.registry.client_mut(id) {
                c.mode.insert(ClientMode::FLOAT);
                c.geom.x = bounds.x + (bounds.w as i32 - c.geom.w as i32) / 2;
                c.geom.y = bounds.y + (bounds.h as i32 - c.geom.h as i32) / 2;
            }
        }
    }

    arrange(&wm.x, &mut wm.state, id)?;

    let atoms = translate_client_mode(wm.state.registry.client(id).map(|c| c.mode).unwrap_or(new_mode));
    wm.x.set_net_wm_state(window, &atoms)?;

    wm.config
        .hooks
        .call(hooks::HookMask::CLIENT_MODE, &hooks::HookSubject::Client { id, window });

    Ok(())
}

/// Re-evaluate every matcher against `subject` and accumulate tags/gravity/
/// screen/geometry/mode_flags/on_match from every matching tag.
pub(crate) fn retag<X: XConn>(
    wm: &mut WindowManager<X>,
    id: ClientId,
    subject: &MatchSubject,
) -> Result<()> {
    let tags = wm.state.registry.tags().to_vec();

    let mut new_tags: crate::core::registry::TagMask = 0;
    let mut gravity: Option<GravityId> = None;
    let mut screen_id: Option<ScreenId> = None;
    let mut geometry: Option<Rect> = None;
    let mut mode_flags = ClientMode::empty();
    let mut on_match: Option<Callback<Client>> = None;

    for tag in &tags {
        if check(&tag.matchers, subject) {
            new_tags |= 1u32 << (tag.id.0 + 1);
            gravity = gravity.or(tag.gravity_id);
            screen_id = screen_id.or(tag.screen_id);
            geometry = geometry.or(tag.geometry);
            mode_flags |= tag.mode_flags;
            if tag.on_match.is_some() {
                on_match = tag.on_match.clone();
            }
        }
    }

    if new_tags == 0 {
        new_tags = 1u32 << (DEFAULT_TAG.0 + 1);
    }

    if let Some(c) = wm.state.registry.client_mut(id) {
        c.tags = new_tags;
        if let Some(g) = gravity {
            c.gravity_id = g;
            for slot in c.gravities.iter_mut() {
                *slot = g;
            }
        }
        if let Some(s) = screen_id {
            c.screen_id = s;
        }
        if let Some(geom) = geometry {
            c.geom = geom;
        }
        c.mode |= mode_flags;
    }

    if let Some(cb) = on_match {
        if let Some(client) = wm.state.registry.client(id) {
            cb(client);
        }
    }

    Ok(())
}

fn window_type_from_atoms(atoms: &[Atom]) -> WindowType {
    for atom in atoms {
        match atom {
            Atom::NetWmWindowTypeDesktop => return WindowType::Desktop,
            Atom::NetWmWindowTypeDock => return WindowType::Dock,
            Atom::NetWmWindowTypeToolbar => return WindowType::Toolbar,
            Atom::NetWmWindowTypeSplash => return WindowType::Splash,
            Atom::NetWmWindowTypeDialog => return WindowType::Dialog,
            _ => {}
        }
    }
    WindowType::Normal
}

pub(crate) fn current_screen_id<X: XConn>(wm: &WindowManager<X>) -> ScreenId {
    wm.x
        .pointer_location()
        .ok()
        .and_then(|(p, _)| {
            wm.state
                .registry
                .screens()
                .iter()
                .find(|s| s.base_geom.contains_point(p))
                .map(|s| s.id)
        })
        .unwrap_or(ScreenId(0))
}

/// The 13-step client adoption procedure.
pub(crate) fn adopt<X: XConn>(wm: &mut WindowManager<X>, window: Xid) -> Result<()> {
    if wm.state.registry.find(window).is_some() {
        return Ok(());
    }

    let attrs = wm.x.window_attributes(window)?;
    if attrs.override_redirect {
        return Ok(());
    }

    let mut geom = attrs.geom;
    geom.w = geom.w.max(1);
    geom.h = geom.h.max(1);

    let screen_id = current_screen_id(wm);
    let default_gravity = wm
        .state
        .focus
        .current()
        .and_then(|w| wm.state.registry.client_by_window(w))
        .map(|c| c.gravity_id)
        .or(wm.state.default_gravity)
        .unwrap_or(GravityId(0));

    let view_count = wm.state.registry.views().len().max(1);
    let gravities = vec![default_gravity; view_count];

    let (instance, class) = wm.x.get_wm_class(window)?.unwrap_or_default();
    let name = wm
        .x
        .get_net_wm_name(window)?
        .or(wm.x.get_wm_name(window)?)
        .unwrap_or_default();
    let role = wm.x.get_wm_window_role(window)?.unwrap_or_default();
    let leader = wm.x.get_wm_client_leader(window)?;

    wm.x.set_input_mask(window)?;
    wm.x.set_border_width(window, wm.config.border_width)?;
    wm.x.set_border_color(window, wm.config.normal_border)?;
    wm.x.add_to_save_set(window)?;
    wm.x.set_wm_state(window, WmState::Withdrawn)?;

    // Clients are never reparented, so the border drawn directly on the
    // client window is the whole of its "frame".
    wm.x.set_net_frame_extents(window, wm.config.border_width)?;

    let protocols = wm.x.get_wm_protocols(window)?;
    let mut lifecycle = ClientLifecycle::INPUT;
    if protocols.contains(&Atom::WmTakeFocus) {
        lifecycle.insert(ClientLifecycle::FOCUS_TAKES_MSG);
    }
    if protocols.contains(&Atom::WmDeleteWindow) {
        lifecycle.insert(ClientLifecycle::CLOSE_TAKES_MSG);
    }

    if let Some(strut) = wm.x.get_net_wm_strut(window)? {
        if let Some(screen) = wm.state.registry.screen_mut(screen_id) {
            screen.work_geom = strut.apply(screen.base_geom);
        }
    }

    let type_atoms = wm.x.get_net_wm_window_type(window)?;
    let window_type = window_type_from_atoms(&type_atoms);
    let mut mode = ClientMode::empty();
    if matches!(window_type, WindowType::Dialog | WindowType::Splash) {
        mode.insert(ClientMode::FLOAT | ClientMode::CENTER);
    }

    let mut size_hints = crate::pure::SizeHints::default();
    if let Some(hints) = wm.x.get_wm_normal_hints(window)? {
        size_hints = hints.hints;
        if hints.implies_fixed() {
            mode.insert(ClientMode::FIXED | ClientMode::FLOAT);
        }
    }

    if let Some(wm_hints) = wm.x.get_wm_hints(window)? {
        if !wm_hints.input {
            lifecycle.remove(ClientLifecycle::INPUT);
        }
        if wm_hints.urgent {
            mode.insert(ClientMode::URGENT);
        }
    }

    if let Some(motif) = wm.x.get_motif_hints(window)? {
        if motif.wants_borderless() {
            mode.insert(ClientMode::BORDERLESS);
        }
    }

    let state_atoms = wm.x.get_net_wm_state(window)?;
    mode |= translate_wm_state(&state_atoms);

    if let Some(transient_for) = wm.x.get_wm_transient_for(window)? {
        mode.insert(ClientMode::FLOAT);
        if wm.state.flags.urgent_dialogs {
            mode.insert(ClientMode::URGENT);
        }
        if let Some(parent) = wm.state.registry.client_by_window(transient_for) {
            mode |= parent.mode & (ClientMode::STICK | ClientMode::ZAPHOD);
        }
    }

    if let Some(leader_window) = leader {
        if let Some(leader_client) = wm.state.registry.client_by_window(leader_window) {
            mode |= leader_client.mode & (ClientMode::STICK | ClientMode::ZAPHOD);
        }
    }

    let client = Client {
        id: ClientId(0),
        window,
        leader,
        name,
        instance: instance.clone(),
        class: class.clone(),
        role: role.clone(),
        tags: 1u32 << (DEFAULT_TAG.0 + 1),
        geom,
        size_hints,
        gravities,
        gravity_id: default_gravity,
        screen_id,
        lifecycle,
        mode: ClientMode::empty(),
        window_type,
        restack_dir: None,
    };

    let id = wm.state.registry.add_client(client);

    let subject = MatchSubject {
        name: wm.state.registry.client(id).map(|c| c.name.clone()).unwrap_or_default(),
        instance,
        class,
        role,
        window_type: window_type.as_str().to_string(),
    };
    retag(wm, id, &subject)?;

    if let Some(leader_window) = leader {
        if let Some(leader_client) = wm.state.registry.client_by_window(leader_window) {
            let (leader_tags, leader_screen) = (leader_client.tags, leader_client.screen_id);
            if let Some(c) = wm.state.registry.client_mut(id) {
                c.tags |= leader_tags;
                c.screen_id = leader_screen;
            }
        }
    }

    toggle_modes(wm, id, mode, true)?;

    let window_ref = wm.state.registry.client(id).map(|c| c.window).unwrap_or(window);
    wm.config
        .hooks
        .call(hooks::HookMask::CLIENT_CREATE, &hooks::HookSubject::Client { id, window: window_ref });

    for deferred in wm.state.deferred.pop_for(TypeTag::ClientTag, window) {
        redispatch_deferred(wm, deferred)?;
    }

    configure_screens(&wm.x, &mut wm.state, &wm.config.hooks)
}

/// ICCCM close: `WM_DELETE_WINDOW` if the client opted in, else
/// `XKillClient`. A protocol close only asks the client to
/// go away; the registry keeps it live until the `DestroyNotify`/
/// `UnmapNotify` that follows reaches [handle_window_gone].
pub(crate) fn close<X: XConn>(wm: &mut WindowManager<X>, id: ClientId) -> Result<()> {
    let Some(client) = wm.state.registry.client(id).cloned() else {
        return Ok(());
    };
    let window = client.window;

    if client.lifecycle.contains(ClientLifecycle::CLOSE_TAKES_MSG) {
        return wm.x.send_protocol(window, Atom::WmDeleteWindow);
    }

    wm.x.kill_client(window)?;

    wm.state.registry.mark_client_dead(id);
    wm.state.mapped.remove(&window);
    wm.state.focus.remove(window);

    wm.config
        .hooks
        .call(hooks::HookMask::CLIENT_KILL, &hooks::HookSubject::Client { id, window });

    configure_screens(&wm.x, &mut wm.state, &wm.config.hooks)?;

    if let Some(next_id) = next(wm, client.screen_id, false) {
        focus(wm, next_id, false)?;
    }

    Ok(())
}

fn redispatch_deferred<X: XConn>(wm: &mut WindowManager<X>, msg: DeferredMessage) -> Result<()> {
    let message_type = match msg.type_tag {
        TypeTag::ClientTag => Atom::SubtleClientTags,
        TypeTag::ClientGravity => Atom::SubtleClientGravity,
        TypeTag::ClientScreen => Atom::SubtleClientScreen,
        TypeTag::ViewSwitch => Atom::NetCurrentDesktop,
    };
    let window = Xid(msg.data[0]);
    handle_client_message(wm, window, message_type, msg.data)
}

fn handle_window_gone<X: XConn>(wm: &mut WindowManager<X>, window: Xid) -> Result<()> {
    if let Some(count) = wm.state.pending_unmap.get_mut(&window) {
        if *count > 0 {
            *count -= 1;
            if *count == 0 {
                wm.state.pending_unmap.remove(&window);
            }
            return Ok(());
        }
    }

    match wm.state.registry.find(window) {
        Some(ObjectRef::Client(id)) => {
            let screen_id = wm.state.registry.client(id).map(|c| c.screen_id);

            wm.state.registry.mark_client_dead(id);
            wm.state.mapped.remove(&window);
            wm.state.focus.remove(window);

            wm.config
                .hooks
                .call(hooks::HookMask::CLIENT_KILL, &hooks::HookSubject::Client { id, window });

            configure_screens(&wm.x, &mut wm.state, &wm.config.hooks)?;

            if let Some(screen_id) = screen_id {
                if let Some(next_id) = next(wm, screen_id, false) {
                    focus(wm, next_id, false)?;
                }
            }
        }
        Some(ObjectRef::Tray(_)) => {
            wm.state.registry.remove_tray(window);
        }
        _ => {}
    }

    Ok(())
}

fn handle_configure_request<X: XConn>(
    wm: &mut WindowManager<X>,
    window: Xid,
    geom: Rect,
    value_mask: ConfigureValueMask,
) -> Result<()> {
    let client = wm.state.registry.client_by_window(window).cloned();

    match client {
        None => wm.x.configure(window, geom),
        Some(c) if c.is_full() => wm.x.configure(window, geom),
        Some(c) => {
            let mut new_geom = c.geom;
            if value_mask.contains(ConfigureValueMask::X) {
                new_geom.x = geom.x;
            }
            if value_mask.contains(ConfigureValueMask::Y) {
                new_geom.y = geom.y;
            }
            if value_mask.contains(ConfigureValueMask::WIDTH) {
                new_geom.w = geom.w;
            }
            if value_mask.contains(ConfigureValueMask::HEIGHT) {
                new_geom.h = geom.h;
            }

            if let Some(client) = wm.state.registry.client_mut(c.id) {
                client.geom = new_geom;
            }
            arrange(&wm.x, &mut wm.state, c.id)?;
            wm.x.configure(window, new_geom)
        }
    }
}

fn handle_client_message<X: XConn>(
    wm: &mut WindowManager<X>,
    window: Xid,
    message_type: Atom,
    data: [u32; 5],
) -> Result<()> {
    let type_tag = match message_type {
        Atom::SubtleClientTags => Some(TypeTag::ClientTag),
        Atom::SubtleClientGravity => Some(TypeTag::ClientGravity),
        Atom::SubtleClientScreen => Some(TypeTag::ClientScreen),
        Atom::NetCurrentDesktop => Some(TypeTag::ViewSwitch),
        _ => None,
    };

    let Some(id) = wm.state.registry.client_by_window(window).map(|c| c.id) else {
        if let Some(type_tag) = type_tag {
            wm.state.deferred.push(DeferredMessage {
                type_tag,
                message_type: window,
                data,
            });
        }
        return Ok(());
    };

    match message_type {
        Atom::NetActiveWindow => focus(wm, id, !wm.state.flags.skip_pointer_warp)?,
        Atom::NetCloseWindow => close(wm, id)?,
        Atom::SubtleClientTags => {
            if let Some(c) = wm.state.registry.client_mut(id) {
                c.tags = data[0];
            }
            configure_screens(&wm.x, &mut wm.state, &wm.config.hooks)?;
        }
        Atom::SubtleClientGravity => {
            let gravity_id = GravityId(data[0] as usize);
            if let Some(c) = wm.state.registry.client_mut(id) {
                c.gravity_id = gravity_id;
                c.mode.remove(ClientMode::FLOAT | ClientMode::FULL);
                for slot in c.gravities.iter_mut() {
                    *slot = gravity_id;
                }
            }
            arrange(&wm.x, &mut wm.state, id)?;
            wm.config
                .hooks
                .call(hooks::HookMask::CLIENT_GRAVITY, &hooks::HookSubject::Client { id, window });
        }
        Atom::SubtleClientScreen => {
            let screen_id = ScreenId(data[0] as usize);
            if let Some(c) = wm.state.registry.client_mut(id) {
                c.screen_id = screen_id;
            }
            configure_screens(&wm.x, &mut wm.state, &wm.config.hooks)?;
        }
        // _NET_WM_STATE ClientMessages carry raw server-side atom ids in
        // data[1..3] that the core cannot resolve without an atom table;
        // mode toggles reach us instead through grab-triggered actions.
        _ => {}
    }

    Ok(())
}

/// `_NET_SYSTEM_TRAY_OPCODE` docking request: `data[2]` names the icon
/// window being embedded, per the XEmbed systray spec.
fn handle_tray_opcode<X: XConn>(wm: &mut WindowManager<X>, data: [u32; 5]) -> Result<()> {
    const SYSTEM_TRAY_REQUEST_DOCK: u32 = 0;
    if data[1] != SYSTEM_TRAY_REQUEST_DOCK {
        return Ok(());
    }

    let icon = Xid(data[2]);
    let Some(screen_id) = wm.state.registry.screens().first().map(|s| s.id) else {
        return Ok(());
    };
    crate::extensions::tray::adopt(&wm.x, &mut wm.state, icon, screen_id)
}

fn handle_property_notify<X: XConn>(wm: &mut WindowManager<X>, window: Xid, atom: Atom) -> Result<()> {
    let Some(id) = wm.state.registry.client_by_window(window).map(|c| c.id) else {
        return Ok(());
    };

    match atom {
        Atom::WmName | Atom::NetWmName => {
            let name = wm
                .x
                .get_net_wm_name(window)?
                .or(wm.x.get_wm_name(window)?)
                .unwrap_or_default();
            if let Some(c) = wm.state.registry.client_mut(id) {
                c.name = name;
            }
        }
        Atom::WmNormalHints => {
            if let Some(hints) = wm.x.get_wm_normal_hints(window)? {
                if let Some(c) = wm.state.registry.client_mut(id) {
                    c.size_hints = hints.hints;
                }
                arrange(&wm.x, &mut wm.state, id)?;
            }
        }
        Atom::WmHints => {
            if let Some(wh) = wm.x.get_wm_hints(window)? {
                if wh.urgent {
                    if let Some(c) = wm.state.registry.client_mut(id) {
                        c.mode.insert(ClientMode::URGENT);
                    }
                    configure_screens(&wm.x, &mut wm.state, &wm.config.hooks)?;
                }
            }
        }
        Atom::NetWmStrut => {
            if let Some(strut) = wm.x.get_net_wm_strut(window)? {
                let screen_id = wm.state.registry.client(id).map(|c| c.screen_id);
                if let Some(screen_id) = screen_id {
                    if let Some(screen) = wm.state.registry.screen_mut(screen_id) {
                        screen.work_geom = strut.apply(screen.base_geom);
                    }
                    configure_screens(&wm.x, &mut wm.state, &wm.config.hooks)?;
                }
            }
        }
        _ => {}
    }

    Ok(())
}

fn handle_selection_clear<X: XConn>(wm: &mut WindowManager<X>, selection: Atom) -> Result<()> {
    if selection == Atom::NetSystemTrayS0 {
        wm.state.flags.tray = false;
    } else {
        wm.state.flags.run = false;
    }
    Ok(())
}

pub(crate) fn re_enumerate_screens<X: XConn>(wm: &mut WindowManager<X>) -> Result<()> {
    let details = wm.x.screen_details()?;
    let fallback_view = wm
        .state
        .registry
        .screens()
        .first()
        .map(|s| s.view_id)
        .unwrap_or(ViewId(0));

    let existing_count = wm.state.registry.screens().len();

    for (i, geom) in details.iter().enumerate() {
        if i < existing_count {
            if let Some(screen) = wm.state.registry.screens_mut().nth(i) {
                screen.base_geom = *geom;
                screen.work_geom = *geom;
            }
        } else {
            wm.state.registry.add_screen(*geom, fallback_view);
        }
    }

    Ok(())
}

/// The main event switch.
pub fn dispatch<X: XConn>(wm: &mut WindowManager<X>, event: XEvent) -> Result<()> {
    match event {
        XEvent::ConfigureNotifyRoot => {
            re_enumerate_screens(wm)?;
            wm.state.flags.reload = true;
        }
        XEvent::ConfigureNotify { .. } => {}
        XEvent::ConfigureRequest { window, geom, value_mask } => {
            handle_configure_request(wm, window, geom, value_mask)?;
        }
        XEvent::EnterNotify { window } => {
            if !wm.state.flags.click_to_focus {
                if let Some(id) = wm.state.registry.client_by_window(window).map(|c| c.id) {
                    focus(wm, id, false)?;
                }
            }
        }
        XEvent::MapRequest { window } => match wm.state.registry.find(window) {
            None => adopt(wm, window)?,
            Some(ObjectRef::Client(id)) => {
                let is_dead = wm.state.registry.client(id).map(|c| c.is_dead()).unwrap_or(false);
                if is_dead {
                    configure_screens(&wm.x, &mut wm.state, &wm.config.hooks)?;
                } else {
                    arrange(&wm.x, &mut wm.state, id)?;
                }
            }
            _ => {}
        },
        XEvent::DestroyNotify { window } => handle_window_gone(wm, window)?,
        XEvent::UnmapNotify { window } => handle_window_gone(wm, window)?,
        XEvent::ClientMessage { window, message_type, data } => {
            if message_type == Atom::NetSystemTrayOpcode {
                handle_tray_opcode(wm, data)?;
            } else {
                handle_client_message(wm, window, message_type, data)?;
            }
        }
        XEvent::PropertyNotify { window, atom } => handle_property_notify(wm, window, atom)?,
        XEvent::SelectionClear { selection } => handle_selection_clear(wm, selection)?,
        XEvent::KeyPress { code, state } => {
            let normalized = normalize_state(state);
            let is_modifier_only = wm.config.modifier_codes.contains(&code);
            let outcome = wm.state.keychain.advance(&wm.grabs, code, normalized, is_modifier_only);

            match outcome {
                ChainOutcome::Passthrough(Some(grab)) => {
                    let grab = grab.clone();
                    actions::execute(wm, &grab)?;
                }
                ChainOutcome::Passthrough(None) => {}
                ChainOutcome::Armed(_) => {
                    wm.x.grab_any_key(wm.state.root)?;
                }
                ChainOutcome::Fired(grab) => {
                    wm.regrab_keys()?;
                    actions::execute(wm, &grab)?;
                }
                ChainOutcome::Cancelled => {
                    wm.regrab_keys()?;
                }
            }
        }
        XEvent::ButtonPress { code, state, window } => {
            let normalized = normalize_state(state);
            if let Some(id) = wm.state.registry.client_by_window(window).map(|c| c.id) {
                if wm.state.flags.click_to_focus {
                    focus(wm, id, false)?;
                }
                if let Some(grab) = wm.grabs.lookup(code, normalized).cloned() {
                    actions::execute_on_client(wm, &grab, id)?;
                }
            }
        }
        XEvent::MotionNotify { .. } | XEvent::ButtonRelease => {}
        XEvent::ExtensionReady { token } => {
            crate::extensions::sublet::fire(&wm.state.sublet_watches, &wm.state.registry, token)?;
        }
    }

    Ok(())
}
