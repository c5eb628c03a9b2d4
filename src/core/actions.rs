//! Pure dispatch on grab flags: a flag-by-flag cascade over [GrabFlags]
//! that runs the action a fired grab names, independent of how the grab
//! was triggered (key, button, or keychain completion).

use crate::core::bindings::{Grab, GrabData, GrabFlags};
use crate::core::drag::{self, Direction, DragMode};
use crate::core::registry::{ClientId, ClientMode, ScreenId, ViewId};
use crate::core::{handle, hooks, WindowManager};
use crate::pure::StackOrder;
use crate::x::XConn;
use crate::Result;

/// Entry point for key-press driven grabs: the subject client is whichever
/// one currently holds focus, not the window the key was pressed over.
pub(crate) fn execute<X: XConn>(wm: &mut WindowManager<X>, grab: &Grab) -> Result<()> {
    let subject = focused_client(wm);
    dispatch(wm, grab, subject)
}

/// Entry point for button-press driven grabs: the subject client is the
/// window the pointer was over when the button fired.
pub(crate) fn execute_on_client<X: XConn>(
    wm: &mut WindowManager<X>,
    grab: &Grab,
    id: ClientId,
) -> Result<()> {
    dispatch(wm, grab, Some(id))
}

fn focused_client<X: XConn>(wm: &WindowManager<X>) -> Option<ClientId> {
    wm.state
        .focus
        .current()
        .and_then(|w| wm.state.registry.client_by_window(w))
        .map(|c| c.id)
}

fn direction_of(data: &GrabData) -> Option<Direction> {
    match data {
        GrabData::Str(s) => match s.to_ascii_lowercase().as_str() {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        },
        _ => None,
    }
}

fn mode_mask_of(data: &GrabData) -> ClientMode {
    match data {
        GrabData::Int(i) => ClientMode::from_bits_truncate(*i as u16),
        _ => ClientMode::empty(),
    }
}

fn dispatch<X: XConn>(
    wm: &mut WindowManager<X>,
    grab: &Grab,
    subject: Option<ClientId>,
) -> Result<()> {
    let flags = grab.flags;

    if flags.contains(GrabFlags::SPAWN) {
        if let GrabData::Str(cmd) = &grab.data {
            wm.x.spawn(cmd)?;
        }
        return Ok(());
    }

    if flags.contains(GrabFlags::CALLBACK) {
        if let GrabData::Callback(cb) = &grab.data {
            if let Some(id) = subject {
                if let Some(client) = wm.state.registry.client(id) {
                    cb(client);
                }
            }
        }
        return Ok(());
    }

    if flags.intersects(GrabFlags::VIEW_FOCUS | GrabFlags::VIEW_SWAP) {
        return view_focus_action(wm, grab);
    }

    if flags.contains(GrabFlags::VIEW_SELECT) {
        return view_select(wm, &grab.data);
    }

    if flags.contains(GrabFlags::SCREEN_JUMP) {
        return screen_jump(wm, &grab.data);
    }

    if flags.intersects(GrabFlags::WINDOW_MOVE | GrabFlags::WINDOW_RESIZE) {
        let Some(id) = subject else { return Ok(()) };
        let mode = if flags.contains(GrabFlags::WINDOW_RESIZE) {
            DragMode::Resize
        } else {
            DragMode::Move
        };
        return drag::run(wm, id, mode, direction_of(&grab.data));
    }

    if flags.contains(GrabFlags::WINDOW_TOGGLE) {
        let Some(id) = subject else { return Ok(()) };
        return handle::toggle_modes(wm, id, mode_mask_of(&grab.data), true);
    }

    if flags.contains(GrabFlags::WINDOW_STACK) {
        let Some(id) = subject else { return Ok(()) };
        return window_stack(wm, id, &grab.data);
    }

    if flags.contains(GrabFlags::WINDOW_SELECT) {
        return window_select(wm, &grab.data);
    }

    if flags.contains(GrabFlags::WINDOW_GRAVITY) {
        let Some(id) = subject else { return Ok(()) };
        return window_gravity(wm, id, &grab.data);
    }

    if flags.contains(GrabFlags::WINDOW_KILL) {
        let Some(id) = subject else { return Ok(()) };
        return handle::close(wm, id);
    }

    if flags.contains(GrabFlags::SUBTLE_RELOAD) {
        wm.state.flags.reload = true;
        return Ok(());
    }

    if flags.contains(GrabFlags::SUBTLE_RESTART) {
        wm.state.flags.restart = true;
        wm.state.flags.run = false;
        return Ok(());
    }

    if flags.contains(GrabFlags::SUBTLE_QUIT) {
        wm.state.flags.run = false;
        return Ok(());
    }

    Ok(())
}

/// `view-focus` / `view-swap`: resolve the target view — by name
/// (`data.string`, the hand-written config path) or by index (`data.int`,
/// the `ViewJump<N>`/`ViewSwitch<N>` builtins) — and delegate to
/// [handle::view_focus] on the pointer's screen.
fn view_focus_action<X: XConn>(wm: &mut WindowManager<X>, grab: &Grab) -> Result<()> {
    let view_id = match &grab.data {
        GrabData::Str(name) => wm.state.registry.view_by_name(name).map(|v| v.id),
        GrabData::Int(idx) => wm.state.registry.views().get(*idx as usize).map(|v| v.id),
        _ => None,
    };
    let Some(view_id) = view_id else {
        return Ok(());
    };

    let screen_id = handle::current_screen_id(wm);
    let swap = grab.flags.contains(GrabFlags::VIEW_SWAP);
    handle::view_focus(wm, screen_id, view_id, swap, true)
}

/// `view-select(next|prev)`: step the pointer's screen to the adjacent view,
/// wrapping at either end.
fn view_select<X: XConn>(wm: &mut WindowManager<X>, data: &GrabData) -> Result<()> {
    let screen_id = handle::current_screen_id(wm);
    let Some(current) = wm.state.registry.screen(screen_id).map(|s| s.view_id) else {
        return Ok(());
    };
    let total = wm.state.registry.views().len();
    if total == 0 {
        return Ok(());
    }

    let prev = matches!(data, GrabData::Str(s) if s.eq_ignore_ascii_case("prev"));
    let delta: i64 = if prev { -1 } else { 1 };
    let next = (current.0 as i64 + delta).rem_euclid(total as i64) as usize;

    handle::view_focus(wm, screen_id, ViewId(next), false, true)
}

/// `screen-jump`: warp the pointer to the named screen and focus whatever
/// client belongs there.
fn screen_jump<X: XConn>(wm: &mut WindowManager<X>, data: &GrabData) -> Result<()> {
    let GrabData::Int(idx) = data else {
        return Ok(());
    };
    let Some(screen) = wm.state.registry.screen(ScreenId(*idx as usize)).cloned() else {
        return Ok(());
    };

    let mid = screen.base_geom.midpoint();
    wm.x.warp_pointer(wm.state.root, mid.x, mid.y)?;

    if let Some(id) = handle::next(wm, screen.id, false) {
        handle::focus(wm, id, false)?;
    }

    Ok(())
}

/// `window-stack(up|down)`: record the direction on the subject client and
/// re-sort via the layering comparator.
fn window_stack<X: XConn>(wm: &mut WindowManager<X>, id: ClientId, data: &GrabData) -> Result<()> {
    let dir = match data {
        GrabData::Str(s) if s.eq_ignore_ascii_case("down") => StackOrder::Down,
        _ => StackOrder::Up,
    };

    if let Some(c) = wm.state.registry.client_mut(id) {
        c.restack_dir = Some(dir);
    }

    handle::restack(wm)
}

/// `window-select(dir)`: direction-aware distance metric over every visible
/// peer. Disqualifies peers outside the half-plane `dir`
/// points to, then ranks by Manhattan distance minus a stacking-order bonus
/// and a focus-history recency bonus; focuses the minimum.
fn window_select<X: XConn>(wm: &mut WindowManager<X>, data: &GrabData) -> Result<()> {
    let Some(dir) = direction_of(data) else {
        return Ok(());
    };
    let Some(current_window) = wm.state.focus.current() else {
        return Ok(());
    };
    let Some(current) = wm.state.registry.client_by_window(current_window) else {
        return Ok(());
    };
    let current_id = current.id;
    let origin = current.geom.midpoint();

    let stacking: Vec<ClientId> = wm.state.registry.stacking_order().map(|c| c.id).collect();

    let mut best: Option<(i64, ClientId)> = None;
    for (idx, &id) in stacking.iter().enumerate() {
        if id == current_id {
            continue;
        }
        let Some(peer) = wm.state.registry.client(id) else {
            continue;
        };
        if !handle::is_client_visible(&wm.state.registry, peer) {
            continue;
        }

        let mid = peer.geom.midpoint();
        let in_half_plane = match dir {
            Direction::Left => mid.x < origin.x,
            Direction::Right => mid.x > origin.x,
            Direction::Up => mid.y < origin.y,
            Direction::Down => mid.y > origin.y,
        };
        if !in_half_plane {
            continue;
        }

        let manhattan = (mid.x - origin.x).unsigned_abs() as i64 + (mid.y - origin.y).unsigned_abs() as i64;
        let mut distance = manhattan - idx as i64;

        if let Some(pos) = wm.state.focus.iter().position(|&w| w == peer.window) {
            let bonus = crate::pure::focus::HISTORY_DEPTH.saturating_sub(pos);
            distance -= bonus as i64;
        }

        if best.map_or(true, |(best_distance, _)| distance < best_distance) {
            best = Some((distance, id));
        }
    }

    if let Some((_, id)) = best {
        handle::focus(wm, id, !wm.state.flags.skip_pointer_warp)?;
    }

    Ok(())
}

/// `window-gravity(str)`: cycle through the comma-separated gravity-name
/// sequence in `data.string`, advancing from the client's current gravity
/// and wrapping at the end.
fn window_gravity<X: XConn>(wm: &mut WindowManager<X>, id: ClientId, data: &GrabData) -> Result<()> {
    let GrabData::Str(sequence) = data else {
        return Ok(());
    };
    let names: Vec<&str> = sequence.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
    if names.is_empty() {
        return Ok(());
    }

    let Some(client) = wm.state.registry.client(id).cloned() else {
        return Ok(());
    };
    if client.is_dead() || client.mode.contains(ClientMode::FIXED) {
        return Ok(());
    }

    let current_name = wm.state.registry.gravity(client.gravity_id).map(|g| g.name.as_str());
    let pos = current_name.and_then(|n| names.iter().position(|&name| name == n));
    let next_name = match pos {
        Some(p) => names[(p + 1) % names.len()],
        None => names[0],
    };
    let Some(next_gravity) = wm.state.registry.gravity_by_name(next_name).map(|g| g.id) else {
        return Ok(());
    };

    if let Some(c) = wm.state.registry.client_mut(id) {
        c.mode.remove(ClientMode::FLOAT | ClientMode::FULL);
        c.gravity_id = next_gravity;
        for slot in c.gravities.iter_mut() {
            *slot = next_gravity;
        }
    }

    let window = wm.state.registry.client(id).map(|c| c.window);
    handle::arrange(&wm.x, &mut wm.state, id)?;

    if let Some(window) = window {
        wm.config
            .hooks
            .call(hooks::HookMask::CLIENT_GRAVITY, &hooks::HookSubject::Client { id, window });
    }

    Ok(())
}
