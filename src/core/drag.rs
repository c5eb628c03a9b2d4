//! Mouse/keyboard-driven move and resize. The drag loop is a nested
//! blocking read against the same `XConn` the main loop uses: while
//! server-grabbed it must not dispatch other events.

use crate::core::registry::ClientId;
use crate::core::WindowManager;
use crate::pure::gravity::{resize, ResizePolicy};
use crate::pure::Rect;
use crate::x::{XConn, XEvent};
use crate::Result;

/// Which geometry transform a drag performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Move,
    Resize,
}

/// A directional-step drag's direction, also used to pick which edges an
/// interactive resize grabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Entry point for both drag flavors. `direction` present means the
/// directional-step mode; absent means interactive pointer-driven mode.
pub fn run<X: XConn>(
    wm: &mut WindowManager<X>,
    id: ClientId,
    mode: DragMode,
    direction: Option<Direction>,
) -> Result<()> {
    match direction {
        Some(dir) => step(wm, id, mode, dir),
        None => interactive(wm, id, mode),
    }
}

fn screen_bounds<X: XConn>(wm: &WindowManager<X>, id: ClientId) -> Option<Rect> {
    let client = wm.state.registry.client(id)?;
    wm.state.registry.screen(client.screen_id).map(|s| s.work_geom)
}

fn apply<X: XConn>(wm: &mut WindowManager<X>, id: ClientId, geom: Rect) -> Result<()> {
    if let Some(client) = wm.state.registry.client_mut(id) {
        client.geom = geom;
        let window = client.window;
        wm.x.configure(window, geom)?;
    }
    Ok(())
}

fn snap(mut geom: Rect, bounds: &Rect, snap: i32, border: u32) -> Rect {
    let border = border as i32;

    if (geom.x - bounds.x).abs() <= snap {
        geom.x = bounds.x + border;
    }
    if (geom.y - bounds.y).abs() <= snap {
        geom.y = bounds.y + border;
    }
    let right = bounds.x + bounds.w as i32;
    let geom_right = geom.x + geom.w as i32;
    if (right - geom_right).abs() <= snap {
        geom.x = right - geom.w as i32 - border;
    }
    let bottom = bounds.y + bounds.h as i32;
    let geom_bottom = geom.y + geom.h as i32;
    if (bottom - geom_bottom).abs() <= snap {
        geom.y = bottom - geom.h as i32 - border;
    }

    geom
}

fn step<X: XConn>(
    wm: &mut WindowManager<X>,
    id: ClientId,
    mode: DragMode,
    dir: Direction,
) -> Result<()> {
    let Some(bounds) = screen_bounds(wm, id) else {
        return Ok(());
    };
    let Some(client) = wm.state.registry.client(id) else {
        return Ok(());
    };

    let step = wm.config.step;
    let hints = client.size_hints;
    let (inc_w, inc_h) = hints.inc.unwrap_or((step.max(1) as u32, step.max(1) as u32));
    let mut geom = client.geom;

    match (mode, dir) {
        (DragMode::Move, Direction::Up) => geom.y -= step,
        (DragMode::Move, Direction::Down) => geom.y += step,
        (DragMode::Move, Direction::Left) => geom.x -= step,
        (DragMode::Move, Direction::Right) => geom.x += step,
        (DragMode::Resize, Direction::Right) => geom.w = geom.w.saturating_add(inc_w),
        (DragMode::Resize, Direction::Left) => geom.w = geom.w.saturating_sub(inc_w).max(1),
        (DragMode::Resize, Direction::Down) => geom.h = geom.h.saturating_add(inc_h),
        (DragMode::Resize, Direction::Up) => geom.h = geom.h.saturating_sub(inc_h).max(1),
    }

    geom = snap(geom, &bounds, wm.config.snap, wm.config.border_width);
    geom = resize(geom, &bounds, &hints, drag_policy(client_is_floating(wm, id), true));

    apply(wm, id, geom)
}

fn client_is_floating<X: XConn>(wm: &WindowManager<X>, id: ClientId) -> bool {
    wm.state
        .registry
        .client(id)
        .map(|c| c.is_floating())
        .unwrap_or(false)
}

fn drag_policy(is_floating: bool, has_resize_mode: bool) -> ResizePolicy {
    ResizePolicy {
        honor_size_hints_globally: false,
        is_floating,
        has_resize_mode,
        is_full: false,
        is_dock: false,
        is_fixed: false,
    }
}

/// Drag edges an interactive resize adjusts, picked from the pointer's
/// initial position relative to the client's center.
#[derive(Debug, Clone, Copy)]
struct ResizeEdges {
    left: bool,
    right: bool,
    top: bool,
    bottom: bool,
}

fn edges_for(pointer_x: i32, pointer_y: i32, geom: &Rect) -> ResizeEdges {
    let mid = geom.midpoint();
    ResizeEdges {
        left: pointer_x < mid.x,
        right: pointer_x >= mid.x,
        top: pointer_y < mid.y,
        bottom: pointer_y >= mid.y,
    }
}

/// Interactive mode: grab pointer+server, then block on raw events directly
/// (bypassing `handle::dispatch`) until `ButtonRelease`. The nested loop
/// must not dispatch other events while the pointer/server are grabbed.
fn interactive<X: XConn>(wm: &mut WindowManager<X>, id: ClientId, mode: DragMode) -> Result<()> {
    let Some(bounds) = screen_bounds(wm, id) else {
        return Ok(());
    };
    let Some(client) = wm.state.registry.client(id) else {
        return Ok(());
    };

    let origin_geom = client.geom;
    let hints = client.size_hints;
    let is_floating = client.is_floating();
    let (pointer, _) = wm.x.pointer_location()?;
    let edges = edges_for(pointer.x, pointer.y, &origin_geom);

    wm.x.grab_pointer_and_server()?;

    let result = (|| -> Result<()> {
        loop {
            match wm.x.next_event()? {
                XEvent::MotionNotify { x, y } => {
                    let mut geom = origin_geom;
                    let dx = x - pointer.x;
                    let dy = y - pointer.y;

                    match mode {
                        DragMode::Move => {
                            geom.x = origin_geom.x + dx;
                            geom.y = origin_geom.y + dy;
                        }
                        DragMode::Resize => {
                            if edges.right {
                                geom.w = (origin_geom.w as i32 + dx).max(1) as u32;
                            } else if edges.left {
                                geom.w = (origin_geom.w as i32 - dx).max(1) as u32;
                                geom.x = origin_geom.x + dx;
                            }
                            if edges.bottom {
                                geom.h = (origin_geom.h as i32 + dy).max(1) as u32;
                            } else if edges.top {
                                geom.h = (origin_geom.h as i32 - dy).max(1) as u32;
                                geom.y = origin_geom.y + dy;
                            }
                        }
                    }

                    geom = snap(geom, &bounds, wm.config.snap, wm.config.border_width);
                    geom = resize(
                        geom,
                        &bounds,
                        &hints,
                        drag_policy(is_floating, mode == DragMode::Resize),
                    );
                    apply(wm, id, geom)?;
                    wm.x.flush()?;
                }
                XEvent::ButtonRelease => return Ok(()),
                _ => {}
            }
        }
    })();

    wm.x.ungrab_pointer_and_server()?;
    result
}
