//! Gravity placement and tiling: named relative rectangles and the pure
//! geometry transforms derived from them.

use crate::pure::geometry::Rect;

/// The tiling direction a gravity imposes on clients that share it, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileDirection {
    Horizontal,
    Vertical,
}

/// A named rectangle expressed as percentages (0..=100) of a bounds rect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GravitySpec {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub tile: Option<TileDirection>,
}

/// `geometry_of(gravity, bounds) -> rect`: pure percentage-of-bounds mapping.
pub fn geometry_of(g: &GravitySpec, bounds: &Rect) -> Rect {
    Rect {
        x: bounds.x + (bounds.w as i64 * g.x as i64 / 100) as i32,
        y: bounds.y + (bounds.h as i64 * g.y as i64 / 100) as i32,
        w: (bounds.w as u64 * g.w as u64 / 100) as u32,
        h: (bounds.h as u64 * g.h as u64 / 100) as u32,
    }
}

/// ICCCM `WM_NORMAL_HINTS`-derived sizing constraints.
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeHints {
    pub min: Option<(u32, u32)>,
    pub max: Option<(u32, u32)>,
    pub inc: Option<(u32, u32)>,
    pub base: Option<(u32, u32)>,
    pub min_aspect: Option<f64>,
    pub max_aspect: Option<f64>,
}

impl SizeHints {
    /// A `min == max` pair implies a fixed-size client (step 10).
    pub fn is_fixed(&self) -> bool {
        matches!((self.min, self.max), (Some(min), Some(max)) if min == max)
    }
}

/// Policy knobs that decide whether [resize] honors size hints at all.
#[derive(Debug, Clone, Copy)]
pub struct ResizePolicy {
    pub honor_size_hints_globally: bool,
    pub is_floating: bool,
    pub has_resize_mode: bool,
    pub is_full: bool,
    pub is_dock: bool,
    pub is_fixed: bool,
}

/// `resize(client, bounds)`: clamp to hints, then always clamp to `bounds`
/// unless the client is full, dock or fixed-size.
pub fn resize(mut geom: Rect, bounds: &Rect, hints: &SizeHints, policy: ResizePolicy) -> Rect {
    let apply_hints =
        policy.honor_size_hints_globally || policy.is_floating || policy.has_resize_mode;

    if apply_hints {
        if let Some((min_w, min_h)) = hints.min {
            geom.w = geom.w.max(min_w);
            geom.h = geom.h.max(min_h);
        }

        let (max_w, max_h) = hints.max.unwrap_or((bounds.w, bounds.h));
        geom.w = geom.w.min(max_w.max(1));
        geom.h = geom.h.min(max_h.max(1));

        if let Some((inc_w, inc_h)) = hints.inc {
            let (base_w, base_h) = hints.base.unwrap_or((0, 0));

            if inc_w > 0 && geom.w > base_w {
                let residue = (geom.w - base_w) % inc_w;
                if residue != 0 {
                    geom.w -= residue;
                    if policy.is_floating {
                        geom.x += (residue / 2) as i32;
                    }
                }
            }
            if inc_h > 0 && geom.h > base_h {
                let residue = (geom.h - base_h) % inc_h;
                if residue != 0 {
                    geom.h -= residue;
                    if policy.is_floating {
                        geom.y += (residue / 2) as i32;
                    }
                }
            }
        }

        if let (Some(min_aspect), h) = (hints.min_aspect, geom.h) {
            if h > 0 {
                let aspect = geom.w as f64 / h as f64;
                if aspect < min_aspect {
                    geom.w = (h as f64 * min_aspect) as u32;
                }
            }
        }
        if let (Some(max_aspect), h) = (hints.max_aspect, geom.h) {
            if h > 0 {
                let aspect = geom.w as f64 / h as f64;
                if aspect > max_aspect {
                    geom.w = (h as f64 * max_aspect) as u32;
                }
            }
        }
    }

    if !policy.is_full && !policy.is_dock && !policy.is_fixed {
        geom = geom.clamped_to(bounds, policy.is_floating);
    }

    geom
}

/// A single client entering [tile]: only the axis-relevant extent and a
/// stable identity for re-association with the caller's own client record.
#[derive(Debug, Clone, Copy)]
pub struct TileSlot<Id> {
    pub id: Id,
}

/// `tile(gravity, screen)`: divide `bounds` equally among `slots` along the
/// gravity's tiling axis, the final slot absorbing any rounding remainder.
/// Returns one [Rect] per input slot, in the same order.
pub fn tile<Id: Copy>(
    slots: &[TileSlot<Id>],
    bounds: &Rect,
    direction: TileDirection,
) -> Vec<(Id, Rect)> {
    let count = slots.len() as u32;
    if count == 0 {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(slots.len());

    match direction {
        TileDirection::Horizontal => {
            let base_w = bounds.w / count;
            let mut x = bounds.x;
            for (i, slot) in slots.iter().enumerate() {
                let w = if i as u32 == count - 1 {
                    bounds.w - base_w * (count - 1)
                } else {
                    base_w
                };
                out.push((slot.id, Rect::new(x, bounds.y, w, bounds.h)));
                x += w as i32;
            }
        }
        TileDirection::Vertical => {
            let base_h = bounds.h / count;
            let mut y = bounds.y;
            for (i, slot) in slots.iter().enumerate() {
                let h = if i as u32 == count - 1 {
                    bounds.h - base_h * (count - 1)
                } else {
                    base_h
                };
                out.push((slot.id, Rect::new(bounds.x, y, bounds.w, h)));
                y += h as i32;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[quickcheck]
    fn resize_aspect_clamp_is_idempotent(w: u16, h: u16, min_aspect_raw: u8) -> bool {
        let w = (w as u32).max(1);
        let h = (h as u32).max(1);
        let min_aspect = (min_aspect_raw as f64 % 8.0) + 1.0;
        let bounds = Rect::new(0, 0, 5000, 5000);
        let hints = SizeHints {
            min_aspect: Some(min_aspect),
            ..Default::default()
        };
        let policy = ResizePolicy {
            honor_size_hints_globally: true,
            is_floating: false,
            has_resize_mode: false,
            is_full: false,
            is_dock: false,
            is_fixed: false,
        };

        let once = resize(Rect::new(0, 0, w, h), &bounds, &hints, policy);
        let twice = resize(once, &bounds, &hints, policy);
        once == twice
    }

    #[quickcheck]
    fn resize_with_min_hint_never_produces_a_zero_dimension(w: u16, h: u16) -> bool {
        let bounds = Rect::new(0, 0, 2000, 2000);
        let hints = SizeHints {
            min: Some((1, 1)),
            ..Default::default()
        };
        let policy = ResizePolicy {
            honor_size_hints_globally: true,
            is_floating: true,
            has_resize_mode: true,
            is_full: false,
            is_dock: false,
            is_fixed: false,
        };

        let out = resize(Rect::new(0, 0, w as u32, h as u32), &bounds, &hints, policy);
        out.w > 0 && out.h > 0
    }

    #[test]
    fn geometry_of_is_stable_on_multiples_of_100() {
        let bounds = Rect::new(0, 0, 1000, 1000);
        let g = GravitySpec {
            x: 25,
            y: 25,
            w: 50,
            h: 50,
            tile: None,
        };
        assert_eq!(geometry_of(&g, &bounds), Rect::new(250, 250, 500, 500));
    }

    #[test]
    fn tile_horizontal_last_slot_absorbs_remainder() {
        let bounds = Rect::new(0, 0, 100, 50);
        let slots = [TileSlot { id: 0 }, TileSlot { id: 1 }, TileSlot { id: 2 }];
        let placed = tile(&slots, &bounds, TileDirection::Horizontal);

        assert_eq!(placed[0].1, Rect::new(0, 0, 33, 50));
        assert_eq!(placed[1].1, Rect::new(33, 0, 33, 50));
        assert_eq!(placed[2].1, Rect::new(66, 0, 34, 50));
    }

    #[test]
    fn tile_is_idempotent() {
        let bounds = Rect::new(0, 0, 301, 200);
        let slots = [TileSlot { id: 'a' }, TileSlot { id: 'b' }];
        let first = tile(&slots, &bounds, TileDirection::Vertical);
        let second = tile(&slots, &bounds, TileDirection::Vertical);
        assert_eq!(first, second);
    }

    #[test]
    fn resize_clamps_to_min_and_max() {
        let bounds = Rect::new(0, 0, 200, 200);
        let hints = SizeHints {
            min: Some((50, 50)),
            max: Some((100, 100)),
            ..Default::default()
        };
        let policy = ResizePolicy {
            honor_size_hints_globally: true,
            is_floating: false,
            has_resize_mode: false,
            is_full: false,
            is_dock: false,
            is_fixed: false,
        };

        let out = resize(Rect::new(0, 0, 10, 300), &bounds, &hints, policy);
        assert_eq!(out.w, 50);
        assert_eq!(out.h, 100);
    }

    #[test]
    fn resize_leaves_width_alone_when_already_above_min_aspect() {
        let bounds = Rect::new(0, 0, 1000, 1000);
        let hints = SizeHints {
            min_aspect: Some(2.0),
            ..Default::default()
        };
        let policy = ResizePolicy {
            honor_size_hints_globally: true,
            is_floating: false,
            has_resize_mode: false,
            is_full: false,
            is_dock: false,
            is_fixed: false,
        };

        let out = resize(Rect::new(0, 0, 100, 10), &bounds, &hints, policy);
        assert_eq!(out.w, 100);
    }

    #[test]
    fn resize_widens_to_satisfy_min_aspect() {
        let bounds = Rect::new(0, 0, 1000, 1000);
        let hints = SizeHints {
            min_aspect: Some(2.0),
            ..Default::default()
        };
        let policy = ResizePolicy {
            honor_size_hints_globally: true,
            is_floating: false,
            has_resize_mode: false,
            is_full: false,
            is_dock: false,
            is_fixed: false,
        };

        let out = resize(Rect::new(0, 0, 10, 100), &bounds, &hints, policy);
        assert_eq!(out.w, 200);
    }

    #[test]
    fn resize_narrows_to_satisfy_max_aspect() {
        let bounds = Rect::new(0, 0, 1000, 1000);
        let hints = SizeHints {
            max_aspect: Some(2.0),
            ..Default::default()
        };
        let policy = ResizePolicy {
            honor_size_hints_globally: true,
            is_floating: false,
            has_resize_mode: false,
            is_full: false,
            is_dock: false,
            is_fixed: false,
        };

        let out = resize(Rect::new(0, 0, 1000, 10), &bounds, &hints, policy);
        assert_eq!(out.w, 20);
    }

    #[test]
    fn fixed_client_skips_bounds_clamp() {
        let bounds = Rect::new(0, 0, 100, 100);
        let hints = SizeHints::default();
        let policy = ResizePolicy {
            honor_size_hints_globally: false,
            is_floating: false,
            has_resize_mode: false,
            is_full: false,
            is_dock: false,
            is_fixed: true,
        };
        let out = resize(Rect::new(500, 500, 50, 50), &bounds, &hints, policy);
        assert_eq!(out, Rect::new(500, 500, 50, 50));
    }
}
