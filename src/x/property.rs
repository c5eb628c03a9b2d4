//! ICCCM/Motif property shapes read off client windows: `WM_NORMAL_HINTS`
//! size hints and `_MOTIF_WM_HINTS` decoration/function/input hints.

use crate::pure::gravity::SizeHints;
use crate::pure::Rect;

/// The value of a property as read back from the server, already decoded
/// into the shape the caller asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Prop {
    Utf8String(Vec<String>),
    Atom(Vec<String>),
    Cardinal(Vec<u32>),
    Window(Vec<crate::core::Xid>),
    WmNormalHints(WmNormalHints),
    WmHints(WmHints),
    MotifHints(MotifHints),
    WmState(WmState),
}

/// `WM_NORMAL_HINTS`: decodes directly into the pure [SizeHints] shape plus
/// the requested program position/size, which `SizeHints` itself does not
/// carry.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WmNormalHints {
    pub hints: SizeHints,
}

impl WmNormalHints {
    /// `min == max` implies a fixed-size client step 10.
    pub fn implies_fixed(&self) -> bool {
        self.hints.is_fixed()
    }
}

/// `WM_HINTS`: only the subset the core consults.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WmHints {
    /// Whether the client wants keyboard input at all; defaults to true
    /// when the hint is absent step 10.
    pub input: bool,
    /// `WM_HINTS.urgency`, translated to the client's urgent mode on adopt.
    pub urgent: bool,
}

bitflags::bitflags! {
    /// `_MOTIF_WM_HINTS.flags`; only the decoration bit is consulted.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MwmFlags: u32 {
        const DECORATIONS = 1 << 1;
    }
}

bitflags::bitflags! {
    /// `_MOTIF_WM_HINTS.decorations`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MwmDecorations: u32 {
        const ALL    = 1 << 0;
        const BORDER = 1 << 1;
    }
}

/// The first two 32-bit words of `_MOTIF_WM_HINTS`, the only ones the core
/// reads.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotifHints {
    pub flags: MwmFlags,
    pub decorations: MwmDecorations,
}

impl MotifHints {
    /// Decode the raw `(flags, decorations)` 32-bit words read off the
    /// property into a typed [MotifHints].
    pub fn from_raw(flags: u32, decorations: u32) -> Self {
        Self {
            flags: MwmFlags::from_bits_truncate(flags),
            decorations: MwmDecorations::from_bits_truncate(decorations),
        }
    }

    /// Absence of the border decoration bit (while the decoration flag
    /// itself is present) means the client should be borderless.
    pub fn wants_borderless(&self) -> bool {
        self.flags.contains(MwmFlags::DECORATIONS)
            && !self
                .decorations
                .intersects(MwmDecorations::ALL | MwmDecorations::BORDER)
    }
}

/// ICCCM `WM_STATE` values, written on every client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WmState {
    Withdrawn,
    Normal,
    Iconic,
}

impl WmState {
    pub fn as_u32(&self) -> u32 {
        match self {
            WmState::Withdrawn => 0,
            WmState::Normal => 1,
            WmState::Iconic => 3,
        }
    }
}

/// `_NET_WM_STRUT`: edge reservations requested by a client (e.g. a panel),
/// used to shrink a screen's work area (`Screen.work_geom`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Strut {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Strut {
    /// Shrink `base` by this strut's edges, clamping so the work area never
    /// inverts ("Client misbehavior": clamp to safe range).
    pub fn apply(&self, base: Rect) -> Rect {
        let left = self.left.min(base.w / 2);
        let right = self.right.min(base.w.saturating_sub(left) / 2);
        let top = self.top.min(base.h / 2);
        let bottom = self.bottom.min(base.h.saturating_sub(top) / 2);

        Rect {
            x: base.x + left as i32,
            y: base.y + top as i32,
            w: base.w.saturating_sub(left + right),
            h: base.h.saturating_sub(top + bottom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motif_hints_borderless_when_decorations_flag_excludes_border() {
        let h = MotifHints::from_raw(0b10, 0);
        assert!(h.wants_borderless());
    }

    #[test]
    fn motif_hints_not_borderless_when_decorations_flag_absent() {
        let h = MotifHints::from_raw(0, 0);
        assert!(!h.wants_borderless());
    }

    #[test]
    fn strut_shrinks_work_area() {
        let base = Rect::new(0, 0, 1000, 800);
        let strut = Strut {
            top: 20,
            ..Default::default()
        };
        let work = strut.apply(base);
        assert_eq!(work, Rect::new(0, 20, 1000, 780));
    }

    #[test]
    fn strut_clamps_oversized_requests() {
        let base = Rect::new(0, 0, 100, 100);
        let strut = Strut {
            top: 10_000,
            bottom: 10_000,
            ..Default::default()
        };
        let work = strut.apply(base);
        assert!(work.h > 0);
    }
}
