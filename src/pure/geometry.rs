//! Geometry primitives shared by every placement calculation.
use serde::{Deserialize, Serialize};

/// An x,y coordinate pair.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// An absolute x coordinate relative to the root window.
    pub x: i32,
    /// An absolute y coordinate relative to the root window.
    pub y: i32,
}

impl Point {
    /// Create a new [Point].
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// An X window / screen position: top left corner plus extent.
///
/// All fields are signed so that a [Rect] can represent a position on a
/// zaphod screen spanning multiple physical outputs with a negative origin.
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// The x-coordinate of the top left corner of this rect.
    pub x: i32,
    /// The y-coordinate of the top left corner of this rect.
    pub y: i32,
    /// The width of this rect.
    pub w: u32,
    /// The height of this rect.
    pub h: u32,
}

impl Rect {
    /// Create a new [Rect].
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Rect {
        Rect { x, y, w, h }
    }

    /// The top left corner of this rect.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// The midpoint of this rectangle.
    pub fn midpoint(&self) -> Point {
        Point::new(self.x + self.w as i32 / 2, self.y + self.h as i32 / 2)
    }

    /// Whether `other` is fully contained within this rect.
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.x + other.w as i32 <= self.x + self.w as i32
            && other.y + other.h as i32 <= self.y + self.h as i32
    }

    /// Whether this rect contains the given point, inclusive of its edges.
    pub fn contains_point<P: Into<Point>>(&self, p: P) -> bool {
        let p = p.into();

        (self.x..=(self.x + self.w as i32)).contains(&p.x)
            && (self.y..=(self.y + self.h as i32)).contains(&p.y)
    }

    /// Shrink every edge of this rect in by `px` pixels (used to account for
    /// a client border when the frame itself is not reparented).
    pub fn shrink_in(&self, px: u32) -> Self {
        let px2 = px * 2;
        Self {
            x: self.x + px as i32,
            y: self.y + px as i32,
            w: self.w.saturating_sub(px2),
            h: self.h.saturating_sub(px2),
        }
    }

    /// Translate this rect by the vector between two origins, e.g. when a
    /// floating client moves from one screen to another.
    pub fn translated(&self, from: Point, to: Point) -> Self {
        Self {
            x: self.x - from.x + to.x,
            y: self.y - from.y + to.y,
            ..*self
        }
    }

    /// Center this rect inside of `enclosing`, clamping to `enclosing`'s
    /// size if this rect does not fit.
    pub fn centered_in(&self, enclosing: &Rect) -> Self {
        let w = self.w.min(enclosing.w);
        let h = self.h.min(enclosing.h);

        Self {
            x: enclosing.x + (enclosing.w as i32 - w as i32) / 2,
            y: enclosing.y + (enclosing.h as i32 - h as i32) / 2,
            w,
            h,
        }
    }

    /// Clamp this rect so that it lies fully inside `bounds`, re-centering
    /// on an axis that overflows if `recenter` is set (used for floating
    /// clients), otherwise snapping that axis to the bound's origin.
    pub fn clamped_to(&self, bounds: &Rect, recenter: bool) -> Self {
        let mut r = *self;
        r.w = r.w.min(bounds.w);
        r.h = r.h.min(bounds.h);

        let max_x = bounds.x + bounds.w as i32 - r.w as i32;
        let max_y = bounds.y + bounds.h as i32 - r.h as i32;

        if r.x < bounds.x || r.x > max_x {
            r.x = if recenter {
                bounds.x + (bounds.w as i32 - r.w as i32) / 2
            } else {
                bounds.x
            };
        }
        if r.y < bounds.y || r.y > max_y {
            r.y = if recenter {
                bounds.y + (bounds.h as i32 - r.h as i32) / 2
            } else {
                bounds.y
            };
        }

        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case(Point::new(0, 0), false; "outside")]
    #[test_case(Point::new(30, 20), true; "inside")]
    #[test_case(Point::new(10, 20), true; "top left edge")]
    #[test_case(Point::new(40, 60), true; "bottom right edge")]
    #[test]
    fn contains_point(p: Point, expected: bool) {
        let r = Rect::new(10, 20, 30, 40);
        assert_eq!(r.contains_point(p), expected);
    }

    #[test]
    fn contains_rect() {
        let outer = Rect::new(0, 0, 100, 100);
        let inner = Rect::new(10, 10, 50, 50);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
    }

    #[test]
    fn shrink_in_is_symmetric() {
        let r = Rect::new(0, 0, 100, 60);
        let shrunk = r.shrink_in(5);
        assert_eq!(shrunk, Rect::new(5, 5, 90, 50));
    }

    #[test]
    fn clamped_to_snaps_when_not_recentering() {
        let bounds = Rect::new(0, 0, 200, 200);
        let r = Rect::new(-50, 300, 80, 80);
        let clamped = r.clamped_to(&bounds, false);
        assert_eq!(clamped.x, 0);
        assert_eq!(clamped.y, 120);
    }

    #[test]
    fn clamped_to_recenters_when_floating() {
        let bounds = Rect::new(0, 0, 200, 200);
        let r = Rect::new(-50, -50, 80, 80);
        let clamped = r.clamped_to(&bounds, true);
        assert_eq!(clamped.x, 60);
        assert_eq!(clamped.y, 60);
    }
}
