//! Side-effect-free data structures and algorithms.
//!
//! Everything under this module is free of `XConn` and can be exercised in
//! unit tests without a display connection: geometry math, the tag matcher,
//! gravity placement/tiling, the layering comparator and the focus ring.

pub mod focus;
pub mod geometry;
pub mod gravity;
pub mod layering;
pub mod tag;

pub use focus::FocusRing;
pub use geometry::{Point, Rect};
pub use gravity::{geometry_of, resize, tile, SizeHints, TileDirection};
pub use layering::{Layer, StackOrder};
pub use tag::{MatchField, Matcher};
