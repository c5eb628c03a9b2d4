//! Extensions to the core engine that sit on top of [`crate::core`] rather
//! than inside it: EWMH root-property publishing, system-tray selection
//! handling, and sublet bookkeeping. The compositor and the scripted sublet
//! engine stay out of scope, but the registration/lifecycle surface around
//! them is still real.

pub mod ewmh;
pub mod sublet;
pub mod tray;
