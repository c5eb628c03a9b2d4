//! The hook bus: a typed event bus keyed by `(type-tag, action)` pairs that
//! invokes scripted callbacks with a snapshot of the subject entity.

use bitflags::bitflags;

bitflags! {
    /// `{client,tag,view} x {create,mode,gravity,focus,kill}` plus the
    /// process-wide `start, exit, reload, tile` events.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HookMask: u32 {
        const START   = 1 << 0;
        const EXIT    = 1 << 1;
        const RELOAD  = 1 << 2;
        const TILE    = 1 << 3;

        const CLIENT_CREATE  = 1 << 4;
        const CLIENT_MODE    = 1 << 5;
        const CLIENT_GRAVITY = 1 << 6;
        const CLIENT_FOCUS   = 1 << 7;
        const CLIENT_KILL    = 1 << 8;

        const TAG_CREATE = 1 << 9;
        const TAG_MODE   = 1 << 10;
        const TAG_KILL   = 1 << 11;

        const VIEW_CREATE = 1 << 12;
        const VIEW_FOCUS  = 1 << 13;
        const VIEW_KILL   = 1 << 14;
    }
}

/// A snapshot of whatever entity triggered a hook, passed by value so the
/// callback cannot hold a live borrow of the registry across its own
/// (synchronous, but possibly script-owned) execution.
#[derive(Debug, Clone)]
pub enum HookSubject {
    Client { id: crate::core::registry::ClientId, window: crate::core::Xid },
    Tag { id: crate::core::registry::TagId },
    View { id: crate::core::registry::ViewId },
    None,
}

type HookFn = Box<dyn Fn(&HookSubject) + Send + Sync>;

/// `Vec<(mask, callback)>` rather than one trait method per trigger point,
/// since the hook bus is explicitly data-driven by `(type-tag, action)`
/// keys.
#[derive(Default)]
pub struct HookBus {
    hooks: Vec<(HookMask, HookFn)>,
}

impl std::fmt::Debug for HookBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookBus")
            .field("registered", &self.hooks.len())
            .finish()
    }
}

impl HookBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&mut self, mask: HookMask, f: impl Fn(&HookSubject) + Send + Sync + 'static) {
        self.hooks.push((mask, Box::new(f)));
    }

    /// Fire every hook whose mask contains `event`, in registration order.
    pub fn call(&self, event: HookMask, subject: &HookSubject) {
        for (mask, f) in &self.hooks {
            if mask.contains(event) {
                f(subject);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn only_matching_hooks_fire() {
        let hits = Arc::new(AtomicUsize::new(0));
        let hits2 = hits.clone();

        let mut bus = HookBus::new();
        bus.on(HookMask::CLIENT_CREATE, move |_| {
            hits2.fetch_add(1, Ordering::SeqCst);
        });

        bus.call(HookMask::CLIENT_CREATE, &HookSubject::None);
        bus.call(HookMask::CLIENT_KILL, &HookSubject::None);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
