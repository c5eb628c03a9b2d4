//! Sublet bookkeeping: the fd-watch/interval registration side of sublet
//! support, without the interpreter that would actually execute one. A
//! sublet is registered once
//! (by name, with an optional polling interval) and keeps a [SubletId]; when
//! the connection's `next_event` surfaces an `XEvent::ExtensionReady`, that
//! token is resolved back to the sublet so a future caller can dispatch to
//! it. No execution engine lives here (out of scope), so [fire] only logs
//! the event.

use std::collections::HashMap;

use tracing::debug;

use crate::core::registry::{Registry, SubletId};
use crate::Result;

/// Maps the opaque fd-watch tokens returned by [`crate::x::XConn::next_event`]
/// back to the [SubletId] that owns them.
#[derive(Debug, Default)]
pub struct SubletWatches {
    by_token: HashMap<usize, SubletId>,
}

impl SubletWatches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new sublet in the registry and bind it to `token`.
    pub fn register(
        &mut self,
        registry: &mut Registry,
        token: usize,
        name: impl Into<String>,
        interval_secs: Option<u64>,
    ) -> SubletId {
        let id = registry.add_sublet(name, interval_secs);
        self.by_token.insert(token, id);
        id
    }

    pub fn unregister(&mut self, token: usize) {
        self.by_token.remove(&token);
    }

    pub fn resolve(&self, token: usize) -> Option<SubletId> {
        self.by_token.get(&token).copied()
    }
}

/// Handle an `XEvent::ExtensionReady { token }`. With no interpreter to run
/// a sublet's body, the only observable effect is a debug log naming which
/// sublet fired.
pub fn fire(watches: &SubletWatches, registry: &Registry, token: usize) -> Result<()> {
    let Some(id) = watches.resolve(token) else {
        debug!(token, "extension-ready event for unknown watch token");
        return Ok(());
    };

    let name = registry
        .sublets()
        .iter()
        .find(|s| s.id == id)
        .map(|s| s.name.as_str())
        .unwrap_or("<unknown>");

    debug!(sublet = name, token, "sublet fired");
    Ok(())
}
