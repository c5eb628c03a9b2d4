//! The deferred ClientMessage queue: messages that reference an object not
//! yet known (e.g. tagging a window before its `MapRequest` has been
//! processed) are parked here and replayed once the target exists.
//!
//! Modeled as a `VecDeque` of typed records with a direct re-dispatch into
//! the handler rather than relying on event re-injection at the X layer —
//! the two are semantically equivalent here since the queue is
//! single-threaded and drained from the same loop that fills it.

use std::collections::VecDeque;

use crate::core::Xid;

/// Discriminates which family of deferred message a queue entry belongs to,
/// so `pop_for` only replays entries relevant to the object that just
/// appeared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    ClientTag,
    ClientGravity,
    ClientScreen,
    ViewSwitch,
}

/// A parked ClientMessage, stored as a full copy of its raw data words.
#[derive(Debug, Clone)]
pub struct DeferredMessage {
    pub type_tag: TypeTag,
    pub message_type: Xid,
    pub data: [u32; 5],
}

/// FIFO of deferred messages, preserving arrival order within each
/// `type_tag`.
#[derive(Debug, Default)]
pub struct DeferredQueue {
    entries: VecDeque<DeferredMessage>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: DeferredMessage) {
        self.entries.push_back(message);
    }

    /// Walk the queue for entries matching `type_tag`, rewrite their first
    /// data slot to `target`, remove them from the queue and return them
    /// in arrival order for the caller to re-dispatch directly into the
    /// event handler.
    pub fn pop_for(&mut self, type_tag: TypeTag, target: Xid) -> Vec<DeferredMessage> {
        let mut matched = Vec::new();
        let mut remaining = VecDeque::with_capacity(self.entries.len());

        for mut entry in self.entries.drain(..) {
            if entry.type_tag == type_tag {
                entry.data[0] = target.0;
                matched.push(entry);
            } else {
                remaining.push_back(entry);
            }
        }

        self.entries = remaining;
        matched
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(tag: TypeTag) -> DeferredMessage {
        DeferredMessage {
            type_tag: tag,
            message_type: Xid(1),
            data: [0; 5],
        }
    }

    #[test]
    fn pop_for_preserves_arrival_order_within_a_tag() {
        let mut q = DeferredQueue::new();
        q.push(msg(TypeTag::ClientTag));
        q.push(msg(TypeTag::ClientGravity));
        q.push(msg(TypeTag::ClientTag));

        let popped = q.pop_for(TypeTag::ClientTag, Xid(42));
        assert_eq!(popped.len(), 2);
        assert!(popped.iter().all(|m| m.data[0] == 42));
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn unrelated_tags_stay_queued() {
        let mut q = DeferredQueue::new();
        q.push(msg(TypeTag::ViewSwitch));
        let popped = q.pop_for(TypeTag::ClientTag, Xid(1));
        assert!(popped.is_empty());
        assert_eq!(q.len(), 1);
    }
}
