//! The grab/keychain dispatcher: a two-level key/button binding table plus
//! the transient "chain armed" state machine.

use std::collections::BTreeMap;

use bitflags::bitflags;

/// Modifier bits normalized the same way X reports them, before NumLock /
/// CapsLock stripping.
pub type ModMask = u16;

pub const NUM_LOCK: ModMask = 1 << 4;
pub const CAPS_LOCK: ModMask = 1 << 1;

bitflags! {
    /// Which action category a [Grab] triggers. Chain bits mark a grab as
    /// part of the keychain state machine rather than a terminal action.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct GrabFlags: u32 {
        const SPAWN           = 1 << 0;
        const CALLBACK        = 1 << 1;
        const VIEW_FOCUS      = 1 << 2;
        const VIEW_SWAP       = 1 << 3;
        const SCREEN_JUMP     = 1 << 4;
        const WINDOW_MOVE     = 1 << 5;
        const WINDOW_RESIZE   = 1 << 6;
        const WINDOW_TOGGLE   = 1 << 7;
        const WINDOW_STACK    = 1 << 8;
        const WINDOW_SELECT   = 1 << 9;
        const WINDOW_GRAVITY  = 1 << 10;
        const WINDOW_KILL     = 1 << 11;
        const SUBTLE_RELOAD   = 1 << 12;
        const SUBTLE_RESTART  = 1 << 13;
        const SUBTLE_QUIT     = 1 << 14;
        const CHAIN_START     = 1 << 15;
        const CHAIN_LINK      = 1 << 16;
        const CHAIN_END       = 1 << 17;
        const VIEW_SELECT     = 1 << 18;
    }
}

/// The tagged-union payload carried by a grab. `Callback` is invoked with
/// the currently-focused client's snapshot.
#[derive(Clone)]
pub enum GrabData {
    Int(i64),
    Str(String),
    Callback(crate::core::registry::Callback<crate::core::registry::Client>),
    None,
}

impl std::fmt::Debug for GrabData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrabData::Int(i) => f.debug_tuple("Int").field(i).finish(),
            GrabData::Str(s) => f.debug_tuple("Str").field(s).finish(),
            GrabData::Callback(_) => f.write_str("Callback(..)"),
            GrabData::None => f.write_str("None"),
        }
    }
}

/// A single key/button binding. `state` is normalized with NumLock/CapsLock
/// stripped before comparison (invariant: grab lookups never see those bits).
#[derive(Debug, Clone)]
pub struct Grab {
    pub code: u32,
    pub state: ModMask,
    pub flags: GrabFlags,
    pub data: GrabData,
    pub chain: Vec<Grab>,
}

impl Grab {
    pub fn is_chain_start(&self) -> bool {
        self.flags.contains(GrabFlags::CHAIN_START)
    }

    pub fn is_chain_end(&self) -> bool {
        self.flags.contains(GrabFlags::CHAIN_END)
    }
}

/// Strip NumLock and CapsLock from a reported modifier state before any
/// grab table lookup or comparison.
pub fn normalize_state(state: ModMask) -> ModMask {
    state & !(NUM_LOCK | CAPS_LOCK)
}

/// `(code, state)` keyed table for O(log n) lookup, replacing the source's
/// hand-rolled sorted array plus `bsearch`.
#[derive(Debug, Default)]
pub struct GrabTable {
    by_code_state: BTreeMap<(u32, ModMask), usize>,
    grabs: Vec<Grab>,
}

impl GrabTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `grab`, replicated over the power set of `{NumLock,
    /// CapsLock}` so any combination of those locks still resolves to the
    /// same binding.
    pub fn insert(&mut self, grab: Grab) {
        let base = normalize_state(grab.state);
        let idx = self.grabs.len();

        for variant in [0, NUM_LOCK, CAPS_LOCK, NUM_LOCK | CAPS_LOCK] {
            self.by_code_state.insert((grab.code, base | variant), idx);
        }
        self.grabs.push(grab);
    }

    pub fn lookup(&self, code: u32, state: ModMask) -> Option<&Grab> {
        self.by_code_state
            .get(&(code, state))
            .and_then(|&i| self.grabs.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Grab> {
        self.grabs.iter()
    }

    pub fn clear(&mut self) {
        self.by_code_state.clear();
        self.grabs.clear();
    }
}

/// The keychain state machine's current mode.
#[derive(Debug, Clone, Default)]
pub enum ChainState {
    /// At startup and after any terminal action. Only top-level grabs are
    /// reachable.
    #[default]
    Idle,
    /// Entered when a `chain-start` grab fires; `prefix` holds the grab
    /// whose `chain` field is currently being walked.
    Armed { prefix: Grab },
}

/// The result of feeding one key press through [Keychain::advance].
#[derive(Debug)]
pub enum ChainOutcome<'a> {
    /// No chain is armed; dispatch `grab` (if any) as an ordinary binding.
    Passthrough(Option<&'a Grab>),
    /// Transitioned deeper into a chain; nothing fires yet.
    Armed(String),
    /// A `chain-end` grab fired; returns to idle.
    Fired(Grab),
    /// Unrecognized input while armed; chain cancelled, back to idle.
    Cancelled,
}

/// Drives the chain-armed transient state described in the grab/keychain
/// dispatcher.
#[derive(Debug, Default)]
pub struct Keychain {
    state: ChainState,
}

impl Keychain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, ChainState::Armed { .. })
    }

    /// Feed one normalized `(code, state)` press through the table/chain.
    /// `is_modifier_only` lets the caller signal a bare modifier key press,
    /// which must not cancel an armed chain.
    pub fn advance<'t>(
        &mut self,
        table: &'t GrabTable,
        code: u32,
        state: ModMask,
        is_modifier_only: bool,
    ) -> ChainOutcome<'t> {
        match std::mem::take(&mut self.state) {
            ChainState::Idle => match table.lookup(code, state) {
                Some(g) if g.is_chain_start() => {
                    self.state = ChainState::Armed { prefix: g.clone() };
                    ChainOutcome::Armed(String::new())
                }
                other => ChainOutcome::Passthrough(other),
            },
            ChainState::Armed { prefix } => {
                if is_modifier_only {
                    self.state = ChainState::Armed { prefix };
                    return ChainOutcome::Armed(String::new());
                }

                let matched = prefix.chain.iter().find(|g| g.code == code && g.state == state);

                match matched {
                    Some(g) if g.is_chain_end() => ChainOutcome::Fired(g.clone()),
                    Some(g) if !g.chain.is_empty() => {
                        let fired = g.clone();
                        self.state = ChainState::Armed { prefix: fired.clone() };
                        ChainOutcome::Armed(fired.data_as_string())
                    }
                    Some(g) => ChainOutcome::Fired(g.clone()),
                    None => {
                        self.state = ChainState::Idle;
                        ChainOutcome::Cancelled
                    }
                }
            }
        }
    }
}

impl Grab {
    fn data_as_string(&self) -> String {
        match &self.data {
            GrabData::Str(s) => s.clone(),
            GrabData::Int(i) => i.to_string(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grab(code: u32, flags: GrabFlags, chain: Vec<Grab>) -> Grab {
        Grab {
            code,
            state: 0,
            flags,
            data: GrabData::None,
            chain,
        }
    }

    #[test]
    fn numlock_and_capslock_variants_all_resolve() {
        let mut table = GrabTable::new();
        table.insert(grab(10, GrabFlags::SPAWN, vec![]));

        assert!(table.lookup(10, 0).is_some());
        assert!(table.lookup(10, NUM_LOCK).is_some());
        assert!(table.lookup(10, CAPS_LOCK).is_some());
        assert!(table.lookup(10, NUM_LOCK | CAPS_LOCK).is_some());
    }

    #[test]
    fn chain_fires_on_end_grab_and_returns_to_idle() {
        let end = grab(2, GrabFlags::CHAIN_END, vec![]);
        let start = grab(1, GrabFlags::CHAIN_START, vec![end.clone()]);

        let mut table = GrabTable::new();
        table.insert(start);

        let mut chain = Keychain::new();
        match chain.advance(&table, 1, 0, false) {
            ChainOutcome::Armed(_) => {}
            other => panic!("expected armed, got {other:?}"),
        }
        assert!(chain.is_armed());

        match chain.advance(&table, 2, 0, false) {
            ChainOutcome::Fired(g) => assert_eq!(g.code, 2),
            other => panic!("expected fired, got {other:?}"),
        }
        assert!(!chain.is_armed());
    }

    #[test]
    fn unmatched_input_cancels_chain() {
        let end = grab(2, GrabFlags::CHAIN_END, vec![]);
        let start = grab(1, GrabFlags::CHAIN_START, vec![end]);

        let mut table = GrabTable::new();
        table.insert(start);

        let mut chain = Keychain::new();
        chain.advance(&table, 1, 0, false);
        match chain.advance(&table, 99, 0, false) {
            ChainOutcome::Cancelled => {}
            other => panic!("expected cancelled, got {other:?}"),
        }
        assert!(!chain.is_armed());
    }
}
