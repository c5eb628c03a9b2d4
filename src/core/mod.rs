//! Process aggregate: [Xid], [State], [Config] and the [WindowManager] main
//! loop that ties every other module together.
//!
//! `State<X>`/`Config<X>` are owned by the [WindowManager], which is generic
//! over the [XConn] backend. There is no `Diff`/`Snapshot` machinery here:
//! clients are not reparented, so geometry is written through to the X
//! server immediately rather than reconciled against a queried snapshot.

pub mod actions;
pub mod bindings;
pub mod drag;
pub mod handle;
pub mod hooks;
pub mod queue;
pub mod registry;

use std::collections::HashSet;

use nix::sys::signal::{self, SigHandler, Signal};
use tracing::{debug, span, Level};

use crate::core::bindings::{GrabTable, Keychain};
use crate::core::hooks::HookBus;
use crate::core::queue::DeferredQueue;
use crate::core::registry::{ClientMode, GravityId, Registry, TagMask};
use crate::extensions::sublet::SubletWatches;
use crate::x::{Atom, XConn, XConnExt, XEvent};
use crate::{Error, Result};

/// How long to wait for a replaced window manager's selection window to
/// disappear before giving up (`W=10`).
const SELECTION_REPLACE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);
const SELECTION_POLL_INTERVAL: std::time::Duration = std::time::Duration::from_millis(100);

/// An opaque X window id. Resolved through the [Registry] on access rather
/// than carried around as a live pointer into server state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Xid(pub u32);

impl std::fmt::Display for Xid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<u32> for Xid {
    fn from(v: u32) -> Self {
        Xid(v)
    }
}

/// Process-wide flags: global policy toggles set at config load and
/// flipped at runtime by grabs (`tiling`, `click_to_focus`, reload/restart/
/// quit, and the rest of the registry's boolean knobs).
#[derive(Debug, Clone, Copy)]
pub struct RuntimeFlags {
    pub run: bool,
    pub reload: bool,
    pub restart: bool,
    pub urgent_dialogs: bool,
    pub honor_size_hints: bool,
    pub tiling: bool,
    pub click_to_focus: bool,
    pub skip_pointer_warp: bool,
    pub skip_urgent_warp: bool,
    pub xinerama: bool,
    pub xrandr: bool,
    pub tray: bool,
}

impl Default for RuntimeFlags {
    fn default() -> Self {
        Self {
            run: true,
            reload: false,
            restart: false,
            urgent_dialogs: false,
            honor_size_hints: false,
            tiling: false,
            click_to_focus: false,
            skip_pointer_warp: false,
            skip_urgent_warp: false,
            xinerama: false,
            xrandr: false,
            tray: false,
        }
    }
}

/// Everything that changes at runtime: the registry, the mapped-window
/// tracking set, the focus ring, the keychain, the deferred queue and the
/// cached visibility masks.
pub struct State {
    pub registry: Registry,
    pub root: Xid,
    pub mapped: HashSet<Xid>,
    pub pending_unmap: std::collections::HashMap<Xid, usize>,
    pub focus: crate::pure::FocusRing<Xid>,
    pub keychain: Keychain,
    pub deferred: DeferredQueue,
    pub flags: RuntimeFlags,
    pub visible_tags: TagMask,
    pub visible_views: TagMask,
    pub urgent_tags: TagMask,
    pub client_tags: TagMask,
    pub default_gravity: Option<GravityId>,
    pub current_event: Option<XEvent>,
    pub sublet_watches: SubletWatches,
}

impl State {
    pub fn new(root: Xid) -> Self {
        Self {
            registry: Registry::new(),
            root,
            mapped: HashSet::new(),
            pending_unmap: std::collections::HashMap::new(),
            focus: crate::pure::FocusRing::new(),
            keychain: Keychain::new(),
            deferred: DeferredQueue::new(),
            flags: RuntimeFlags::default(),
            visible_tags: 0,
            visible_views: 0,
            urgent_tags: 0,
            client_tags: 0,
            default_gravity: None,
            current_event: None,
            sublet_watches: SubletWatches::new(),
        }
    }

    /// Recompute the visibility caches from scratch, per invariant 6: they
    /// are caches, not sources of truth.
    pub fn recompute_visibility(&mut self) {
        self.visible_tags = self.registry.visible_tags();
        self.visible_views = self.registry.visible_views();
        self.client_tags = self.registry.client_tags();
    }
}

/// Border colors, styling and the hook slots a window manager is
/// configured with.
pub struct Config {
    pub normal_border: u32,
    pub focused_border: u32,
    pub urgent_border: u32,
    pub border_width: u32,
    pub step: i32,
    pub snap: i32,
    pub wm_name: String,
    pub hooks: HookBus,
    /// Keycodes that are bare modifiers (Shift/Control/Alt/Super/...), so the
    /// keychain state machine can tell a modifier-only press from a real
    /// binding miss while a chain is armed.
    pub modifier_codes: HashSet<u32>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("normal_border", &self.normal_border)
            .field("focused_border", &self.focused_border)
            .field("urgent_border", &self.urgent_border)
            .field("border_width", &self.border_width)
            .field("step", &self.step)
            .field("snap", &self.snap)
            .field("wm_name", &self.wm_name)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            normal_border: 0x333333,
            focused_border: 0xffcc00,
            urgent_border: 0xff0000,
            border_width: 2,
            step: 5,
            snap: 10,
            wm_name: "subtlety".into(),
            hooks: HookBus::new(),
            modifier_codes: HashSet::new(),
        }
    }
}

/// Owns the connection, the mutable [State], the static [Config] and the
/// two-level grab table; runs the single-threaded event loop.
pub struct WindowManager<X> {
    pub x: X,
    pub state: State,
    pub config: Config,
    pub grabs: GrabTable,
}

impl<X: XConn> WindowManager<X> {
    pub fn new(x: X, config: Config) -> Result<Self> {
        let root = x.root()?;
        Ok(Self {
            x,
            state: State::new(root),
            config,
            grabs: GrabTable::new(),
        })
    }

    /// Install `SIGCHLD => SigIgn` so spawned children are reaped by the
    /// kernel without an explicit `wait()` loop, claim the WM selection,
    /// enumerate screens and adopt every already-mapped window, grab every
    /// configured binding, then run the event loop until `state.flags.run`
    /// is false. Returns `true` when the loop stopped because of
    /// `SUBTLE_RESTART`, so the caller can re-exec.
    ///
    /// `replace` mirrors the `-r` CLI flag: when false and `WM_S0` is
    /// already owned, this returns [`Error::SelectionTaken`] immediately
    /// rather than waiting out [SELECTION_REPLACE_TIMEOUT] for the owner
    /// to exit.
    pub fn run(mut self, replace: bool) -> Result<bool> {
        unsafe {
            signal::signal(Signal::SIGCHLD, SigHandler::SigIgn)
                .map_err(|e| crate::Error::X11(format!("failed to ignore SIGCHLD: {e}")))?;
        }

        self.claim_selection(replace)?;
        handle::re_enumerate_screens(&mut self)?;

        for window in self.x.existing_windows()? {
            handle::adopt(&mut self, window)?;
        }
        handle::configure_screens(&self.x, &mut self.state, &self.config.hooks)?;

        crate::extensions::ewmh::publish(&self.x, &self.state)?;
        if self.state.flags.tray {
            if let Some(screen_id) = self.state.registry.screens().first().map(|s| s.id) {
                crate::extensions::tray::claim(&self.x, &self.state, screen_id)?;
            }
        }

        self.config.hooks.call(hooks::HookMask::START, &hooks::HookSubject::None);

        self.grab_all()?;
        self.x.flush()?;

        while self.state.flags.run {
            let event = self.x.next_event()?;
            let span = span!(Level::DEBUG, "x_event", ?event);
            let _enter = span.enter();
            debug!("dispatching event");

            self.state.current_event = Some(event.clone());
            handle::dispatch(&mut self, event)?;
            self.x.flush()?;

            if self.state.flags.reload {
                self.reload()?;
            }
        }

        self.config.hooks.call(hooks::HookMask::EXIT, &hooks::HookSubject::None);

        Ok(self.state.flags.restart)
    }

    /// Claim `WM_S0`. This crate targets a single X screen (multi-monitor
    /// setups are handled by Xrandr/Xinerama, not multiple X screens), so
    /// only `WM_S0` is claimed. If the selection is already owned and
    /// `replace` is false, fail immediately; otherwise wait up to
    /// [SELECTION_REPLACE_TIMEOUT] for the previous owner to release it.
    fn claim_selection(&mut self, replace: bool) -> Result<()> {
        let Some(prev_owner) = self.x.claim_selection(Atom::WmS0, self.state.root)? else {
            return Ok(());
        };

        if !replace {
            return Err(Error::SelectionTaken { screen: 0 });
        }

        let deadline = std::time::Instant::now() + SELECTION_REPLACE_TIMEOUT;
        while std::time::Instant::now() < deadline {
            if self.x.window_attributes(prev_owner).is_err() {
                return Ok(());
            }
            std::thread::sleep(SELECTION_POLL_INTERVAL);
        }

        Err(Error::SelectionTaken { screen: 0 })
    }

    fn grab_all(&mut self) -> Result<()> {
        for grab in self.grabs.iter() {
            self.x.grab_key(self.state.root, grab.code, grab.state)?;
        }
        Ok(())
    }

    /// Drop every key grab and reinstall from [GrabTable] fresh, used after
    /// the keychain's transient any-key grab is torn down.
    pub(crate) fn regrab_keys(&mut self) -> Result<()> {
        self.x.ungrab_keys(self.state.root)?;
        self.grab_all()
    }

    /// Reload: re-run config evaluation is the scripted collaborator's job
    /// (see [`crate::config`]); the engine's half re-sorts grabs, re-reads
    /// every client's type/tags/modes and re-configures screens, per the
    /// event dispatcher's reload steps.
    fn reload(&mut self) -> Result<()> {
        self.state.flags.reload = false;

        self.x.ungrab_keys(self.state.root)?;
        self.grab_all()?;

        let client_ids: Vec<registry::ClientId> =
            self.state.registry.clients().map(|c| c.id).collect();

        for id in client_ids {
            let subject = match self.state.registry.client(id) {
                Some(c) => crate::pure::tag::MatchSubject {
                    name: c.name.clone(),
                    instance: c.instance.clone(),
                    class: c.class.clone(),
                    role: c.role.clone(),
                    window_type: c.window_type.as_str().to_string(),
                },
                None => continue,
            };
            handle::retag(self, id, &subject)?;
        }

        self.x.configure_screens(&mut self.state, &self.config.hooks)?;

        if let Ok((point, _)) = self.x.pointer_location() {
            let screen_id = self
                .state
                .registry
                .screens()
                .iter()
                .find(|s| s.base_geom.contains_point(point))
                .map(|s| s.id);
            if let Some(screen_id) = screen_id {
                if let Some(id) = handle::next(self, screen_id, false) {
                    handle::focus(self, id, false)?;
                }
            }
        }

        self.config.hooks.call(hooks::HookMask::RELOAD, &hooks::HookSubject::None);

        Ok(())
    }
}
