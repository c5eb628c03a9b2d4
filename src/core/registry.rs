//! The single owner of every process-wide collection: clients, tags, views,
//! gravities, screens, grabs, hooks, trays and sublets, plus the
//! window→object lookup map. Each kind gets its own container rather than
//! one polymorphic array discriminated by flag bits.

use std::collections::HashMap;

use bitflags::bitflags;
use strum_macros::EnumIter;

use crate::core::bindings::Grab;
use crate::core::Xid;
use crate::pure::gravity::{GravitySpec, SizeHints};
use crate::pure::layering::StackOrder;
use crate::pure::tag::Matcher;
use crate::pure::Rect;
use crate::{Error, Result};

/// A 32-bit OR of `1 << (tag.id + 1)` bits; tag id 0 (the default tag)
/// occupies bit 1, leaving bit 0 unused as a sentinel "no tags" state.
pub type TagMask = u32;

macro_rules! index_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub usize);
    };
}

index_id!(TagId);
index_id!(ViewId);
index_id!(ScreenId);
index_id!(GravityId);
index_id!(GrabId);
index_id!(ClientId);
index_id!(TrayId);
index_id!(SubletId);

bitflags! {
    /// Lifecycle bits: transient process-level state, not user-visible mode.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ClientLifecycle: u16 {
        const DEAD            = 0b0000_0001;
        const UNMAP_IGNORE    = 0b0000_0010;
        const ARRANGE_PENDING = 0b0000_0100;
        const FOCUS_TAKES_MSG = 0b0000_1000;
        const INPUT           = 0b0001_0000;
        const CLOSE_TAKES_MSG = 0b0010_0000;
    }
}

bitflags! {
    /// User-visible mode bits, toggled via `toggle_modes`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ClientMode: u16 {
        const FULL        = 0b0000_0000_0001;
        const FLOAT       = 0b0000_0000_0010;
        const STICK       = 0b0000_0000_0100;
        const STICK_SCREEN= 0b0000_0000_1000;
        const URGENT      = 0b0000_0001_0000;
        const RESIZE      = 0b0000_0010_0000;
        const ZAPHOD      = 0b0000_0100_0000;
        const FIXED       = 0b0000_1000_0000;
        const CENTER      = 0b0001_0000_0000;
        const BORDERLESS  = 0b0010_0000_0000;
    }
}

/// Exactly one of these is set per client; `Normal` is the default. A
/// `strum::EnumIter` enum (rather than loose bits) so type-mask matcher
/// tests are exhaustive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum WindowType {
    Normal,
    Desktop,
    Dock,
    Toolbar,
    Splash,
    Dialog,
}

impl Default for WindowType {
    fn default() -> Self {
        WindowType::Normal
    }
}

impl WindowType {
    /// Lowercase name used both by EWMH atom lookup and the matcher's
    /// type-field string comparison.
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowType::Normal => "normal",
            WindowType::Desktop => "desktop",
            WindowType::Dock => "dock",
            WindowType::Toolbar => "toolbar",
            WindowType::Splash => "splash",
            WindowType::Dialog => "dialog",
        }
    }
}

/// A top-level client window.
#[derive(Debug, Clone)]
pub struct Client {
    pub id: ClientId,
    pub window: Xid,
    pub leader: Option<Xid>,
    pub name: String,
    pub instance: String,
    pub class: String,
    pub role: String,
    pub tags: TagMask,
    pub geom: Rect,
    pub size_hints: SizeHints,
    /// Per-view gravity assignment; length always equals the current view
    /// count, resized in place as views are added/removed.
    pub gravities: Vec<GravityId>,
    pub gravity_id: GravityId,
    pub screen_id: ScreenId,
    pub lifecycle: ClientLifecycle,
    pub mode: ClientMode,
    pub window_type: WindowType,
    pub restack_dir: Option<StackOrder>,
}

impl Client {
    pub fn is_dead(&self) -> bool {
        self.lifecycle.contains(ClientLifecycle::DEAD)
    }

    pub fn is_sticky(&self) -> bool {
        self.mode.contains(ClientMode::STICK)
    }

    pub fn is_floating(&self) -> bool {
        self.mode.contains(ClientMode::FLOAT)
    }

    pub fn is_full(&self) -> bool {
        self.mode.contains(ClientMode::FULL)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ViewFlags: u8 {
        const ICON      = 0b001;
        const ICON_ONLY = 0b010;
        const DYNAMIC   = 0b100;
    }
}

/// Callback handle: the core invokes it but never owns the language-level
/// value behind it. The scripted collaborator supplies the closure.
pub type Callback<Subject> = std::sync::Arc<dyn Fn(&Subject) + Send + Sync>;

#[derive(Clone)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub matchers: Vec<Matcher>,
    pub gravity_id: Option<GravityId>,
    pub screen_id: Option<ScreenId>,
    pub geometry: Option<Rect>,
    pub mode_flags: ClientMode,
    pub on_match: Option<Callback<Client>>,
}

impl std::fmt::Debug for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tag")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("matchers", &self.matchers)
            .field("gravity_id", &self.gravity_id)
            .field("screen_id", &self.screen_id)
            .field("geometry", &self.geometry)
            .field("mode_flags", &self.mode_flags)
            .field("on_match", &self.on_match.is_some())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct View {
    pub id: ViewId,
    pub name: String,
    pub tags: TagMask,
    pub focus_hint: Option<Xid>,
    pub flags: ViewFlags,
}

#[derive(Debug, Clone)]
pub struct Gravity {
    pub id: GravityId,
    pub name: String,
    pub spec: GravitySpec,
}

/// A physical output. Panel windows and the drawable are external-collaborator
/// handles (font/panel rendering is out of scope); we keep the ids so the
/// registry can still answer "what panels does this screen own".
#[derive(Debug, Clone)]
pub struct Screen {
    pub id: ScreenId,
    pub base_geom: Rect,
    pub work_geom: Rect,
    pub view_id: ViewId,
    pub panel1: Option<Xid>,
    pub panel2: Option<Xid>,
}

/// A registered system-tray icon (`tray.c`): registration and lifecycle
/// only, no icon-drawing engine.
#[derive(Debug, Clone)]
pub struct Tray {
    pub id: TrayId,
    pub window: Xid,
    pub screen_id: ScreenId,
}

/// A registered sublet: the fd-watch/interval bookkeeping lives here, the
/// execution engine does not (interpreter out of scope).
#[derive(Debug, Clone)]
pub struct Sublet {
    pub id: SubletId,
    pub name: String,
    pub interval_secs: Option<u64>,
}

/// A window→object resolution, per invariant 1: exactly one entity owns
/// each X window.
#[derive(Debug, Clone, Copy)]
pub enum ObjectRef {
    Client(ClientId),
    Screen(ScreenId),
    Tray(TrayId),
}

/// The default tag (id 0) is always present, per invariant 4.
pub const DEFAULT_TAG: TagId = TagId(0);

/// Owns every collection and the window lookup map. Index shifts on
/// removal of a tag/view are handled by [Registry::remove_tag] /
/// [Registry::remove_view], which rewrite every dependent client/screen
/// field in one pass rather than leaving stale indices behind.
///
/// `stacking` is kept separate from `clients`' storage order (invariant 3:
/// "the client array's order is the stacking order") precisely because a
/// [ClientId] is a positional index into `clients` assigned at creation
/// time; physically re-sorting `clients` for restacking would invalidate
/// every outstanding id. `stacking` is the one true bottom-first order and
/// is what [Registry::restack] reorders.
#[derive(Debug, Default)]
pub struct Registry {
    clients: Vec<Client>,
    stacking: Vec<ClientId>,
    tags: Vec<Tag>,
    views: Vec<View>,
    screens: Vec<Screen>,
    gravities: Vec<Gravity>,
    grabs: Vec<Grab>,
    trays: Vec<Tray>,
    sublets: Vec<Sublet>,
    by_window: HashMap<Xid, ObjectRef>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // -- lookup -----------------------------------------------------------

    pub fn find(&self, window: Xid) -> Option<ObjectRef> {
        self.by_window.get(&window).copied()
    }

    pub fn client(&self, id: ClientId) -> Option<&Client> {
        self.clients.get(id.0)
    }

    pub fn client_mut(&mut self, id: ClientId) -> Option<&mut Client> {
        self.clients.get_mut(id.0)
    }

    pub fn client_by_window(&self, window: Xid) -> Option<&Client> {
        match self.find(window) {
            Some(ObjectRef::Client(id)) => self.client(id),
            _ => None,
        }
    }

    pub fn client_by_window_mut(&mut self, window: Xid) -> Option<&mut Client> {
        match self.find(window) {
            Some(ObjectRef::Client(id)) => self.client_mut(id),
            _ => None,
        }
    }

    pub fn clients(&self) -> impl Iterator<Item = &Client> {
        self.clients.iter().filter(|c| !c.is_dead())
    }

    pub fn clients_mut(&mut self) -> impl Iterator<Item = &mut Client> {
        self.clients.iter_mut().filter(|c| !c.lifecycle.contains(ClientLifecycle::DEAD))
    }

    pub fn tag(&self, id: TagId) -> Option<&Tag> {
        self.tags.get(id.0)
    }

    pub fn tag_mut(&mut self, id: TagId) -> Option<&mut Tag> {
        self.tags.get_mut(id.0)
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn view(&self, id: ViewId) -> Option<&View> {
        self.views.get(id.0)
    }

    pub fn view_mut(&mut self, id: ViewId) -> Option<&mut View> {
        self.views.get_mut(id.0)
    }

    pub fn views(&self) -> &[View] {
        &self.views
    }

    pub fn view_by_name(&self, name: &str) -> Option<&View> {
        self.views.iter().find(|v| v.name == name)
    }

    pub fn tag_by_name(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.name == name)
    }

    pub fn screen(&self, id: ScreenId) -> Option<&Screen> {
        self.screens.get(id.0)
    }

    pub fn screen_mut(&mut self, id: ScreenId) -> Option<&mut Screen> {
        self.screens.get_mut(id.0)
    }

    pub fn screens(&self) -> &[Screen] {
        &self.screens
    }

    pub fn screens_mut(&mut self) -> impl Iterator<Item = &mut Screen> {
        self.screens.iter_mut()
    }

    pub fn gravity(&self, id: GravityId) -> Option<&Gravity> {
        self.gravities.get(id.0)
    }

    pub fn gravities(&self) -> &[Gravity] {
        &self.gravities
    }

    pub fn grabs(&self) -> &[Grab] {
        &self.grabs
    }

    // -- mutation -----------------------------------------------------------

    pub fn add_client(&mut self, mut client: Client) -> ClientId {
        let id = ClientId(self.clients.len());
        client.id = id;
        self.by_window.insert(client.window, ObjectRef::Client(id));
        self.clients.push(client);
        self.stacking.push(id);
        id
    }

    pub fn mark_client_dead(&mut self, id: ClientId) {
        if let Some(c) = self.clients.get_mut(id.0) {
            c.lifecycle.insert(ClientLifecycle::DEAD);
            self.by_window.remove(&c.window);
        }
        self.stacking.retain(|&i| i != id);
    }

    /// Bottom-first stacking order, per invariant 3. Dead clients are
    /// filtered lazily rather than removed eagerly from `stacking` so a
    /// restack in progress never has to special-case a client that died
    /// mid-pass.
    pub fn stacking_order(&self) -> impl Iterator<Item = &Client> {
        self.stacking
            .iter()
            .filter_map(move |id| self.client(*id))
            .filter(|c| !c.is_dead())
    }

    /// Replace the stacking order wholesale, as produced by
    /// [`crate::pure::layering::restack`] run over a snapshot of
    /// `stacking_order`.
    pub fn set_stacking_order(&mut self, order: Vec<ClientId>) {
        self.stacking = order;
    }

    pub fn add_tag(&mut self, name: impl Into<String>, matchers: Vec<Matcher>) -> TagId {
        let id = TagId(self.tags.len());
        self.tags.push(Tag {
            id,
            name: name.into(),
            matchers,
            gravity_id: None,
            screen_id: None,
            geometry: None,
            mode_flags: ClientMode::empty(),
            on_match: None,
        });
        id
    }

    /// Remove a tag and shift every higher index down by one, rewriting
    /// every client's tag bitmask accordingly. The default tag (id 0)
    /// cannot be removed.
    pub fn remove_tag(&mut self, id: TagId) -> Result<()> {
        if id == DEFAULT_TAG {
            return Err(Error::Config("the default tag cannot be removed".into()));
        }
        if id.0 >= self.tags.len() {
            return Err(Error::UnknownTag(id.0.to_string()));
        }

        self.tags.remove(id.0);
        for (i, t) in self.tags.iter_mut().enumerate().skip(id.0) {
            t.id = TagId(i);
        }

        let removed_bit = 1u32 << (id.0 + 1);
        let below_mask = removed_bit - 1;
        for c in self.clients.iter_mut() {
            let below = c.tags & below_mask;
            let above = (c.tags & !below_mask & !removed_bit) >> 1;
            c.tags = below | above;
            if c.tags == 0 && !c.is_sticky() {
                c.tags = 1u32 << (DEFAULT_TAG.0 + 1);
            }
        }
        for v in self.views.iter_mut() {
            let below = v.tags & below_mask;
            let above = (v.tags & !below_mask & !removed_bit) >> 1;
            v.tags = below | above;
        }

        Ok(())
    }

    pub fn add_view(&mut self, name: impl Into<String>, tags: TagMask) -> ViewId {
        let id = ViewId(self.views.len());
        self.views.push(View {
            id,
            name: name.into(),
            tags,
            focus_hint: None,
            flags: ViewFlags::empty(),
        });

        for c in self.clients.iter_mut() {
            c.gravities.push(c.gravity_id);
        }

        id
    }

    /// Remove a view: decrement every client's per-view gravity vector and
    /// clamp every screen's `view_id` down, per the boundary behavior in
    /// the spec's testable properties.
    pub fn remove_view(&mut self, id: ViewId) -> Result<()> {
        if id.0 >= self.views.len() {
            return Err(Error::UnknownView(id.0.to_string()));
        }

        self.views.remove(id.0);
        for (i, v) in self.views.iter_mut().enumerate().skip(id.0) {
            v.id = ViewId(i);
        }

        for c in self.clients.iter_mut() {
            if id.0 < c.gravities.len() {
                c.gravities.remove(id.0);
            }
        }

        for s in self.screens.iter_mut() {
            if s.view_id.0 == id.0 || s.view_id.0 >= self.views.len() {
                s.view_id = ViewId(0);
            } else if s.view_id.0 > id.0 {
                s.view_id = ViewId(s.view_id.0 - 1);
            }
        }

        Ok(())
    }

    pub fn add_screen(&mut self, base_geom: Rect, view_id: ViewId) -> ScreenId {
        let id = ScreenId(self.screens.len());
        self.screens.push(Screen {
            id,
            base_geom,
            work_geom: base_geom,
            view_id,
            panel1: None,
            panel2: None,
        });
        id
    }

    pub fn add_gravity(&mut self, name: impl Into<String>, spec: GravitySpec) -> GravityId {
        let id = GravityId(self.gravities.len());
        self.gravities.push(Gravity {
            id,
            name: name.into(),
            spec,
        });
        id
    }

    pub fn gravity_by_name(&self, name: &str) -> Option<&Gravity> {
        self.gravities.iter().find(|g| g.name == name)
    }

    pub fn add_grab(&mut self, grab: Grab) -> GrabId {
        let id = GrabId(self.grabs.len());
        self.grabs.push(grab);
        id
    }

    pub fn add_tray(&mut self, window: Xid, screen_id: ScreenId) -> TrayId {
        let id = TrayId(self.trays.len());
        self.by_window.insert(window, ObjectRef::Tray(id));
        self.trays.push(Tray { id, window, screen_id });
        id
    }

    pub fn remove_tray(&mut self, window: Xid) {
        self.trays.retain(|t| t.window != window);
        self.by_window.remove(&window);
    }

    pub fn add_sublet(&mut self, name: impl Into<String>, interval_secs: Option<u64>) -> SubletId {
        let id = SubletId(self.sublets.len());
        self.sublets.push(Sublet {
            id,
            name: name.into(),
            interval_secs,
        });
        id
    }

    pub fn sublets(&self) -> &[Sublet] {
        &self.sublets
    }

    /// OR of the tags of every screen's current view: a cache recomputed
    /// from scratch on every configure pass, never a source of truth.
    pub fn visible_tags(&self) -> TagMask {
        self.screens
            .iter()
            .filter_map(|s| self.view(s.view_id))
            .fold(0, |acc, v| acc | v.tags)
    }

    /// One bit per screen's current view id, used for quick "is this view
    /// showing anywhere" checks.
    pub fn visible_views(&self) -> TagMask {
        self.screens
            .iter()
            .fold(0u32, |acc, s| acc | (1u32 << s.view_id.0.min(31)))
    }

    /// OR of the tags of every alive client.
    pub fn client_tags(&self) -> TagMask {
        self.clients().fold(0, |acc, c| acc | c.tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_view_clamps_screen_pointing_past_the_end_to_zero() {
        let mut reg = Registry::new();
        reg.add_view("one", 0);
        reg.add_view("two", 0);
        let v = reg.add_view("three", 0);
        let screen = reg.add_screen(Rect::new(0, 0, 100, 100), v);

        reg.remove_view(v).unwrap();

        assert_eq!(reg.screen(screen).unwrap().view_id, ViewId(0));
    }

    #[test]
    fn remove_view_clamps_screen_pointing_at_the_removed_view_to_zero() {
        let mut reg = Registry::new();
        reg.add_view("one", 0);
        let target = reg.add_view("two", 0);
        reg.add_view("three", 0);
        let screen = reg.add_screen(Rect::new(0, 0, 100, 100), target);

        reg.remove_view(target).unwrap();

        assert_eq!(reg.screen(screen).unwrap().view_id, ViewId(0));
    }

    #[test]
    fn remove_view_shifts_down_screens_past_the_removed_view() {
        let mut reg = Registry::new();
        let keep = reg.add_view("one", 0);
        let removed = reg.add_view("two", 0);
        let after = reg.add_view("three", 0);
        let screen = reg.add_screen(Rect::new(0, 0, 100, 100), after);
        let _ = keep;

        reg.remove_view(removed).unwrap();

        assert_eq!(reg.screen(screen).unwrap().view_id, ViewId(1));
    }
}
