//! End-to-end scenarios driven entirely through the public
//! [`subtlety::core::handle::dispatch`]/[`subtlety::core::handle::
//! configure_screens`] surface, against a recording mock connection: a
//! `WindowManager<MockXConn>` driven through synthetic events rather than
//! unit-tested internals directly.

use std::cell::RefCell;
use std::collections::HashMap;

use subtlety::core::bindings::{Grab, GrabData, GrabFlags, GrabTable};
use subtlety::core::handle;
use subtlety::core::registry::{
    Client, ClientId, ClientLifecycle, ClientMode, GravityId, Registry, ScreenId, WindowType,
};
use subtlety::core::{Config, WindowManager, Xid};
use subtlety::pure::gravity::GravitySpec;
use subtlety::pure::tag::{MatchField, Matcher};
use subtlety::pure::{Point, Rect, SizeHints};
use subtlety::x::mock::MockXConn;
use subtlety::x::{Atom, WindowAttributes, WmNormalHints, XEvent};
use subtlety::{Error, Result};

/// A [`MockXConn`] that records every write call it receives and answers
/// reads from a handful of pre-seeded tables, standing in for a live
/// display connection across a full `dispatch()` call.
#[derive(Default)]
struct RecordingXConn {
    window_attrs: HashMap<Xid, WindowAttributes>,
    wm_class: HashMap<Xid, (String, String)>,
    wm_normal_hints: HashMap<Xid, WmNormalHints>,
    pointer: RefCell<Point>,
    configured: RefCell<Vec<(Xid, Rect)>>,
    mapped: RefCell<Vec<Xid>>,
    unmapped: RefCell<Vec<Xid>>,
    sent_protocols: RefCell<Vec<(Xid, Atom)>>,
}

impl MockXConn for RecordingXConn {
    fn mock_window_attributes(&self, window: Xid) -> Result<WindowAttributes> {
        self.window_attrs.get(&window).copied().ok_or(Error::UnimplementedMock)
    }
    fn mock_get_wm_class(&self, window: Xid) -> Result<Option<(String, String)>> {
        Ok(self.wm_class.get(&window).cloned())
    }
    fn mock_get_wm_normal_hints(&self, window: Xid) -> Result<Option<WmNormalHints>> {
        Ok(self.wm_normal_hints.get(&window).copied())
    }
    fn mock_pointer_location(&self) -> Result<(Point, Option<Xid>)> {
        Ok((*self.pointer.borrow(), None))
    }
    fn mock_configure(&self, window: Xid, geom: Rect) -> Result<()> {
        self.configured.borrow_mut().push((window, geom));
        Ok(())
    }
    fn mock_map(&self, window: Xid) -> Result<()> {
        self.mapped.borrow_mut().push(window);
        Ok(())
    }
    fn mock_unmap(&self, window: Xid) -> Result<()> {
        self.unmapped.borrow_mut().push(window);
        Ok(())
    }
    fn mock_send_protocol(&self, window: Xid, protocol: Atom) -> Result<()> {
        self.sent_protocols.borrow_mut().push((window, protocol));
        Ok(())
    }
}

fn wm(conn: RecordingXConn) -> WindowManager<RecordingXConn> {
    WindowManager::new(conn, Config::default()).expect("mock root never fails")
}

/// A client with just enough fields set to exercise placement/focus/mode
/// logic without going through the full `adopt()` hint-reading pipeline.
fn bare_client(window: Xid, tags: u32, gravity: GravityId, screen_id: ScreenId, geom: Rect) -> Client {
    Client {
        id: ClientId(0),
        window,
        leader: None,
        name: String::new(),
        instance: String::new(),
        class: String::new(),
        role: String::new(),
        tags,
        geom,
        size_hints: SizeHints::default(),
        gravities: vec![gravity, gravity],
        gravity_id: gravity,
        screen_id,
        lifecycle: ClientLifecycle::INPUT,
        mode: ClientMode::empty(),
        window_type: WindowType::Normal,
        restack_dir: None,
    }
}

/// An instance matcher assigns a tag carrying a gravity, and adoption
/// places the client at that gravity's rect.
#[test]
fn tag_match_places_client_via_gravity() {
    let mut conn = RecordingXConn::default();
    let window = Xid(100);
    conn.window_attrs
        .insert(window, WindowAttributes { override_redirect: false, geom: Rect::new(0, 0, 200, 200) });
    conn.wm_class.insert(window, ("xterm".into(), "XTerm".into()));

    let mut registry = Registry::new();
    let center = registry.add_gravity("center", GravitySpec { x: 25, y: 25, w: 50, h: 50, tile: None });
    let matcher = Matcher::new(MatchField::INSTANCE, "^xterm$").expect("valid regex");
    let tag_id = registry.add_tag("t", vec![matcher]);
    registry.tag_mut(tag_id).expect("just inserted").gravity_id = Some(center);
    let view_tags = 1u32 << (tag_id.0 + 1);
    let view_id = registry.add_view("v", view_tags);
    registry.add_screen(Rect::new(0, 0, 100, 100), view_id);

    let mut wm = wm(conn);
    wm.state.registry = registry;
    wm.state.default_gravity = Some(center);

    handle::dispatch(&mut wm, XEvent::MapRequest { window }).expect("adoption should succeed");

    let client = wm.state.registry.client_by_window(window).expect("client should be adopted");
    assert_eq!(client.gravity_id, center);
    assert_eq!(client.geom, Rect::new(25, 25, 50, 50));
    assert_eq!(wm.x.configured.borrow().last().map(|&(_, g)| g), Some(Rect::new(25, 25, 50, 50)));
}

/// Scenario 2: `window-gravity` with a comma-separated list cycles a
/// client through the named gravities in order, wrapping at the end.
#[test]
fn window_gravity_action_cycles_through_named_list() {
    let conn = RecordingXConn::default();
    let window = Xid(200);

    let mut registry = Registry::new();
    let left = registry.add_gravity("left", GravitySpec { x: 0, y: 0, w: 50, h: 100, tile: None });
    let right = registry.add_gravity("right", GravitySpec { x: 50, y: 0, w: 50, h: 100, tile: None });
    let tag_id = registry.add_tag("default", vec![]);
    let tags = 1u32 << (tag_id.0 + 1);
    let view_id = registry.add_view("v", tags);
    registry.add_screen(Rect::new(0, 0, 200, 100), view_id);
    let id = registry.add_client(bare_client(window, tags, left, ScreenId(0), Rect::new(0, 0, 50, 100)));

    let mut grabs = GrabTable::new();
    grabs.insert(Grab {
        code: 40,
        state: 0,
        flags: GrabFlags::WINDOW_GRAVITY,
        data: GrabData::Str("left,right".into()),
        chain: vec![],
    });

    let mut wm = wm(conn);
    wm.state.registry = registry;
    wm.grabs = grabs;
    wm.state.focus.push(window);

    handle::dispatch(&mut wm, XEvent::KeyPress { code: 40, state: 0 }).expect("dispatch should succeed");
    assert_eq!(wm.state.registry.client(id).unwrap().gravity_id, right);

    handle::dispatch(&mut wm, XEvent::KeyPress { code: 40, state: 0 }).expect("dispatch should succeed");
    assert_eq!(wm.state.registry.client(id).unwrap().gravity_id, left);
}

/// Scenario 3: a two-key chain arms on its start grab, fires the bound
/// view-jump on its end grab and returns to idle; an unmatched key while
/// armed cancels the chain instead of falling through to a top-level grab.
#[test]
fn keychain_fires_and_cancels() {
    let conn = RecordingXConn::default();

    let mut registry = Registry::new();
    let tag_id = registry.add_tag("default", vec![]);
    let tags = 1u32 << (tag_id.0 + 1);
    let v0 = registry.add_view("v0", tags);
    let v1 = registry.add_view("v1", tags);
    registry.add_screen(Rect::new(0, 0, 800, 600), v0);

    let link = Grab {
        code: 30,
        state: 0,
        flags: GrabFlags::VIEW_FOCUS | GrabFlags::CHAIN_END,
        data: GrabData::Int(1),
        chain: vec![],
    };
    let start =
        Grab { code: 24, state: 0, flags: GrabFlags::CHAIN_START, data: GrabData::None, chain: vec![link] };

    let mut grabs = GrabTable::new();
    grabs.insert(start);

    let mut wm = wm(conn);
    wm.state.registry = registry;
    wm.grabs = grabs;

    handle::dispatch(&mut wm, XEvent::KeyPress { code: 24, state: 0 }).expect("dispatch should succeed");
    assert!(wm.state.keychain.is_armed());

    handle::dispatch(&mut wm, XEvent::KeyPress { code: 30, state: 0 }).expect("dispatch should succeed");
    assert!(!wm.state.keychain.is_armed());
    assert_eq!(wm.state.registry.screen(ScreenId(0)).unwrap().view_id, v1);

    handle::dispatch(&mut wm, XEvent::KeyPress { code: 24, state: 0 }).expect("dispatch should succeed");
    assert!(wm.state.keychain.is_armed());

    handle::dispatch(&mut wm, XEvent::KeyPress { code: 99, state: 0 }).expect("dispatch should succeed");
    assert!(!wm.state.keychain.is_armed(), "an unmatched key while armed must cancel, not fall through");
    assert_eq!(
        wm.state.registry.screen(ScreenId(0)).unwrap().view_id,
        v1,
        "a cancelled chain must not have executed anything"
    );
}

/// Scenario 4: `window-kill` against a client advertising `WM_DELETE_WINDOW`
/// only asks it to close; the registry keeps the client until the
/// `DestroyNotify` that follows actually removes it.
#[test]
fn window_kill_defers_removal_to_destroy_notify() {
    let conn = RecordingXConn::default();
    let window = Xid(300);

    let mut registry = Registry::new();
    let gravity = registry.add_gravity("all", GravitySpec { x: 0, y: 0, w: 100, h: 100, tile: None });
    let tag_id = registry.add_tag("default", vec![]);
    let tags = 1u32 << (tag_id.0 + 1);
    let view_id = registry.add_view("v", tags);
    registry.add_screen(Rect::new(0, 0, 640, 480), view_id);

    let mut client = bare_client(window, tags, gravity, ScreenId(0), Rect::new(0, 0, 100, 100));
    client.lifecycle.insert(ClientLifecycle::CLOSE_TAKES_MSG);
    registry.add_client(client);

    let mut grabs = GrabTable::new();
    grabs.insert(Grab { code: 50, state: 0, flags: GrabFlags::WINDOW_KILL, data: GrabData::None, chain: vec![] });

    let mut wm = wm(conn);
    wm.state.registry = registry;
    wm.grabs = grabs;
    wm.state.focus.push(window);

    handle::dispatch(&mut wm, XEvent::KeyPress { code: 50, state: 0 }).expect("dispatch should succeed");

    assert_eq!(wm.x.sent_protocols.borrow().as_slice(), &[(window, Atom::WmDeleteWindow)]);
    assert!(
        wm.state.registry.client_by_window(window).is_some(),
        "a protocol close must not remove the client until the server confirms it"
    );

    handle::dispatch(&mut wm, XEvent::DestroyNotify { window }).expect("dispatch should succeed");
    assert!(wm.state.registry.client_by_window(window).is_none());
}

/// Scenario 5: a sticky client stays mapped across view switches on either
/// screen, since `is_client_visible` treats stickiness as independent of
/// whichever view a screen happens to show.
#[test]
fn sticky_client_stays_mapped_across_view_switches() {
    let conn = RecordingXConn::default();
    let window = Xid(400);

    let mut registry = Registry::new();
    let gravity = registry.add_gravity("center", GravitySpec { x: 0, y: 0, w: 100, h: 100, tile: None });
    let tag_id = registry.add_tag("default", vec![]);
    let tags = 1u32 << (tag_id.0 + 1);
    let v0 = registry.add_view("v0", tags);
    let v1 = registry.add_view("v1", tags);
    registry.add_screen(Rect::new(0, 0, 800, 600), v0);
    registry.add_screen(Rect::new(800, 0, 800, 600), v1);

    // Not tagged onto either view: only `STICK` keeps it visible.
    let mut client = bare_client(window, 0, gravity, ScreenId(0), Rect::new(0, 0, 50, 50));
    client.mode.insert(ClientMode::STICK);
    registry.add_client(client);

    let mut grabs = GrabTable::new();
    grabs.insert(Grab { code: 60, state: 0, flags: GrabFlags::VIEW_FOCUS, data: GrabData::Int(1), chain: vec![] });
    grabs.insert(Grab { code: 61, state: 0, flags: GrabFlags::VIEW_FOCUS, data: GrabData::Int(0), chain: vec![] });

    let mut wm = wm(conn);
    wm.state.registry = registry;
    wm.grabs = grabs;

    handle::configure_screens(&wm.x, &mut wm.state, &wm.config.hooks)
        .expect("initial placement should succeed");
    assert!(wm.x.mapped.borrow().contains(&window));

    // Screen 0 (pointer at its default origin) jumps from v0 to v1.
    handle::dispatch(&mut wm, XEvent::KeyPress { code: 60, state: 0 }).expect("dispatch should succeed");
    assert_eq!(wm.state.registry.screen(ScreenId(0)).unwrap().view_id, v1);

    // Screen 1 jumps from v1 back to v0, with the pointer moved onto it.
    *wm.x.pointer.borrow_mut() = Point::new(850, 50);
    handle::dispatch(&mut wm, XEvent::KeyPress { code: 61, state: 0 }).expect("dispatch should succeed");
    assert_eq!(wm.state.registry.screen(ScreenId(1)).unwrap().view_id, v0);

    assert!(wm.x.unmapped.borrow().is_empty(), "a sticky client must never be unmapped by a view switch");
}

/// Scenario 6: a fixed-size client (`min == max`) that doesn't match its
/// screen's dimensions refuses to go fullscreen.
#[test]
fn fullscreen_toggle_is_refused_for_a_fixed_size_client() {
    let conn = RecordingXConn::default();
    let window = Xid(500);

    let mut registry = Registry::new();
    let tag_id = registry.add_tag("default", vec![]);
    let tags = 1u32 << (tag_id.0 + 1);
    let view_id = registry.add_view("v", tags);
    registry.add_screen(Rect::new(0, 0, 1920, 1080), view_id);

    let mut client = bare_client(window, tags, GravityId(0), ScreenId(0), Rect::new(100, 100, 320, 240));
    client.size_hints = SizeHints { min: Some((320, 240)), max: Some((320, 240)), ..Default::default() };
    let id = registry.add_client(client);

    let mut grabs = GrabTable::new();
    grabs.insert(Grab {
        code: 70,
        state: 0,
        flags: GrabFlags::WINDOW_TOGGLE,
        data: GrabData::Int(ClientMode::FULL.bits() as i64),
        chain: vec![],
    });

    let mut wm = wm(conn);
    wm.state.registry = registry;
    wm.grabs = grabs;
    wm.state.focus.push(window);

    handle::dispatch(&mut wm, XEvent::KeyPress { code: 70, state: 0 }).expect("dispatch should succeed");

    let client = wm.state.registry.client(id).unwrap();
    assert!(
        !client.mode.contains(ClientMode::FULL),
        "a fixed-size client whose hints don't match the screen must refuse fullscreen"
    );
}
