//! The concrete [`crate::x::XConn`] implementation: inherent helpers for
//! atom lookups and raw property reads, a single `impl XConn` block that is
//! pure translation, and an Xrandr → Xinerama → single-screen probing
//! order for output enumeration.

use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};

use x11rb::connection::Connection;
use x11rb::protocol::randr::ConnectionExt as _;
use x11rb::protocol::xinerama::ConnectionExt as _;
use x11rb::protocol::xproto::{
    AtomEnum, ChangeWindowAttributesAux, ClientMessageData, ClientMessageEvent,
    ConfigureWindowAux, ConnectionExt as _, EventMask, GrabMode, InputFocus, ModMask, PropMode,
    SetMode, StackMode,
};
use x11rb::protocol::Event;
use x11rb::wrapper::ConnectionExt as _;
use x11rb::CURRENT_TIME;

use crate::core::Xid;
use crate::pure::gravity::SizeHints;
use crate::pure::{Point, Rect};
use crate::x::{
    Atom, ButtonMask, MotifHints, Strut, WindowAttributes, WmHints, WmNormalHints, WmState, XConn,
    XEvent,
};
use crate::{Error, Result};

use super::atom::Atoms;
use super::X11rbError;

/// How physical outputs are enumerated, probed once at startup via a
/// Randr → Xinerama → single-screen fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScreenBackend {
    Randr,
    Xinerama,
    Single,
}

/// The live connection to an X server, generic over any [`Connection`] so
/// that both the plain TCP/unix-socket transport and the `allow-unsafe-code`
/// XCB-shared transport (behind the `x11rb-xcb` feature) work unchanged.
#[derive(Debug)]
pub struct X11rbConn<C> {
    conn: C,
    root: Xid,
    atoms: Atoms,
    backend: ScreenBackend,
}

impl<C> X11rbConn<C>
where
    C: Connection,
{
    /// Wrap an already-established connection, probing for a screen
    /// enumeration backend unless `no_randr` forces the single-screen
    /// fallback (the `-n` CLI flag).
    pub fn new(conn: C, no_randr: bool) -> Result<Self> {
        let root = conn.setup().roots[0].root;

        if !no_randr {
            conn.randr_query_version(1, 2).map_err(X11rbError::from)?;
        }

        let backend = if !no_randr
            && conn
                .extension_information(x11rb::protocol::randr::X11_EXTENSION_NAME)
                .map_err(X11rbError::from)?
                .is_some()
        {
            ScreenBackend::Randr
        } else if conn
            .extension_information(x11rb::protocol::xinerama::X11_EXTENSION_NAME)
            .map_err(X11rbError::from)?
            .is_some()
        {
            ScreenBackend::Xinerama
        } else {
            ScreenBackend::Single
        };

        let atoms = Atoms::new(&conn).map_err(X11rbError::from)?;

        Ok(Self {
            conn,
            root: Xid(root),
            atoms,
            backend,
        })
    }

    fn atom(&self, atom: Atom) -> u32 {
        self.atoms.id(atom)
    }

    fn get_property_u32s(&self, window: Xid, atom: Atom, kind: AtomEnum) -> Result<Vec<u32>> {
        let reply = self
            .conn
            .get_property(false, window.0, self.atom(atom), kind, 0, 1024)
            .map_err(X11rbError::from)?
            .reply()
            .map_err(X11rbError::from)?;
        Ok(reply.value32().map(|it| it.collect()).unwrap_or_default())
    }

    fn get_property_string(&self, window: Xid, atom: Atom) -> Result<Option<String>> {
        let reply = self
            .conn
            .get_property(
                false,
                window.0,
                self.atom(atom),
                AtomEnum::ANY,
                0,
                1024,
            )
            .map_err(X11rbError::from)?
            .reply()
            .map_err(X11rbError::from)?;
        if reply.value.is_empty() {
            return Ok(None);
        }
        Ok(String::from_utf8(reply.value).ok())
    }

    fn set_property_u32s(&self, window: Xid, atom: Atom, kind: AtomEnum, values: &[u32]) -> Result<()> {
        self.conn
            .change_property32(PropMode::REPLACE, window.0, self.atom(atom), kind, values)
            .map_err(X11rbError::from)?;
        Ok(())
    }
}

impl<C> XConn for X11rbConn<C>
where
    C: Connection,
{
    fn root(&self) -> Result<Xid> {
        Ok(self.root)
    }

    fn screen_details(&self) -> Result<Vec<Rect>> {
        match self.backend {
            ScreenBackend::Randr => {
                let resources = self
                    .conn
                    .randr_get_screen_resources(self.root.0)
                    .map_err(X11rbError::from)?
                    .reply()
                    .map_err(X11rbError::from)?;
                let cookies = resources
                    .crtcs
                    .iter()
                    .map(|c| self.conn.randr_get_crtc_info(*c, 0).map_err(X11rbError::from))
                    .collect::<Result<Vec<_>>>()?;
                let rects = cookies
                    .into_iter()
                    .filter_map(|c| c.reply().ok())
                    .filter(|r| r.width > 0 && r.height > 0)
                    .map(|r| Rect::new(r.x as i32, r.y as i32, r.width as u32, r.height as u32))
                    .collect();
                Ok(rects)
            }
            ScreenBackend::Xinerama => {
                let reply = self
                    .conn
                    .xinerama_query_screens()
                    .map_err(X11rbError::from)?
                    .reply()
                    .map_err(X11rbError::from)?;
                Ok(reply
                    .screen_info
                    .into_iter()
                    .map(|s| Rect::new(s.x_org as i32, s.y_org as i32, s.width as u32, s.height as u32))
                    .collect())
            }
            ScreenBackend::Single => {
                let geom = self
                    .conn
                    .get_geometry(self.root.0)
                    .map_err(X11rbError::from)?
                    .reply()
                    .map_err(X11rbError::from)?;
                Ok(vec![Rect::new(0, 0, geom.width as u32, geom.height as u32)])
            }
        }
    }

    fn pointer_location(&self) -> Result<(Point, Option<Xid>)> {
        let reply = self
            .conn
            .query_pointer(self.root.0)
            .map_err(X11rbError::from)?
            .reply()
            .map_err(X11rbError::from)?;
        let window = (reply.child != 0).then_some(Xid(reply.child));
        Ok((Point::new(reply.root_x as i32, reply.root_y as i32), window))
    }

    fn flush(&self) -> Result<()> {
        self.conn.flush().map_err(X11rbError::from)?;
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        self.conn.sync().map_err(X11rbError::from)?;
        Ok(())
    }

    fn next_event(&self) -> Result<XEvent> {
        loop {
            let event = self.conn.wait_for_event().map_err(X11rbError::from)?;
            if let Some(translated) = self.translate(event)? {
                return Ok(translated);
            }
        }
    }

    fn grab_key(&self, window: Xid, code: u32, state: u16) -> Result<()> {
        self.conn
            .grab_key(
                false,
                window.0,
                state,
                code as u8,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
            )
            .map_err(X11rbError::from)?;
        Ok(())
    }

    fn ungrab_keys(&self, window: Xid) -> Result<()> {
        self.conn
            .ungrab_key(x11rb::protocol::xproto::GRAB_ANY, window.0, ModMask::ANY)
            .map_err(X11rbError::from)?;
        Ok(())
    }

    fn grab_button(&self, window: Xid, code: u32, state: u16, mask: ButtonMask) -> Result<()> {
        let mut event_mask = EventMask::from(0u16);
        if mask.contains(ButtonMask::PRESS) {
            event_mask |= EventMask::BUTTON_PRESS;
        }
        if mask.contains(ButtonMask::RELEASE) {
            event_mask |= EventMask::BUTTON_RELEASE;
        }
        self.conn
            .grab_button(
                false,
                window.0,
                event_mask,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
                x11rb::NONE,
                x11rb::NONE,
                code as u8,
                state,
            )
            .map_err(X11rbError::from)?;
        Ok(())
    }

    fn ungrab_buttons(&self, window: Xid) -> Result<()> {
        self.conn
            .ungrab_button(x11rb::protocol::xproto::GRAB_ANY, window.0, ModMask::ANY)
            .map_err(X11rbError::from)?;
        Ok(())
    }

    fn grab_any_key(&self, window: Xid) -> Result<()> {
        self.conn
            .grab_key(
                false,
                window.0,
                ModMask::ANY,
                x11rb::protocol::xproto::GRAB_ANY,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
            )
            .map_err(X11rbError::from)?;
        Ok(())
    }

    fn grab_pointer_and_server(&self) -> Result<()> {
        let mask = EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE | EventMask::POINTER_MOTION;
        self.conn
            .grab_pointer(
                false,
                self.root.0,
                mask,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
                x11rb::NONE,
                x11rb::NONE,
                CURRENT_TIME,
            )
            .map_err(X11rbError::from)?
            .reply()
            .map_err(X11rbError::from)?;
        self.conn.grab_server().map_err(X11rbError::from)?;
        Ok(())
    }

    fn ungrab_pointer_and_server(&self) -> Result<()> {
        self.conn
            .ungrab_pointer(CURRENT_TIME)
            .map_err(X11rbError::from)?;
        self.conn.ungrab_server().map_err(X11rbError::from)?;
        Ok(())
    }

    fn existing_windows(&self) -> Result<Vec<Xid>> {
        let reply = self
            .conn
            .query_tree(self.root.0)
            .map_err(X11rbError::from)?
            .reply()
            .map_err(X11rbError::from)?;
        Ok(reply.children.into_iter().map(Xid).collect())
    }

    fn window_attributes(&self, window: Xid) -> Result<WindowAttributes> {
        let attr = self
            .conn
            .get_window_attributes(window.0)
            .map_err(X11rbError::from)?
            .reply()
            .map_err(X11rbError::from)?;
        let geom = self
            .conn
            .get_geometry(window.0)
            .map_err(X11rbError::from)?
            .reply()
            .map_err(X11rbError::from)?;
        Ok(WindowAttributes {
            override_redirect: attr.override_redirect,
            geom: Rect::new(geom.x as i32, geom.y as i32, geom.width as u32, geom.height as u32),
        })
    }

    fn set_input_mask(&self, window: Xid) -> Result<()> {
        let mask = EventMask::ENTER_WINDOW
            | EventMask::PROPERTY_CHANGE
            | EventMask::STRUCTURE_NOTIFY
            | EventMask::FOCUS_CHANGE;
        let aux = ChangeWindowAttributesAux::new().event_mask(mask);
        self.conn
            .change_window_attributes(window.0, &aux)
            .map_err(X11rbError::from)?;
        Ok(())
    }

    fn add_to_save_set(&self, window: Xid) -> Result<()> {
        self.conn
            .change_save_set(SetMode::INSERT, window.0)
            .map_err(X11rbError::from)?;
        Ok(())
    }

    fn remove_from_save_set(&self, window: Xid) -> Result<()> {
        self.conn
            .change_save_set(SetMode::DELETE, window.0)
            .map_err(X11rbError::from)?;
        Ok(())
    }

    fn get_wm_class(&self, window: Xid) -> Result<Option<(String, String)>> {
        let reply = self
            .conn
            .get_property(false, window.0, AtomEnum::WM_CLASS, AtomEnum::STRING, 0, 1024)
            .map_err(X11rbError::from)?
            .reply()
            .map_err(X11rbError::from)?;
        let mut parts = reply.value.split(|b| *b == 0).filter(|s| !s.is_empty());
        let instance = parts.next().and_then(|s| std::str::from_utf8(s).ok());
        let class = parts.next().and_then(|s| std::str::from_utf8(s).ok());
        Ok(instance.zip(class).map(|(i, c)| (i.to_string(), c.to_string())))
    }

    fn get_wm_name(&self, window: Xid) -> Result<Option<String>> {
        self.get_property_string(window, Atom::WmName)
    }

    fn get_net_wm_name(&self, window: Xid) -> Result<Option<String>> {
        self.get_property_string(window, Atom::NetWmName)
    }

    fn get_wm_window_role(&self, window: Xid) -> Result<Option<String>> {
        self.get_property_string(window, Atom::WmWindowRole)
    }

    fn get_wm_client_leader(&self, window: Xid) -> Result<Option<Xid>> {
        Ok(self
            .get_property_u32s(window, Atom::WmClientLeader, AtomEnum::WINDOW)?
            .first()
            .copied()
            .map(Xid))
    }

    fn get_wm_protocols(&self, window: Xid) -> Result<Vec<Atom>> {
        Ok(self
            .get_property_u32s(window, Atom::WmProtocols, AtomEnum::ATOM)?
            .into_iter()
            .filter_map(|id| self.atoms.name(id))
            .collect())
    }

    fn get_wm_normal_hints(&self, window: Xid) -> Result<Option<WmNormalHints>> {
        let words = self.get_property_u32s(window, Atom::WmNormalHints, AtomEnum::ANY)?;
        if words.len() < 18 {
            return Ok(None);
        }
        let flags = words[0];
        let ratio = |num: u32, den: u32| if den != 0 { num as f64 / den as f64 } else { 0.0 };
        let hints = SizeHints {
            min: (flags & (1 << 4) != 0).then(|| (words[5], words[6])),
            max: (flags & (1 << 5) != 0).then(|| (words[7], words[8])),
            inc: (flags & (1 << 6) != 0).then(|| (words[9], words[10])),
            min_aspect: (flags & (1 << 7) != 0).then(|| ratio(words[11], words[12])),
            max_aspect: (flags & (1 << 7) != 0).then(|| ratio(words[13], words[14])),
            base: (flags & (1 << 8) != 0).then(|| (words[15], words[16])),
        };
        Ok(Some(WmNormalHints { hints }))
    }

    fn get_wm_hints(&self, window: Xid) -> Result<Option<WmHints>> {
        let words = self.get_property_u32s(window, Atom::WmHints, AtomEnum::ANY)?;
        if words.is_empty() {
            return Ok(None);
        }
        let flags = words[0];
        let input = flags & 0b1 == 0 || words.get(1).map(|v| *v != 0).unwrap_or(true);
        let urgent = flags & (1 << 8) != 0;
        Ok(Some(WmHints { input, urgent }))
    }

    fn get_motif_hints(&self, window: Xid) -> Result<Option<MotifHints>> {
        let words = self.get_property_u32s(window, Atom::MotifWmHints, AtomEnum::ANY)?;
        if words.len() < 3 {
            return Ok(None);
        }
        Ok(Some(MotifHints::from_raw(words[0], words[2])))
    }

    fn get_net_wm_window_type(&self, window: Xid) -> Result<Vec<Atom>> {
        Ok(self
            .get_property_u32s(window, Atom::NetWmWindowType, AtomEnum::ATOM)?
            .into_iter()
            .filter_map(|id| self.atoms.name(id))
            .collect())
    }

    fn get_net_wm_state(&self, window: Xid) -> Result<Vec<Atom>> {
        Ok(self
            .get_property_u32s(window, Atom::NetWmState, AtomEnum::ATOM)?
            .into_iter()
            .filter_map(|id| self.atoms.name(id))
            .collect())
    }

    fn get_net_wm_strut(&self, window: Xid) -> Result<Option<Strut>> {
        let words = self.get_property_u32s(window, Atom::NetWmStrut, AtomEnum::CARDINAL)?;
        if words.len() < 4 {
            return Ok(None);
        }
        Ok(Some(Strut {
            left: words[0],
            right: words[1],
            top: words[2],
            bottom: words[3],
        }))
    }

    fn get_wm_transient_for(&self, window: Xid) -> Result<Option<Xid>> {
        Ok(self
            .get_property_u32s(window, Atom::WmTransientFor, AtomEnum::WINDOW)?
            .first()
            .copied()
            .map(Xid))
    }

    fn get_xembed_info(&self, window: Xid) -> Result<Option<(u32, u32)>> {
        let words = self.get_property_u32s(window, Atom::XEmbedInfo, AtomEnum::ANY)?;
        if words.len() < 2 {
            return Ok(None);
        }
        Ok(Some((words[0], words[1])))
    }

    fn set_wm_state(&self, window: Xid, state: WmState) -> Result<()> {
        self.set_property_u32s(window, Atom::WmState, AtomEnum::ANY, &[state.as_u32(), 0])
    }

    fn set_net_wm_state(&self, window: Xid, atoms: &[Atom]) -> Result<()> {
        let ids: Vec<u32> = atoms.iter().map(|a| self.atom(*a)).collect();
        self.set_property_u32s(window, Atom::NetWmState, AtomEnum::ATOM, &ids)
    }

    fn set_net_wm_desktop(&self, window: Xid, idx: u32) -> Result<()> {
        self.set_property_u32s(window, Atom::NetWmDesktop, AtomEnum::CARDINAL, &[idx])
    }

    fn set_net_frame_extents(&self, window: Xid, border: u32) -> Result<()> {
        self.set_property_u32s(
            window,
            Atom::NetFrameExtents,
            AtomEnum::CARDINAL,
            &[border, border, border, border],
        )
    }

    fn set_cardinal_prop(&self, window: Xid, atom: Atom, values: &[u32]) -> Result<()> {
        self.set_property_u32s(window, atom, AtomEnum::CARDINAL, values)
    }

    fn set_string_prop(&self, window: Xid, atom: Atom, values: &[String]) -> Result<()> {
        let joined = values.join("\0");
        self.conn
            .change_property8(
                PropMode::REPLACE,
                window.0,
                self.atom(atom),
                self.atom(Atom::Utf8String),
                joined.as_bytes(),
            )
            .map_err(X11rbError::from)?;
        Ok(())
    }

    fn set_window_prop(&self, window: Xid, atom: Atom, values: &[Xid]) -> Result<()> {
        let ids: Vec<u32> = values.iter().map(|w| w.0).collect();
        self.set_property_u32s(window, atom, AtomEnum::WINDOW, &ids)
    }

    fn set_atom_prop(&self, window: Xid, atom: Atom, values: &[Atom]) -> Result<()> {
        let ids: Vec<u32> = values.iter().map(|a| self.atom(*a)).collect();
        self.set_property_u32s(window, atom, AtomEnum::ATOM, &ids)
    }

    fn delete_property(&self, window: Xid, atom: Atom) -> Result<()> {
        self.conn
            .delete_property(window.0, self.atom(atom))
            .map_err(X11rbError::from)?;
        Ok(())
    }

    fn map(&self, window: Xid) -> Result<()> {
        self.conn.map_window(window.0).map_err(X11rbError::from)?;
        Ok(())
    }

    fn unmap(&self, window: Xid) -> Result<()> {
        self.conn.unmap_window(window.0).map_err(X11rbError::from)?;
        Ok(())
    }

    fn configure(&self, window: Xid, geom: Rect) -> Result<()> {
        let aux = ConfigureWindowAux::new()
            .x(geom.x)
            .y(geom.y)
            .width(geom.w)
            .height(geom.h);
        self.conn
            .configure_window(window.0, &aux)
            .map_err(X11rbError::from)?;
        Ok(())
    }

    fn set_border_width(&self, window: Xid, px: u32) -> Result<()> {
        let aux = ConfigureWindowAux::new().border_width(px);
        self.conn
            .configure_window(window.0, &aux)
            .map_err(X11rbError::from)?;
        Ok(())
    }

    fn set_border_color(&self, window: Xid, pixel: u32) -> Result<()> {
        let aux = ChangeWindowAttributesAux::new().border_pixel(pixel);
        self.conn
            .change_window_attributes(window.0, &aux)
            .map_err(X11rbError::from)?;
        Ok(())
    }

    fn restack(&self, order: &[Xid]) -> Result<()> {
        // `order` is bottom-first; each window is stacked directly above
        // its predecessor so the last entry ends up on top.
        for pair in order.windows(2) {
            let aux = ConfigureWindowAux::new()
                .sibling(pair[0].0)
                .stack_mode(StackMode::ABOVE);
            self.conn
                .configure_window(pair[1].0, &aux)
                .map_err(X11rbError::from)?;
        }
        Ok(())
    }

    fn kill_client(&self, window: Xid) -> Result<()> {
        self.conn.kill_client(window.0).map_err(X11rbError::from)?;
        Ok(())
    }

    fn set_input_focus(&self, window: Xid) -> Result<()> {
        self.conn
            .set_input_focus(InputFocus::POINTER_ROOT, window.0, CURRENT_TIME)
            .map_err(X11rbError::from)?;
        let active = self.atom(Atom::NetActiveWindow);
        self.conn
            .change_property32(PropMode::REPLACE, self.root.0, active, AtomEnum::WINDOW, &[window.0])
            .map_err(X11rbError::from)?;
        Ok(())
    }

    fn send_client_message(&self, window: Xid, message_type: Atom, data: [u32; 5]) -> Result<()> {
        let event = ClientMessageEvent {
            response_type: x11rb::protocol::xproto::CLIENT_MESSAGE_EVENT,
            format: 32,
            sequence: 0,
            window: window.0,
            type_: self.atom(message_type),
            data: ClientMessageData::from(data),
        };
        self.conn
            .send_event(false, window.0, EventMask::NO_EVENT, &event)
            .map_err(X11rbError::from)?;
        Ok(())
    }

    fn send_protocol(&self, window: Xid, protocol: Atom) -> Result<()> {
        let mut data = [0u32; 5];
        data[0] = self.atom(protocol);
        data[1] = CURRENT_TIME;
        self.send_client_message(window, Atom::WmProtocols, data)
    }

    fn warp_pointer(&self, window: Xid, x: i32, y: i32) -> Result<()> {
        self.conn
            .warp_pointer(x11rb::NONE, window.0, 0, 0, 0, 0, x as i16, y as i16)
            .map_err(X11rbError::from)?;
        Ok(())
    }

    fn claim_selection(&self, selection: Atom, owner: Xid) -> Result<Option<Xid>> {
        let selection_atom = self.atom(selection);
        let previous = self.selection_owner(selection)?;
        self.conn
            .set_selection_owner(owner.0, selection_atom, CURRENT_TIME)
            .map_err(X11rbError::from)?;
        Ok(previous)
    }

    fn selection_owner(&self, selection: Atom) -> Result<Option<Xid>> {
        let reply = self
            .conn
            .get_selection_owner(self.atom(selection))
            .map_err(X11rbError::from)?
            .reply()
            .map_err(X11rbError::from)?;
        Ok((reply.owner != 0).then_some(Xid(reply.owner)))
    }

    fn spawn(&self, command: &str) -> Result<()> {
        let mut cmd = Command::new("/bin/sh");
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        unsafe {
            cmd.pre_exec(|| {
                nix::unistd::setsid().map_err(std::io::Error::from)?;
                Ok(())
            });
        }
        cmd.spawn().map_err(Error::Io)?;
        Ok(())
    }
}

impl<C> X11rbConn<C>
where
    C: Connection,
{
    /// Translate one raw protocol event into our event enum, or `None` for
    /// an event the core does not act on (dropped rather than surfaced).
    fn translate(&self, event: Event) -> Result<Option<XEvent>> {
        let translated = match event {
            Event::KeyPress(e) => Some(XEvent::KeyPress {
                code: e.detail as u32,
                state: u16::from(e.state),
            }),
            Event::ButtonPress(e) => Some(XEvent::ButtonPress {
                code: e.detail as u32,
                state: u16::from(e.state),
                window: Xid(e.event),
            }),
            Event::ButtonRelease(_) => Some(XEvent::ButtonRelease),
            Event::MotionNotify(e) => Some(XEvent::MotionNotify {
                x: e.root_x as i32,
                y: e.root_y as i32,
            }),
            Event::EnterNotify(e) => Some(XEvent::EnterNotify { window: Xid(e.event) }),
            Event::MapRequest(e) => Some(XEvent::MapRequest { window: Xid(e.window) }),
            Event::DestroyNotify(e) => Some(XEvent::DestroyNotify { window: Xid(e.window) }),
            Event::UnmapNotify(e) => Some(XEvent::UnmapNotify { window: Xid(e.window) }),
            Event::ConfigureNotify(e) if e.window == self.root.0 => Some(XEvent::ConfigureNotifyRoot),
            Event::ConfigureNotify(e) => Some(XEvent::ConfigureNotify {
                window: Xid(e.window),
                geom: Rect::new(e.x as i32, e.y as i32, e.width as u32, e.height as u32),
            }),
            Event::ConfigureRequest(e) => {
                use crate::x::event::ConfigureValueMask;
                use x11rb::protocol::xproto::ConfigWindow;
                let mask = ConfigWindow::from(e.value_mask);
                let mut value_mask = ConfigureValueMask::empty();
                if mask.contains(ConfigWindow::X) {
                    value_mask |= ConfigureValueMask::X;
                }
                if mask.contains(ConfigWindow::Y) {
                    value_mask |= ConfigureValueMask::Y;
                }
                if mask.contains(ConfigWindow::WIDTH) {
                    value_mask |= ConfigureValueMask::WIDTH;
                }
                if mask.contains(ConfigWindow::HEIGHT) {
                    value_mask |= ConfigureValueMask::HEIGHT;
                }
                Some(XEvent::ConfigureRequest {
                    window: Xid(e.window),
                    geom: Rect::new(e.x as i32, e.y as i32, e.width as u32, e.height as u32),
                    value_mask,
                })
            }
            Event::ClientMessage(e) => self.atoms.name(e.type_).map(|message_type| {
                let data = e.data.as_data32();
                XEvent::ClientMessage {
                    window: Xid(e.window),
                    message_type,
                    data,
                }
            }),
            Event::PropertyNotify(e) => self.atoms.name(e.atom).map(|atom| XEvent::PropertyNotify {
                window: Xid(e.window),
                atom,
            }),
            Event::SelectionClear(e) => self
                .atoms
                .name(e.selection)
                .map(|selection| XEvent::SelectionClear { selection }),
            _ => None,
        };
        Ok(translated)
    }
}
