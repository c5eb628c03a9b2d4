//! A mock [`XConn`] implementation for unit and integration tests. Only
//! available under `cfg(test)` / the `mock` feature. Every method defaults
//! to [`crate::Error::UnimplementedMock`] unless the test overrides it, so
//! a test only has to implement the handful of calls the scenario it
//! exercises actually reaches.

#![allow(unused_variables)]

use crate::core::Xid;
use crate::pure::{Point, Rect};
use crate::x::{
    Atom, ButtonMask, MotifHints, Strut, WindowAttributes, WmHints, WmNormalHints, WmState, XConn,
    XEvent,
};
use crate::{Error, Result};

pub trait MockXConn {
    fn mock_root(&self) -> Xid {
        Xid(1)
    }
    fn mock_screen_details(&self) -> Result<Vec<Rect>> {
        Err(Error::UnimplementedMock)
    }
    fn mock_pointer_location(&self) -> Result<(Point, Option<Xid>)> {
        Err(Error::UnimplementedMock)
    }
    fn mock_flush(&self) -> Result<()> {
        Ok(())
    }
    fn mock_sync(&self) -> Result<()> {
        Ok(())
    }
    fn mock_next_event(&self) -> Result<XEvent> {
        Err(Error::UnimplementedMock)
    }
    fn mock_grab_key(&self, window: Xid, code: u32, state: u16) -> Result<()> {
        Ok(())
    }
    fn mock_ungrab_keys(&self, window: Xid) -> Result<()> {
        Ok(())
    }
    fn mock_grab_button(&self, window: Xid, code: u32, state: u16, mask: ButtonMask) -> Result<()> {
        Ok(())
    }
    fn mock_ungrab_buttons(&self, window: Xid) -> Result<()> {
        Ok(())
    }
    fn mock_grab_any_key(&self, window: Xid) -> Result<()> {
        Ok(())
    }
    fn mock_grab_pointer_and_server(&self) -> Result<()> {
        Ok(())
    }
    fn mock_ungrab_pointer_and_server(&self) -> Result<()> {
        Ok(())
    }
    fn mock_existing_windows(&self) -> Result<Vec<Xid>> {
        Ok(Vec::new())
    }
    fn mock_window_attributes(&self, window: Xid) -> Result<WindowAttributes> {
        Err(Error::UnimplementedMock)
    }
    fn mock_set_input_mask(&self, window: Xid) -> Result<()> {
        Ok(())
    }
    fn mock_add_to_save_set(&self, window: Xid) -> Result<()> {
        Ok(())
    }
    fn mock_remove_from_save_set(&self, window: Xid) -> Result<()> {
        Ok(())
    }
    fn mock_get_wm_class(&self, window: Xid) -> Result<Option<(String, String)>> {
        Ok(None)
    }
    fn mock_get_wm_name(&self, window: Xid) -> Result<Option<String>> {
        Ok(None)
    }
    fn mock_get_net_wm_name(&self, window: Xid) -> Result<Option<String>> {
        Ok(None)
    }
    fn mock_get_wm_window_role(&self, window: Xid) -> Result<Option<String>> {
        Ok(None)
    }
    fn mock_get_wm_client_leader(&self, window: Xid) -> Result<Option<Xid>> {
        Ok(None)
    }
    fn mock_get_wm_protocols(&self, window: Xid) -> Result<Vec<Atom>> {
        Ok(Vec::new())
    }
    fn mock_get_wm_normal_hints(&self, window: Xid) -> Result<Option<WmNormalHints>> {
        Ok(None)
    }
    fn mock_get_wm_hints(&self, window: Xid) -> Result<Option<WmHints>> {
        Ok(None)
    }
    fn mock_get_motif_hints(&self, window: Xid) -> Result<Option<MotifHints>> {
        Ok(None)
    }
    fn mock_get_net_wm_window_type(&self, window: Xid) -> Result<Vec<Atom>> {
        Ok(Vec::new())
    }
    fn mock_get_net_wm_state(&self, window: Xid) -> Result<Vec<Atom>> {
        Ok(Vec::new())
    }
    fn mock_get_net_wm_strut(&self, window: Xid) -> Result<Option<Strut>> {
        Ok(None)
    }
    fn mock_get_wm_transient_for(&self, window: Xid) -> Result<Option<Xid>> {
        Ok(None)
    }
    fn mock_get_xembed_info(&self, window: Xid) -> Result<Option<(u32, u32)>> {
        Ok(None)
    }
    fn mock_set_wm_state(&self, window: Xid, state: WmState) -> Result<()> {
        Ok(())
    }
    fn mock_set_net_wm_state(&self, window: Xid, atoms: &[Atom]) -> Result<()> {
        Ok(())
    }
    fn mock_set_net_wm_desktop(&self, window: Xid, idx: u32) -> Result<()> {
        Ok(())
    }
    fn mock_set_net_frame_extents(&self, window: Xid, border: u32) -> Result<()> {
        Ok(())
    }
    fn mock_set_cardinal_prop(&self, window: Xid, atom: Atom, values: &[u32]) -> Result<()> {
        Ok(())
    }
    fn mock_set_string_prop(&self, window: Xid, atom: Atom, values: &[String]) -> Result<()> {
        Ok(())
    }
    fn mock_set_window_prop(&self, window: Xid, atom: Atom, values: &[Xid]) -> Result<()> {
        Ok(())
    }
    fn mock_set_atom_prop(&self, window: Xid, atom: Atom, values: &[Atom]) -> Result<()> {
        Ok(())
    }
    fn mock_delete_property(&self, window: Xid, atom: Atom) -> Result<()> {
        Ok(())
    }
    fn mock_map(&self, window: Xid) -> Result<()> {
        Ok(())
    }
    fn mock_unmap(&self, window: Xid) -> Result<()> {
        Ok(())
    }
    fn mock_configure(&self, window: Xid, geom: Rect) -> Result<()> {
        Ok(())
    }
    fn mock_set_border_width(&self, window: Xid, px: u32) -> Result<()> {
        Ok(())
    }
    fn mock_set_border_color(&self, window: Xid, pixel: u32) -> Result<()> {
        Ok(())
    }
    fn mock_restack(&self, order: &[Xid]) -> Result<()> {
        Ok(())
    }
    fn mock_kill_client(&self, window: Xid) -> Result<()> {
        Ok(())
    }
    fn mock_set_input_focus(&self, window: Xid) -> Result<()> {
        Ok(())
    }
    fn mock_send_client_message(&self, window: Xid, message_type: Atom, data: [u32; 5]) -> Result<()> {
        Ok(())
    }
    fn mock_send_protocol(&self, window: Xid, protocol: Atom) -> Result<()> {
        Ok(())
    }
    fn mock_warp_pointer(&self, window: Xid, x: i32, y: i32) -> Result<()> {
        Ok(())
    }
    fn mock_claim_selection(&self, selection: Atom, owner: Xid) -> Result<Option<Xid>> {
        Ok(None)
    }
    fn mock_selection_owner(&self, selection: Atom) -> Result<Option<Xid>> {
        Ok(None)
    }
    fn mock_spawn(&self, command: &str) -> Result<()> {
        Ok(())
    }
}

/// A bare-bones [`MockXConn`] that answers every call with its default, for
/// tests that only care about a handful of overridden methods.
#[derive(Debug, Default)]
pub struct StubXConn;

impl MockXConn for StubXConn {}

impl<T> XConn for T
where
    T: MockXConn,
{
    fn root(&self) -> Result<Xid> {
        Ok(self.mock_root())
    }
    fn screen_details(&self) -> Result<Vec<Rect>> {
        self.mock_screen_details()
    }
    fn pointer_location(&self) -> Result<(Point, Option<Xid>)> {
        self.mock_pointer_location()
    }
    fn flush(&self) -> Result<()> {
        self.mock_flush()
    }
    fn sync(&self) -> Result<()> {
        self.mock_sync()
    }
    fn next_event(&self) -> Result<XEvent> {
        self.mock_next_event()
    }
    fn grab_key(&self, window: Xid, code: u32, state: u16) -> Result<()> {
        self.mock_grab_key(window, code, state)
    }
    fn ungrab_keys(&self, window: Xid) -> Result<()> {
        self.mock_ungrab_keys(window)
    }
    fn grab_button(&self, window: Xid, code: u32, state: u16, mask: ButtonMask) -> Result<()> {
        self.mock_grab_button(window, code, state, mask)
    }
    fn ungrab_buttons(&self, window: Xid) -> Result<()> {
        self.mock_ungrab_buttons(window)
    }
    fn grab_any_key(&self, window: Xid) -> Result<()> {
        self.mock_grab_any_key(window)
    }
    fn grab_pointer_and_server(&self) -> Result<()> {
        self.mock_grab_pointer_and_server()
    }
    fn ungrab_pointer_and_server(&self) -> Result<()> {
        self.mock_ungrab_pointer_and_server()
    }
    fn existing_windows(&self) -> Result<Vec<Xid>> {
        self.mock_existing_windows()
    }
    fn window_attributes(&self, window: Xid) -> Result<WindowAttributes> {
        self.mock_window_attributes(window)
    }
    fn set_input_mask(&self, window: Xid) -> Result<()> {
        self.mock_set_input_mask(window)
    }
    fn add_to_save_set(&self, window: Xid) -> Result<()> {
        self.mock_add_to_save_set(window)
    }
    fn remove_from_save_set(&self, window: Xid) -> Result<()> {
        self.mock_remove_from_save_set(window)
    }
    fn get_wm_class(&self, window: Xid) -> Result<Option<(String, String)>> {
        self.mock_get_wm_class(window)
    }
    fn get_wm_name(&self, window: Xid) -> Result<Option<String>> {
        self.mock_get_wm_name(window)
    }
    fn get_net_wm_name(&self, window: Xid) -> Result<Option<String>> {
        self.mock_get_net_wm_name(window)
    }
    fn get_wm_window_role(&self, window: Xid) -> Result<Option<String>> {
        self.mock_get_wm_window_role(window)
    }
    fn get_wm_client_leader(&self, window: Xid) -> Result<Option<Xid>> {
        self.mock_get_wm_client_leader(window)
    }
    fn get_wm_protocols(&self, window: Xid) -> Result<Vec<Atom>> {
        self.mock_get_wm_protocols(window)
    }
    fn get_wm_normal_hints(&self, window: Xid) -> Result<Option<WmNormalHints>> {
        self.mock_get_wm_normal_hints(window)
    }
    fn get_wm_hints(&self, window: Xid) -> Result<Option<WmHints>> {
        self.mock_get_wm_hints(window)
    }
    fn get_motif_hints(&self, window: Xid) -> Result<Option<MotifHints>> {
        self.mock_get_motif_hints(window)
    }
    fn get_net_wm_window_type(&self, window: Xid) -> Result<Vec<Atom>> {
        self.mock_get_net_wm_window_type(window)
    }
    fn get_net_wm_state(&self, window: Xid) -> Result<Vec<Atom>> {
        self.mock_get_net_wm_state(window)
    }
    fn get_net_wm_strut(&self, window: Xid) -> Result<Option<Strut>> {
        self.mock_get_net_wm_strut(window)
    }
    fn get_wm_transient_for(&self, window: Xid) -> Result<Option<Xid>> {
        self.mock_get_wm_transient_for(window)
    }
    fn get_xembed_info(&self, window: Xid) -> Result<Option<(u32, u32)>> {
        self.mock_get_xembed_info(window)
    }
    fn set_wm_state(&self, window: Xid, state: WmState) -> Result<()> {
        self.mock_set_wm_state(window, state)
    }
    fn set_net_wm_state(&self, window: Xid, atoms: &[Atom]) -> Result<()> {
        self.mock_set_net_wm_state(window, atoms)
    }
    fn set_net_wm_desktop(&self, window: Xid, idx: u32) -> Result<()> {
        self.mock_set_net_wm_desktop(window, idx)
    }
    fn set_net_frame_extents(&self, window: Xid, border: u32) -> Result<()> {
        self.mock_set_net_frame_extents(window, border)
    }
    fn set_cardinal_prop(&self, window: Xid, atom: Atom, values: &[u32]) -> Result<()> {
        self.mock_set_cardinal_prop(window, atom, values)
    }
    fn set_string_prop(&self, window: Xid, atom: Atom, values: &[String]) -> Result<()> {
        self.mock_set_string_prop(window, atom, values)
    }
    fn set_window_prop(&self, window: Xid, atom: Atom, values: &[Xid]) -> Result<()> {
        self.mock_set_window_prop(window, atom, values)
    }
    fn set_atom_prop(&self, window: Xid, atom: Atom, values: &[Atom]) -> Result<()> {
        self.mock_set_atom_prop(window, atom, values)
    }
    fn delete_property(&self, window: Xid, atom: Atom) -> Result<()> {
        self.mock_delete_property(window, atom)
    }
    fn map(&self, window: Xid) -> Result<()> {
        self.mock_map(window)
    }
    fn unmap(&self, window: Xid) -> Result<()> {
        self.mock_unmap(window)
    }
    fn configure(&self, window: Xid, geom: Rect) -> Result<()> {
        self.mock_configure(window, geom)
    }
    fn set_border_width(&self, window: Xid, px: u32) -> Result<()> {
        self.mock_set_border_width(window, px)
    }
    fn set_border_color(&self, window: Xid, pixel: u32) -> Result<()> {
        self.mock_set_border_color(window, pixel)
    }
    fn restack(&self, order: &[Xid]) -> Result<()> {
        self.mock_restack(order)
    }
    fn kill_client(&self, window: Xid) -> Result<()> {
        self.mock_kill_client(window)
    }
    fn set_input_focus(&self, window: Xid) -> Result<()> {
        self.mock_set_input_focus(window)
    }
    fn send_client_message(&self, window: Xid, message_type: Atom, data: [u32; 5]) -> Result<()> {
        self.mock_send_client_message(window, message_type, data)
    }
    fn send_protocol(&self, window: Xid, protocol: Atom) -> Result<()> {
        self.mock_send_protocol(window, protocol)
    }
    fn warp_pointer(&self, window: Xid, x: i32, y: i32) -> Result<()> {
        self.mock_warp_pointer(window, x, y)
    }
    fn claim_selection(&self, selection: Atom, owner: Xid) -> Result<Option<Xid>> {
        self.mock_claim_selection(selection, owner)
    }
    fn selection_owner(&self, selection: Atom) -> Result<Option<Xid>> {
        self.mock_selection_owner(selection)
    }
    fn spawn(&self, command: &str) -> Result<()> {
        self.mock_spawn(command)
    }
}
