//! A mock implementation of XConn that is easier to implement for use in tests.
use crate::{
    core::bindings::KeyCode,
    pure::{geometry::Rect, topology::OutputInfo},
    x::{ClientConfig, XConn, XEvent},
    Result, Xid,
};

/// All methods on this trait that return a Result are unimplemented by default unless an
/// implementation is provided. The `mock_root` method always returns id 0, `mock_flush` is a
/// no-op and `mock_init` succeeds.
///
/// Any implementation of `MockXConn` will automatically implement `XConn` by forwarding on
/// calls to `$method` to `mock_$method`.
#[allow(unused_variables)]
pub trait MockXConn {
    fn mock_root(&self) -> Xid {
        Xid(0)
    }

    fn mock_init(&self) -> Result<()> {
        Ok(())
    }

    fn mock_screen_size(&self) -> Result<Rect> {
        unimplemented!("mock_screen_size")
    }

    fn mock_screen_details(&self) -> Result<Vec<Rect>> {
        unimplemented!("mock_screen_details")
    }

    fn mock_output_details(&self) -> Result<Vec<OutputInfo>> {
        unimplemented!("mock_output_details")
    }

    fn mock_keycodes_for_keysym(&self, keysym: u32) -> Result<Vec<u8>> {
        unimplemented!("mock_keycodes_for_keysym")
    }

    fn mock_grab(&self, key_codes: &[KeyCode]) -> Result<()> {
        unimplemented!("mock_grab")
    }

    fn mock_ungrab(&self) -> Result<()> {
        unimplemented!("mock_ungrab")
    }

    fn mock_next_event(&self) -> Result<XEvent> {
        unimplemented!("mock_next_event")
    }

    fn mock_flush(&self) {}

    fn mock_map(&self, client: Xid) -> Result<()> {
        unimplemented!("mock_map")
    }

    fn mock_unmap(&self, client: Xid) -> Result<()> {
        unimplemented!("mock_unmap")
    }

    fn mock_kill(&self, client: Xid) -> Result<()> {
        unimplemented!("mock_kill")
    }

    fn mock_focus(&self, client: Xid) -> Result<()> {
        unimplemented!("mock_focus")
    }

    fn mock_set_client_config(&self, client: Xid, data: &[ClientConfig]) -> Result<()> {
        unimplemented!("mock_set_client_config")
    }

    fn mock_warp_pointer(&self, id: Xid, x: i16, y: i16) -> Result<()> {
        unimplemented!("mock_warp_pointer")
    }

    fn mock_create_indicator(&self, r: Rect) -> Result<Xid> {
        unimplemented!("mock_create_indicator")
    }

    fn mock_draw_indicator(&self, id: Xid, label: &str) -> Result<()> {
        unimplemented!("mock_draw_indicator")
    }

    fn mock_destroy_indicator(&self, id: Xid) -> Result<()> {
        unimplemented!("mock_destroy_indicator")
    }
}

impl<T> XConn for T
where
    T: MockXConn,
{
    fn root(&self) -> Xid {
        self.mock_root()
    }

    fn init(&self) -> Result<()> {
        self.mock_init()
    }

    fn screen_size(&self) -> Result<Rect> {
        self.mock_screen_size()
    }

    fn screen_details(&self) -> Result<Vec<Rect>> {
        self.mock_screen_details()
    }

    fn output_details(&self) -> Result<Vec<OutputInfo>> {
        self.mock_output_details()
    }

    fn keycodes_for_keysym(&self, keysym: u32) -> Result<Vec<u8>> {
        self.mock_keycodes_for_keysym(keysym)
    }

    fn grab(&self, key_codes: &[KeyCode]) -> Result<()> {
        self.mock_grab(key_codes)
    }

    fn ungrab(&self) -> Result<()> {
        self.mock_ungrab()
    }

    fn next_event(&self) -> Result<XEvent> {
        self.mock_next_event()
    }

    fn flush(&self) {
        self.mock_flush()
    }

    fn map(&self, client: Xid) -> Result<()> {
        self.mock_map(client)
    }

    fn unmap(&self, client: Xid) -> Result<()> {
        self.mock_unmap(client)
    }

    fn kill(&self, client: Xid) -> Result<()> {
        self.mock_kill(client)
    }

    fn focus(&self, client: Xid) -> Result<()> {
        self.mock_focus(client)
    }

    fn set_client_config(&self, client: Xid, data: &[ClientConfig]) -> Result<()> {
        self.mock_set_client_config(client, data)
    }

    fn warp_pointer(&self, id: Xid, x: i16, y: i16) -> Result<()> {
        self.mock_warp_pointer(id, x, y)
    }

    fn create_indicator(&self, r: Rect) -> Result<Xid> {
        self.mock_create_indicator(r)
    }

    fn draw_indicator(&self, id: Xid, label: &str) -> Result<()> {
        self.mock_draw_indicator(id, label)
    }

    fn destroy_indicator(&self, id: Xid) -> Result<()> {
        self.mock_destroy_indicator(id)
    }
}
