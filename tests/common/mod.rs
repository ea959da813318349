//! Shared test helpers: a recording XConn that stands in for the X server
#![allow(dead_code)]
use gowm::{
    core::bindings::{KeyCode, ModifierKey, XK_1},
    pure::{OutputInfo, Rect},
    x::{ClientConfig, MockXConn, XEvent},
    Config, Result, WindowManager, Xid,
};
use std::cell::RefCell;

pub const MAIN: Rect = Rect::new(0, 0, 1920, 1080);
pub const EXT: Rect = Rect::new(1920, 0, 2560, 1440);
pub const SCREEN: Rect = Rect::new(0, 0, 4480, 1440);
pub const INDICATOR_ID: u32 = 1000;

/// A request that was made of the X server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Map(Xid),
    Unmap(Xid),
    Kill(Xid),
    Focus(Xid),
    Configure(Xid, Vec<ClientConfig>),
    Warp(i16, i16),
    Draw(Xid, String),
    Grab(usize),
    Ungrab,
    DestroyIndicator(Xid),
}

/// Key codes are the low byte of the keysym they produce.
#[derive(Debug)]
pub struct RecordingXConn {
    pub screen: RefCell<Rect>,
    pub heads: RefCell<Vec<Rect>>,
    pub outputs: RefCell<Vec<OutputInfo>>,
    pub calls: RefCell<Vec<Call>>,
}

impl RecordingXConn {
    pub fn single() -> Self {
        Self {
            screen: RefCell::new(MAIN),
            heads: RefCell::new(vec![MAIN]),
            outputs: RefCell::new(vec![output("eDP-1", MAIN)]),
            calls: RefCell::new(vec![]),
        }
    }

    pub fn dual() -> Self {
        Self {
            screen: RefCell::new(SCREEN),
            heads: RefCell::new(vec![MAIN, EXT]),
            outputs: RefCell::new(vec![output("eDP-1", MAIN), output("HDMI-1", EXT)]),
            calls: RefCell::new(vec![]),
        }
    }

    /// The X server shrinks the root window to the remaining output.
    pub fn unplug_external(&self) {
        self.screen.replace(MAIN);
        self.heads.replace(vec![MAIN]);
        self.outputs.replace(vec![output("eDP-1", MAIN)]);
    }

    /// Change the resolution of a lone main output.
    pub fn set_resolution(&self, r: Rect) {
        self.screen.replace(r);
        self.heads.replace(vec![r]);
        self.outputs.replace(vec![output("eDP-1", r)]);
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: Call) -> Result<()> {
        self.calls.borrow_mut().push(call);
        Ok(())
    }
}

impl MockXConn for RecordingXConn {
    fn mock_screen_size(&self) -> Result<Rect> {
        Ok(*self.screen.borrow())
    }

    fn mock_screen_details(&self) -> Result<Vec<Rect>> {
        Ok(self.heads.borrow().clone())
    }

    fn mock_output_details(&self) -> Result<Vec<OutputInfo>> {
        Ok(self.outputs.borrow().clone())
    }

    fn mock_keycodes_for_keysym(&self, keysym: u32) -> Result<Vec<u8>> {
        Ok(vec![keysym as u8])
    }

    fn mock_grab(&self, key_codes: &[KeyCode]) -> Result<()> {
        self.record(Call::Grab(key_codes.len()))
    }

    fn mock_ungrab(&self) -> Result<()> {
        self.record(Call::Ungrab)
    }

    fn mock_map(&self, client: Xid) -> Result<()> {
        self.record(Call::Map(client))
    }

    fn mock_unmap(&self, client: Xid) -> Result<()> {
        self.record(Call::Unmap(client))
    }

    fn mock_kill(&self, client: Xid) -> Result<()> {
        self.record(Call::Kill(client))
    }

    fn mock_focus(&self, client: Xid) -> Result<()> {
        self.record(Call::Focus(client))
    }

    fn mock_set_client_config(&self, client: Xid, data: &[ClientConfig]) -> Result<()> {
        self.record(Call::Configure(client, data.to_vec()))
    }

    fn mock_warp_pointer(&self, _: Xid, x: i16, y: i16) -> Result<()> {
        self.record(Call::Warp(x, y))
    }

    fn mock_create_indicator(&self, _: Rect) -> Result<Xid> {
        Ok(Xid::from(INDICATOR_ID))
    }

    fn mock_draw_indicator(&self, id: Xid, label: &str) -> Result<()> {
        self.record(Call::Draw(id, label.to_string()))
    }

    fn mock_destroy_indicator(&self, id: Xid) -> Result<()> {
        self.record(Call::DestroyIndicator(id))
    }
}

pub fn output(name: &str, r: Rect) -> OutputInfo {
    OutputInfo {
        name: name.to_string(),
        r,
        primary: false,
    }
}

/// An initialised window manager with the recorded calls from start up cleared.
pub fn wm(x: RecordingXConn) -> WindowManager<RecordingXConn> {
    let mut wm = WindowManager::new(Config::default(), x).unwrap();
    wm.init().unwrap();
    wm.x().clear();

    wm
}

fn mask(mods: &[ModifierKey]) -> u16 {
    mods.iter().fold(0, |acc, &m| acc | u16::from(m))
}

/// The default binding for switching to the workspace with the given index.
pub fn switch_to(ix: usize) -> XEvent {
    XEvent::KeyPress(KeyCode {
        mask: mask(&[ModifierKey::Ctrl]),
        code: (XK_1 as usize + ix) as u8,
    })
}

/// The default binding for moving the focused client to the workspace with the given index.
pub fn move_to(ix: usize) -> XEvent {
    XEvent::KeyPress(KeyCode {
        mask: mask(&[ModifierKey::Ctrl, ModifierKey::Shift]),
        code: (XK_1 as usize + ix) as u8,
    })
}

pub fn kill_focused() -> XEvent {
    XEvent::KeyPress(KeyCode {
        mask: mask(&[ModifierKey::Ctrl, ModifierKey::Shift]),
        code: b'q',
    })
}

pub fn quit() -> XEvent {
    XEvent::KeyPress(KeyCode {
        mask: mask(&[ModifierKey::Ctrl, ModifierKey::Shift]),
        code: b'c',
    })
}

pub fn new_window(id: u32) -> XEvent {
    XEvent::MapRequest(Xid::from(id))
}
