//! An [XConn] implementation backed by the x11rb crate.
use crate::{
    core::bindings::KeyCode,
    pure::{geometry::Rect, topology::OutputInfo},
    x::{ClientConfig, XConn, XEvent},
    Error, Result, Xid,
};
use std::{cell::RefCell, collections::HashMap};
use tracing::{debug, warn};
use x11rb::{
    connection::Connection,
    errors::ReplyError,
    protocol::{
        randr::{self, ConnectionExt as _},
        xinerama::{self, ConnectionExt as _},
        xproto::{
            ChangeWindowAttributesAux, ConfigureWindowAux, ConnectionExt as _, CreateGCAux,
            CreateWindowAux, EventMask, Font, Gcontext, Grab, GrabMode, InputFocus, ModMask,
            StackMode, Window, WindowClass,
        },
    },
    rust_connection::RustConnection,
    CURRENT_TIME, NONE,
};

mod conversions;

use conversions::convert_event;

// Baseline for the indicator label
const LABEL_X: i16 = 4;
const LABEL_Y: i16 = 12;

#[derive(Debug, Clone, Copy)]
struct DrawContext {
    gc: Gcontext,
    font: Font,
}

/// Handles communication with an X server via the x11rb crate.
#[derive(Debug)]
pub struct Conn<C: Connection> {
    conn: C,
    root: Xid,
    screen: usize,
    font_name: String,
    contexts: RefCell<HashMap<Xid, DrawContext>>,
}

impl Conn<RustConnection> {
    /// Construct an X11rbConnection backed by the [x11rb][crate::x11rb] backend using
    /// [x11rb::rust_connection::RustConnection].
    ///
    /// `font_name` is the core X font used for drawing the workspace indicator.
    pub fn new(font_name: impl Into<String>) -> Result<Self> {
        let (conn, screen) = RustConnection::connect(None)?;

        Ok(Self::new_for_connection(conn, screen, font_name))
    }
}

impl<C: Connection> Conn<C> {
    /// Construct a new [Conn] backed by the given x11rb [Connection].
    pub fn new_for_connection(conn: C, screen: usize, font_name: impl Into<String>) -> Self {
        let root = Xid(conn.setup().roots[screen].root);

        Self {
            conn,
            root,
            screen,
            font_name: font_name.into(),
            contexts: RefCell::new(HashMap::new()),
        }
    }

    /// Get a handle on the underlying connection.
    pub fn connection(&self) -> &C {
        &self.conn
    }

    fn root_window(&self) -> Window {
        *self.root
    }

    fn has_extension(&self, name: &'static str) -> bool {
        matches!(self.conn.extension_information(name), Ok(Some(_)))
    }
}

impl<C: Connection> XConn for Conn<C> {
    fn root(&self) -> Xid {
        self.root
    }

    fn init(&self) -> Result<()> {
        let mask = EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY;
        let aux = ChangeWindowAttributesAux::new().event_mask(mask);

        match self
            .conn
            .change_window_attributes(self.root_window(), &aux)?
            .check()
        {
            Ok(()) => (),
            Err(ReplyError::X11Error(e)) => {
                debug!(?e, "unable to set substructure redirect on the root window");
                return Err(Error::OtherWmRunning);
            }
            Err(e) => return Err(e.into()),
        }

        if self.has_extension(randr::X11_EXTENSION_NAME) {
            let mask = randr::NotifyMask::SCREEN_CHANGE
                | randr::NotifyMask::OUTPUT_CHANGE
                | randr::NotifyMask::CRTC_CHANGE;
            self.conn.randr_select_input(self.root_window(), mask)?;
        } else {
            warn!("RandR is not available: output changes will not be detected");
        }

        Ok(())
    }

    // The setup block is only a snapshot from connection time so we ask for the current
    // size of the root window instead.
    fn screen_size(&self) -> Result<Rect> {
        let geo = self.conn.get_geometry(self.root_window())?.reply()?;

        Ok(Rect::new(0, 0, geo.width as u32, geo.height as u32))
    }

    fn screen_details(&self) -> Result<Vec<Rect>> {
        if !self.has_extension(xinerama::X11_EXTENSION_NAME) {
            return Err(Error::MissingExtension(xinerama::X11_EXTENSION_NAME));
        }

        if self.conn.xinerama_is_active()?.reply()?.state == 0 {
            return Ok(vec![]);
        }

        let screens = self
            .conn
            .xinerama_query_screens()?
            .reply()?
            .screen_info
            .iter()
            .map(|s| {
                Rect::new(
                    s.x_org.max(0) as u32,
                    s.y_org.max(0) as u32,
                    s.width as u32,
                    s.height as u32,
                )
            })
            .collect();

        Ok(screens)
    }

    fn output_details(&self) -> Result<Vec<OutputInfo>> {
        if !self.has_extension(randr::X11_EXTENSION_NAME) {
            return Err(Error::MissingExtension(randr::X11_EXTENSION_NAME));
        }

        let root = self.root_window();
        let resources = self.conn.randr_get_screen_resources_current(root)?.reply()?;
        let primary = self.conn.randr_get_output_primary(root)?.reply()?.output;
        let ts = resources.config_timestamp;

        let mut outputs = Vec::with_capacity(resources.outputs.len());
        for &output in resources.outputs.iter() {
            let info = self.conn.randr_get_output_info(output, ts)?.reply()?;
            if info.connection != randr::Connection::CONNECTED || info.crtc == NONE {
                continue;
            }

            let crtc = self.conn.randr_get_crtc_info(info.crtc, ts)?.reply()?;
            if crtc.width == 0 || crtc.height == 0 {
                continue;
            }

            outputs.push(OutputInfo {
                name: String::from_utf8_lossy(&info.name).into_owned(),
                r: Rect::new(
                    crtc.x.max(0) as u32,
                    crtc.y.max(0) as u32,
                    crtc.width as u32,
                    crtc.height as u32,
                ),
                primary: output == primary,
            });
        }

        Ok(outputs)
    }

    fn keycodes_for_keysym(&self, keysym: u32) -> Result<Vec<u8>> {
        let setup = self.conn.setup();
        let (min, max) = (setup.min_keycode, setup.max_keycode);
        let mapping = self
            .conn
            .get_keyboard_mapping(min, max - min + 1)?
            .reply()?;
        let per = mapping.keysyms_per_keycode as usize;

        if per == 0 {
            return Ok(vec![]);
        }

        let codes = mapping
            .keysyms
            .chunks(per)
            .enumerate()
            .filter(|(_, syms)| syms.contains(&keysym))
            .map(|(i, _)| min + i as u8)
            .collect();

        Ok(codes)
    }

    fn grab(&self, key_codes: &[KeyCode]) -> Result<()> {
        let root = self.root_window();
        for k in key_codes {
            self.conn.grab_key(
                false,
                root,
                ModMask::from(k.mask),
                k.code,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
            )?;
        }

        Ok(())
    }

    fn ungrab(&self) -> Result<()> {
        self.conn
            .ungrab_key(Grab::ANY, self.root_window(), ModMask::ANY)?;

        Ok(())
    }

    fn next_event(&self) -> Result<XEvent> {
        loop {
            let event = self.conn.wait_for_event()?;
            if let Some(event) = convert_event(event)? {
                return Ok(event);
            }
        }
    }

    fn flush(&self) {
        if let Err(e) = self.conn.flush() {
            warn!(%e, "unable to flush the X connection");
        }
    }

    fn map(&self, client: Xid) -> Result<()> {
        self.conn.map_window(*client)?;

        Ok(())
    }

    fn unmap(&self, client: Xid) -> Result<()> {
        self.conn.unmap_window(*client)?;

        Ok(())
    }

    fn kill(&self, client: Xid) -> Result<()> {
        self.conn.kill_client(*client)?;

        Ok(())
    }

    fn focus(&self, client: Xid) -> Result<()> {
        self.conn
            .set_input_focus(InputFocus::POINTER_ROOT, *client, CURRENT_TIME)?;

        Ok(())
    }

    fn set_client_config(&self, client: Xid, data: &[ClientConfig]) -> Result<()> {
        let mut aux = ConfigureWindowAux::new();
        for conf in data {
            aux = match conf {
                ClientConfig::Position(r) => aux
                    .x(r.x as i32)
                    .y(r.y as i32)
                    .width(r.w)
                    .height(r.h),
                ClientConfig::StackTop => aux.stack_mode(StackMode::ABOVE),
            };
        }
        self.conn.configure_window(*client, &aux)?;

        Ok(())
    }

    fn warp_pointer(&self, id: Xid, x: i16, y: i16) -> Result<()> {
        self.conn.warp_pointer(NONE, *id, 0, 0, 0, 0, x, y)?;

        Ok(())
    }

    fn create_indicator(&self, r: Rect) -> Result<Xid> {
        let s = &self.conn.setup().roots[self.screen];
        let (black, white) = (s.black_pixel, s.white_pixel);

        let id = self.conn.generate_id()?;
        let aux = CreateWindowAux::new()
            .override_redirect(1u32)
            .background_pixel(black)
            .event_mask(EventMask::EXPOSURE);
        self.conn.create_window(
            x11rb::COPY_DEPTH_FROM_PARENT,
            id,
            self.root_window(),
            r.x as i16,
            r.y as i16,
            r.w as u16,
            r.h as u16,
            0,
            WindowClass::INPUT_OUTPUT,
            x11rb::COPY_FROM_PARENT,
            &aux,
        )?;

        let font = self.conn.generate_id()?;
        self.conn.open_font(font, self.font_name.as_bytes())?;

        let gc = self.conn.generate_id()?;
        let gc_aux = CreateGCAux::new()
            .foreground(white)
            .background(black)
            .font(font);
        self.conn.create_gc(gc, id, &gc_aux)?;

        self.conn.map_window(id)?;
        self.contexts
            .borrow_mut()
            .insert(Xid(id), DrawContext { gc, font });

        Ok(Xid(id))
    }

    fn draw_indicator(&self, id: Xid, label: &str) -> Result<()> {
        let ctx = match self.contexts.borrow().get(&id) {
            Some(&ctx) => ctx,
            None => return Err(Error::UnknownClient(id)),
        };

        self.conn.clear_area(false, *id, 0, 0, 0, 0)?;
        self.conn
            .image_text8(*id, ctx.gc, LABEL_X, LABEL_Y, label.as_bytes())?;

        Ok(())
    }

    fn destroy_indicator(&self, id: Xid) -> Result<()> {
        if let Some(ctx) = self.contexts.borrow_mut().remove(&id) {
            self.conn.free_gc(ctx.gc)?;
            self.conn.close_font(ctx.font)?;
        }
        self.conn.destroy_window(*id)?;

        Ok(())
    }
}
