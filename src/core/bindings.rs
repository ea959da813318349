//! Setting up and responding to the fixed set of key bindings
use crate::{
    core::Config,
    pure::Ws,
    x::XConn,
    Error, Result,
};
use std::collections::HashMap;
use strum::{EnumIter, IntoEnumIterator};
use tracing::{debug, trace};

/// Keysym for the digit `1`: the digits `1..=9` are contiguous from here.
pub const XK_1: u32 = 0x0031;
/// Keysym for `c`
pub const XK_C: u32 = 0x0063;
/// Keysym for `p`
pub const XK_P: u32 = 0x0070;
/// Keysym for `q`
pub const XK_Q: u32 = 0x0071;

/// Modifier mask for Caps Lock
pub const LOCK_MASK: u16 = 1 << 1;
/// Modifier mask for Num Lock on the vast majority of keyboard set ups
pub const NUM_LOCK_MASK: u16 = 1 << 4;

/// Known modifier keys for bindings
#[derive(Debug, EnumIter, PartialEq, Eq, Hash, Clone, Copy)]
pub enum ModifierKey {
    /// Control
    Ctrl,
    /// Alt
    Alt,
    /// Shift
    Shift,
    /// Meta / super / windows
    Meta,
}

impl ModifierKey {
    fn was_held(&self, mask: u16) -> bool {
        mask & u16::from(*self) > 0
    }
}

impl From<ModifierKey> for u16 {
    fn from(m: ModifierKey) -> u16 {
        match m {
            ModifierKey::Shift => 1 << 0,
            ModifierKey::Ctrl => 1 << 2,
            ModifierKey::Alt => 1 << 3,
            ModifierKey::Meta => 1 << 6,
        }
    }
}

/// A key press and held modifiers
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct KeyCode {
    /// The held modifier mask
    pub mask: u16,
    /// The key code that was held
    pub code: u8,
}

impl KeyCode {
    /// Create a new KeyCode from an existing one, removing the given modifier mask
    pub fn ignoring_modifier(&self, mask: u16) -> KeyCode {
        KeyCode {
            mask: self.mask & !mask,
            code: self.code,
        }
    }

    /// The modifier keys held as part of this key press.
    pub fn modifiers(&self) -> Vec<ModifierKey> {
        ModifierKey::iter().filter(|m| m.was_held(self.mask)).collect()
    }
}

/// Something the user can ask the window manager to do from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Display and focus the given workspace
    SwitchTo(Ws),
    /// Move the focused client to the given workspace and follow it
    MoveTo(Ws),
    /// Forcibly kill the focused client
    KillFocused,
    /// Exit the window manager
    Quit,
    /// Run the configured launcher
    Launch,
}

/// The resolved key bindings: a map from key press to [Command].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    inner: HashMap<KeyCode, Command>,
}

impl KeyBindings {
    /// Resolve the command table for the given [Config] against the current keyboard
    /// mapping.
    ///
    /// Every keysym in the table must be mapped to at least one key code.
    pub fn from_config<X: XConn>(config: &Config, x: &X) -> Result<Self> {
        let primary = u16::from(config.primary_modifier);
        let moving = primary | u16::from(config.secondary_modifier);
        let mut bindings = Self::default();

        for ws in Ws::iter() {
            let keysym = XK_1 + ws.index() as u32;
            bindings.bind(x, primary, keysym, Command::SwitchTo(ws))?;
            bindings.bind(x, moving, keysym, Command::MoveTo(ws))?;
        }

        bindings.bind(x, moving, XK_Q, Command::KillFocused)?;
        bindings.bind(x, moving, XK_C, Command::Quit)?;

        if config.launcher.is_some() {
            bindings.bind(x, primary, XK_P, Command::Launch)?;
        }

        debug!(n_bindings = bindings.inner.len(), "resolved key bindings");

        Ok(bindings)
    }

    fn bind<X: XConn>(&mut self, x: &X, mask: u16, keysym: u32, cmd: Command) -> Result<()> {
        let codes = x.keycodes_for_keysym(keysym)?;
        if codes.is_empty() {
            return Err(Error::UnknownKeysym { keysym });
        }

        for code in codes {
            trace!(mask, code, ?cmd, "binding key");
            self.inner.insert(KeyCode { mask, code }, cmd);
        }

        Ok(())
    }

    /// Add a single binding directly.
    pub fn insert(&mut self, k: KeyCode, cmd: Command) -> Option<Command> {
        self.inner.insert(k, cmd)
    }

    /// The command bound to the given key press.
    ///
    /// Lock modifiers held at the time of the key press are ignored.
    pub fn command_for(&self, k: KeyCode) -> Option<Command> {
        let k = k.ignoring_modifier(LOCK_MASK | NUM_LOCK_MASK);
        self.inner.get(&k).copied()
    }

    /// Every key combination that needs to be grabbed in order to receive our bindings.
    ///
    /// Each binding is grabbed with and without the lock modifiers held.
    pub fn grabs(&self) -> Vec<KeyCode> {
        let mut grabs: Vec<KeyCode> = self
            .inner
            .keys()
            .flat_map(|k| {
                [0, LOCK_MASK, NUM_LOCK_MASK, LOCK_MASK | NUM_LOCK_MASK].map(|m| KeyCode {
                    mask: k.mask | m,
                    code: k.code,
                })
            })
            .collect();
        grabs.sort_by_key(|k| (k.code, k.mask));

        grabs
    }

    /// The number of bound key combinations.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether or not there are any bindings.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{pure::client_set::tests::ws, x::MockXConn};
    use simple_test_case::test_case;

    const CTRL: u16 = 1 << 2;
    const SHIFT: u16 = 1 << 0;

    // Key codes are the low byte of the keysym
    struct IdentityKeymap;

    impl MockXConn for IdentityKeymap {
        fn mock_keycodes_for_keysym(&self, keysym: u32) -> Result<Vec<u8>> {
            Ok(vec![keysym as u8])
        }
    }

    struct MissingQ;

    impl MockXConn for MissingQ {
        fn mock_keycodes_for_keysym(&self, keysym: u32) -> Result<Vec<u8>> {
            if keysym == XK_Q {
                Ok(vec![])
            } else {
                Ok(vec![keysym as u8])
            }
        }
    }

    fn bindings() -> KeyBindings {
        KeyBindings::from_config(&Config::default(), &IdentityKeymap).unwrap()
    }

    #[test_case(CTRL, b'1', Some(Command::SwitchTo(ws(0))); "ctrl 1")]
    #[test_case(CTRL, b'9', Some(Command::SwitchTo(ws(8))); "ctrl 9")]
    #[test_case(CTRL | SHIFT, b'3', Some(Command::MoveTo(ws(2))); "ctrl shift 3")]
    #[test_case(CTRL | SHIFT, b'q', Some(Command::KillFocused); "ctrl shift q")]
    #[test_case(CTRL | SHIFT, b'c', Some(Command::Quit); "ctrl shift c")]
    #[test_case(CTRL, b'p', Some(Command::Launch); "ctrl p")]
    #[test_case(CTRL, b'q', None; "ctrl q is unbound")]
    #[test_case(SHIFT, b'1', None; "shift 1 is unbound")]
    #[test_case(CTRL | LOCK_MASK, b'2', Some(Command::SwitchTo(ws(1))); "caps lock ignored")]
    #[test_case(CTRL | SHIFT | NUM_LOCK_MASK, b'c', Some(Command::Quit); "num lock ignored")]
    #[test]
    fn command_for(mask: u16, code: u8, expected: Option<Command>) {
        assert_eq!(bindings().command_for(KeyCode { mask, code }), expected);
    }

    #[test]
    fn every_binding_is_grabbed_with_lock_variants() {
        let b = bindings();

        assert_eq!(b.len(), 9 * 2 + 3);
        assert_eq!(b.grabs().len(), b.len() * 4);
    }

    #[test]
    fn launcher_is_only_bound_when_configured() {
        let config = Config {
            launcher: None,
            ..Config::default()
        };
        let b = KeyBindings::from_config(&config, &IdentityKeymap).unwrap();

        assert_eq!(b.command_for(KeyCode { mask: CTRL, code: b'p' }), None);
    }

    #[test]
    fn unmapped_keysym_is_an_error() {
        let res = KeyBindings::from_config(&Config::default(), &MissingQ);

        assert!(matches!(res, Err(Error::UnknownKeysym { keysym: XK_Q })));
    }

    #[test]
    fn modifiers_are_decoded_from_the_mask() {
        let k = KeyCode {
            mask: CTRL | SHIFT | LOCK_MASK,
            code: 10,
        };

        assert_eq!(k.modifiers(), vec![ModifierKey::Ctrl, ModifierKey::Shift]);
    }
}
