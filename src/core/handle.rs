//! XEvent handlers for use in the main event loop
//!
//! Each handler updates [State] and reports what it did as an [Outcome]. Pushing a
//! [Outcome::Relayout] out to the X server is left to the caller.
use crate::{
    core::{
        bindings::{Command, KeyBindings, KeyCode},
        topology, Outcome, State,
    },
    pure::{Displaced, MainOutputRules, Move, Ws},
    util::Spawn,
    x::{XConn, XConnExt},
    Result, Xid,
};
use tracing::{debug, error, info, trace, warn};

pub(crate) fn topology_changed<X: XConn>(
    rules: &MainOutputRules,
    state: &mut State,
    x: &X,
) -> Result<Outcome> {
    let changes = topology::sync(x, &mut state.client_set, rules);

    if changes.is_empty() {
        Ok(Outcome::Unchanged)
    } else {
        Ok(Outcome::Relayout { warp_to: None })
    }
}

pub(crate) fn keypress<X: XConn>(
    key: KeyCode,
    bindings: &KeyBindings,
    spawner: &dyn Spawn,
    state: &mut State,
    x: &X,
) -> Result<Outcome> {
    let cmd = match bindings.command_for(key) {
        Some(cmd) => cmd,
        None => {
            trace!(code = key.code, modifiers = ?key.modifiers(), "no binding for key");
            return Ok(Outcome::Unchanged);
        }
    };

    debug!(?cmd, "running command");

    match cmd {
        Command::SwitchTo(ws) => Ok(switch_workspace(ws, state)),
        Command::MoveTo(ws) => Ok(move_window(ws, state)),
        Command::KillFocused => kill_focused(state, x),

        Command::Quit => {
            info!("exit requested");
            state.running = false;
            Ok(Outcome::StateChanged)
        }

        Command::Launch => {
            if let Some(cmd) = state.config.launcher.as_deref() {
                if let Err(e) = spawner.spawn(cmd) {
                    error!(%e, %cmd, "unable to run launcher");
                }
            }
            Ok(Outcome::Unchanged)
        }
    }
}

fn switch_workspace(ws: Ws, state: &mut State) -> Outcome {
    if ws == state.client_set.focused() {
        return Outcome::Unchanged;
    }

    let warp_to = state.client_set.switch_workspace(ws);

    Outcome::Relayout { warp_to }
}

fn move_window(ws: Ws, state: &mut State) -> Outcome {
    match state.client_set.move_window_to_workspace(ws) {
        Move::Moved { warp_to } => Outcome::Relayout { warp_to },
        Move::Unchanged => Outcome::Unchanged,
    }
}

fn kill_focused<X: XConn>(state: &mut State, x: &X) -> Result<Outcome> {
    let client = match state.client_set.remove_focused() {
        Some(client) => client,
        None => return Ok(Outcome::Unchanged),
    };

    info!(%client, "killing focused client");
    state.vis.forget(client);
    x.kill(client)?;

    Ok(Outcome::Relayout { warp_to: None })
}

pub(crate) fn map_request<X: XConn>(client: Xid, state: &mut State, x: &X) -> Result<Outcome> {
    if let Some(ws) = state.client_set.workspace_for_client(client) {
        debug!(%client, %ws, "map request for known client: switching to its workspace");
        let warp_to = state.client_set.switch_workspace(ws);

        return Ok(Outcome::Relayout { warp_to });
    }

    state.released.retain(|&c| c != client);
    let placement = state.client_set.route_new_window(client);
    info!(%client, ws = %placement.ws, "managing new client");

    match placement.displaced {
        Some(Displaced::Moved(prev, ws)) => debug!(client = %prev, %ws, "displaced client"),
        Some(Displaced::Released(prev)) => {
            warn!(client = %prev, "no free workspace: unmapping and releasing client");
            x.hide(prev, &mut state.vis)?;
            state.released.push(prev);
        }
        None => (),
    }

    Ok(Outcome::Relayout { warp_to: None })
}

pub(crate) fn destroy(client: Xid, state: &mut State) -> Outcome {
    let removed = state.client_set.remove_client(client);
    state.vis.forget(client);
    state.released.retain(|&c| c != client);

    match removed {
        Some(ws) => {
            debug!(%client, %ws, "client destroyed");
            Outcome::StateChanged
        }
        None => Outcome::Unchanged,
    }
}

// Expected unmap events are tracked in pending_unmap. We ignore expected unmaps.
pub(crate) fn unmap_notify(client: Xid, state: &mut State) -> Outcome {
    let expected = state.vis.pending_unmaps(client);

    match expected {
        0 => {
            state.vis.mapped.remove(&client);
            match state.client_set.remove_client(client) {
                Some(ws) => {
                    debug!(%client, %ws, "client unmapped itself");
                    Outcome::StateChanged
                }
                None => Outcome::Unchanged,
            }
        }

        1 => {
            state.vis.pending_unmap.remove(&client);
            Outcome::Unchanged
        }

        _ => {
            state
                .vis
                .pending_unmap
                .entry(client)
                .and_modify(|count| *count -= 1);
            Outcome::Unchanged
        }
    }
}

pub(crate) fn expose<X: XConn>(id: Xid, state: &mut State, x: &X) -> Result<Outcome> {
    if let Some(indicator) = state.indicator.filter(|i| i.id() == id) {
        indicator.redraw(x, &state.client_set)?;
    }

    Ok(Outcome::Unchanged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{Config, Visibility},
        pure::client_set::tests::{dual, single, with_clients, ws},
        pure::{ClientSet, Monitor},
        x::{ClientConfig, MockXConn},
        Error,
    };
    use simple_test_case::test_case;
    use std::cell::RefCell;

    #[derive(Debug, Default)]
    struct Recorder {
        calls: RefCell<Vec<String>>,
    }

    impl MockXConn for Recorder {
        fn mock_unmap(&self, client: Xid) -> Result<()> {
            self.calls.borrow_mut().push(format!("unmap {client}"));
            Ok(())
        }

        fn mock_kill(&self, client: Xid) -> Result<()> {
            self.calls.borrow_mut().push(format!("kill {client}"));
            Ok(())
        }

        fn mock_create_indicator(&self, _: crate::pure::Rect) -> Result<Xid> {
            Ok(Xid(500))
        }

        fn mock_draw_indicator(&self, id: Xid, label: &str) -> Result<()> {
            self.calls.borrow_mut().push(format!("draw {id} {label}"));
            Ok(())
        }

        fn mock_set_client_config(&self, _: Xid, _: &[ClientConfig]) -> Result<()> {
            Ok(())
        }
    }

    #[derive(Debug)]
    struct NoSpawn;

    impl Spawn for NoSpawn {
        fn spawn(&self, cmd: &str) -> Result<()> {
            Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                cmd.to_string(),
            )))
        }
    }

    fn state(cs: ClientSet) -> State {
        State {
            config: Config::default(),
            client_set: cs,
            vis: Visibility::default(),
            indicator: None,
            released: vec![],
            running: true,
        }
    }

    #[test]
    fn switching_to_focused_workspace_is_a_no_op() {
        let mut s = state(single());

        assert_eq!(switch_workspace(ws(0), &mut s), Outcome::Unchanged);
    }

    #[test_case(single(), 8, None; "single monitor never warps")]
    #[test_case(dual(), 3, Some(Monitor::Main); "external to main warps")]
    #[test_case(dual(), 7, None; "within external monitor")]
    #[test]
    fn switching_reports_monitor_jumps(cs: ClientSet, ix: usize, warp_to: Option<Monitor>) {
        let mut s = state(cs);

        assert_eq!(switch_workspace(ws(ix), &mut s), Outcome::Relayout { warp_to });
        assert_eq!(s.client_set.focused(), ws(ix));
    }

    #[test]
    fn moving_from_an_empty_workspace_is_a_no_op() {
        let mut s = state(single());

        assert_eq!(move_window(ws(3), &mut s), Outcome::Unchanged);
    }

    #[test]
    fn kill_focused_removes_and_kills() {
        let x = Recorder::default();
        let mut s = state(with_clients(single(), &[(0, 42)]));
        s.vis.mapped.insert(Xid(42));

        let outcome = kill_focused(&mut s, &x).unwrap();

        assert_eq!(outcome, Outcome::Relayout { warp_to: None });
        assert_eq!(s.client_set.client(ws(0)), None);
        assert!(!s.vis.is_mapped(Xid(42)));
        assert_eq!(*x.calls.borrow(), vec!["kill 42".to_string()]);
    }

    #[test]
    fn kill_focused_on_empty_workspace_is_a_no_op() {
        let x = Recorder::default();
        let mut s = state(single());

        assert_eq!(kill_focused(&mut s, &x).unwrap(), Outcome::Unchanged);
        assert!(x.calls.borrow().is_empty());
    }

    #[test]
    fn quit_stops_the_event_loop() {
        let x = Recorder::default();
        let mut bindings = KeyBindings::default();
        let k = KeyCode { mask: 5, code: 54 };
        bindings.insert(k, Command::Quit);
        let mut s = state(single());

        let outcome = keypress(k, &bindings, &NoSpawn, &mut s, &x).unwrap();

        assert_eq!(outcome, Outcome::StateChanged);
        assert!(!s.running);
    }

    #[test]
    fn launcher_failures_are_not_propagated() {
        let x = Recorder::default();
        let mut bindings = KeyBindings::default();
        let k = KeyCode { mask: 4, code: 33 };
        bindings.insert(k, Command::Launch);
        let mut s = state(single());

        let outcome = keypress(k, &bindings, &NoSpawn, &mut s, &x).unwrap();

        assert_eq!(outcome, Outcome::Unchanged);
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let x = Recorder::default();
        let mut s = state(single());
        let k = KeyCode { mask: 4, code: 99 };

        let outcome = keypress(k, &KeyBindings::default(), &NoSpawn, &mut s, &x).unwrap();

        assert_eq!(outcome, Outcome::Unchanged);
    }

    #[test]
    fn released_clients_are_hidden() {
        let x = Recorder::default();
        let clients: Vec<(usize, u32)> = (0..9).map(|i| (i, 10 + i as u32)).collect();
        let mut s = state(with_clients(single(), &clients));
        s.vis.mapped.insert(Xid(10));

        let outcome = map_request(Xid(99), &mut s, &x).unwrap();

        assert_eq!(outcome, Outcome::Relayout { warp_to: None });
        assert_eq!(s.client_set.client(ws(0)), Some(Xid(99)));
        assert!(!s.client_set.contains(Xid(10)));
        assert_eq!(s.vis.pending_unmaps(Xid(10)), 1);
        assert_eq!(s.released, vec![Xid(10)]);
        assert_eq!(*x.calls.borrow(), vec!["unmap 10".to_string()]);
    }

    #[test]
    fn destroying_a_released_client_forgets_it() {
        let mut s = state(single());
        s.released.push(Xid(10));

        assert_eq!(destroy(Xid(10), &mut s), Outcome::Unchanged);
        assert!(s.released.is_empty());
    }

    #[test]
    fn map_request_for_known_client_switches_to_it() {
        let x = Recorder::default();
        let mut s = state(with_clients(single(), &[(4, 7)]));

        let outcome = map_request(Xid(7), &mut s, &x).unwrap();

        assert_eq!(outcome, Outcome::Relayout { warp_to: None });
        assert_eq!(s.client_set.focused(), ws(4));
        assert_eq!(s.client_set.client(ws(0)), None);
    }

    #[test_case(0, Outcome::StateChanged, None; "unexpected")]
    #[test_case(1, Outcome::Unchanged, Some(7); "expected once")]
    #[test_case(2, Outcome::Unchanged, Some(7); "expected twice")]
    #[test]
    fn unmap_notify_respects_pending_unmaps(pending: usize, outcome: Outcome, holder: Option<u32>) {
        let mut s = state(with_clients(single(), &[(2, 7)]));
        if pending > 0 {
            s.vis.pending_unmap.insert(Xid(7), pending);
        }

        assert_eq!(unmap_notify(Xid(7), &mut s), outcome);
        assert_eq!(s.client_set.client(ws(2)), holder.map(Xid));
        assert_eq!(s.vis.pending_unmaps(Xid(7)), pending.saturating_sub(1));
    }

    #[test]
    fn destroy_clears_slot_and_bookkeeping() {
        let mut s = state(with_clients(single(), &[(5, 3)]));
        s.vis.mapped.insert(Xid(3));
        s.vis.pending_unmap.insert(Xid(3), 2);

        assert_eq!(destroy(Xid(3), &mut s), Outcome::StateChanged);
        assert_eq!(s.client_set.client(ws(5)), None);
        assert_eq!(s.vis.pending_unmaps(Xid(3)), 0);
        assert!(!s.vis.is_mapped(Xid(3)));
    }

    #[test]
    fn destroy_of_unknown_client_is_a_no_op() {
        let mut s = state(single());

        assert_eq!(destroy(Xid(3), &mut s), Outcome::Unchanged);
    }

    #[test]
    fn expose_only_redraws_the_indicator() {
        let x = Recorder::default();
        let mut s = state(single());
        s.indicator = Some(crate::core::indicator::Indicator::new(&x, &s.client_set).unwrap());
        x.calls.borrow_mut().clear();

        expose(Xid(1234), &mut s, &x).unwrap();
        assert!(x.calls.borrow().is_empty());

        let id = s.indicator.unwrap().id();
        expose(id, &mut s, &x).unwrap();
        assert_eq!(*x.calls.borrow(), vec![format!("draw {id} 1")]);
    }
}
