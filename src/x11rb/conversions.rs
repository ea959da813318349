//! Conversions to gowm types from x11rb types
use crate::{core::bindings::KeyCode, x::XEvent, Error, Result, Xid};
use x11rb::protocol::Event;

pub(crate) fn convert_event(event: Event) -> Result<Option<XEvent>> {
    match event {
        Event::RandrNotify(_) | Event::RandrScreenChangeNotify(_) => {
            Ok(Some(XEvent::TopologyChanged))
        }

        Event::KeyPress(event) => Ok(Some(XEvent::KeyPress(KeyCode {
            mask: event.state.into(),
            code: event.detail,
        }))),

        Event::MapRequest(event) => Ok(Some(XEvent::MapRequest(Xid(event.window)))),

        Event::DestroyNotify(event) => Ok(Some(XEvent::Destroy(Xid(event.window)))),

        Event::UnmapNotify(event) => Ok(Some(XEvent::UnmapNotify(Xid(event.window)))),

        // Only the last in a series of expose events triggers a redraw
        Event::Expose(event) if event.count == 0 => Ok(Some(XEvent::Expose(Xid(event.window)))),

        Event::Error(err) => Err(Error::X11rbX11Error(err)),

        // NOTE: Ignoring other event types
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use x11rb::protocol::xproto::{
        DestroyNotifyEvent, ExposeEvent, KeyButMask, KeyPressEvent, MapRequestEvent,
        UnmapNotifyEvent,
    };

    #[test]
    fn key_press_keeps_the_full_modifier_mask() {
        let event = Event::KeyPress(KeyPressEvent {
            detail: 24,
            state: KeyButMask::CONTROL | KeyButMask::SHIFT | KeyButMask::MOD2,
            ..Default::default()
        });

        let converted = convert_event(event).unwrap();

        assert_eq!(
            converted,
            Some(XEvent::KeyPress(KeyCode {
                mask: 1 | 4 | 16,
                code: 24
            }))
        );
    }

    #[test]
    fn window_events_carry_the_window_id() {
        let map = Event::MapRequest(MapRequestEvent {
            window: 7,
            ..Default::default()
        });
        let destroy = Event::DestroyNotify(DestroyNotifyEvent {
            window: 8,
            ..Default::default()
        });
        let unmap = Event::UnmapNotify(UnmapNotifyEvent {
            window: 9,
            ..Default::default()
        });

        assert_eq!(convert_event(map).unwrap(), Some(XEvent::MapRequest(Xid(7))));
        assert_eq!(convert_event(destroy).unwrap(), Some(XEvent::Destroy(Xid(8))));
        assert_eq!(convert_event(unmap).unwrap(), Some(XEvent::UnmapNotify(Xid(9))));
    }

    #[test]
    fn only_final_expose_is_forwarded() {
        let expose = |count| {
            Event::Expose(ExposeEvent {
                window: 3,
                count,
                ..Default::default()
            })
        };

        assert_eq!(convert_event(expose(2)).unwrap(), None);
        assert_eq!(convert_event(expose(0)).unwrap(), Some(XEvent::Expose(Xid(3))));
    }
}
