//! Button edge sources
//!
//! Buttons only translate debounced edges into queued events; all
//! chord and long-press semantics live in the dispatch loop where both
//! buttons are visible together.

use velaria_cluster::{Event, EventKind, EventSink};

/// The two physical buttons of the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonId {
    Up,
    Down,
}

/// One debounced button posting its edges to the event queue
#[derive(Debug, Clone, Copy)]
pub struct Button {
    id: ButtonId,
}

impl Button {
    pub fn new(id: ButtonId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> ButtonId {
        self.id
    }

    pub fn press(&self, sink: &impl EventSink) {
        let kind = match self.id {
            ButtonId::Up => EventKind::UpPressed,
            ButtonId::Down => EventKind::DownPressed,
        };
        sink.post(Event::new(kind));
    }

    pub fn release(&self, sink: &impl EventSink) {
        let kind = match self.id {
            ButtonId::Up => EventKind::UpReleased,
            ButtonId::Down => EventKind::DownReleased,
        };
        sink.post(Event::new(kind));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;

    struct VecSink(RefCell<heapless::Vec<Event, 8>>);

    impl EventSink for VecSink {
        fn post(&self, event: Event) {
            self.0.borrow_mut().push(event).unwrap();
        }
    }

    #[test]
    fn test_edges_post_matching_events() {
        let sink = VecSink(RefCell::new(heapless::Vec::new()));
        let up = Button::new(ButtonId::Up);
        let down = Button::new(ButtonId::Down);

        up.press(&sink);
        up.release(&sink);
        down.press(&sink);
        down.release(&sink);

        let events = sink.0.borrow();
        assert_eq!(events[0].kind, EventKind::UpPressed);
        assert_eq!(events[1].kind, EventKind::UpReleased);
        assert_eq!(events[2].kind, EventKind::DownPressed);
        assert_eq!(events[3].kind, EventKind::DownReleased);
        assert!(events.iter().all(|event| event.endpoint.is_none()));
    }
}
