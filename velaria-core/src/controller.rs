//! Event dispatch and the chorded-button automaton
//!
//! The controller is the single consumer of the event queue. Every
//! handler runs to completion without blocking, so no two events are
//! ever processed concurrently and the automaton flags need no
//! synchronization.

use velaria_cluster::{
    server, Attribute, AttributeStore, EndpointId, Event, EventKind, EventSink,
};

use crate::config::MAX_COVERS;
use crate::cover::Cover;
use crate::timer::Timer;

/// Which axis the buttons drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonMode {
    #[default]
    Lift,
    Tilt,
}

/// Actions the dispatcher requests but does not perform itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SideEffect {
    /// Wipe persisted state and restart; confirmed by a double long
    /// press on Up
    FactoryReset,
}

/// Connectivity snapshot polled from the network stack each loop tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StateFlags {
    pub provisioned: bool,
    pub ble_connections: bool,
    pub service_reachable: bool,
}

/// Owner of the covers and the button automaton state
pub struct Controller<T: Timer> {
    covers: heapless::Vec<Cover<T>, MAX_COVERS>,
    long_press: T,
    mode: ButtonMode,
    current_cover: usize,
    up_pressed: bool,
    down_pressed: bool,
    up_suppressed: bool,
    down_suppressed: bool,
    reset_warning: bool,
    state: StateFlags,
}

impl<T: Timer> Controller<T> {
    pub fn new(long_press: T) -> Self {
        Self {
            covers: heapless::Vec::new(),
            long_press,
            mode: ButtonMode::default(),
            current_cover: 0,
            up_pressed: false,
            down_pressed: false,
            up_suppressed: false,
            down_suppressed: false,
            reset_warning: false,
            state: StateFlags::default(),
        }
    }

    /// Register a covering; fails when all slots are taken
    pub fn add_cover(&mut self, cover: Cover<T>) -> Result<(), Cover<T>> {
        self.covers.push(cover)
    }

    pub fn button_mode(&self) -> ButtonMode {
        self.mode
    }

    pub fn current_endpoint(&self) -> Option<EndpointId> {
        self.covers.get(self.current_cover).map(Cover::endpoint)
    }

    /// Stop every timer; called at shutdown
    pub fn finish(&mut self) {
        self.long_press.stop();
        for cover in &mut self.covers {
            cover.finish();
        }
    }

    fn cover_mut(&mut self, endpoint: Option<EndpointId>) -> Option<&mut Cover<T>> {
        let endpoint = endpoint?;
        self.covers
            .iter_mut()
            .find(|cover| cover.endpoint() == endpoint)
    }

    /// Drain one event from the queue.
    ///
    /// Returns a [`SideEffect`] when the event asks for something the
    /// control layer cannot do itself. Store failures are logged and
    /// the event is dropped; malformed input never panics.
    pub fn dispatch(
        &mut self,
        event: Event,
        store: &mut impl AttributeStore,
        sink: &impl EventSink,
    ) -> Option<SideEffect> {
        #[cfg(feature = "defmt")]
        defmt::debug!("dispatch {}", event);

        match event.kind {
            EventKind::Reset => return Some(SideEffect::FactoryReset),

            EventKind::ResetWarning => {
                self.reset_warning = true;
                self.long_press.start();
            }

            EventKind::ResetCanceled => self.reset_warning = false,

            EventKind::UpPressed => {
                self.up_pressed = true;
                self.long_press.start();
            }

            EventKind::UpReleased => {
                self.up_pressed = false;
                self.long_press.stop();
                if self.reset_warning {
                    sink.post(Event::new(EventKind::ResetCanceled));
                }
                if self.up_suppressed {
                    // Already consumed by a chord or long press
                    self.up_suppressed = false;
                } else if self.down_pressed {
                    self.toggle_mode(sink);
                } else if let Some(cover) = self.covers.get_mut(self.current_cover) {
                    match self.mode {
                        ButtonMode::Tilt => cover.tilt.step_toward_up_or_open(sink),
                        ButtonMode::Lift => cover.lift.step_toward_up_or_open(sink),
                    }
                }
            }

            EventKind::DownPressed => {
                self.down_pressed = true;
                self.long_press.start();
            }

            EventKind::DownReleased => {
                self.down_pressed = false;
                self.long_press.stop();
                if self.reset_warning {
                    sink.post(Event::new(EventKind::ResetCanceled));
                }
                if self.down_suppressed {
                    self.down_suppressed = false;
                } else if self.up_pressed {
                    self.toggle_mode(sink);
                } else if let Some(cover) = self.covers.get_mut(self.current_cover) {
                    match self.mode {
                        ButtonMode::Tilt => cover.tilt.step_toward_down_or_close(sink),
                        ButtonMode::Lift => cover.lift.step_toward_down_or_close(sink),
                    }
                }
            }

            EventKind::LongPressTimeout => self.handle_long_press(store, sink),

            EventKind::LiftTargetPositionChanged => {
                if let Some(cover) = self.cover_mut(event.endpoint) {
                    let endpoint = cover.endpoint();
                    match store
                        .get(endpoint, Attribute::TargetPositionLiftPercent100ths)
                        .and_then(|target| server::percent100ths_to_lift(store, endpoint, target))
                    {
                        Ok(raw) => cover.lift.go_to_value(raw, sink),
                        Err(_error) => {
                            #[cfg(feature = "defmt")]
                            defmt::warn!("Ep[{=u16}] lift target unreadable: {}", endpoint, _error);
                        }
                    }
                }
            }

            EventKind::TiltTargetPositionChanged => {
                if let Some(cover) = self.cover_mut(event.endpoint) {
                    let endpoint = cover.endpoint();
                    match store
                        .get(endpoint, Attribute::TargetPositionTiltPercent100ths)
                        .and_then(|target| server::percent100ths_to_tilt(store, endpoint, target))
                    {
                        Ok(raw) => cover.tilt.go_to_value(raw, sink),
                        Err(_error) => {
                            #[cfg(feature = "defmt")]
                            defmt::warn!("Ep[{=u16}] tilt target unreadable: {}", endpoint, _error);
                        }
                    }
                }
            }

            EventKind::StopMotion => {
                if let Some(cover) = self.cover_mut(event.endpoint) {
                    cover.stop_motion(sink);
                }
            }

            EventKind::LiftTimerExpired => {
                if let Some(cover) = self.cover_mut(event.endpoint) {
                    cover.lift.update_position(sink);
                }
            }

            EventKind::TiltTimerExpired => {
                if let Some(cover) = self.cover_mut(event.endpoint) {
                    cover.tilt.update_position(sink);
                }
            }

            EventKind::LiftUpdate => {
                if let Some(cover) = self.cover_mut(event.endpoint) {
                    if let Err(_error) = cover.publish_lift_state(store) {
                        #[cfg(feature = "defmt")]
                        defmt::warn!("lift state publish failed: {}", _error);
                    }
                }
            }

            EventKind::TiltUpdate => {
                if let Some(cover) = self.cover_mut(event.endpoint) {
                    if let Err(_error) = cover.publish_tilt_state(store) {
                        #[cfg(feature = "defmt")]
                        defmt::warn!("tilt state publish failed: {}", _error);
                    }
                }
            }

            EventKind::OperationalStatusChanged => {
                if let Some(cover) = self.cover_mut(event.endpoint) {
                    let _endpoint = cover.endpoint();
                    #[cfg(feature = "defmt")]
                    match server::operational_status_get(store, _endpoint) {
                        Ok(status) => defmt::info!(
                            "Ep[{=u16}] OperationalStatus {=u8:#04x}",
                            _endpoint,
                            status.encode()
                        ),
                        Err(error) => defmt::warn!("Ep[{=u16}] {}", _endpoint, error),
                    }
                }
            }

            // Informational only; state lives in the attribute store
            EventKind::CycleActuatorMode
            | EventKind::CycleCover
            | EventKind::TypeChanged
            | EventKind::ConfigStatusChanged
            | EventKind::EndProductTypeChanged
            | EventKind::ModeChanged
            | EventKind::SafetyStatusChanged
            | EventKind::LiftCurrentPositionChanged
            | EventKind::TiltCurrentPositionChanged
            | EventKind::ProvisionedChanged
            | EventKind::ConnectivityChanged
            | EventKind::BleConnectionsChanged => {}
        }

        None
    }

    /// Chord detected: both releases are consumed, mode flips, no
    /// motion
    fn toggle_mode(&mut self, sink: &impl EventSink) {
        self.mode = match self.mode {
            ButtonMode::Lift => ButtonMode::Tilt,
            ButtonMode::Tilt => ButtonMode::Lift,
        };
        self.up_suppressed = true;
        self.down_suppressed = true;
        sink.post(Event::new(EventKind::CycleActuatorMode));
    }

    /// The shared long-press timer expired with at least one button
    /// still held
    fn handle_long_press(&mut self, store: &mut impl AttributeStore, sink: &impl EventSink) {
        if self.up_pressed && self.down_pressed {
            // Both held: select the next covering
            self.up_suppressed = true;
            self.down_suppressed = true;
            self.current_cover = if self.current_cover + 1 < self.covers.len() {
                self.current_cover + 1
            } else {
                0
            };
            sink.post(Event::new(EventKind::CycleCover));
        } else if self.up_pressed {
            self.up_suppressed = true;
            if self.reset_warning {
                // Second long press within the warning window
                sink.post(Event::new(EventKind::Reset));
            } else {
                sink.post(Event::new(EventKind::ResetWarning));
            }
        } else if self.down_pressed {
            self.down_suppressed = true;
            if let Some(cover) = self.covers.get_mut(self.current_cover) {
                match cover.cycle_type(store) {
                    Ok(covering_type) => {
                        self.mode = if covering_type.supports_tilt() {
                            ButtonMode::Tilt
                        } else {
                            ButtonMode::Lift
                        };
                    }
                    Err(_error) => {
                        #[cfg(feature = "defmt")]
                        defmt::warn!("type cycle failed: {}", _error);
                    }
                }
            }
        }
    }

    /// Diff a fresh connectivity snapshot against the previous one and
    /// post an event per changed flag
    pub fn update_connectivity(&mut self, snapshot: StateFlags, sink: &impl EventSink) {
        if snapshot.provisioned != self.state.provisioned {
            sink.post(Event::new(EventKind::ProvisionedChanged));
        }
        if snapshot.service_reachable != self.state.service_reachable {
            sink.post(Event::new(EventKind::ConnectivityChanged));
        }
        if snapshot.ble_connections != self.state.ble_connections {
            sink.post(Event::new(EventKind::BleConnectionsChanged));
        }
        self.state = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoverConfig;
    use crate::timer::ManualTimer;
    use core::cell::RefCell;
    use velaria_cluster::store::RamAttributeStore;
    use velaria_cluster::{CoveringType, Features, OperationalState};

    const EP1: EndpointId = 1;
    const EP2: EndpointId = 2;

    struct QueueSink(RefCell<heapless::Deque<Event, 32>>);

    impl QueueSink {
        fn new() -> Self {
            Self(RefCell::new(heapless::Deque::new()))
        }

        fn pop(&self) -> Option<Event> {
            self.0.borrow_mut().pop_front()
        }
    }

    impl EventSink for QueueSink {
        fn post(&self, event: Event) {
            self.0.borrow_mut().push_back(event).unwrap();
        }
    }

    struct Fixture {
        controller: Controller<ManualTimer>,
        store: RamAttributeStore<2>,
        sink: QueueSink,
    }

    impl Fixture {
        fn new() -> Self {
            let mut store = RamAttributeStore::new([EP1, EP2]);
            let features = Features::LIFT
                .union(Features::TILT)
                .union(Features::POSITION_AWARE)
                .union(Features::ABSOLUTE);
            for endpoint in [EP1, EP2] {
                store
                    .set(endpoint, Attribute::FeatureMap, features.bits())
                    .unwrap();
            }

            let mut controller = Controller::new(ManualTimer::new());
            for endpoint in [EP1, EP2] {
                let mut cover = Cover::new(
                    endpoint,
                    &CoverConfig::default(),
                    ManualTimer::new(),
                    ManualTimer::new(),
                );
                cover.init(&mut store).unwrap();
                assert!(controller.add_cover(cover).is_ok());
            }

            Self {
                controller,
                store,
                sink: QueueSink::new(),
            }
        }

        fn dispatch(&mut self, event: Event) -> Option<SideEffect> {
            self.controller.dispatch(event, &mut self.store, &self.sink)
        }

        /// Dispatch queued events until the queue drains
        fn pump(&mut self) -> Option<SideEffect> {
            let mut effect = None;
            while let Some(event) = self.sink.pop() {
                effect = effect.or(self.dispatch(event));
            }
            effect
        }

        /// Fire pending actuator timers as the firmware timer tasks
        /// would, feeding expiries back through the queue
        fn run_motion(&mut self, endpoint: EndpointId) {
            loop {
                self.pump();
                let index = usize::from(endpoint) - 1;
                let cover = &self.controller.covers[index];
                let (lift_moving, tilt_moving) = (cover.lift.is_moving(), cover.tilt.is_moving());
                if lift_moving {
                    self.dispatch(Event::for_endpoint(EventKind::LiftTimerExpired, endpoint));
                } else if tilt_moving {
                    self.dispatch(Event::for_endpoint(EventKind::TiltTimerExpired, endpoint));
                } else {
                    break;
                }
            }
            self.pump();
        }

        fn lift_position(&self, endpoint: EndpointId) -> u16 {
            let index = usize::from(endpoint) - 1;
            self.controller.covers[index].lift.current_position()
        }

        fn tilt_position(&self, endpoint: EndpointId) -> u16 {
            let index = usize::from(endpoint) - 1;
            self.controller.covers[index].tilt.current_position()
        }
    }

    #[test]
    fn test_plain_tap_steps_selected_axis() {
        let mut fixture = Fixture::new();

        fixture.dispatch(Event::new(EventKind::UpPressed));
        assert!(fixture.controller.long_press.is_active());
        fixture.dispatch(Event::new(EventKind::UpReleased));
        assert!(!fixture.controller.long_press.is_active());

        // Default mode drives lift; one step of 50 toward open
        assert_eq!(fixture.lift_position(EP1), 950);
        assert_eq!(fixture.tilt_position(EP1), 100);

        fixture.dispatch(Event::new(EventKind::DownPressed));
        fixture.dispatch(Event::new(EventKind::DownReleased));
        assert_eq!(fixture.lift_position(EP1), 1000);
    }

    #[test]
    fn test_chord_toggles_mode_without_motion() {
        let mut fixture = Fixture::new();

        fixture.dispatch(Event::new(EventKind::UpPressed));
        fixture.dispatch(Event::new(EventKind::DownPressed));
        fixture.dispatch(Event::new(EventKind::UpReleased));

        assert_eq!(fixture.controller.button_mode(), ButtonMode::Tilt);
        assert_eq!(fixture.sink.pop().unwrap().kind, EventKind::CycleActuatorMode);

        // The second release was consumed by the chord
        fixture.dispatch(Event::new(EventKind::DownReleased));
        assert_eq!(fixture.lift_position(EP1), 1000);
        assert_eq!(fixture.tilt_position(EP1), 100);
        assert!(fixture.sink.pop().is_none());

        // The chord also suppressed Up, whose release had already
        // happened; the first Up tap after it only clears the flag
        fixture.dispatch(Event::new(EventKind::UpPressed));
        fixture.dispatch(Event::new(EventKind::UpReleased));
        assert_eq!(fixture.tilt_position(EP1), 100);

        // The tap after that drives the tilt axis
        fixture.dispatch(Event::new(EventKind::UpPressed));
        fixture.dispatch(Event::new(EventKind::UpReleased));
        assert_eq!(fixture.tilt_position(EP1), 95);
        assert_eq!(fixture.lift_position(EP1), 1000);

        // Down's suppression was consumed by its own release, so a
        // Down tap moves immediately
        fixture.dispatch(Event::new(EventKind::DownPressed));
        fixture.dispatch(Event::new(EventKind::DownReleased));
        assert_eq!(fixture.tilt_position(EP1), 100);
    }

    #[test]
    fn test_long_press_both_cycles_cover() {
        let mut fixture = Fixture::new();
        assert_eq!(fixture.controller.current_endpoint(), Some(EP1));

        fixture.dispatch(Event::new(EventKind::UpPressed));
        fixture.dispatch(Event::new(EventKind::DownPressed));
        fixture.dispatch(Event::new(EventKind::LongPressTimeout));

        assert_eq!(fixture.controller.current_endpoint(), Some(EP2));
        assert_eq!(fixture.sink.pop().unwrap().kind, EventKind::CycleCover);

        // Both releases suppressed, no motion on either cover
        fixture.dispatch(Event::new(EventKind::UpReleased));
        fixture.dispatch(Event::new(EventKind::DownReleased));
        assert_eq!(fixture.lift_position(EP1), 1000);
        assert_eq!(fixture.lift_position(EP2), 1000);

        // Wraparound back to the first cover
        fixture.dispatch(Event::new(EventKind::UpPressed));
        fixture.dispatch(Event::new(EventKind::DownPressed));
        fixture.dispatch(Event::new(EventKind::LongPressTimeout));
        assert_eq!(fixture.controller.current_endpoint(), Some(EP1));
    }

    #[test]
    fn test_double_long_press_up_factory_resets() {
        let mut fixture = Fixture::new();

        // First long press arms the warning
        fixture.dispatch(Event::new(EventKind::UpPressed));
        fixture.dispatch(Event::new(EventKind::LongPressTimeout));
        assert_eq!(fixture.pump(), None);
        assert!(fixture.controller.reset_warning);
        // Arming restarted the shared timer
        assert!(fixture.controller.long_press.is_active());

        // Second long press without release confirms
        fixture.dispatch(Event::new(EventKind::LongPressTimeout));
        assert_eq!(fixture.pump(), Some(SideEffect::FactoryReset));
    }

    #[test]
    fn test_release_cancels_reset_warning() {
        let mut fixture = Fixture::new();

        fixture.dispatch(Event::new(EventKind::UpPressed));
        fixture.dispatch(Event::new(EventKind::LongPressTimeout));
        fixture.pump();
        assert!(fixture.controller.reset_warning);

        fixture.dispatch(Event::new(EventKind::UpReleased));
        fixture.pump();
        assert!(!fixture.controller.reset_warning);

        // The suppressed release produced no motion
        assert_eq!(fixture.lift_position(EP1), 1000);
    }

    #[test]
    fn test_long_press_down_cycles_type_and_mode() {
        let mut fixture = Fixture::new();

        // Init leaves the type at TiltBlindLiftAndTilt; cycling moves
        // to Rollershade, a lift-only type
        fixture.dispatch(Event::new(EventKind::DownPressed));
        fixture.dispatch(Event::new(EventKind::LongPressTimeout));
        assert_eq!(
            server::type_get(&fixture.store, EP1),
            Ok(CoveringType::Rollershade)
        );
        assert_eq!(fixture.controller.button_mode(), ButtonMode::Lift);
        fixture.dispatch(Event::new(EventKind::DownReleased));

        // Two more cycles land back on the tilt-capable type
        for _ in 0..2 {
            fixture.dispatch(Event::new(EventKind::DownPressed));
            fixture.dispatch(Event::new(EventKind::LongPressTimeout));
            fixture.dispatch(Event::new(EventKind::DownReleased));
        }
        assert_eq!(
            server::type_get(&fixture.store, EP1),
            Ok(CoveringType::TiltBlindLiftAndTilt)
        );
        assert_eq!(fixture.controller.button_mode(), ButtonMode::Tilt);
    }

    #[test]
    fn test_target_change_drives_motion_to_completion() {
        let mut fixture = Fixture::new();

        server::lift_target_position_set(&mut fixture.store, EP1, 5000).unwrap();
        fixture.dispatch(Event::for_endpoint(EventKind::LiftTargetPositionChanged, EP1));
        fixture.run_motion(EP1);

        assert_eq!(fixture.lift_position(EP1), 500);
        assert_eq!(
            fixture
                .store
                .get(EP1, Attribute::CurrentPositionLiftPercent100ths),
            Ok(5000)
        );
        let status = server::operational_status_get(&fixture.store, EP1).unwrap();
        assert_eq!(status.lift, OperationalState::Stall);
        assert_eq!(status.global, OperationalState::Stall);
    }

    #[test]
    fn test_stop_motion_halts_travel() {
        let mut fixture = Fixture::new();

        server::lift_target_position_set(&mut fixture.store, EP1, 0).unwrap();
        fixture.dispatch(Event::for_endpoint(EventKind::LiftTargetPositionChanged, EP1));
        fixture.pump();
        let position = fixture.lift_position(EP1);
        assert!(position < 1000);

        fixture.dispatch(Event::for_endpoint(EventKind::StopMotion, EP1));
        fixture.run_motion(EP1);
        // Stops near where it was, not at the original target
        assert_eq!(fixture.lift_position(EP1), position);
    }

    #[test]
    fn test_unknown_endpoint_is_silent_noop() {
        let mut fixture = Fixture::new();

        fixture.dispatch(Event::for_endpoint(EventKind::LiftTargetPositionChanged, 9));
        fixture.dispatch(Event::for_endpoint(EventKind::OperationalStatusChanged, 9));
        fixture.dispatch(Event::for_endpoint(EventKind::LiftUpdate, 9));
        assert!(fixture.sink.pop().is_none());
    }

    #[test]
    fn test_events_route_to_their_endpoint() {
        let mut fixture = Fixture::new();

        server::lift_target_position_set(&mut fixture.store, EP2, 0).unwrap();
        fixture.dispatch(Event::for_endpoint(EventKind::LiftTargetPositionChanged, EP2));
        fixture.run_motion(EP2);

        assert_eq!(fixture.lift_position(EP2), 0);
        assert_eq!(fixture.lift_position(EP1), 1000);
    }

    #[test]
    fn test_connectivity_diff_posts_events() {
        let mut fixture = Fixture::new();
        let sink = QueueSink::new();

        fixture.controller.update_connectivity(
            StateFlags {
                provisioned: true,
                ble_connections: true,
                service_reachable: false,
            },
            &sink,
        );
        assert_eq!(sink.pop().unwrap().kind, EventKind::ProvisionedChanged);
        assert_eq!(sink.pop().unwrap().kind, EventKind::BleConnectionsChanged);
        assert!(sink.pop().is_none());

        // Unchanged snapshot posts nothing
        fixture.controller.update_connectivity(
            StateFlags {
                provisioned: true,
                ble_connections: true,
                service_reachable: false,
            },
            &sink,
        );
        assert!(sink.pop().is_none());
    }
}
