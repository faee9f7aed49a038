//! One managed covering: the lift/tilt actuator pair of an endpoint

use velaria_cluster::{
    server, Attribute, AttributeStore, ClusterError, ConfigStatus, CoveringType, EndProductType,
    EndpointId, Event, EventKind, EventSink, Features, Mode, OperationalStatus, SafetyStatus,
};

use crate::actuator::Actuator;
use crate::config::CoverConfig;
use crate::timer::Timer;

/// A physical covering bound to one endpoint
pub struct Cover<T: Timer> {
    endpoint: EndpointId,
    operational_status: OperationalStatus,
    pub lift: Actuator<T>,
    pub tilt: Actuator<T>,
}

impl<T: Timer> Cover<T> {
    pub fn new(endpoint: EndpointId, config: &CoverConfig, lift_timer: T, tilt_timer: T) -> Self {
        Self {
            endpoint,
            operational_status: OperationalStatus::default(),
            lift: Actuator::new(
                &config.lift,
                lift_timer,
                Event::for_endpoint(EventKind::LiftUpdate, endpoint),
            ),
            tilt: Actuator::new(
                &config.tilt,
                tilt_timer,
                Event::for_endpoint(EventKind::TiltUpdate, endpoint),
            ),
        }
    }

    pub fn endpoint(&self) -> EndpointId {
        self.endpoint
    }

    pub fn operational_status(&self) -> OperationalStatus {
        self.operational_status
    }

    /// Write the installed limits, starting positions and descriptive
    /// attributes of this covering. Both actuators start at rest at
    /// the closed limit.
    pub fn init(&mut self, store: &mut impl AttributeStore) -> Result<(), ClusterError> {
        let endpoint = self.endpoint;

        store.set(
            endpoint,
            Attribute::InstalledOpenLimitLift,
            self.lift.open_limit(),
        )?;
        store.set(
            endpoint,
            Attribute::InstalledClosedLimitLift,
            self.lift.closed_limit(),
        )?;
        let closed = server::lift_to_percent100ths(store, endpoint, self.lift.closed_limit())?;
        // Rejected on non-position-aware endpoints
        let _ = server::lift_current_position_set(store, endpoint, closed);

        store.set(
            endpoint,
            Attribute::InstalledOpenLimitTilt,
            self.tilt.open_limit(),
        )?;
        store.set(
            endpoint,
            Attribute::InstalledClosedLimitTilt,
            self.tilt.closed_limit(),
        )?;
        let closed = server::tilt_to_percent100ths(store, endpoint, self.tilt.closed_limit())?;
        let _ = server::tilt_current_position_set(store, endpoint, closed);

        server::type_set(store, endpoint, CoveringType::TiltBlindLiftAndTilt)?;

        let config_status = ConfigStatus {
            operational: true,
            online: true,
            lift_reversed: false,
            lift_position_aware: server::has_feature(store, endpoint, Features::LIFT)
                && server::has_feature(store, endpoint, Features::POSITION_AWARE),
            tilt_position_aware: server::has_feature(store, endpoint, Features::TILT)
                && server::has_feature(store, endpoint, Features::POSITION_AWARE),
            lift_encoder_controlled: true,
            tilt_encoder_controlled: true,
        };
        server::config_status_set(store, endpoint, config_status)?;

        server::operational_status_set(store, endpoint, self.operational_status)?;
        server::end_product_type_set(store, endpoint, EndProductType::InteriorBlind)?;

        let mode = Mode {
            motor_direction_reversed: false,
            calibration_mode: true,
            maintenance_mode: true,
            led_display: true,
        };
        server::mode_set(store, endpoint, mode)?;

        server::safety_status_set(store, endpoint, SafetyStatus::default())
    }

    /// Advance the Type attribute through the demo cycle
    /// Rollershade -> Drapery -> TiltBlindLiftAndTilt -> Rollershade;
    /// any other starting type resets to TiltBlindLiftAndTilt.
    pub fn cycle_type(
        &mut self,
        store: &mut impl AttributeStore,
    ) -> Result<CoveringType, ClusterError> {
        let next = match server::type_get(store, self.endpoint)? {
            CoveringType::Rollershade => CoveringType::Drapery,
            CoveringType::Drapery => CoveringType::TiltBlindLiftAndTilt,
            CoveringType::TiltBlindLiftAndTilt => CoveringType::Rollershade,
            _ => CoveringType::TiltBlindLiftAndTilt,
        };
        server::type_set(store, self.endpoint, next)?;
        Ok(next)
    }

    pub fn stop_motion(&mut self, sink: &impl EventSink) {
        self.tilt.stop_motion(sink);
        self.lift.stop_motion(sink);
    }

    /// Stop both actuator timers; called at shutdown
    pub fn finish(&mut self) {
        self.lift.finish();
        self.tilt.finish();
    }

    /// Re-synchronize the lift attributes after an actuator state
    /// change
    pub fn publish_lift_state(
        &mut self,
        store: &mut impl AttributeStore,
    ) -> Result<(), ClusterError> {
        self.operational_status.lift = self.lift.op_state();
        self.refresh_global_status();
        server::operational_status_set(store, self.endpoint, self.operational_status)?;

        let percent100ths =
            server::lift_to_percent100ths(store, self.endpoint, self.lift.current_position())?;
        // Rejected on non-position-aware endpoints; the motion itself
        // still happened
        let _ = server::lift_current_position_set(store, self.endpoint, percent100ths);
        store.set(
            self.endpoint,
            Attribute::NumberOfActuationsLift,
            self.lift.actuation_count(),
        )
    }

    /// Re-synchronize the tilt attributes after an actuator state
    /// change
    pub fn publish_tilt_state(
        &mut self,
        store: &mut impl AttributeStore,
    ) -> Result<(), ClusterError> {
        self.operational_status.tilt = self.tilt.op_state();
        self.refresh_global_status();
        server::operational_status_set(store, self.endpoint, self.operational_status)?;

        let percent100ths =
            server::tilt_to_percent100ths(store, self.endpoint, self.tilt.current_position())?;
        let _ = server::tilt_current_position_set(store, self.endpoint, percent100ths);
        store.set(
            self.endpoint,
            Attribute::NumberOfActuationsTilt,
            self.tilt.actuation_count(),
        )
    }

    /// Global state mirrors the lift axis while it moves, else tilt
    fn refresh_global_status(&mut self) {
        self.operational_status.global = if self.operational_status.lift.is_moving() {
            self.operational_status.lift
        } else {
            self.operational_status.tilt
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::ManualTimer;
    use core::cell::RefCell;
    use velaria_cluster::store::RamAttributeStore;
    use velaria_cluster::OperationalState;

    const EP: EndpointId = 1;

    struct VecSink(RefCell<heapless::Vec<Event, 64>>);

    impl EventSink for VecSink {
        fn post(&self, event: Event) {
            self.0.borrow_mut().push(event).unwrap();
        }
    }

    fn full_store() -> RamAttributeStore<1> {
        let mut store = RamAttributeStore::new([EP]);
        let features = Features::LIFT
            .union(Features::TILT)
            .union(Features::POSITION_AWARE)
            .union(Features::ABSOLUTE);
        store.set(EP, Attribute::FeatureMap, features.bits()).unwrap();
        store
    }

    fn cover() -> Cover<ManualTimer> {
        Cover::new(
            EP,
            &CoverConfig::default(),
            ManualTimer::new(),
            ManualTimer::new(),
        )
    }

    #[test]
    fn test_init_writes_baseline_attributes() {
        let mut store = full_store();
        let mut cover = cover();
        cover.init(&mut store).unwrap();

        assert_eq!(store.get(EP, Attribute::InstalledClosedLimitLift), Ok(1000));
        assert_eq!(store.get(EP, Attribute::InstalledClosedLimitTilt), Ok(100));
        // Fully closed at boot
        assert_eq!(
            store.get(EP, Attribute::CurrentPositionLiftPercent100ths),
            Ok(10_000)
        );
        assert_eq!(
            store.get(EP, Attribute::CurrentPositionTiltPercent100ths),
            Ok(10_000)
        );
        assert_eq!(
            server::type_get(&store, EP),
            Ok(CoveringType::TiltBlindLiftAndTilt)
        );
        assert_eq!(
            server::end_product_type_get(&store, EP),
            Ok(EndProductType::InteriorBlind)
        );

        let config_status = server::config_status_get(&store, EP).unwrap();
        assert!(config_status.operational);
        assert!(config_status.lift_position_aware);
        assert!(config_status.tilt_position_aware);

        assert_eq!(server::safety_status_get(&store, EP).unwrap().encode(), 0);
    }

    #[test]
    fn test_type_cycle() {
        let mut store = full_store();
        let mut cover = cover();
        server::type_set(&mut store, EP, CoveringType::Rollershade).unwrap();

        assert_eq!(cover.cycle_type(&mut store), Ok(CoveringType::Drapery));
        assert_eq!(
            cover.cycle_type(&mut store),
            Ok(CoveringType::TiltBlindLiftAndTilt)
        );
        assert_eq!(cover.cycle_type(&mut store), Ok(CoveringType::Rollershade));

        // Unrecognized type resets into the cycle
        server::type_set(&mut store, EP, CoveringType::Awning).unwrap();
        assert_eq!(
            cover.cycle_type(&mut store),
            Ok(CoveringType::TiltBlindLiftAndTilt)
        );
    }

    #[test]
    fn test_publish_lift_state_syncs_attributes() {
        let mut store = full_store();
        let mut cover = cover();
        cover.init(&mut store).unwrap();
        let sink = VecSink(RefCell::new(heapless::Vec::new()));

        cover.lift.go_to_value(500, &sink);
        cover.publish_lift_state(&mut store).unwrap();

        let status = server::operational_status_get(&store, EP).unwrap();
        assert_eq!(status.lift, OperationalState::MovingUpOrOpen);
        assert_eq!(status.global, OperationalState::MovingUpOrOpen);

        let percent100ths = store
            .get(EP, Attribute::CurrentPositionLiftPercent100ths)
            .unwrap();
        assert_eq!(
            percent100ths,
            server::lift_to_percent100ths(&store, EP, cover.lift.current_position()).unwrap()
        );
        assert_eq!(store.get(EP, Attribute::NumberOfActuationsLift), Ok(1));
    }

    #[test]
    fn test_global_status_follows_moving_axis() {
        let mut store = full_store();
        let mut cover = cover();
        cover.init(&mut store).unwrap();
        let sink = VecSink(RefCell::new(heapless::Vec::new()));

        cover.tilt.go_to_value(20, &sink);
        cover.publish_tilt_state(&mut store).unwrap();
        let status = server::operational_status_get(&store, EP).unwrap();
        assert_eq!(status.global, status.tilt);
        assert!(status.global.is_moving());

        cover.stop_motion(&sink);
        while cover.tilt.op_state().is_moving() {
            cover.tilt.update_position(&sink);
        }
        cover.publish_tilt_state(&mut store).unwrap();
        let status = server::operational_status_get(&store, EP).unwrap();
        assert_eq!(status.global, OperationalState::Stall);
    }
}
