//! Position-control state machine for one actuator axis
//!
//! An actuator moves `current_position` toward `target_position` one
//! step per timer tick. Every state change posts the axis's update
//! event so the protocol layer re-synchronizes its attributes; the
//! actuator itself never touches attribute storage.

use velaria_cluster::{Event, EventSink, LimitStatus, OperationalState};

use crate::config::AxisConfig;
use crate::timer::Timer;

/// One axis (lift or tilt) of a covering, in raw actuator units.
///
/// `open_limit` may be numerically greater than `closed_limit`
/// (inverted mounting); positions are always clamped into the interval
/// between the two limits whatever their order.
pub struct Actuator<T: Timer> {
    open_limit: u16,
    closed_limit: u16,
    current_position: u16,
    target_position: u16,
    step_delta: u16,
    step_minimum: u16,
    actuation_count: u16,
    op_state: OperationalState,
    timer: T,
    update_event: Event,
}

impl<T: Timer> Actuator<T> {
    /// Build an actuator at rest at the closed limit
    pub fn new(config: &AxisConfig, timer: T, update_event: Event) -> Self {
        Self {
            open_limit: config.open_limit,
            closed_limit: config.closed_limit,
            current_position: config.closed_limit,
            target_position: config.closed_limit,
            step_delta: config.step_delta,
            step_minimum: config.step_minimum,
            actuation_count: 0,
            op_state: OperationalState::Stall,
            timer,
            update_event,
        }
    }

    pub fn open_limit(&self) -> u16 {
        self.open_limit
    }

    pub fn closed_limit(&self) -> u16 {
        self.closed_limit
    }

    pub fn current_position(&self) -> u16 {
        self.current_position
    }

    pub fn target_position(&self) -> u16 {
        self.target_position
    }

    pub fn actuation_count(&self) -> u16 {
        self.actuation_count
    }

    pub fn op_state(&self) -> OperationalState {
        self.op_state
    }

    pub fn is_moving(&self) -> bool {
        self.op_state.is_moving()
    }

    /// Stop the timer; called at shutdown
    pub fn finish(&mut self) {
        self.timer.stop();
    }

    fn clamp(&self, value: u16) -> u16 {
        let lo = self.open_limit.min(self.closed_limit);
        let hi = self.open_limit.max(self.closed_limit);
        value.clamp(lo, hi)
    }

    /// Whether moving from `current_position` to `target` approaches
    /// the closed limit
    fn is_toward_closed(&self, target: u16) -> bool {
        if self.closed_limit >= self.open_limit {
            target > self.current_position
        } else {
            target < self.current_position
        }
    }

    /// Position after one step of `delta` toward `limit`, never
    /// passing it
    fn stepped_toward(&self, limit: u16, delta: u16) -> u16 {
        if limit >= self.current_position {
            self.current_position.saturating_add(delta).min(limit)
        } else {
            self.current_position.saturating_sub(delta).max(limit)
        }
    }

    /// Begin (or redirect) automatic motion toward `target`.
    ///
    /// The first movement step happens synchronously so a single-tick
    /// move is visible immediately rather than deferred to the next
    /// timer fire.
    pub fn go_to_value(&mut self, target: u16, sink: &impl EventSink) {
        let target = self.clamp(target);
        self.target_position = target;
        if self.target_position != self.current_position {
            self.actuation_count = self.actuation_count.wrapping_add(1);
            self.update_position(sink);
        }
    }

    /// Advance the motion state machine by one tick.
    ///
    /// Called once from [`Self::go_to_value`] and then on every timer
    /// expiry. Posts the update event on every call, whichever branch
    /// is taken.
    pub fn update_position(&mut self, sink: &impl EventSink) {
        let lo = self.open_limit.min(self.closed_limit);
        let hi = self.open_limit.max(self.closed_limit);
        let curr_min = self.current_position.saturating_sub(self.step_minimum).max(lo);
        let curr_max = self.current_position.saturating_add(self.step_minimum).min(hi);

        let arrived = (self.target_position >= curr_min && self.target_position <= curr_max)
            || self.current_position == self.target_position;

        if arrived {
            // The motor cannot resolve below step_minimum; snap exactly
            // onto the target
            self.op_state = OperationalState::Stall;
            self.current_position = self.target_position;
            self.timer.stop();
        } else if self.is_toward_closed(self.target_position) {
            self.op_state = OperationalState::MovingDownOrClose;
            self.timer.start();
            self.step_toward_down_or_close(sink);
        } else {
            self.op_state = OperationalState::MovingUpOrOpen;
            self.timer.start();
            self.step_toward_up_or_open(sink);
        }

        sink.post(self.update_event);
    }

    /// Externally observed position change.
    ///
    /// While the timer is active the change is attributed to automatic
    /// motion and the tick that caused it already posts an update.
    /// With the timer idle this is a hand-operated change and the
    /// update event is posted here; the target is left untouched.
    pub fn set_position(&mut self, value: u16, sink: &impl EventSink) {
        let value = self.clamp(value);
        if value != self.current_position {
            self.current_position = value;
            if !self.timer.is_active() {
                sink.post(self.update_event);
            }
        }
    }

    /// One manual step toward the open limit
    pub fn step_toward_up_or_open(&mut self, sink: &impl EventSink) {
        let delta = self.step_delta.max(self.step_minimum);
        let stepped = self.stepped_toward(self.open_limit, delta);
        self.set_position(stepped, sink);
    }

    /// One manual step toward the closed limit
    pub fn step_toward_down_or_close(&mut self, sink: &impl EventSink) {
        let delta = self.step_delta.max(self.step_minimum);
        let stepped = self.stepped_toward(self.closed_limit, delta);
        self.set_position(stepped, sink);
    }

    /// Request an immediate stop by targeting the current position
    pub fn stop_motion(&mut self, sink: &impl EventSink) {
        self.go_to_value(self.current_position, sink);
    }

    /// Position relative to the installed limits
    pub fn limit_state(&self) -> LimitStatus {
        if self.open_limit > self.closed_limit {
            LimitStatus::Inverted
        } else if self.current_position == self.open_limit {
            LimitStatus::IsUpOrOpen
        } else if self.current_position == self.closed_limit {
            LimitStatus::IsDownOrClose
        } else if self.current_position < self.open_limit {
            LimitStatus::IsOverUpOrOpen
        } else if self.current_position > self.closed_limit {
            LimitStatus::IsOverDownOrClose
        } else {
            LimitStatus::Intermediate
        }
    }
}
