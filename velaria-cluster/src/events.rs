//! Events funneled through the single-consumer dispatch queue
//!
//! Every input source - button edges, timer expiries, attribute-change
//! notifications from the host stack, connectivity polling - produces
//! one of these values. Events are consumed exactly once, in FIFO
//! order, by the dispatch loop; they are never persisted.

use crate::attributes::EndpointId;

/// Discriminates every event the dispatch loop can receive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventKind {
    /// Confirmed factory reset request
    Reset,
    /// First long press on Up: arm the reset warning
    ResetWarning,
    /// Button released while the warning was armed
    ResetCanceled,

    // Raw button edges
    UpPressed,
    UpReleased,
    DownPressed,
    DownReleased,

    // Button automaton intents
    /// Chord detected: actuator mode toggled between lift and tilt
    CycleActuatorMode,
    /// Both buttons long-pressed: selection moved to the next covering
    CycleCover,

    // Timer expiries
    LongPressTimeout,
    LiftTimerExpired,
    TiltTimerExpired,

    // Attribute-change notifications from the host stack
    TypeChanged,
    ConfigStatusChanged,
    OperationalStatusChanged,
    EndProductTypeChanged,
    ModeChanged,
    SafetyStatusChanged,
    LiftCurrentPositionChanged,
    TiltCurrentPositionChanged,
    /// A new lift target triggers motion on the simulated device
    LiftTargetPositionChanged,
    /// A new tilt target triggers motion on the simulated device
    TiltTargetPositionChanged,

    // Actuator state sync requests
    LiftUpdate,
    TiltUpdate,

    StopMotion,

    // Connectivity snapshot deltas
    ProvisionedChanged,
    ConnectivityChanged,
    BleConnectionsChanged,
}

/// One queued input, optionally scoped to a covering endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Event {
    pub kind: EventKind,
    pub endpoint: Option<EndpointId>,
}

impl Event {
    /// Event without endpoint scope (buttons, connectivity, reset)
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            endpoint: None,
        }
    }

    /// Event scoped to one covering
    pub fn for_endpoint(kind: EventKind, endpoint: EndpointId) -> Self {
        Self {
            kind,
            endpoint: Some(endpoint),
        }
    }
}

/// Producer side of the event queue.
///
/// Implementations must accept posts from any execution context that
/// can race with the single consumer (a synchronized or lock-free
/// multi-producer queue). Posting never blocks.
pub trait EventSink {
    fn post(&self, event: Event);
}
