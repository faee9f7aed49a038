//! Window Covering cluster protocol layer
//!
//! This crate implements the device-side surface of the window covering
//! cluster: bit-exact packing of the composite status attributes, linear
//! unit conversion between installed actuator limits and the normalized
//! percent100ths scale, capability-gated position setters, and the
//! command handlers exposed to the host protocol stack.
//!
//! The host stack's attribute storage engine is consumed through the
//! narrow [`AttributeStore`] trait; everything here is plain logic over
//! that contract, so the whole layer is testable on the host.

#![no_std]
#![deny(unsafe_code)]

pub mod attributes;
pub mod convert;
pub mod events;
pub mod fields;
pub mod notify;
pub mod server;
pub mod store;

pub use attributes::{Attribute, AttributeStore, ClusterError, EndpointId, WINDOW_COVERING_CLUSTER_ID};
pub use events::{Event, EventKind, EventSink};
pub use fields::{
    ConfigStatus, CoveringType, EndProductType, Features, LimitStatus, Mode, OperationalState,
    OperationalStatus, SafetyStatus,
};
pub use server::{Command, PERCENT100THS_MAX_CLOSED, PERCENT100THS_MIN_OPEN};
