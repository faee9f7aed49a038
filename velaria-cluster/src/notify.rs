//! Mapping of host-stack attribute-change notifications onto events
//!
//! The host stack reports every attribute write as
//! `(endpoint, cluster id, attribute id, raw bytes)`. Only a fixed set
//! of window covering attributes is of interest to the dispatch loop;
//! everything else is dropped here.

use crate::attributes::{Attribute, EndpointId, WINDOW_COVERING_CLUSTER_ID};
use crate::events::{Event, EventKind};

/// Translate an attribute-change notification into a queued event.
///
/// Returns `None` for attributes outside the mapped set. A foreign
/// cluster identifier is logged and ignored.
pub fn attribute_event(
    endpoint: EndpointId,
    cluster_id: u32,
    attribute_id: u32,
    _value: &[u8],
) -> Option<Event> {
    if cluster_id != WINDOW_COVERING_CLUSTER_ID {
        #[cfg(feature = "defmt")]
        defmt::warn!("Ignoring change on foreign cluster {=u32:#06x}", cluster_id);
        return None;
    }

    let kind = match Attribute::from_id(attribute_id)? {
        Attribute::Type => EventKind::TypeChanged,
        Attribute::ConfigStatus => EventKind::ConfigStatusChanged,
        Attribute::OperationalStatus => EventKind::OperationalStatusChanged,
        Attribute::EndProductType => EventKind::EndProductTypeChanged,
        Attribute::Mode => EventKind::ModeChanged,
        Attribute::SafetyStatus => EventKind::SafetyStatusChanged,
        Attribute::CurrentPositionLiftPercent100ths => EventKind::LiftCurrentPositionChanged,
        Attribute::CurrentPositionTiltPercent100ths => EventKind::TiltCurrentPositionChanged,
        Attribute::TargetPositionLiftPercent100ths => EventKind::LiftTargetPositionChanged,
        Attribute::TargetPositionTiltPercent100ths => EventKind::TiltTargetPositionChanged,
        _ => return None,
    };

    Some(Event::for_endpoint(kind, endpoint))
}
