//! Typed attribute accessors and command handlers
//!
//! Everything in this module works against the [`AttributeStore`]
//! contract. Position setters are capability-gated: the per-endpoint
//! FeatureMap decides whether an axis exists, whether it is
//! position-aware, and whether the raw-unit mirror attributes are kept
//! in sync.

use crate::attributes::{Attribute, AttributeStore, ClusterError, EndpointId};
use crate::convert::{percent100ths_is_valid, percent100ths_to_value, value_to_percent100ths};
use crate::fields::{
    ConfigStatus, CoveringType, EndProductType, Features, LimitStatus, Mode, OperationalStatus,
    SafetyStatus,
};

pub use crate::convert::{PERCENT100THS_MAX_CLOSED, PERCENT100THS_MIN_OPEN};

/// Check one capability flag of an endpoint.
///
/// An unreadable FeatureMap counts as the capability being absent.
pub fn has_feature(store: &impl AttributeStore, endpoint: EndpointId, feature: Features) -> bool {
    store
        .get(endpoint, Attribute::FeatureMap)
        .map(|bits| Features::from_bits(bits).contains(feature))
        .unwrap_or(false)
}

pub fn type_set(
    store: &mut impl AttributeStore,
    endpoint: EndpointId,
    covering_type: CoveringType,
) -> Result<(), ClusterError> {
    store.set(endpoint, Attribute::Type, covering_type.raw())
}

pub fn type_get(
    store: &impl AttributeStore,
    endpoint: EndpointId,
) -> Result<CoveringType, ClusterError> {
    Ok(CoveringType::from_raw(store.get(endpoint, Attribute::Type)?))
}

pub fn config_status_set(
    store: &mut impl AttributeStore,
    endpoint: EndpointId,
    status: ConfigStatus,
) -> Result<(), ClusterError> {
    store.set(endpoint, Attribute::ConfigStatus, status.encode().into())
}

pub fn config_status_get(
    store: &impl AttributeStore,
    endpoint: EndpointId,
) -> Result<ConfigStatus, ClusterError> {
    Ok(ConfigStatus::decode(
        store.get(endpoint, Attribute::ConfigStatus)? as u8,
    ))
}

pub fn operational_status_set(
    store: &mut impl AttributeStore,
    endpoint: EndpointId,
    status: OperationalStatus,
) -> Result<(), ClusterError> {
    store.set(endpoint, Attribute::OperationalStatus, status.encode().into())
}

pub fn operational_status_get(
    store: &impl AttributeStore,
    endpoint: EndpointId,
) -> Result<OperationalStatus, ClusterError> {
    Ok(OperationalStatus::decode(
        store.get(endpoint, Attribute::OperationalStatus)? as u8,
    ))
}

pub fn end_product_type_set(
    store: &mut impl AttributeStore,
    endpoint: EndpointId,
    product: EndProductType,
) -> Result<(), ClusterError> {
    store.set(endpoint, Attribute::EndProductType, product.raw())
}

pub fn end_product_type_get(
    store: &impl AttributeStore,
    endpoint: EndpointId,
) -> Result<EndProductType, ClusterError> {
    Ok(EndProductType::from_raw(
        store.get(endpoint, Attribute::EndProductType)?,
    ))
}

pub fn mode_set(
    store: &mut impl AttributeStore,
    endpoint: EndpointId,
    mode: Mode,
) -> Result<(), ClusterError> {
    store.set(endpoint, Attribute::Mode, mode.encode().into())
}

pub fn mode_get(store: &impl AttributeStore, endpoint: EndpointId) -> Result<Mode, ClusterError> {
    Ok(Mode::decode(store.get(endpoint, Attribute::Mode)? as u8))
}

pub fn safety_status_set(
    store: &mut impl AttributeStore,
    endpoint: EndpointId,
    status: SafetyStatus,
) -> Result<(), ClusterError> {
    store.set(endpoint, Attribute::SafetyStatus, status.encode())
}

pub fn safety_status_get(
    store: &impl AttributeStore,
    endpoint: EndpointId,
) -> Result<SafetyStatus, ClusterError> {
    Ok(SafetyStatus::decode(
        store.get(endpoint, Attribute::SafetyStatus)?,
    ))
}

/// Convert a raw lift position into percent100ths using the installed
/// limits of the endpoint
pub fn lift_to_percent100ths(
    store: &impl AttributeStore,
    endpoint: EndpointId,
    lift: u16,
) -> Result<u16, ClusterError> {
    let open = store.get(endpoint, Attribute::InstalledOpenLimitLift)?;
    let closed = store.get(endpoint, Attribute::InstalledClosedLimitLift)?;
    Ok(value_to_percent100ths(open, closed, lift))
}

/// Convert a lift percent100ths position into raw units
pub fn percent100ths_to_lift(
    store: &impl AttributeStore,
    endpoint: EndpointId,
    percent100ths: u16,
) -> Result<u16, ClusterError> {
    let open = store.get(endpoint, Attribute::InstalledOpenLimitLift)?;
    let closed = store.get(endpoint, Attribute::InstalledClosedLimitLift)?;
    Ok(percent100ths_to_value(open, closed, percent100ths))
}

/// Convert a raw tilt position into percent100ths
pub fn tilt_to_percent100ths(
    store: &impl AttributeStore,
    endpoint: EndpointId,
    tilt: u16,
) -> Result<u16, ClusterError> {
    let open = store.get(endpoint, Attribute::InstalledOpenLimitTilt)?;
    let closed = store.get(endpoint, Attribute::InstalledClosedLimitTilt)?;
    Ok(value_to_percent100ths(open, closed, tilt))
}

/// Convert a tilt percent100ths position into raw units
pub fn percent100ths_to_tilt(
    store: &impl AttributeStore,
    endpoint: EndpointId,
    percent100ths: u16,
) -> Result<u16, ClusterError> {
    let open = store.get(endpoint, Attribute::InstalledOpenLimitTilt)?;
    let closed = store.get(endpoint, Attribute::InstalledClosedLimitTilt)?;
    Ok(percent100ths_to_value(open, closed, percent100ths))
}

/// Write the lift current-position attribute set.
///
/// Requires the lift axis and position awareness; the raw-unit mirror
/// is written only when the absolute-unit capability is present.
pub fn lift_current_position_set(
    store: &mut impl AttributeStore,
    endpoint: EndpointId,
    percent100ths: u16,
) -> Result<(), ClusterError> {
    if !has_feature(store, endpoint, Features::LIFT) {
        return Err(ClusterError::UnsupportedAttribute);
    }
    if !has_feature(store, endpoint, Features::POSITION_AWARE) {
        return Err(ClusterError::UnsupportedAttribute);
    }
    if !percent100ths_is_valid(percent100ths) {
        return Err(ClusterError::InvalidValue);
    }

    store.set(
        endpoint,
        Attribute::CurrentPositionLiftPercentage,
        percent100ths / 100,
    )?;
    store.set(
        endpoint,
        Attribute::CurrentPositionLiftPercent100ths,
        percent100ths,
    )?;
    if has_feature(store, endpoint, Features::ABSOLUTE) {
        let raw = percent100ths_to_lift(store, endpoint, percent100ths)?;
        store.set(endpoint, Attribute::CurrentPositionLift, raw)?;
    }
    Ok(())
}

pub fn lift_current_position_get(
    store: &impl AttributeStore,
    endpoint: EndpointId,
) -> Result<u16, ClusterError> {
    store.get(endpoint, Attribute::CurrentPositionLiftPercent100ths)
}

/// Write the lift target position, triggering motion via the change
/// notification.
///
/// On an axis without position awareness the percentage degrades to a
/// binary command: zero is treated as DownOrClose, any nonzero value
/// as UpOrOpen.
pub fn lift_target_position_set(
    store: &mut impl AttributeStore,
    endpoint: EndpointId,
    percent100ths: u16,
) -> Result<(), ClusterError> {
    if !has_feature(store, endpoint, Features::LIFT) {
        return Err(ClusterError::UnsupportedCommand);
    }
    if has_feature(store, endpoint, Features::POSITION_AWARE) {
        if !percent100ths_is_valid(percent100ths) {
            return Err(ClusterError::InvalidValue);
        }
        store.set(
            endpoint,
            Attribute::TargetPositionLiftPercent100ths,
            percent100ths,
        )
    } else {
        let binary = if percent100ths != 0 {
            PERCENT100THS_MIN_OPEN
        } else {
            PERCENT100THS_MAX_CLOSED
        };
        store.set(endpoint, Attribute::TargetPositionLiftPercent100ths, binary)
    }
}

/// Write the tilt current-position attribute set (see lift counterpart)
pub fn tilt_current_position_set(
    store: &mut impl AttributeStore,
    endpoint: EndpointId,
    percent100ths: u16,
) -> Result<(), ClusterError> {
    if !has_feature(store, endpoint, Features::TILT) {
        return Err(ClusterError::UnsupportedAttribute);
    }
    if !has_feature(store, endpoint, Features::POSITION_AWARE) {
        return Err(ClusterError::UnsupportedAttribute);
    }
    if !percent100ths_is_valid(percent100ths) {
        return Err(ClusterError::InvalidValue);
    }

    store.set(
        endpoint,
        Attribute::CurrentPositionTiltPercentage,
        percent100ths / 100,
    )?;
    store.set(
        endpoint,
        Attribute::CurrentPositionTiltPercent100ths,
        percent100ths,
    )?;
    if has_feature(store, endpoint, Features::ABSOLUTE) {
        let raw = percent100ths_to_tilt(store, endpoint, percent100ths)?;
        store.set(endpoint, Attribute::CurrentPositionTilt, raw)?;
    }
    Ok(())
}

pub fn tilt_current_position_get(
    store: &impl AttributeStore,
    endpoint: EndpointId,
) -> Result<u16, ClusterError> {
    store.get(endpoint, Attribute::CurrentPositionTiltPercent100ths)
}

/// Write the tilt target position (see lift counterpart)
pub fn tilt_target_position_set(
    store: &mut impl AttributeStore,
    endpoint: EndpointId,
    percent100ths: u16,
) -> Result<(), ClusterError> {
    if !has_feature(store, endpoint, Features::TILT) {
        return Err(ClusterError::UnsupportedCommand);
    }
    if has_feature(store, endpoint, Features::POSITION_AWARE) {
        if !percent100ths_is_valid(percent100ths) {
            return Err(ClusterError::InvalidValue);
        }
        store.set(
            endpoint,
            Attribute::TargetPositionTiltPercent100ths,
            percent100ths,
        )
    } else {
        let binary = if percent100ths != 0 {
            PERCENT100THS_MIN_OPEN
        } else {
            PERCENT100THS_MAX_CLOSED
        };
        store.set(endpoint, Attribute::TargetPositionTiltPercent100ths, binary)
    }
}

/// Position of the lift axis relative to its limits, as reported over
/// the percent100ths attributes
pub fn lift_limit_status(store: &impl AttributeStore, endpoint: EndpointId) -> LimitStatus {
    if !has_feature(store, endpoint, Features::LIFT)
        || !has_feature(store, endpoint, Features::POSITION_AWARE)
    {
        return LimitStatus::Unsupported;
    }
    match lift_current_position_get(store, endpoint) {
        Ok(PERCENT100THS_MIN_OPEN) => LimitStatus::IsUpOrOpen,
        Ok(PERCENT100THS_MAX_CLOSED) => LimitStatus::IsDownOrClose,
        Ok(_) => LimitStatus::Unknown,
        Err(_) => LimitStatus::Unknown,
    }
}

/// Position of the tilt axis relative to its limits
pub fn tilt_limit_status(store: &impl AttributeStore, endpoint: EndpointId) -> LimitStatus {
    if !has_feature(store, endpoint, Features::TILT)
        || !has_feature(store, endpoint, Features::POSITION_AWARE)
    {
        return LimitStatus::Unsupported;
    }
    match tilt_current_position_get(store, endpoint) {
        Ok(PERCENT100THS_MIN_OPEN) => LimitStatus::IsUpOrOpen,
        Ok(PERCENT100THS_MAX_CLOSED) => LimitStatus::IsDownOrClose,
        Ok(_) => LimitStatus::Unknown,
        Err(_) => LimitStatus::Unknown,
    }
}

/// Commands exposed to the host stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    UpOrOpen,
    DownOrClose,
    StopMotion,
    GoToLiftValue { lift_value: u16 },
    GoToLiftPercentage { percentage: u8, percent100ths: u16 },
    GoToTiltValue { tilt_value: u16 },
    GoToTiltPercentage { percentage: u8, percent100ths: u16 },
}

/// Handle one inbound command, resolving it to target-position writes.
///
/// Each command produces exactly one response status. The combined
/// open/close/stop commands address both axes and succeed when either
/// axis accepts the write, since a covering may implement only one.
pub fn handle_command(
    store: &mut impl AttributeStore,
    endpoint: EndpointId,
    command: Command,
) -> Result<(), ClusterError> {
    #[cfg(feature = "defmt")]
    defmt::info!("Ep[{=u16}] command {}", endpoint, command);

    match command {
        Command::UpOrOpen => both_axes(store, endpoint, PERCENT100THS_MIN_OPEN),
        Command::DownOrClose => both_axes(store, endpoint, PERCENT100THS_MAX_CLOSED),
        Command::StopMotion => {
            let tilt = tilt_current_position_get(store, endpoint)
                .and_then(|current| tilt_target_position_set(store, endpoint, current));
            let lift = lift_current_position_get(store, endpoint)
                .and_then(|current| lift_target_position_set(store, endpoint, current));
            if lift.is_ok() || tilt.is_ok() {
                Ok(())
            } else {
                Err(ClusterError::UnsupportedCommand)
            }
        }
        Command::GoToLiftValue { lift_value } => {
            if !has_feature(store, endpoint, Features::ABSOLUTE) {
                return Err(ClusterError::UnsupportedCommand);
            }
            let percent100ths = lift_to_percent100ths(store, endpoint, lift_value)?;
            lift_target_position_set(store, endpoint, percent100ths)
        }
        Command::GoToLiftPercentage {
            percentage: _,
            percent100ths,
        } => lift_target_position_set(store, endpoint, percent100ths),
        Command::GoToTiltValue { tilt_value } => {
            if !has_feature(store, endpoint, Features::ABSOLUTE) {
                return Err(ClusterError::UnsupportedCommand);
            }
            let percent100ths = tilt_to_percent100ths(store, endpoint, tilt_value)?;
            tilt_target_position_set(store, endpoint, percent100ths)
        }
        Command::GoToTiltPercentage {
            percentage: _,
            percent100ths,
        } => tilt_target_position_set(store, endpoint, percent100ths),
    }
}

fn both_axes(
    store: &mut impl AttributeStore,
    endpoint: EndpointId,
    percent100ths: u16,
) -> Result<(), ClusterError> {
    let tilt = tilt_target_position_set(store, endpoint, percent100ths);
    let lift = lift_target_position_set(store, endpoint, percent100ths);
    if lift.is_ok() || tilt.is_ok() {
        Ok(())
    } else {
        Err(ClusterError::UnsupportedCommand)
    }
}
