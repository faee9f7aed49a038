//! Attribute identifiers and the accessor contract of the host stack
//!
//! The host protocol stack owns the actual attribute storage engine;
//! this layer only consumes it through [`AttributeStore`]. All values
//! cross the contract as raw `u16` words, the widest storage any of the
//! cluster's attributes needs; the typed wrappers live in
//! [`crate::server`].

/// Endpoint identifier, one per managed covering
pub type EndpointId = u16;

/// Cluster identifier of the window covering cluster
pub const WINDOW_COVERING_CLUSTER_ID: u32 = 0x0102;

/// Attributes of the window covering cluster, by wire identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum Attribute {
    Type = 0x0000,
    CurrentPositionLift = 0x0003,
    CurrentPositionTilt = 0x0004,
    NumberOfActuationsLift = 0x0005,
    NumberOfActuationsTilt = 0x0006,
    ConfigStatus = 0x0007,
    CurrentPositionLiftPercentage = 0x0008,
    CurrentPositionTiltPercentage = 0x0009,
    OperationalStatus = 0x000A,
    TargetPositionLiftPercent100ths = 0x000B,
    TargetPositionTiltPercent100ths = 0x000C,
    EndProductType = 0x000D,
    CurrentPositionLiftPercent100ths = 0x000E,
    CurrentPositionTiltPercent100ths = 0x000F,
    InstalledOpenLimitLift = 0x0010,
    InstalledClosedLimitLift = 0x0011,
    InstalledOpenLimitTilt = 0x0012,
    InstalledClosedLimitTilt = 0x0013,
    Mode = 0x0017,
    SafetyStatus = 0x001A,
    FeatureMap = 0xFFFC,
}

impl Attribute {
    /// Wire identifier of this attribute
    pub const fn id(self) -> u32 {
        self as u32
    }

    /// Look up an attribute by wire identifier
    pub fn from_id(id: u32) -> Option<Self> {
        Some(match id {
            0x0000 => Attribute::Type,
            0x0003 => Attribute::CurrentPositionLift,
            0x0004 => Attribute::CurrentPositionTilt,
            0x0005 => Attribute::NumberOfActuationsLift,
            0x0006 => Attribute::NumberOfActuationsTilt,
            0x0007 => Attribute::ConfigStatus,
            0x0008 => Attribute::CurrentPositionLiftPercentage,
            0x0009 => Attribute::CurrentPositionTiltPercentage,
            0x000A => Attribute::OperationalStatus,
            0x000B => Attribute::TargetPositionLiftPercent100ths,
            0x000C => Attribute::TargetPositionTiltPercent100ths,
            0x000D => Attribute::EndProductType,
            0x000E => Attribute::CurrentPositionLiftPercent100ths,
            0x000F => Attribute::CurrentPositionTiltPercent100ths,
            0x0010 => Attribute::InstalledOpenLimitLift,
            0x0011 => Attribute::InstalledClosedLimitLift,
            0x0012 => Attribute::InstalledOpenLimitTilt,
            0x0013 => Attribute::InstalledClosedLimitTilt,
            0x0017 => Attribute::Mode,
            0x001A => Attribute::SafetyStatus,
            0xFFFC => Attribute::FeatureMap,
            _ => return None,
        })
    }
}

/// Protocol status codes returned across the cluster boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClusterError {
    /// Value outside its defined range; nothing was written
    InvalidValue,
    /// Attribute not present for this endpoint's capabilities
    UnsupportedAttribute,
    /// Command not usable with this endpoint's capabilities
    UnsupportedCommand,
    /// No covering registered at this endpoint
    UnsupportedEndpoint,
}

/// Narrow accessor contract over the host stack's attribute storage.
///
/// Attributes that were never written read back as zero, matching the
/// zero-initialized storage of the host stack.
pub trait AttributeStore {
    fn get(&self, endpoint: EndpointId, attribute: Attribute) -> Result<u16, ClusterError>;
    fn set(
        &mut self,
        endpoint: EndpointId,
        attribute: Attribute,
        value: u16,
    ) -> Result<(), ClusterError>;
}
