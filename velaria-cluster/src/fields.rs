//! Bit-exact value objects for the composite cluster attributes
//!
//! Each composite attribute round-trips through a single raw storage
//! value. Encode and decode are exact inverses for every defined bit;
//! reserved bits always read back as zero.

/// Movement state of one actuator axis (2-bit field)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperationalState {
    /// Not moving
    #[default]
    Stall,
    /// Moving toward the fully open position
    MovingUpOrOpen,
    /// Moving toward the fully closed position
    MovingDownOrClose,
    /// Reserved encoding
    Reserved,
}

impl OperationalState {
    /// Decode from the 2-bit wire encoding
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0x00 => OperationalState::Stall,
            0x01 => OperationalState::MovingUpOrOpen,
            0x02 => OperationalState::MovingDownOrClose,
            _ => OperationalState::Reserved,
        }
    }

    /// Encode to the 2-bit wire encoding
    pub fn bits(self) -> u8 {
        match self {
            OperationalState::Stall => 0x00,
            OperationalState::MovingUpOrOpen => 0x01,
            OperationalState::MovingDownOrClose => 0x02,
            OperationalState::Reserved => 0x03,
        }
    }

    /// Returns true for either moving state
    pub fn is_moving(self) -> bool {
        matches!(
            self,
            OperationalState::MovingUpOrOpen | OperationalState::MovingDownOrClose
        )
    }
}

/// ConfigStatus attribute: installation and capability summary (7 bits)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigStatus {
    pub operational: bool,
    pub online: bool,
    pub lift_reversed: bool,
    pub lift_position_aware: bool,
    pub tilt_position_aware: bool,
    pub lift_encoder_controlled: bool,
    pub tilt_encoder_controlled: bool,
}

impl ConfigStatus {
    pub fn encode(self) -> u8 {
        (self.operational as u8)
            | (self.online as u8) << 1
            | (self.lift_reversed as u8) << 2
            | (self.lift_position_aware as u8) << 3
            | (self.tilt_position_aware as u8) << 4
            | (self.lift_encoder_controlled as u8) << 5
            | (self.tilt_encoder_controlled as u8) << 6
    }

    pub fn decode(raw: u8) -> Self {
        Self {
            operational: raw & 0x01 != 0,
            online: raw & 0x02 != 0,
            lift_reversed: raw & 0x04 != 0,
            lift_position_aware: raw & 0x08 != 0,
            tilt_position_aware: raw & 0x10 != 0,
            lift_encoder_controlled: raw & 0x20 != 0,
            tilt_encoder_controlled: raw & 0x40 != 0,
        }
    }
}

/// OperationalStatus attribute: global plus per-axis movement state
/// (three 2-bit fields)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OperationalStatus {
    pub global: OperationalState,
    pub lift: OperationalState,
    pub tilt: OperationalState,
}

impl OperationalStatus {
    pub fn encode(self) -> u8 {
        self.global.bits() | self.lift.bits() << 2 | self.tilt.bits() << 4
    }

    pub fn decode(raw: u8) -> Self {
        Self {
            global: OperationalState::from_bits(raw),
            lift: OperationalState::from_bits(raw >> 2),
            tilt: OperationalState::from_bits(raw >> 4),
        }
    }
}

/// Mode attribute: motor configuration switches (4 bits, writable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Mode {
    pub motor_direction_reversed: bool,
    pub calibration_mode: bool,
    pub maintenance_mode: bool,
    pub led_display: bool,
}

impl Mode {
    pub fn encode(self) -> u8 {
        (self.motor_direction_reversed as u8)
            | (self.calibration_mode as u8) << 1
            | (self.maintenance_mode as u8) << 2
            | (self.led_display as u8) << 3
    }

    pub fn decode(raw: u8) -> Self {
        Self {
            motor_direction_reversed: raw & 0x01 != 0,
            calibration_mode: raw & 0x02 != 0,
            maintenance_mode: raw & 0x04 != 0,
            led_display: raw & 0x08 != 0,
        }
    }
}

/// SafetyStatus attribute: active protection conditions (11 bits)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SafetyStatus {
    pub remote_lockout: bool,
    pub tamper_detection: bool,
    pub failed_communication: bool,
    pub position_failure: bool,
    pub thermal_protection: bool,
    pub obstacle_detected: bool,
    pub power_issue: bool,
    pub stop_input: bool,
    pub motor_jammed: bool,
    pub hardware_failure: bool,
    pub manual_operation: bool,
}

impl SafetyStatus {
    pub fn encode(self) -> u16 {
        (self.remote_lockout as u16)
            | (self.tamper_detection as u16) << 1
            | (self.failed_communication as u16) << 2
            | (self.position_failure as u16) << 3
            | (self.thermal_protection as u16) << 4
            | (self.obstacle_detected as u16) << 5
            | (self.power_issue as u16) << 6
            | (self.stop_input as u16) << 7
            | (self.motor_jammed as u16) << 8
            | (self.hardware_failure as u16) << 9
            | (self.manual_operation as u16) << 10
    }

    pub fn decode(raw: u16) -> Self {
        Self {
            remote_lockout: raw & 0x0001 != 0,
            tamper_detection: raw & 0x0002 != 0,
            failed_communication: raw & 0x0004 != 0,
            position_failure: raw & 0x0008 != 0,
            thermal_protection: raw & 0x0010 != 0,
            obstacle_detected: raw & 0x0020 != 0,
            power_issue: raw & 0x0040 != 0,
            stop_input: raw & 0x0080 != 0,
            motor_jammed: raw & 0x0100 != 0,
            hardware_failure: raw & 0x0200 != 0,
            manual_operation: raw & 0x0400 != 0,
        }
    }
}

/// Window covering type (Type attribute)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CoveringType {
    Rollershade,
    Rollershade2Motor,
    RollershadeExterior,
    RollershadeExterior2Motor,
    Drapery,
    Awning,
    Shutter,
    TiltBlindTiltOnly,
    TiltBlindLiftAndTilt,
    ProjectorScreen,
    Unknown,
}

impl CoveringType {
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            0 => CoveringType::Rollershade,
            1 => CoveringType::Rollershade2Motor,
            2 => CoveringType::RollershadeExterior,
            3 => CoveringType::RollershadeExterior2Motor,
            4 => CoveringType::Drapery,
            5 => CoveringType::Awning,
            6 => CoveringType::Shutter,
            7 => CoveringType::TiltBlindTiltOnly,
            8 => CoveringType::TiltBlindLiftAndTilt,
            9 => CoveringType::ProjectorScreen,
            _ => CoveringType::Unknown,
        }
    }

    pub fn raw(self) -> u16 {
        match self {
            CoveringType::Rollershade => 0,
            CoveringType::Rollershade2Motor => 1,
            CoveringType::RollershadeExterior => 2,
            CoveringType::RollershadeExterior2Motor => 3,
            CoveringType::Drapery => 4,
            CoveringType::Awning => 5,
            CoveringType::Shutter => 6,
            CoveringType::TiltBlindTiltOnly => 7,
            CoveringType::TiltBlindLiftAndTilt => 8,
            CoveringType::ProjectorScreen => 9,
            CoveringType::Unknown => 255,
        }
    }

    /// Returns true if this covering type has a tilt axis
    pub fn supports_tilt(self) -> bool {
        matches!(
            self,
            CoveringType::TiltBlindTiltOnly | CoveringType::TiltBlindLiftAndTilt
        )
    }
}

/// End product type (EndProductType attribute)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EndProductType {
    RollerShade,
    RomanShade,
    BalloonShade,
    WovenWood,
    PleatedShade,
    CellularShade,
    LayeredShade,
    LayeredShade2D,
    SheerShade,
    TiltOnlyInteriorBlind,
    InteriorBlind,
    VerticalBlindStripCurtain,
    InteriorVenetianBlind,
    ExteriorVenetianBlind,
    Unknown,
}

impl EndProductType {
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            0 => EndProductType::RollerShade,
            1 => EndProductType::RomanShade,
            2 => EndProductType::BalloonShade,
            3 => EndProductType::WovenWood,
            4 => EndProductType::PleatedShade,
            5 => EndProductType::CellularShade,
            6 => EndProductType::LayeredShade,
            7 => EndProductType::LayeredShade2D,
            8 => EndProductType::SheerShade,
            9 => EndProductType::TiltOnlyInteriorBlind,
            10 => EndProductType::InteriorBlind,
            11 => EndProductType::VerticalBlindStripCurtain,
            12 => EndProductType::InteriorVenetianBlind,
            13 => EndProductType::ExteriorVenetianBlind,
            _ => EndProductType::Unknown,
        }
    }

    pub fn raw(self) -> u16 {
        match self {
            EndProductType::RollerShade => 0,
            EndProductType::RomanShade => 1,
            EndProductType::BalloonShade => 2,
            EndProductType::WovenWood => 3,
            EndProductType::PleatedShade => 4,
            EndProductType::CellularShade => 5,
            EndProductType::LayeredShade => 6,
            EndProductType::LayeredShade2D => 7,
            EndProductType::SheerShade => 8,
            EndProductType::TiltOnlyInteriorBlind => 9,
            EndProductType::InteriorBlind => 10,
            EndProductType::VerticalBlindStripCurtain => 11,
            EndProductType::InteriorVenetianBlind => 12,
            EndProductType::ExteriorVenetianBlind => 13,
            EndProductType::Unknown => 255,
        }
    }
}

/// Position of an actuator relative to its installed limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LimitStatus {
    /// Somewhere between the two limits
    Intermediate,
    /// Exactly at the open limit
    IsUpOrOpen,
    /// Exactly at the closed limit
    IsDownOrClose,
    /// Past the open limit
    IsOverUpOrOpen,
    /// Past the closed limit
    IsOverDownOrClose,
    /// Open limit numerically above closed limit
    Inverted,
    /// Position attributes not readable
    Unknown,
    /// Axis or position awareness not present
    Unsupported,
}

/// Capability flags stored in the FeatureMap attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Features(u16);

impl Features {
    /// Covering has a lift axis
    pub const LIFT: Features = Features(0x01);
    /// Covering has a tilt axis
    pub const TILT: Features = Features(0x02);
    /// Axes report and accept fine-grained percent positions
    pub const POSITION_AWARE: Features = Features(0x04);
    /// Axes accept and report positions in native raw units
    pub const ABSOLUTE: Features = Features(0x08);

    pub const fn from_bits(bits: u16) -> Self {
        Features(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn union(self, other: Features) -> Features {
        Features(self.0 | other.0)
    }

    pub const fn contains(self, other: Features) -> bool {
        self.0 & other.0 == other.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_operational_state_round_trip() {
        for bits in 0..=3u8 {
            assert_eq!(OperationalState::from_bits(bits).bits(), bits);
        }
    }

    #[test]
    fn test_operational_status_exhaustive_round_trip() {
        let states = [
            OperationalState::Stall,
            OperationalState::MovingUpOrOpen,
            OperationalState::MovingDownOrClose,
            OperationalState::Reserved,
        ];
        for global in states {
            for lift in states {
                for tilt in states {
                    let status = OperationalStatus { global, lift, tilt };
                    assert_eq!(OperationalStatus::decode(status.encode()), status);
                }
            }
        }
    }

    #[test]
    fn test_operational_status_layout() {
        let status = OperationalStatus {
            global: OperationalState::MovingUpOrOpen,
            lift: OperationalState::MovingDownOrClose,
            tilt: OperationalState::Stall,
        };
        assert_eq!(status.encode(), 0b00_10_01);
    }

    #[test]
    fn test_config_status_layout() {
        let status = ConfigStatus {
            operational: true,
            online: true,
            lift_position_aware: true,
            ..Default::default()
        };
        assert_eq!(status.encode(), 0x01 | 0x02 | 0x08);
    }

    #[test]
    fn test_reserved_bits_read_as_zero() {
        assert_eq!(ConfigStatus::decode(0xFF).encode(), 0x7F);
        assert_eq!(Mode::decode(0xFF).encode(), 0x0F);
        assert_eq!(SafetyStatus::decode(0xFFFF).encode(), 0x07FF);
        assert_eq!(OperationalStatus::decode(0xFF).encode(), 0x3F);
    }

    #[test]
    fn test_covering_type_round_trip() {
        for raw in 0..=9u16 {
            assert_eq!(CoveringType::from_raw(raw).raw(), raw);
        }
        assert_eq!(CoveringType::from_raw(42), CoveringType::Unknown);
    }

    #[test]
    fn test_end_product_type_round_trip() {
        for raw in 0..=13u16 {
            assert_eq!(EndProductType::from_raw(raw).raw(), raw);
        }
    }

    #[test]
    fn test_supports_tilt() {
        assert!(CoveringType::TiltBlindLiftAndTilt.supports_tilt());
        assert!(CoveringType::TiltBlindTiltOnly.supports_tilt());
        assert!(!CoveringType::Rollershade.supports_tilt());
        assert!(!CoveringType::Drapery.supports_tilt());
    }

    #[test]
    fn test_features() {
        let features = Features::LIFT.union(Features::POSITION_AWARE);
        assert!(features.contains(Features::LIFT));
        assert!(features.contains(Features::POSITION_AWARE));
        assert!(!features.contains(Features::TILT));
        assert!(!features.contains(Features::LIFT.union(Features::TILT)));
    }

    proptest! {
        #[test]
        fn prop_config_status_idempotent(raw in 0u8..0x80) {
            prop_assert_eq!(ConfigStatus::decode(raw).encode(), raw);
        }

        #[test]
        fn prop_mode_idempotent(raw in 0u8..0x10) {
            prop_assert_eq!(Mode::decode(raw).encode(), raw);
        }

        #[test]
        fn prop_safety_status_idempotent(raw in 0u16..0x0800) {
            prop_assert_eq!(SafetyStatus::decode(raw).encode(), raw);
        }

        #[test]
        fn prop_operational_status_idempotent(raw in 0u8..0x40) {
            prop_assert_eq!(OperationalStatus::decode(raw).encode(), raw);
        }
    }
}
