//! Linear unit conversion between raw actuator units and percent100ths
//!
//! Positions cross this boundary in two unit systems: the raw units of an
//! installed actuator (bounded by its open/closed limits, which may be
//! given in either order) and the normalized percent100ths scale where
//! 0 is fully open and 10000 is fully closed.

/// Fully open position on the percent100ths scale
pub const PERCENT100THS_MIN_OPEN: u16 = 0;

/// Fully closed position on the percent100ths scale
pub const PERCENT100THS_MAX_CLOSED: u16 = 10_000;

/// Generic linear rescale of `value` from one range onto another.
///
/// Either range may be given with its bounds in descending order (an
/// inverted installation); the bounds are normalized before use. Values
/// outside the input range clamp to the matching output bound. A
/// zero-width input range (open limit equals closed limit) degenerates
/// to the output maximum.
pub fn convert_value(
    input_low: u16,
    input_high: u16,
    output_low: u16,
    output_high: u16,
    value: u16,
) -> u16 {
    let (input_min, input_max) = if input_low > input_high {
        (input_high, input_low)
    } else {
        (input_low, input_high)
    };
    let (output_min, output_max) = if output_low > output_high {
        (output_high, output_low)
    } else {
        (output_low, output_high)
    };

    if value < input_min {
        return output_min;
    }
    if value > input_max {
        return output_max;
    }

    let input_range = u32::from(input_max - input_min);
    let output_range = u32::from(output_max - output_min);

    if input_range > 0 {
        let scaled = output_range * u32::from(value - input_min) / input_range;
        output_min + scaled as u16
    } else {
        output_max
    }
}

/// Convert a raw actuator position into percent100ths
pub fn value_to_percent100ths(open_limit: u16, closed_limit: u16, value: u16) -> u16 {
    convert_value(
        open_limit,
        closed_limit,
        PERCENT100THS_MIN_OPEN,
        PERCENT100THS_MAX_CLOSED,
        value,
    )
}

/// Convert a percent100ths position into raw actuator units
pub fn percent100ths_to_value(open_limit: u16, closed_limit: u16, percent100ths: u16) -> u16 {
    convert_value(
        PERCENT100THS_MIN_OPEN,
        PERCENT100THS_MAX_CLOSED,
        open_limit,
        closed_limit,
        percent100ths,
    )
}

/// Check a percent100ths value against its inclusive bounds.
///
/// Out-of-range values are rejected at the setter boundary, never
/// clamped.
pub fn percent100ths_is_valid(percent100ths: u16) -> bool {
    percent100ths <= PERCENT100THS_MAX_CLOSED
}
