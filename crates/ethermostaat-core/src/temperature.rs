//! Target temperature normalization.
//!
//! The thermostat accepts targets between 5 and 30 °C in half-degree steps.

use crate::api::ApiError;

/// Lowest accepted target temperature in °C
pub const MIN_TARGET: f64 = 5.0;

/// Highest accepted target temperature in °C
pub const MAX_TARGET: f64 = 30.0;

pub fn clamp_target(value: f64) -> f64 {
    value.clamp(MIN_TARGET, MAX_TARGET)
}

/// Round to the nearest half degree; halves round up
pub fn round_half(value: f64) -> f64 {
    (value * 2.0 + 0.5).floor() / 2.0
}

/// Clamp then round a requested target. NaN is refused.
pub fn normalize_target(value: f64) -> Result<f64, ApiError> {
    if value.is_nan() {
        return Err(ApiError::InvalidTemperature(value));
    }
    Ok(round_half(clamp_target(value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_target() {
        assert_eq!(clamp_target(-3.0), 5.0);
        assert_eq!(clamp_target(4.99), 5.0);
        assert_eq!(clamp_target(5.0), 5.0);
        assert_eq!(clamp_target(18.3), 18.3);
        assert_eq!(clamp_target(30.0), 30.0);
        assert_eq!(clamp_target(45.0), 30.0);
        assert_eq!(clamp_target(f64::INFINITY), 30.0);
        assert_eq!(clamp_target(f64::NEG_INFINITY), 5.0);
    }

    #[test]
    fn test_round_half() {
        assert_eq!(round_half(20.0), 20.0);
        assert_eq!(round_half(20.2), 20.0);
        assert_eq!(round_half(20.25), 20.5);
        assert_eq!(round_half(20.3), 20.5);
        assert_eq!(round_half(20.74), 20.5);
        assert_eq!(round_half(20.75), 21.0);
        assert_eq!(round_half(20.9), 21.0);
    }

    #[test]
    fn test_normalize_target() {
        assert_eq!(normalize_target(2.0).unwrap(), 5.0);
        assert_eq!(normalize_target(31.4).unwrap(), 30.0);
        assert_eq!(normalize_target(21.3).unwrap(), 21.5);
        assert_eq!(normalize_target(29.9).unwrap(), 30.0);
        assert_eq!(normalize_target(5.1).unwrap(), 5.0);
        assert!(matches!(
            normalize_target(f64::NAN),
            Err(ApiError::InvalidTemperature(_))
        ));
    }

    #[test]
    fn test_normalized_values_are_half_steps_in_range() {
        let mut value = -10.0;
        while value <= 40.0 {
            let normalized = normalize_target(value).unwrap();
            assert!((MIN_TARGET..=MAX_TARGET).contains(&normalized), "{value}");
            assert_eq!((normalized * 2.0).fract(), 0.0, "{value}");
            value += 0.37;
        }
    }
}
