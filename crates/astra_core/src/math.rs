//! Fixed-point math utilities for deterministic simulation.
//!
//! All resource accounting uses fixed-point arithmetic so that
//! catch-up over a split interval produces bit-identical results
//! to catch-up over the whole interval. Floating-point accrual
//! would drift depending on where the server happened to wake up.

use fixed::types::I32F32;

/// Fixed-point number type for all resource and rate math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
///
/// Growth curves use saturating multiplication, so extreme building
/// levels saturate at the type ceiling instead of wrapping.
pub type Fixed = I32F32;

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// Serde support for `Option<Fixed>`.
pub mod option_fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize an optional fixed-point number.
    pub fn serialize<S>(value: &Option<Fixed>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => v.to_bits().serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize an optional fixed-point number.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Fixed>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt = Option::<i64>::deserialize(deserializer)?;
        Ok(opt.map(Fixed::from_bits))
    }
}

/// Convert a whole-number percentage into a fixed-point fraction.
///
/// `percent(10)` is `0.1`, the form bonus channels are stored in.
#[must_use]
pub fn percent(value: i64) -> Fixed {
    Fixed::from_num(value) / Fixed::from_num(100)
}

/// Raise a fixed-point growth factor to an integer power.
///
/// Cost and output curves are `base * growth^level`; the exponent is
/// always a small level number, so repeated saturating multiplication
/// is both exact and overflow-safe.
#[must_use]
pub fn pow_growth(growth: Fixed, exp: u32) -> Fixed {
    let mut result = Fixed::ONE;
    for _ in 0..exp {
        result = result.saturating_mul(growth);
    }
    result
}

/// Floor a non-negative fixed-point amount into a `u64`.
///
/// Score and plunder arithmetic accumulates in integer space to stay
/// clear of the fixed-point ceiling.
#[must_use]
pub fn floor_u64(value: Fixed) -> u64 {
    if value <= Fixed::ZERO {
        0
    } else {
        value.to_num::<u64>()
    }
}

/// Convert an integer amount into fixed-point, clamping at the ceiling.
#[must_use]
pub fn from_u64_saturating(value: u64) -> Fixed {
    if value >= (1 << 31) {
        Fixed::MAX
    } else {
        Fixed::from_num(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_determinism() {
        // Same operations must produce identical results
        let a = Fixed::from_num(1) / Fixed::from_num(3);
        let b = Fixed::from_num(1) / Fixed::from_num(3);
        assert_eq!(a, b);

        let result1 = a * Fixed::from_num(7);
        let result2 = b * Fixed::from_num(7);
        assert_eq!(result1, result2);
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(50), Fixed::from_num(0.5));
        assert_eq!(percent(0), Fixed::ZERO);
        assert_eq!(percent(100), Fixed::ONE);
    }

    #[test]
    fn test_pow_growth() {
        let growth = Fixed::from_num(1.5);
        assert_eq!(pow_growth(growth, 0), Fixed::ONE);
        assert_eq!(pow_growth(growth, 1), growth);
        assert_eq!(pow_growth(growth, 2), Fixed::from_num(2.25));
    }

    #[test]
    fn test_pow_growth_saturates() {
        // Extreme exponents clamp at the type ceiling instead of wrapping
        let result = pow_growth(Fixed::from_num(2), 64);
        assert_eq!(result, Fixed::MAX);
    }

    #[test]
    fn test_floor_u64() {
        assert_eq!(floor_u64(Fixed::from_num(1234.9)), 1234);
        assert_eq!(floor_u64(Fixed::ZERO), 0);
        assert_eq!(floor_u64(Fixed::from_num(-5)), 0);
    }

    #[test]
    fn test_from_u64_saturating() {
        assert_eq!(from_u64_saturating(42), Fixed::from_num(42));
        assert_eq!(from_u64_saturating(u64::MAX), Fixed::MAX);
    }

    #[test]
    fn test_fixed_accrual_telescopes() {
        // rate * (t1 - t0) + rate * (t2 - t1) == rate * (t2 - t0)
        // holds exactly because multiplication by an integer is exact.
        let rate = Fixed::from_num(1) / Fixed::from_num(3);
        let split = rate * Fixed::from_num(1000) + rate * Fixed::from_num(2345);
        let direct = rate * Fixed::from_num(3345);
        assert_eq!(split, direct);
    }
}
