use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Signed power-of-two scale, the wire encoding of the poll interval and
/// the clock precision
///
/// `Exponent(10)` stands for 2^10 = 1024 seconds, `Exponent(-3)` for
/// 2^-3 = 0.125 seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Exponent(pub i8);

impl Exponent {
    /// Returns 2^e. Exact for every `i8` exponent.
    pub fn to_float(self) -> f64 {
        2f64.powi(i32::from(self.0))
    }

    /// Encodes `v` as the nearest power of two, `round(log2(v))`.
    ///
    /// Lossy: only exact powers of two survive `to_float(from_float(v))`.
    /// Zero, negative and non-finite values have no logarithm and are
    /// rejected, as are values whose exponent falls outside `i8`.
    pub fn from_float(v: f64) -> Result<Self> {
        if !v.is_finite() || v <= 0.0 {
            return Err(Error::invalid_value(format!(
                "no power-of-two exponent for {}",
                v
            )));
        }
        let e = v.log2().round();
        if e < f64::from(i8::MIN) || e > f64::from(i8::MAX) {
            return Err(Error::overflow(format!("exponent of {} exceeds 8 bits", v)));
        }
        Ok(Exponent(e as i8))
    }
}

impl From<i8> for Exponent {
    fn from(e: i8) -> Self {
        Exponent(e)
    }
}

impl From<Exponent> for i8 {
    fn from(e: Exponent) -> Self {
        e.0
    }
}
