//! Scale functions for data-to-pixel mappings.
//!
//! Plot timestamps are epoch seconds, so scales work in `f64` to keep
//! sub-second precision at current epoch magnitudes.

use crate::error::{Error, Result};

/// Trait for scale functions that map domain values to range values.
pub trait Scale<D, R> {
    /// Transform a domain value to a range value.
    fn scale(&self, value: D) -> R;

    /// Get the domain extent.
    fn domain(&self) -> (D, D);

    /// Get the range extent.
    fn range(&self) -> (R, R);
}

/// Linear scale for continuous-to-continuous mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_min: f64,
    domain_max: f64,
    range_min: f64,
    range_max: f64,
}

impl LinearScale {
    /// Create a new linear scale.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain is empty or not finite.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Result<Self> {
        if !domain.0.is_finite() || !domain.1.is_finite() {
            return Err(Error::ScaleDomain("Domain bounds must be finite".to_string()));
        }
        if (domain.0 - domain.1).abs() < f64::EPSILON {
            return Err(Error::ScaleDomain("Domain min and max cannot be equal".to_string()));
        }

        Ok(Self { domain_min: domain.0, domain_max: domain.1, range_min: range.0, range_max: range.1 })
    }

    /// Create a scale from the extent of `data`, ignoring non-finite values.
    ///
    /// A constant series is widened by one unit on each side so it still maps
    /// to the middle of the range.
    #[must_use]
    pub fn from_data(data: &[f64], range: (f64, f64)) -> Option<Self> {
        let (min, max) = data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if min > max {
            return None;
        }
        if (max - min).abs() < f64::EPSILON {
            return Self::new((min - 1.0, max + 1.0), range).ok();
        }
        Self::new((min, max), range).ok()
    }

    /// Domain value that maps to `value` in the range.
    #[must_use]
    pub fn invert(&self, value: f64) -> f64 {
        let t = (value - self.range_min) / (self.range_max - self.range_min);
        self.domain_min + t * (self.domain_max - self.domain_min)
    }
}

impl Scale<f64, f64> for LinearScale {
    fn scale(&self, value: f64) -> f64 {
        let t = (value - self.domain_min) / (self.domain_max - self.domain_min);
        self.range_min + t * (self.range_max - self.range_min)
    }

    fn domain(&self) -> (f64, f64) {
        (self.domain_min, self.domain_max)
    }

    fn range(&self) -> (f64, f64) {
        (self.range_min, self.range_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_scale() {
        let scale = LinearScale::new((0.0, 100.0), (0.0, 500.0)).unwrap();
        assert_relative_eq!(scale.scale(0.0), 0.0);
        assert_relative_eq!(scale.scale(50.0), 250.0);
        assert_relative_eq!(scale.scale(100.0), 500.0);
    }

    #[test]
    fn test_linear_scale_inverted_range() {
        // Screen y grows downward: high values map to small y.
        let scale = LinearScale::new((0.0, 10.0), (99.0, 0.0)).unwrap();
        assert_relative_eq!(scale.scale(10.0), 0.0);
        assert_relative_eq!(scale.scale(0.0), 99.0);
    }

    #[test]
    fn test_linear_scale_invert() {
        let scale = LinearScale::new((0.0, 10.0), (99.0, 0.0)).unwrap();
        assert_relative_eq!(scale.invert(0.0), 10.0);
        assert_relative_eq!(scale.invert(49.5), 5.0);
    }

    #[test]
    fn test_epoch_precision() {
        let start = 1_700_000_000.0;
        let scale = LinearScale::new((start, start + 60.0), (0.0, 60.0)).unwrap();
        assert_relative_eq!(scale.scale(start + 1.0), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_linear_scale_from_data() {
        let scale = LinearScale::from_data(&[1.0, f64::NAN, 5.0], (0.0, 4.0)).unwrap();
        assert_eq!(scale.domain(), (1.0, 5.0));
        assert_eq!(scale.range(), (0.0, 4.0));
    }

    #[test]
    fn test_linear_scale_from_constant_data() {
        let scale = LinearScale::from_data(&[3.0, 3.0], (0.0, 10.0)).unwrap();
        assert_relative_eq!(scale.scale(3.0), 5.0);
        assert!(LinearScale::from_data(&[], (0.0, 1.0)).is_none());
    }

    #[test]
    fn test_linear_scale_equal_domain_error() {
        assert!(LinearScale::new((5.0, 5.0), (0.0, 100.0)).is_err());
        assert!(LinearScale::new((0.0, f64::INFINITY), (0.0, 100.0)).is_err());
    }
}
