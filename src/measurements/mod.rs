pub mod extractor;
pub mod normalize;
pub mod patterns;

use serde::{Deserialize, Serialize};

pub use extractor::extract;
pub use normalize::normalize;

/// Inclusive plausibility band for a circumference, in centimeters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
}

impl MetricRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Keeps the value only when it lies inside the band; never clamps.
    pub fn accept(&self, value: f64) -> Option<f64> {
        if self.contains(value) {
            Some(value)
        } else {
            None
        }
    }
}

pub const WAIST_RANGE: MetricRange = MetricRange::new(50.0, 120.0);
pub const HIP_RANGE: MetricRange = MetricRange::new(70.0, 150.0);
/// Band used when a number carries no label at all.
pub const UNLABELED_RANGE: MetricRange = MetricRange::new(40.0, 200.0);

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct MeasurementPair {
    pub waist: Option<f64>,
    pub hip: Option<f64>,
}

impl MeasurementPair {
    pub fn new(waist: Option<f64>, hip: Option<f64>) -> Self {
        Self { waist, hip }
    }

    /// Builds a pair from raw candidates, dropping whichever fails its range.
    pub fn validated(waist: Option<f64>, hip: Option<f64>) -> Self {
        Self {
            waist: waist.and_then(|v| WAIST_RANGE.accept(v)),
            hip: hip.and_then(|v| HIP_RANGE.accept(v)),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.waist.is_some() && self.hip.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.waist.is_none() && self.hip.is_none()
    }

    /// Swaps waist and hip when they were recorded the wrong way round and
    /// the swapped values are both plausible.
    pub fn ordered(self) -> Self {
        match (self.waist, self.hip) {
            (Some(waist), Some(hip))
                if waist > hip && WAIST_RANGE.contains(hip) && HIP_RANGE.contains(waist) =>
            {
                Self {
                    waist: Some(hip),
                    hip: Some(waist),
                }
            }
            _ => self,
        }
    }

    pub fn waist_to_hip_ratio(&self) -> Option<f64> {
        match (self.waist, self.hip) {
            (Some(waist), Some(hip)) if hip > 0.0 => Some(waist / hip),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MeasurementPair, HIP_RANGE, WAIST_RANGE};

    #[test]
    fn ranges_reject_instead_of_clamping() {
        assert_eq!(WAIST_RANGE.accept(49.9), None);
        assert_eq!(WAIST_RANGE.accept(120.0), Some(120.0));
        assert_eq!(HIP_RANGE.accept(151.0), None);
        let pair = MeasurementPair::validated(Some(130.0), Some(95.0));
        assert_eq!(pair, MeasurementPair::new(None, Some(95.0)));
    }

    #[test]
    fn swaps_inverted_pair_when_both_stay_valid() {
        let pair = MeasurementPair::new(Some(98.0), Some(72.0)).ordered();
        assert_eq!(pair, MeasurementPair::new(Some(72.0), Some(98.0)));
    }

    #[test]
    fn keeps_inverted_pair_when_swap_is_implausible() {
        let pair = MeasurementPair::new(Some(60.0), Some(55.0)).ordered();
        assert_eq!(pair, MeasurementPair::new(Some(60.0), Some(55.0)));
    }

    #[test]
    fn ratio_needs_both_values() {
        let pair = MeasurementPair::new(Some(70.0), Some(100.0));
        assert!((pair.waist_to_hip_ratio().expect("ratio") - 0.7).abs() < 1e-9);
        assert_eq!(MeasurementPair::new(Some(70.0), None).waist_to_hip_ratio(), None);
    }
}
