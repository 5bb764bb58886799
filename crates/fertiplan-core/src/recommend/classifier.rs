use crate::calibration::schema::{NutrientThresholds, ThresholdPair};
use crate::model::{Limitation, Nutrient, NutrientEstimate};
use crate::recommend::outcome::NutrientLimitation;

/// Bucket one concentration. Comparisons are strict, so a value equal to a
/// threshold lands in the less severe tier.
pub fn classify_concentration(value: f64, thresholds: &ThresholdPair) -> Limitation {
    if value < thresholds.high_below {
        Limitation::High
    } else if value < thresholds.medium_below {
        Limitation::Medium
    } else {
        Limitation::Low
    }
}

pub fn classify(estimate: &NutrientEstimate, thresholds: &NutrientThresholds) -> NutrientLimitation {
    let tier = |nutrient: Nutrient| {
        classify_concentration(
            estimate.concentration(nutrient),
            thresholds.for_nutrient(nutrient),
        )
    };

    NutrientLimitation {
        nitrogen: tier(Nutrient::Nitrogen),
        phosphorus: tier(Nutrient::Phosphorus),
        potassium: tier(Nutrient::Potassium),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::builtin::default_calibration;
    use crate::model::EstimateSource;

    fn estimate(n: f64, p: f64, k: f64) -> NutrientEstimate {
        NutrientEstimate {
            nitrogen_percent: n,
            phosphorus_ppm: p,
            potassium_ppm: k,
            ph: None,
            source: EstimateSource::Lab,
        }
    }

    #[test]
    fn test_tiers() {
        let t = default_calibration().unwrap().thresholds;
        let l = classify(&estimate(0.9, 20.0, 250.0), &t);
        assert_eq!(l.nitrogen, Limitation::High);
        assert_eq!(l.phosphorus, Limitation::Medium);
        assert_eq!(l.potassium, Limitation::Low);
    }

    #[test]
    fn test_boundaries_fall_into_less_severe_tier() {
        let t = default_calibration().unwrap().thresholds;
        let l = classify(&estimate(1.0, 15.0, 120.0), &t);
        assert_eq!(l.nitrogen, Limitation::Medium);
        assert_eq!(l.phosphorus, Limitation::Medium);
        assert_eq!(l.potassium, Limitation::Medium);

        let l = classify(&estimate(1.5, 25.0, 200.0), &t);
        assert_eq!(l.nitrogen, Limitation::Low);
        assert_eq!(l.phosphorus, Limitation::Low);
        assert_eq!(l.potassium, Limitation::Low);
    }

    #[test]
    fn test_negative_values_are_high() {
        let pair = ThresholdPair {
            high_below: 1.0,
            medium_below: 1.5,
        };
        assert_eq!(classify_concentration(-3.0, &pair), Limitation::High);
    }
}
