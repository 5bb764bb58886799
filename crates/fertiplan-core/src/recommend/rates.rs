use crate::calibration::schema::{BaseRates, YieldScaling};
use crate::model::Nutrient;
use crate::recommend::outcome::{NutrientLimitation, NutrientRates};

/// Ratio of target to reference yield, capped at `max_factor`.
///
/// Not floored: targets below the reference scale rates down.
pub fn yield_factor(target_yield_kg_ha: f64, scaling: &YieldScaling) -> f64 {
    (target_yield_kg_ha / scaling.reference_yield_kg_ha).min(scaling.max_factor)
}

pub fn calculate_rates(
    limitations: &NutrientLimitation,
    yield_factor: f64,
    base_rates: &BaseRates,
) -> NutrientRates {
    let rate = |nutrient: Nutrient| {
        base_rates
            .for_nutrient(nutrient)
            .for_tier(limitations.get(nutrient))
            * yield_factor
    };

    NutrientRates {
        n_kg_ha: rate(Nutrient::Nitrogen),
        p2o5_kg_ha: rate(Nutrient::Phosphorus),
        k2o_kg_ha: rate(Nutrient::Potassium),
    }
}
