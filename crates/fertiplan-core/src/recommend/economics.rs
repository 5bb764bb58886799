use crate::calibration::schema::Prices;
use crate::recommend::outcome::{EconomicProjection, NutrientRates};
use crate::recommend::yield_model::YieldResponse;

/// Cost of the nutrients for the whole farm. Prices apply per kg of nutrient.
pub fn fertilizer_cost(rates: &NutrientRates, farm_size_ha: f64, prices: &Prices) -> f64 {
    (rates.n_kg_ha * prices.n_usd_per_kg
        + rates.p2o5_kg_ha * prices.p2o5_usd_per_kg
        + rates.k2o_kg_ha * prices.k2o_usd_per_kg)
        * farm_size_ha
}

/// Project cost, yield gain, revenue, profit and ROI for one season.
pub fn project_economics(
    rates: &NutrientRates,
    farm_size_ha: f64,
    previous_yield_kg_ha: f64,
    model: &dyn YieldResponse,
    prices: &Prices,
) -> EconomicProjection {
    let total_cost = fertilizer_cost(rates, farm_size_ha, prices);
    let expected_yield = model.estimate_yield(previous_yield_kg_ha, rates);
    let yield_increase = expected_yield - previous_yield_kg_ha;
    let revenue_increase = yield_increase * farm_size_ha * prices.crop_usd_per_kg;
    let net_profit = revenue_increase - total_cost;

    let (roi_percent, breakeven_yield_kg_ha) = if total_cost > 0.0 {
        (
            net_profit / total_cost * 100.0,
            total_cost / prices.crop_usd_per_kg / farm_size_ha,
        )
    } else {
        (0.0, 0.0)
    };

    tracing::debug!(
        model = model.name(),
        total_cost,
        expected_yield,
        net_profit,
        "projected economics"
    );

    EconomicProjection {
        total_cost,
        expected_yield,
        yield_increase,
        revenue_increase,
        net_profit,
        roi_percent,
        breakeven_yield_kg_ha,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::builtin::default_calibration;
    use crate::recommend::yield_model::CappedLinear;

    fn medium_rates() -> NutrientRates {
        NutrientRates {
            n_kg_ha: 60.0,
            p2o5_kg_ha: 35.0,
            k2o_kg_ha: 30.0,
        }
    }

    fn capped(target: f64) -> CappedLinear {
        CappedLinear {
            ceiling_multiplier: 1.3,
            target_yield_kg_ha: target,
        }
    }

    #[test]
    fn test_medium_scenario() {
        let prices = default_calibration().unwrap().prices;
        let e = project_economics(&medium_rates(), 2.0, 1500.0, &capped(3000.0), &prices);
        // (60*1.2 + 35*2.5 + 30*1.0) * 2 = 379
        assert!((e.total_cost - 379.0).abs() < 1e-9);
        assert!((e.expected_yield - 1950.0).abs() < 1e-9);
        assert!((e.yield_increase - 450.0).abs() < 1e-9);
        // 450 * 2 * 0.45 = 405
        assert!((e.revenue_increase - 405.0).abs() < 1e-9);
        assert!((e.net_profit - 26.0).abs() < 1e-9);
        assert!((e.roi_percent - 26.0 / 379.0 * 100.0).abs() < 1e-9);
        assert!((e.breakeven_yield_kg_ha - 379.0 / 0.45 / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_yield_increase_is_reported() {
        let prices = default_calibration().unwrap().prices;
        let e = project_economics(&medium_rates(), 1.0, 3500.0, &capped(3000.0), &prices);
        assert_eq!(e.expected_yield, 3000.0);
        assert_eq!(e.yield_increase, -500.0);
        assert!(e.revenue_increase < 0.0);
        assert!(e.roi_percent < -100.0);
    }

    #[test]
    fn test_zero_cost_gives_zero_roi() {
        let prices = default_calibration().unwrap().prices;
        let zero = NutrientRates {
            n_kg_ha: 0.0,
            p2o5_kg_ha: 0.0,
            k2o_kg_ha: 0.0,
        };
        let e = project_economics(&zero, 2.0, 1500.0, &capped(3000.0), &prices);
        assert_eq!(e.total_cost, 0.0);
        assert_eq!(e.roi_percent, 0.0);
        assert_eq!(e.breakeven_yield_kg_ha, 0.0);

        let e = project_economics(&medium_rates(), 0.0, 1500.0, &capped(3000.0), &prices);
        assert_eq!(e.roi_percent, 0.0);
        assert!(e.roi_percent.is_finite());
    }
}
