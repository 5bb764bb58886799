use crate::calibration::schema::{Calibration, MitscherlichParams};
use crate::recommend::outcome::NutrientRates;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Projects the yield a crop will reach after fertilization.
pub trait YieldResponse {
    fn estimate_yield(&self, current_yield_kg_ha: f64, rates: &NutrientRates) -> f64;

    fn name(&self) -> &'static str;
}

/// Fixed proportional gain over last season, never above the target.
///
/// Does not depend on the applied rates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CappedLinear {
    pub ceiling_multiplier: f64,
    pub target_yield_kg_ha: f64,
}

impl YieldResponse for CappedLinear {
    fn estimate_yield(&self, current_yield_kg_ha: f64, _rates: &NutrientRates) -> f64 {
        (current_yield_kg_ha * self.ceiling_multiplier).min(self.target_yield_kg_ha)
    }

    fn name(&self) -> &'static str {
        "capped_linear"
    }
}

/// Mitscherlich diminishing-returns curve, one saturating term per nutrient,
/// combined multiplicatively.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mitscherlich {
    pub potential_multiplier: f64,
    pub decay_n: f64,
    pub decay_p: f64,
    pub decay_k: f64,
}

impl Mitscherlich {
    pub fn from_params(params: &MitscherlichParams) -> Mitscherlich {
        Mitscherlich {
            potential_multiplier: params.potential_multiplier,
            decay_n: params.decay.n,
            decay_p: params.decay.p,
            decay_k: params.decay.k,
        }
    }

    /// Fraction of the attainable gain realized at these rates, in [0, 1).
    pub fn total_response(&self, rates: &NutrientRates) -> f64 {
        let response = |k: f64, rate: f64| 1.0 - (-k * rate).exp();
        response(self.decay_n, rates.n_kg_ha)
            * response(self.decay_p, rates.p2o5_kg_ha)
            * response(self.decay_k, rates.k2o_kg_ha)
    }
}

impl YieldResponse for Mitscherlich {
    fn estimate_yield(&self, current_yield_kg_ha: f64, rates: &NutrientRates) -> f64 {
        let max_yield = current_yield_kg_ha * self.potential_multiplier;
        current_yield_kg_ha + (max_yield - current_yield_kg_ha) * self.total_response(rates)
    }

    fn name(&self) -> &'static str {
        "mitscherlich"
    }
}

/// Selectable yield-response strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YieldModel {
    #[default]
    CappedLinear,
    Mitscherlich,
}

impl YieldModel {
    pub const ALL: [YieldModel; 2] = [YieldModel::CappedLinear, YieldModel::Mitscherlich];

    /// Build the strategy from calibration parameters. The target yield only
    /// matters for the capped-linear model.
    pub fn strategy(
        &self,
        calibration: &Calibration,
        target_yield_kg_ha: f64,
    ) -> Box<dyn YieldResponse> {
        let params = &calibration.yield_response;
        match self {
            YieldModel::CappedLinear => Box::new(CappedLinear {
                ceiling_multiplier: params.capped_linear.ceiling_multiplier,
                target_yield_kg_ha,
            }),
            YieldModel::Mitscherlich => Box::new(Mitscherlich::from_params(&params.mitscherlich)),
        }
    }
}

impl fmt::Display for YieldModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YieldModel::CappedLinear => write!(f, "capped-linear"),
            YieldModel::Mitscherlich => write!(f, "mitscherlich"),
        }
    }
}

impl FromStr for YieldModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "capped-linear" | "linear" => Ok(YieldModel::CappedLinear),
            "mitscherlich" => Ok(YieldModel::Mitscherlich),
            other => Err(format!(
                "unknown yield model '{other}' (expected capped-linear or mitscherlich)"
            )),
        }
    }
}

/// Mitscherlich yield projection for arbitrary rates.
pub fn estimate_yield_response(
    current_yield_kg_ha: f64,
    rates: &NutrientRates,
    params: &MitscherlichParams,
) -> f64 {
    Mitscherlich::from_params(params).estimate_yield(current_yield_kg_ha, rates)
}
