use crate::model::{Limitation, Nutrient, NutrientEstimate};
use crate::plan::ApplicationPlan;
use crate::recommend::yield_model::YieldModel;
use serde::{Deserialize, Serialize};

/// Limitation tier per nutrient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutrientLimitation {
    #[serde(rename = "N")]
    pub nitrogen: Limitation,
    #[serde(rename = "P")]
    pub phosphorus: Limitation,
    #[serde(rename = "K")]
    pub potassium: Limitation,
}

impl NutrientLimitation {
    pub fn get(&self, nutrient: Nutrient) -> Limitation {
        match nutrient {
            Nutrient::Nitrogen => self.nitrogen,
            Nutrient::Phosphorus => self.phosphorus,
            Nutrient::Potassium => self.potassium,
        }
    }
}

/// Nutrient application rates in kg/ha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutrientRates {
    pub n_kg_ha: f64,
    pub p2o5_kg_ha: f64,
    pub k2o_kg_ha: f64,
}

impl NutrientRates {
    pub fn get(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Nitrogen => self.n_kg_ha,
            Nutrient::Phosphorus => self.p2o5_kg_ha,
            Nutrient::Potassium => self.k2o_kg_ha,
        }
    }
}

/// Product quantities for the whole farm, in kg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FertilizerQuantities {
    pub urea_kg: f64,
    pub dap_kg: f64,
    pub mop_kg: f64,
}

/// Projected season economics. Money is in USD, yields in kg/ha. Not rounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EconomicProjection {
    pub total_cost: f64,
    pub expected_yield: f64,
    /// May be zero or negative; never floored.
    pub yield_increase: f64,
    pub revenue_increase: f64,
    pub net_profit: f64,
    /// Zero when the fertilizer cost is zero.
    pub roi_percent: f64,
    /// Extra yield per hectare needed to pay for the fertilizer.
    pub breakeven_yield_kg_ha: f64,
}

/// Everything computed for one request. Read-only output for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub soil: NutrientEstimate,
    pub limitations: NutrientLimitation,
    pub yield_factor: f64,
    pub rates: NutrientRates,
    pub fertilizers: FertilizerQuantities,
    pub economics: EconomicProjection,
    pub yield_model: YieldModel,
    pub application_plan: ApplicationPlan,
    pub farm_size_ha: f64,
    pub previous_yield_kg_ha: f64,
    pub target_yield_kg_ha: f64,
    /// Lookup fallbacks and other non-fatal diagnostics.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Result for one record of a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    /// Position of the record in the submitted batch.
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
