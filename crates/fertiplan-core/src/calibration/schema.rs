use crate::model::{
    Limitation, Nutrient, PreviousYieldBracket, SoilColor, SoilTexture, TargetYieldBracket,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Regional calibration of every constant the recommendation pipeline uses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calibration {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    /// Crop the yield and price figures refer to.
    #[serde(default)]
    pub crop: Option<String>,
    pub thresholds: NutrientThresholds,
    pub base_rates: BaseRates,
    pub yield_scaling: YieldScaling,
    pub products: ProductFractions,
    pub prices: Prices,
    pub yield_response: YieldResponseParams,
    pub visual_estimates: VisualEstimates,
    /// Planting windows by latitude. Without it no season note is added.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planting_calendar: Option<PlantingCalendar>,
}

/// Concentrations below which a nutrient is classified as a High or Medium limitation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPair {
    pub high_below: f64,
    pub medium_below: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutrientThresholds {
    /// Total nitrogen, %.
    pub nitrogen_percent: ThresholdPair,
    /// Available phosphorus, ppm.
    pub phosphorus_ppm: ThresholdPair,
    /// Exchangeable potassium, ppm.
    pub potassium_ppm: ThresholdPair,
}

impl NutrientThresholds {
    pub fn for_nutrient(&self, nutrient: Nutrient) -> &ThresholdPair {
        match nutrient {
            Nutrient::Nitrogen => &self.nitrogen_percent,
            Nutrient::Phosphorus => &self.phosphorus_ppm,
            Nutrient::Potassium => &self.potassium_ppm,
        }
    }
}

/// Application rate in kg/ha for each limitation tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierRates {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl TierRates {
    pub fn for_tier(&self, tier: Limitation) -> f64 {
        match tier {
            Limitation::High => self.high,
            Limitation::Medium => self.medium,
            Limitation::Low => self.low,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseRates {
    /// kg N/ha.
    pub n: TierRates,
    /// kg P2O5/ha.
    pub p2o5: TierRates,
    /// kg K2O/ha.
    pub k2o: TierRates,
}

impl BaseRates {
    pub fn for_nutrient(&self, nutrient: Nutrient) -> &TierRates {
        match nutrient {
            Nutrient::Nitrogen => &self.n,
            Nutrient::Phosphorus => &self.p2o5,
            Nutrient::Potassium => &self.k2o,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct YieldScaling {
    /// Target yield at which base rates apply unscaled, kg/ha.
    pub reference_yield_kg_ha: f64,
    /// Upper bound on the yield factor.
    pub max_factor: f64,
}

/// Nutrient content by weight of each fertilizer product.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProductFractions {
    pub urea_n_fraction: f64,
    pub dap_p2o5_fraction: f64,
    pub mop_k2o_fraction: f64,
}

/// Unit prices in USD. Fertilizer prices are per kg of nutrient, not product.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Prices {
    pub n_usd_per_kg: f64,
    pub p2o5_usd_per_kg: f64,
    pub k2o_usd_per_kg: f64,
    pub crop_usd_per_kg: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct YieldResponseParams {
    pub capped_linear: CappedLinearParams,
    pub mitscherlich: MitscherlichParams,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CappedLinearParams {
    /// Maximum expected yield as a multiple of last season's yield.
    pub ceiling_multiplier: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MitscherlichParams {
    /// Attainable yield as a multiple of current yield.
    pub potential_multiplier: f64,
    pub decay: DecayConstants,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DecayConstants {
    pub n: f64,
    pub p: f64,
    pub k: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhosphorusPotassium {
    pub phosphorus_ppm: f64,
    pub potassium_ppm: f64,
}

/// Lookup tables turning a qualitative assessment into numbers.
///
/// The color and texture tables may be partial; missing categories fall back
/// to the defaults. Both yield tables must cover every bracket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualEstimates {
    pub color_nitrogen_percent: BTreeMap<SoilColor, f64>,
    pub default_nitrogen_percent: f64,
    pub texture_phosphorus_potassium: BTreeMap<SoilTexture, PhosphorusPotassium>,
    pub default_phosphorus_potassium: PhosphorusPotassium,
    pub previous_yield_kg_ha: BTreeMap<PreviousYieldBracket, f64>,
    pub target_yield_kg_ha: BTreeMap<TargetYieldBracket, f64>,
}

/// Planting windows split at one latitude (degrees north).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantingCalendar {
    /// Sites strictly north of this latitude use `northern`.
    pub northern_above_latitude: f64,
    pub northern: SeasonWindows,
    pub southern: SeasonWindows,
}

impl PlantingCalendar {
    pub fn windows_for(&self, latitude: f64) -> &SeasonWindows {
        if latitude > self.northern_above_latitude {
            &self.northern
        } else {
            &self.southern
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonWindows {
    pub wet_season: String,
    pub dry_season: String,
}
