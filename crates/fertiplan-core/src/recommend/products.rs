use crate::calibration::schema::ProductFractions;
use crate::error::FertiplanError;
use crate::recommend::outcome::{FertilizerQuantities, NutrientRates};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    Urea,
    Dap,
    Mop,
}

impl Product {
    /// How the product is usually recognized at the agro-dealer.
    pub fn appearance(&self) -> &'static str {
        match self {
            Product::Urea => "white granules",
            Product::Dap => "dark granules",
            Product::Mop => "red/white crystals",
        }
    }

    pub fn quantity(&self, quantities: &FertilizerQuantities) -> f64 {
        match self {
            Product::Urea => quantities.urea_kg,
            Product::Dap => quantities.dap_kg,
            Product::Mop => quantities.mop_kg,
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Product::Urea => write!(f, "Urea"),
            Product::Dap => write!(f, "DAP"),
            Product::Mop => write!(f, "Muriate of Potash"),
        }
    }
}

pub fn check_farm_size(farm_size_ha: f64) -> Result<(), FertiplanError> {
    if !farm_size_ha.is_finite() || farm_size_ha <= 0.0 {
        return Err(FertiplanError::InvalidInput(format!(
            "farm_size_ha must be positive, got {farm_size_ha}"
        )));
    }
    Ok(())
}

/// Convert per-hectare nutrient rates into product kilograms for the whole farm.
pub fn convert_to_products(
    rates: &NutrientRates,
    farm_size_ha: f64,
    fractions: &ProductFractions,
) -> Result<FertilizerQuantities, FertiplanError> {
    check_farm_size(farm_size_ha)?;

    Ok(FertilizerQuantities {
        urea_kg: rates.n_kg_ha / fractions.urea_n_fraction * farm_size_ha,
        dap_kg: rates.p2o5_kg_ha / fractions.dap_p2o5_fraction * farm_size_ha,
        mop_kg: rates.k2o_kg_ha / fractions.mop_k2o_fraction * farm_size_ha,
    })
}
