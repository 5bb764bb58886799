use crate::calibration::schema::PlantingCalendar;
use crate::error::FertiplanError;
use crate::recommend::outcome::FertilizerQuantities;
use crate::recommend::products::Product;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Share of the urea applied at planting; the rest is top-dressed.
pub const UREA_SHARE_AT_PLANTING: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationTiming {
    /// 2-3 weeks before planting.
    LandPreparation,
    Planting,
    /// Top-dressing, 6 weeks after planting.
    SixWeeksAfterPlanting,
}

impl fmt::Display for ApplicationTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationTiming::LandPreparation => write!(f, "Land preparation (2-3 weeks before planting)"),
            ApplicationTiming::Planting => write!(f, "At planting"),
            ApplicationTiming::SixWeeksAfterPlanting => write!(f, "6 weeks after planting"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationStep {
    pub timing: ApplicationTiming,
    pub product: Product,
    pub quantity_kg: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationPlan {
    pub steps: Vec<ApplicationStep>,
    pub notes: Vec<String>,
}

impl ApplicationPlan {
    pub fn total_for(&self, product: Product) -> f64 {
        self.steps
            .iter()
            .filter(|s| s.product == product)
            .map(|s| s.quantity_kg)
            .sum()
    }
}

/// Schedule the products: DAP and MOP mixed at land preparation, urea split
/// between planting and top-dressing. Zero quantities are left out.
pub fn build_plan(quantities: &FertilizerQuantities) -> ApplicationPlan {
    let candidates = [
        (ApplicationTiming::LandPreparation, Product::Dap, quantities.dap_kg),
        (ApplicationTiming::LandPreparation, Product::Mop, quantities.mop_kg),
        (
            ApplicationTiming::Planting,
            Product::Urea,
            quantities.urea_kg * UREA_SHARE_AT_PLANTING,
        ),
        (
            ApplicationTiming::SixWeeksAfterPlanting,
            Product::Urea,
            quantities.urea_kg * (1.0 - UREA_SHARE_AT_PLANTING),
        ),
    ];

    let steps = candidates
        .into_iter()
        .filter(|(_, _, kg)| *kg > 0.0)
        .map(|(timing, product, quantity_kg)| ApplicationStep {
            timing,
            product,
            quantity_kg,
        })
        .collect();

    ApplicationPlan {
        steps,
        notes: vec![
            "Apply before expected rainfall; avoid application during heavy rains".into(),
            "Mix DAP and MOP and incorporate during land preparation".into(),
        ],
    }
}

/// Add the planting season note for a site at `latitude` (degrees north).
pub fn add_planting_window(
    plan: &mut ApplicationPlan,
    latitude: f64,
    calendar: &PlantingCalendar,
) -> Result<(), FertiplanError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(FertiplanError::InvalidInput(format!(
            "latitude must be within [-90, 90], got {latitude}"
        )));
    }
    let windows = calendar.windows_for(latitude);
    plan.notes.push(format!(
        "Plant in {} (wet season) or {} (dry season, irrigated)",
        windows.wet_season, windows.dry_season
    ));
    Ok(())
}
