use crate::calibration::schema::Calibration;
use crate::model::{EstimateSource, Limitation, Nutrient};
use crate::recommend::outcome::Recommendation;
use crate::recommend::products::Product;
use serde::{Deserialize, Serialize};

pub const TRACE_SCHEMA_VERSION: &str = "1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceSeverity {
    /// Money is lost and the yield is projected to drop.
    Critical,
    Important,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceStepType {
    EstimateInput,
    ClassifyLimitation,
    ScaleRate,
    ConvertProduct,
    ProjectEconomics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceStep {
    pub step_type: TraceStepType,
    pub message: String,
}

/// How one nutrient went from soil concentration to product kilograms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    pub entry_id: String,
    pub request_id: String,
    pub nutrient: Nutrient,
    pub concentration: f64,
    pub unit: String,
    pub source: EstimateSource,
    pub limitation: Limitation,
    pub rate_kg_ha: f64,
    pub product: Product,
    pub product_kg: f64,
    pub steps: Vec<TraceStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceDecision {
    pub decision_id: String,
    pub request_id: String,
    pub summary: String,
    pub severity: TraceSeverity,
    pub steps: Vec<TraceStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceWarning {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub message: String,
    pub severity: TraceSeverity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceBundle {
    pub trace_schema_version: String,
    pub entries: Vec<TraceEntry>,
    pub decisions: Vec<TraceDecision>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<TraceWarning>,
}

impl Default for TraceBundle {
    fn default() -> Self {
        Self {
            trace_schema_version: TRACE_SCHEMA_VERSION.to_string(),
            entries: Vec::new(),
            decisions: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl TraceBundle {
    /// Append another bundle, e.g. when tracing a batch.
    pub fn extend(&mut self, other: TraceBundle) {
        self.entries.extend(other.entries);
        self.decisions.extend(other.decisions);
        self.warnings.extend(other.warnings);
    }
}

fn product_for(nutrient: Nutrient) -> Product {
    match nutrient {
        Nutrient::Nitrogen => Product::Urea,
        Nutrient::Phosphorus => Product::Dap,
        Nutrient::Potassium => Product::Mop,
    }
}

fn product_fraction(product: Product, calibration: &Calibration) -> f64 {
    let p = &calibration.products;
    match product {
        Product::Urea => p.urea_n_fraction,
        Product::Dap => p.dap_p2o5_fraction,
        Product::Mop => p.mop_k2o_fraction,
    }
}

pub fn build_entry_trace(
    request_id: &str,
    nutrient: Nutrient,
    rec: &Recommendation,
    calibration: &Calibration,
) -> TraceEntry {
    let concentration = rec.soil.concentration(nutrient);
    let unit = nutrient.soil_unit();
    let limitation = rec.limitations.get(nutrient);
    let thresholds = calibration.thresholds.for_nutrient(nutrient);
    let base_rate = calibration
        .base_rates
        .for_nutrient(nutrient)
        .for_tier(limitation);
    let rate = rec.rates.get(nutrient);
    let product = product_for(nutrient);
    let product_kg = product.quantity(&rec.fertilizers);

    TraceEntry {
        entry_id: format!("ent_{}_{}", request_id, nutrient.symbol()),
        request_id: request_id.to_string(),
        nutrient,
        concentration,
        unit: unit.to_string(),
        source: rec.soil.source,
        limitation,
        rate_kg_ha: rate,
        product,
        product_kg,
        steps: vec![
            TraceStep {
                step_type: TraceStepType::EstimateInput,
                message: format!("{} {} {} from {}", nutrient, concentration, unit, rec.soil.source),
            },
            TraceStep {
                step_type: TraceStepType::ClassifyLimitation,
                message: format!(
                    "{} {} against High < {} / Medium < {} -> {} limitation",
                    concentration, unit, thresholds.high_below, thresholds.medium_below, limitation
                ),
            },
            TraceStep {
                step_type: TraceStepType::ScaleRate,
                message: format!(
                    "base {} kg {}/ha x yield factor {:.3} = {:.1} kg/ha",
                    base_rate,
                    nutrient.rate_form(),
                    rec.yield_factor,
                    rate
                ),
            },
            TraceStep {
                step_type: TraceStepType::ConvertProduct,
                message: format!(
                    "{:.1} kg/ha / {} x {} ha = {:.1} kg {}",
                    rate,
                    product_fraction(product, calibration),
                    rec.farm_size_ha,
                    product_kg,
                    product
                ),
            },
        ],
    }
}

pub fn build_economics_decision(request_id: &str, rec: &Recommendation) -> TraceDecision {
    let e = &rec.economics;
    let severity = if e.net_profit < 0.0 && e.yield_increase < 0.0 {
        TraceSeverity::Critical
    } else if e.net_profit < 0.0 {
        TraceSeverity::Important
    } else {
        TraceSeverity::Info
    };

    TraceDecision {
        decision_id: format!("dec_{}_economics", request_id),
        request_id: request_id.to_string(),
        summary: format!(
            "net profit {:.2} USD on {:.2} USD invested ({:.1}% ROI)",
            e.net_profit, e.total_cost, e.roi_percent
        ),
        severity,
        steps: vec![TraceStep {
            step_type: TraceStepType::ProjectEconomics,
            message: format!(
                "{} model: yield {} -> {:.0} kg/ha ({:+.0} kg/ha), break-even at {:.0} kg/ha extra",
                rec.yield_model,
                rec.previous_yield_kg_ha,
                e.expected_yield,
                e.yield_increase,
                e.breakeven_yield_kg_ha
            ),
        }],
    }
}

/// Full derivation trace of one recommendation.
pub fn build_trace(request_id: &str, rec: &Recommendation, calibration: &Calibration) -> TraceBundle {
    TraceBundle {
        entries: Nutrient::ALL
            .iter()
            .map(|n| build_entry_trace(request_id, *n, rec, calibration))
            .collect(),
        decisions: vec![build_economics_decision(request_id, rec)],
        warnings: rec
            .warnings
            .iter()
            .map(|w| TraceWarning {
                request_id: Some(request_id.to_string()),
                message: w.clone(),
                severity: TraceSeverity::Important,
            })
            .collect(),
        ..TraceBundle::default()
    }
}
