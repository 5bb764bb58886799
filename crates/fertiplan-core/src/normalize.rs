use crate::calibration::schema::{Calibration, VisualEstimates};
use crate::error::FertiplanError;
use crate::model::{
    EstimateSource, NutrientEstimate, PreviousYieldBracket, SoilInput, SoilSample,
    TargetYieldBracket, VisualAssessment,
};
use serde::{Deserialize, Serialize};

/// Lab fields as they arrive from a form or an uploaded record, possibly incomplete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LabValues {
    pub nitrogen_percent: Option<f64>,
    pub phosphorus_ppm: Option<f64>,
    pub potassium_ppm: Option<f64>,
    pub ph: Option<f64>,
}

impl LabValues {
    pub fn is_empty(&self) -> bool {
        self.nitrogen_percent.is_none()
            && self.phosphorus_ppm.is_none()
            && self.potassium_ppm.is_none()
    }

    fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.nitrogen_percent.is_none() {
            missing.push("nitrogen_percent");
        }
        if self.phosphorus_ppm.is_none() {
            missing.push("phosphorus_ppm");
        }
        if self.potassium_ppm.is_none() {
            missing.push("potassium_ppm");
        }
        missing
    }
}

/// Pick the soil input source. Complete lab values always win over a visual
/// assessment; incomplete lab values fall back to the assessment.
pub fn resolve_input(
    lab: LabValues,
    visual: Option<VisualAssessment>,
) -> Result<(SoilInput, Vec<String>), FertiplanError> {
    if let (Some(n), Some(p), Some(k)) = (lab.nitrogen_percent, lab.phosphorus_ppm, lab.potassium_ppm)
    {
        let sample = SoilSample::new(n, p, k, lab.ph)?;
        return Ok((SoilInput::Lab(sample), Vec::new()));
    }

    match visual {
        Some(assessment) => {
            let mut warnings = Vec::new();
            if !lab.is_empty() {
                let msg = format!(
                    "incomplete lab values (missing {}); using visual assessment",
                    lab.missing().join(", ")
                );
                tracing::warn!("{msg}");
                warnings.push(msg);
            }
            Ok((SoilInput::Visual(assessment), warnings))
        }
        None if lab.is_empty() => Err(FertiplanError::InvalidInput(
            "no soil input: supply complete lab values or a visual assessment".into(),
        )),
        None => Err(FertiplanError::InvalidInput(format!(
            "incomplete lab sample (missing {}) and no visual assessment to fall back on",
            lab.missing().join(", ")
        ))),
    }
}

/// Nutrient estimate plus any lookup fallbacks taken while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedInput {
    pub estimate: NutrientEstimate,
    pub warnings: Vec<String>,
}

/// Turn either input source into N %, P ppm and K ppm.
pub fn normalize(
    input: &SoilInput,
    calibration: &Calibration,
) -> Result<NormalizedInput, FertiplanError> {
    match input {
        SoilInput::Lab(sample) => {
            sample.validate()?;
            Ok(NormalizedInput {
                estimate: NutrientEstimate {
                    nitrogen_percent: sample.nitrogen_percent,
                    phosphorus_ppm: sample.phosphorus_ppm,
                    potassium_ppm: sample.potassium_ppm,
                    ph: sample.ph,
                    source: EstimateSource::Lab,
                },
                warnings: Vec::new(),
            })
        }
        SoilInput::Visual(assessment) => Ok(estimate_from_visual(
            assessment,
            &calibration.visual_estimates,
        )),
    }
}

/// Estimate concentrations from soil color and texture.
///
/// Unrecognized or missing categories use the table defaults and record a warning.
pub fn estimate_from_visual(
    assessment: &VisualAssessment,
    tables: &VisualEstimates,
) -> NormalizedInput {
    let mut warnings = Vec::new();

    let nitrogen_percent = match assessment
        .soil_color
        .and_then(|c| tables.color_nitrogen_percent.get(&c))
    {
        Some(n) => *n,
        None => {
            let msg = match assessment.soil_color {
                Some(color) => format!(
                    "no nitrogen estimate for soil color '{color}'; using default {}%",
                    tables.default_nitrogen_percent
                ),
                None => format!(
                    "soil color not recognized; using default nitrogen estimate {}%",
                    tables.default_nitrogen_percent
                ),
            };
            tracing::warn!("{msg}");
            warnings.push(msg);
            tables.default_nitrogen_percent
        }
    };

    let pk = match assessment
        .soil_texture
        .and_then(|t| tables.texture_phosphorus_potassium.get(&t))
    {
        Some(pk) => *pk,
        None => {
            let d = tables.default_phosphorus_potassium;
            let msg = match assessment.soil_texture {
                Some(texture) => format!(
                    "no P/K estimate for soil texture '{texture}'; using defaults P {} ppm, K {} ppm",
                    d.phosphorus_ppm, d.potassium_ppm
                ),
                None => format!(
                    "soil texture not recognized; using defaults P {} ppm, K {} ppm",
                    d.phosphorus_ppm, d.potassium_ppm
                ),
            };
            tracing::warn!("{msg}");
            warnings.push(msg);
            d
        }
    };

    NormalizedInput {
        estimate: NutrientEstimate {
            nitrogen_percent,
            phosphorus_ppm: pk.phosphorus_ppm,
            potassium_ppm: pk.potassium_ppm,
            ph: None,
            source: EstimateSource::Visual,
        },
        warnings,
    }
}

pub fn previous_yield_kg_ha(
    bracket: PreviousYieldBracket,
    tables: &VisualEstimates,
) -> Result<f64, FertiplanError> {
    tables.previous_yield_kg_ha.get(&bracket).copied().ok_or_else(|| {
        FertiplanError::CalibrationInvalid(format!("no yield for previous yield bracket '{bracket}'"))
    })
}

pub fn target_yield_kg_ha(
    bracket: TargetYieldBracket,
    tables: &VisualEstimates,
) -> Result<f64, FertiplanError> {
    tables.target_yield_kg_ha.get(&bracket).copied().ok_or_else(|| {
        FertiplanError::CalibrationInvalid(format!("no yield for target yield bracket '{bracket}'"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::builtin::default_calibration;
    use crate::model::{SoilColor, SoilTexture};

    fn assessment(color: Option<SoilColor>, texture: Option<SoilTexture>) -> VisualAssessment {
        VisualAssessment {
            soil_color: color,
            soil_texture: texture,
            previous_yield: PreviousYieldBracket::OneToTwoTons,
            target_yield: TargetYieldBracket::FourTons,
        }
    }

    #[test]
    fn test_lab_values_pass_through() {
        let c = default_calibration().unwrap();
        let input = SoilInput::Lab(SoilSample::new(1.2, 15.0, 180.0, Some(6.2)).unwrap());
        let out = normalize(&input, &c).unwrap();
        assert_eq!(out.estimate.nitrogen_percent, 1.2);
        assert_eq!(out.estimate.phosphorus_ppm, 15.0);
        assert_eq!(out.estimate.potassium_ppm, 180.0);
        assert_eq!(out.estimate.ph, Some(6.2));
        assert_eq!(out.estimate.source, EstimateSource::Lab);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_lab_sample_bypassing_constructor_is_validated() {
        let c = default_calibration().unwrap();
        let input = SoilInput::Lab(SoilSample {
            nitrogen_percent: 1.0,
            phosphorus_ppm: -5.0,
            potassium_ppm: 100.0,
            ph: None,
        });
        assert!(matches!(
            normalize(&input, &c),
            Err(FertiplanError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_visual_lookup() {
        let c = default_calibration().unwrap();
        let out = estimate_from_visual(
            &assessment(Some(SoilColor::VeryDarkBrown), Some(SoilTexture::Clay)),
            &c.visual_estimates,
        );
        assert_eq!(out.estimate.nitrogen_percent, 2.0);
        assert_eq!(out.estimate.phosphorus_ppm, 25.0);
        assert_eq!(out.estimate.potassium_ppm, 250.0);
        assert_eq!(out.estimate.source, EstimateSource::Visual);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_unknown_categories_use_defaults_with_warnings() {
        let c = default_calibration().unwrap();
        let out = estimate_from_visual(&assessment(None, None), &c.visual_estimates);
        assert_eq!(out.estimate.nitrogen_percent, 1.2);
        assert_eq!(out.estimate.phosphorus_ppm, 15.0);
        assert_eq!(out.estimate.potassium_ppm, 150.0);
        assert_eq!(out.warnings.len(), 2);
        assert!(out.warnings[0].contains("soil color"));
        assert!(out.warnings[1].contains("soil texture"));
    }

    #[test]
    fn test_color_missing_from_table_uses_default() {
        let mut c = default_calibration().unwrap();
        c.visual_estimates.color_nitrogen_percent.remove(&SoilColor::Red);
        let out = estimate_from_visual(
            &assessment(Some(SoilColor::Red), Some(SoilTexture::Loamy)),
            &c.visual_estimates,
        );
        assert_eq!(out.estimate.nitrogen_percent, 1.2);
        assert_eq!(out.estimate.phosphorus_ppm, 20.0);
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("Red"));
    }

    #[test]
    fn test_resolve_complete_lab_wins_over_visual() {
        let lab = LabValues {
            nitrogen_percent: Some(0.5),
            phosphorus_ppm: Some(10.0),
            potassium_ppm: Some(100.0),
            ph: None,
        };
        let visual = assessment(Some(SoilColor::Brown), Some(SoilTexture::Sandy));
        let (input, warnings) = resolve_input(lab, Some(visual)).unwrap();
        assert!(matches!(input, SoilInput::Lab(s) if s.nitrogen_percent == 0.5));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_resolve_incomplete_lab_falls_back_to_visual() {
        let lab = LabValues {
            nitrogen_percent: Some(0.5),
            ..LabValues::default()
        };
        let visual = assessment(Some(SoilColor::Brown), Some(SoilTexture::Sandy));
        let (input, warnings) = resolve_input(lab, Some(visual)).unwrap();
        assert!(matches!(input, SoilInput::Visual(_)));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("phosphorus_ppm, potassium_ppm"));
    }

    #[test]
    fn test_resolve_without_any_source_fails() {
        let err = resolve_input(LabValues::default(), None).unwrap_err();
        assert!(matches!(err, FertiplanError::InvalidInput(_)));
    }

    #[test]
    fn test_resolve_incomplete_lab_without_visual_fails() {
        let lab = LabValues {
            nitrogen_percent: Some(1.0),
            phosphorus_ppm: Some(10.0),
            ..LabValues::default()
        };
        let err = resolve_input(lab, None).unwrap_err();
        assert!(err.to_string().contains("potassium_ppm"));
    }

    #[test]
    fn test_resolve_rejects_out_of_range_ph() {
        let lab = LabValues {
            nitrogen_percent: Some(1.0),
            phosphorus_ppm: Some(10.0),
            potassium_ppm: Some(100.0),
            ph: Some(10.5),
        };
        assert!(resolve_input(lab, None).is_err());
    }

    #[test]
    fn test_bracket_yields() {
        let c = default_calibration().unwrap();
        let v = &c.visual_estimates;
        assert_eq!(
            previous_yield_kg_ha(PreviousYieldBracket::OneToTwoTons, v).unwrap(),
            1500.0
        );
        assert_eq!(
            target_yield_kg_ha(TargetYieldBracket::FourTons, v).unwrap(),
            4000.0
        );
    }
}
