pub mod builtin;
pub mod schema;

use crate::error::FertiplanError;
use crate::model::{PreviousYieldBracket, TargetYieldBracket};
use schema::{Calibration, ThresholdPair, TierRates};
use std::path::Path;

/// Load a calibration from a JSON file.
pub fn load_calibration(path: &Path) -> Result<Calibration, FertiplanError> {
    let content = std::fs::read_to_string(path).map_err(|e| FertiplanError::CalibrationLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_calibration(&content, path)
}

/// Parse a calibration from a JSON string.
pub fn parse_calibration(json: &str, source: &Path) -> Result<Calibration, FertiplanError> {
    let calibration: Calibration =
        serde_json::from_str(json).map_err(|e| FertiplanError::CalibrationLoad {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_calibration(&calibration)?;
    Ok(calibration)
}

/// Parse a calibration from a JSON string (no file path context).
pub fn parse_calibration_str(json: &str) -> Result<Calibration, FertiplanError> {
    let calibration: Calibration = serde_json::from_str(json).map_err(FertiplanError::Json)?;
    validate_calibration(&calibration)?;
    Ok(calibration)
}

fn invalid(msg: String) -> FertiplanError {
    FertiplanError::CalibrationInvalid(msg)
}

fn check_positive(name: &str, value: f64) -> Result<(), FertiplanError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(format!("{name} must be positive, got {value}")));
    }
    Ok(())
}

fn check_non_negative(name: &str, value: f64) -> Result<(), FertiplanError> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(format!("{name} must not be negative, got {value}")));
    }
    Ok(())
}

fn check_thresholds(name: &str, pair: &ThresholdPair) -> Result<(), FertiplanError> {
    check_non_negative(&format!("thresholds.{name}.high_below"), pair.high_below)?;
    check_non_negative(&format!("thresholds.{name}.medium_below"), pair.medium_below)?;
    if pair.high_below > pair.medium_below {
        return Err(invalid(format!(
            "thresholds.{name}: high_below ({}) exceeds medium_below ({})",
            pair.high_below, pair.medium_below
        )));
    }
    Ok(())
}

/// Rates must not drop as the limitation gets more severe.
fn check_tier_rates(name: &str, rates: &TierRates) -> Result<(), FertiplanError> {
    check_non_negative(&format!("base_rates.{name}.high"), rates.high)?;
    check_non_negative(&format!("base_rates.{name}.medium"), rates.medium)?;
    check_non_negative(&format!("base_rates.{name}.low"), rates.low)?;
    if rates.high < rates.medium || rates.medium < rates.low {
        return Err(invalid(format!(
            "base_rates.{name} must satisfy high >= medium >= low (got {}, {}, {})",
            rates.high, rates.medium, rates.low
        )));
    }
    Ok(())
}

fn check_fraction(name: &str, value: f64) -> Result<(), FertiplanError> {
    if !value.is_finite() || value <= 0.0 || value > 1.0 {
        return Err(invalid(format!(
            "products.{name} must be within (0, 1], got {value}"
        )));
    }
    Ok(())
}

/// Validate that a calibration is well-formed.
pub fn validate_calibration(calibration: &Calibration) -> Result<(), FertiplanError> {
    if calibration.name.trim().is_empty() {
        return Err(invalid("name must not be empty".into()));
    }
    if calibration.version.trim().is_empty() {
        return Err(invalid("version must not be empty".into()));
    }

    let t = &calibration.thresholds;
    check_thresholds("nitrogen_percent", &t.nitrogen_percent)?;
    check_thresholds("phosphorus_ppm", &t.phosphorus_ppm)?;
    check_thresholds("potassium_ppm", &t.potassium_ppm)?;

    let r = &calibration.base_rates;
    check_tier_rates("n", &r.n)?;
    check_tier_rates("p2o5", &r.p2o5)?;
    check_tier_rates("k2o", &r.k2o)?;

    check_positive(
        "yield_scaling.reference_yield_kg_ha",
        calibration.yield_scaling.reference_yield_kg_ha,
    )?;
    check_positive("yield_scaling.max_factor", calibration.yield_scaling.max_factor)?;

    let p = &calibration.products;
    check_fraction("urea_n_fraction", p.urea_n_fraction)?;
    check_fraction("dap_p2o5_fraction", p.dap_p2o5_fraction)?;
    check_fraction("mop_k2o_fraction", p.mop_k2o_fraction)?;

    let prices = &calibration.prices;
    check_non_negative("prices.n_usd_per_kg", prices.n_usd_per_kg)?;
    check_non_negative("prices.p2o5_usd_per_kg", prices.p2o5_usd_per_kg)?;
    check_non_negative("prices.k2o_usd_per_kg", prices.k2o_usd_per_kg)?;
    check_positive("prices.crop_usd_per_kg", prices.crop_usd_per_kg)?;

    let response = &calibration.yield_response;
    check_positive(
        "yield_response.capped_linear.ceiling_multiplier",
        response.capped_linear.ceiling_multiplier,
    )?;
    let potential = response.mitscherlich.potential_multiplier;
    if !potential.is_finite() || potential < 1.0 {
        return Err(invalid(format!(
            "yield_response.mitscherlich.potential_multiplier must be at least 1, got {potential}"
        )));
    }
    let decay = &response.mitscherlich.decay;
    check_positive("yield_response.mitscherlich.decay.n", decay.n)?;
    check_positive("yield_response.mitscherlich.decay.p", decay.p)?;
    check_positive("yield_response.mitscherlich.decay.k", decay.k)?;

    let v = &calibration.visual_estimates;
    for (color, n) in &v.color_nitrogen_percent {
        check_non_negative(&format!("visual_estimates.color_nitrogen_percent.{color}"), *n)?;
    }
    check_non_negative(
        "visual_estimates.default_nitrogen_percent",
        v.default_nitrogen_percent,
    )?;
    for (texture, pk) in v
        .texture_phosphorus_potassium
        .iter()
        .map(|(t, pk)| (t.to_string(), pk))
        .chain(std::iter::once((
            "default".to_string(),
            &v.default_phosphorus_potassium,
        )))
    {
        check_non_negative(
            &format!("visual_estimates.{texture}.phosphorus_ppm"),
            pk.phosphorus_ppm,
        )?;
        check_non_negative(
            &format!("visual_estimates.{texture}.potassium_ppm"),
            pk.potassium_ppm,
        )?;
    }

    for bracket in PreviousYieldBracket::ALL {
        match v.previous_yield_kg_ha.get(&bracket) {
            Some(kg) => check_positive(&format!("previous yield for '{bracket}'"), *kg)?,
            None => {
                return Err(invalid(format!(
                    "visual_estimates.previous_yield_kg_ha is missing bracket '{bracket}'"
                )))
            }
        }
    }
    for bracket in TargetYieldBracket::ALL {
        match v.target_yield_kg_ha.get(&bracket) {
            Some(kg) => check_positive(&format!("target yield for '{bracket}'"), *kg)?,
            None => {
                return Err(invalid(format!(
                    "visual_estimates.target_yield_kg_ha is missing bracket '{bracket}'"
                )))
            }
        }
    }

    if let Some(ref calendar) = calibration.planting_calendar {
        if !calendar.northern_above_latitude.is_finite() {
            return Err(invalid(
                "planting_calendar.northern_above_latitude must be a finite number".into(),
            ));
        }
        for (name, windows) in [
            ("northern", &calendar.northern),
            ("southern", &calendar.southern),
        ] {
            if windows.wet_season.trim().is_empty() || windows.dry_season.trim().is_empty() {
                return Err(invalid(format!(
                    "planting_calendar.{name} needs both wet_season and dry_season"
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PRESET: &str = include_str!("../../../../calibrations/ng-north.json");

    fn preset_value() -> serde_json::Value {
        serde_json::from_str(PRESET).unwrap()
    }

    fn parse_value(value: serde_json::Value) -> Result<Calibration, FertiplanError> {
        parse_calibration_str(&value.to_string())
    }

    #[test]
    fn test_parse_valid_calibration() {
        let c = parse_calibration_str(PRESET).unwrap();
        assert_eq!(c.version, "2.0.0");
        assert_eq!(c.yield_scaling.reference_yield_kg_ha, 3000.0);
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let mut v = preset_value();
        v["thresholds"]["phosphorus_ppm"]["high_below"] = 30.into();
        assert!(matches!(
            parse_value(v),
            Err(FertiplanError::CalibrationInvalid(_))
        ));
    }

    #[test]
    fn test_non_monotone_rates_rejected() {
        let mut v = preset_value();
        v["base_rates"]["n"]["low"] = 90.into();
        assert!(parse_value(v).is_err());
    }

    #[test]
    fn test_fraction_out_of_range_rejected() {
        let mut v = preset_value();
        v["products"]["urea_n_fraction"] = 0.into();
        assert!(parse_value(v).is_err());

        let mut v = preset_value();
        v["products"]["mop_k2o_fraction"] = 1.5.into();
        assert!(parse_value(v).is_err());
    }

    #[test]
    fn test_missing_yield_bracket_rejected() {
        let mut v = preset_value();
        v["visual_estimates"]["target_yield_kg_ha"]
            .as_object_mut()
            .unwrap()
            .remove("5t");
        let err = parse_value(v).unwrap_err();
        assert!(err.to_string().contains("5 tons/ha"));
    }

    #[test]
    fn test_partial_color_table_allowed() {
        let mut v = preset_value();
        v["visual_estimates"]["color_nitrogen_percent"]
            .as_object_mut()
            .unwrap()
            .remove("red");
        let c = parse_value(v).unwrap();
        assert_eq!(c.visual_estimates.color_nitrogen_percent.len(), 5);
    }

    #[test]
    fn test_unknown_color_key_rejected() {
        let mut v = preset_value();
        v["visual_estimates"]["color_nitrogen_percent"]["purple"] = 1.0.into();
        assert!(matches!(parse_value(v), Err(FertiplanError::Json(_))));
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut v = preset_value();
        v["prices"]["k2o_usd_per_kg"] = (-1.0).into();
        assert!(parse_value(v).is_err());
    }

    #[test]
    fn test_planting_calendar_is_optional() {
        let mut v = preset_value();
        v.as_object_mut().unwrap().remove("planting_calendar");
        let c = parse_value(v).unwrap();
        assert!(c.planting_calendar.is_none());
    }

    #[test]
    fn test_blank_season_window_rejected() {
        let mut v = preset_value();
        v["planting_calendar"]["southern"]["dry_season"] = " ".into();
        let err = parse_value(v).unwrap_err();
        assert!(err.to_string().contains("planting_calendar.southern"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PRESET.as_bytes()).unwrap();
        let c = load_calibration(file.path()).unwrap();
        assert_eq!(c.name, "Northern Nigeria maize");
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        match load_calibration(&path) {
            Err(FertiplanError::CalibrationLoad { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected CalibrationLoad, got {other:?}"),
        }
    }
}
