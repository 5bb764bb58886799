use crate::calibration::schema::Calibration;
use crate::calibration::validate_calibration;
use crate::error::FertiplanError;

const NG_NORTH_JSON: &str = include_str!("../../../../calibrations/ng-north.json");

/// Available predefined calibrations.
pub const PRESETS: &[&str] = &["ng-north"];

/// Preset used when neither a preset nor a calibration file is given.
pub const DEFAULT_PRESET: &str = "ng-north";

/// Load a predefined calibration by name.
pub fn load_preset(name: &str) -> Result<Calibration, FertiplanError> {
    match name {
        "ng-north" => {
            let calibration: Calibration = serde_json::from_str(NG_NORTH_JSON)?;
            validate_calibration(&calibration)?;
            Ok(calibration)
        }
        _ => Err(FertiplanError::CalibrationInvalid(format!(
            "unknown preset '{}'. Available: {}",
            name,
            PRESETS.join(", ")
        ))),
    }
}

pub fn default_calibration() -> Result<Calibration, FertiplanError> {
    load_preset(DEFAULT_PRESET)
}
