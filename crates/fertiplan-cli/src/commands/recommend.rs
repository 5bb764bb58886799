use fertiplan_core::calibration::builtin;
use fertiplan_core::calibration::schema::Calibration;
use fertiplan_core::error::FertiplanError;
use fertiplan_core::model::{
    FromLabel, PreviousYieldBracket, RecommendationRequest, SoilColor, SoilTexture,
    TargetYieldBracket, VisualAssessment,
};
use fertiplan_core::normalize::{self, LabValues};
use fertiplan_core::trace::{build_trace, TraceBundle};
use fertiplan_core::RecommendOptions;
use std::path::PathBuf;

use crate::config::CliConfig;
use crate::output;
use crate::RecommendArgs;

pub fn run(args: RecommendArgs, config: &CliConfig) -> Result<(), FertiplanError> {
    let calibration = resolve_calibration(args.calibration.as_ref(), args.preset.as_deref(), config)?;
    tracing::info!(
        calibration = %calibration.name,
        version = %calibration.version,
        "loaded calibration"
    );

    let options = RecommendOptions {
        yield_model: args.yield_model,
    };

    if let Some(ref path) = args.input {
        let json_bytes = std::fs::read(path)?;
        // Records are decoded one by one so a bad record cannot sink the file.
        let records: Vec<serde_json::Value> = serde_json::from_slice(&json_bytes)?;
        tracing::info!(records = records.len(), path = %path.display(), "processing batch");

        let items = fertiplan_core::recommend_batch_json(&records, &calibration, &options);

        let trace = args.trace.then(|| {
            let mut bundle = TraceBundle::default();
            for item in &items {
                if let Some(ref rec) = item.recommendation {
                    let request_id = item
                        .id
                        .clone()
                        .unwrap_or_else(|| format!("req_{}", item.index));
                    bundle.extend(build_trace(&request_id, rec, &calibration));
                }
            }
            bundle
        });

        match args.output.as_str() {
            "json" => output::json::print_batch(&items, trace.as_ref())?,
            _ => output::table::print_batch(&items, trace.as_ref()),
        }
        return Ok(());
    }

    let (request, resolution_warnings) = single_request(&args, &calibration)?;

    let mut rec = fertiplan_core::recommend(&request, &calibration, &options)?;
    if !resolution_warnings.is_empty() {
        let mut warnings = resolution_warnings;
        warnings.append(&mut rec.warnings);
        rec.warnings = warnings;
    }

    let trace = args.trace.then(|| build_trace("req_0", &rec, &calibration));

    match args.output.as_str() {
        "json" => output::json::print(&rec, trace.as_ref())?,
        _ => output::table::print(&rec, &calibration, trace.as_ref()),
    }

    Ok(())
}

/// `--calibration`, then `--preset`, then `FERTIPLAN_CALIBRATION`, then the default preset.
fn resolve_calibration(
    file: Option<&PathBuf>,
    preset: Option<&str>,
    config: &CliConfig,
) -> Result<Calibration, FertiplanError> {
    if let Some(path) = file {
        return fertiplan_core::calibration::load_calibration(path);
    }
    if let Some(name) = preset {
        return builtin::load_preset(name);
    }
    if let Some(ref path) = config.calibration {
        tracing::debug!(path = %path.display(), "using calibration from FERTIPLAN_CALIBRATION");
        return fertiplan_core::calibration::load_calibration(path);
    }
    builtin::default_calibration()
}

/// Build a request from the command line flags. Yields are always resolved to
/// kg/ha here, since a lab sample carries no brackets of its own.
fn single_request(
    args: &RecommendArgs,
    calibration: &Calibration,
) -> Result<(RecommendationRequest, Vec<String>), FertiplanError> {
    let farm_size_ha = args.farm_size.ok_or_else(|| {
        FertiplanError::InvalidInput("--farm-size is required".into())
    })?;

    let previous_bracket = args
        .previous_yield
        .as_deref()
        .map(parse_label::<PreviousYieldBracket>)
        .transpose()?;
    let target_bracket = args
        .target_yield
        .as_deref()
        .map(parse_label::<TargetYieldBracket>)
        .transpose()?;

    let tables = &calibration.visual_estimates;
    let previous_yield_kg_ha = match (args.previous_yield_kg, previous_bracket) {
        (Some(kg), _) => kg,
        (None, Some(bracket)) => normalize::previous_yield_kg_ha(bracket, tables)?,
        (None, None) => {
            return Err(FertiplanError::InvalidInput(
                "give --previous-yield or --previous-yield-kg".into(),
            ))
        }
    };
    let target_yield_kg_ha = match (args.target_yield_kg, target_bracket) {
        (Some(kg), _) => kg,
        (None, Some(bracket)) => normalize::target_yield_kg_ha(bracket, tables)?,
        (None, None) => {
            return Err(FertiplanError::InvalidInput(
                "give --target-yield or --target-yield-kg".into(),
            ))
        }
    };

    let lab = LabValues {
        nitrogen_percent: args.nitrogen,
        phosphorus_ppm: args.phosphorus,
        potassium_ppm: args.potassium,
        ph: args.ph,
    };
    let lab_complete = lab.nitrogen_percent.is_some()
        && lab.phosphorus_ppm.is_some()
        && lab.potassium_ppm.is_some();

    let visual_flags = args.color.is_some() || args.texture.is_some();

    // Complete lab values win, so visual flags are only needed as a fallback.
    let visual = if lab_complete || !visual_flags {
        if lab_complete && visual_flags {
            tracing::debug!("complete lab values given; ignoring soil color and texture");
        }
        None
    } else {
        match (previous_bracket, target_bracket) {
            (Some(previous_yield), Some(target_yield)) => Some(VisualAssessment {
                // Unrecognized labels become None and fall back to the table defaults.
                soil_color: args.color.as_deref().and_then(SoilColor::from_label),
                soil_texture: args.texture.as_deref().and_then(SoilTexture::from_label),
                previous_yield,
                target_yield,
            }),
            _ => {
                return Err(FertiplanError::InvalidInput(
                    "a visual assessment needs --previous-yield and --target-yield brackets".into(),
                ))
            }
        }
    };

    let (input, warnings) = normalize::resolve_input(lab, visual)?;

    Ok((
        RecommendationRequest {
            id: None,
            input,
            previous_yield_kg_ha: Some(previous_yield_kg_ha),
            target_yield_kg_ha: Some(target_yield_kg_ha),
            farm_size_ha,
            latitude: args.latitude,
        },
        warnings,
    ))
}

fn parse_label<T>(label: &str) -> Result<T, FertiplanError>
where
    T: TryFrom<String, Error = String>,
{
    T::try_from(label.to_string()).map_err(FertiplanError::InvalidInput)
}
