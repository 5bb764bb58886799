pub mod calibration;
pub mod error;
pub mod model;
pub mod normalize;
pub mod plan;
pub mod recommend;
pub mod trace;

use calibration::schema::Calibration;
use error::FertiplanError;
use model::{RecommendationRequest, SoilInput};
use recommend::outcome::{BatchItem, Recommendation};
use recommend::products::check_farm_size;
use recommend::YieldModel;

/// Options controlling how a recommendation is computed.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendOptions {
    /// Strategy used for the expected yield in the economic projection.
    pub yield_model: YieldModel,
}

/// Main API entry point: turn one soil input into a fertilizer recommendation.
///
/// Runs normalize -> classify -> rates -> products -> economics. Lab values
/// always take precedence over visual estimation because `SoilInput` holds
/// exactly one source.
pub fn compute_recommendation(
    input: &SoilInput,
    previous_yield_kg_ha: f64,
    target_yield_kg_ha: f64,
    farm_size_ha: f64,
    calibration: &Calibration,
    options: &RecommendOptions,
) -> Result<Recommendation, FertiplanError> {
    check_farm_size(farm_size_ha)?;
    if !target_yield_kg_ha.is_finite() || target_yield_kg_ha <= 0.0 {
        return Err(FertiplanError::InvalidInput(format!(
            "target_yield_kg_ha must be positive, got {target_yield_kg_ha}"
        )));
    }
    if !previous_yield_kg_ha.is_finite() || previous_yield_kg_ha < 0.0 {
        return Err(FertiplanError::InvalidInput(format!(
            "previous_yield_kg_ha must not be negative, got {previous_yield_kg_ha}"
        )));
    }

    let normalized = normalize::normalize(input, calibration)?;
    let soil = normalized.estimate;
    tracing::debug!(
        source = %soil.source,
        n = soil.nitrogen_percent,
        p = soil.phosphorus_ppm,
        k = soil.potassium_ppm,
        "normalized soil input"
    );

    let limitations = recommend::classify(&soil, &calibration.thresholds);
    tracing::debug!(
        n = %limitations.nitrogen,
        p = %limitations.phosphorus,
        k = %limitations.potassium,
        "classified limitations"
    );

    let factor = recommend::yield_factor(target_yield_kg_ha, &calibration.yield_scaling);
    let rates = recommend::calculate_rates(&limitations, factor, &calibration.base_rates);
    tracing::debug!(
        yield_factor = factor,
        n_kg_ha = rates.n_kg_ha,
        p2o5_kg_ha = rates.p2o5_kg_ha,
        k2o_kg_ha = rates.k2o_kg_ha,
        "calculated rates"
    );

    let fertilizers = recommend::convert_to_products(&rates, farm_size_ha, &calibration.products)?;

    let model = options.yield_model.strategy(calibration, target_yield_kg_ha);
    let economics = recommend::project_economics(
        &rates,
        farm_size_ha,
        previous_yield_kg_ha,
        model.as_ref(),
        &calibration.prices,
    );

    Ok(Recommendation {
        id: None,
        soil,
        limitations,
        yield_factor: factor,
        rates,
        fertilizers,
        economics,
        yield_model: options.yield_model,
        application_plan: plan::build_plan(&fertilizers),
        farm_size_ha,
        previous_yield_kg_ha,
        target_yield_kg_ha,
        warnings: normalized.warnings,
    })
}

/// Compute a recommendation for a submitted record, filling in yields from
/// the visual assessment's brackets when they are not given explicitly.
pub fn recommend(
    request: &RecommendationRequest,
    calibration: &Calibration,
    options: &RecommendOptions,
) -> Result<Recommendation, FertiplanError> {
    let (previous, target) = resolve_yields(request, calibration)?;
    let mut recommendation = compute_recommendation(
        &request.input,
        previous,
        target,
        request.farm_size_ha,
        calibration,
        options,
    )?;
    recommendation.id = request.id.clone();

    if let Some(latitude) = request.latitude {
        match calibration.planting_calendar {
            Some(ref calendar) => plan::add_planting_window(
                &mut recommendation.application_plan,
                latitude,
                calendar,
            )?,
            None => tracing::debug!(latitude, "calibration has no planting calendar"),
        }
    }

    Ok(recommendation)
}

/// Process records independently. A failing record is reported in its
/// `BatchItem` and does not stop the rest.
pub fn recommend_batch(
    requests: &[RecommendationRequest],
    calibration: &Calibration,
    options: &RecommendOptions,
) -> Vec<BatchItem> {
    requests
        .iter()
        .enumerate()
        .map(|(index, request)| {
            batch_item(
                index,
                request.id.clone(),
                recommend(request, calibration, options),
            )
        })
        .collect()
}

/// Like [`recommend_batch`], for records not yet decoded. A record that does
/// not decode (unknown bracket label, missing field) fails on its own as
/// invalid input.
pub fn recommend_batch_json(
    records: &[serde_json::Value],
    calibration: &Calibration,
    options: &RecommendOptions,
) -> Vec<BatchItem> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let id = record
                .get("id")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string);
            let result = serde_json::from_value::<RecommendationRequest>(record.clone())
                .map_err(|e| FertiplanError::InvalidInput(format!("malformed record: {e}")))
                .and_then(|request| recommend(&request, calibration, options));
            batch_item(index, id, result)
        })
        .collect()
}

fn batch_item(
    index: usize,
    id: Option<String>,
    result: Result<Recommendation, FertiplanError>,
) -> BatchItem {
    match result {
        Ok(recommendation) => BatchItem {
            index,
            id,
            recommendation: Some(recommendation),
            error: None,
        },
        Err(e) => {
            tracing::warn!(index, id = ?id, error = %e, "record skipped");
            BatchItem {
                index,
                id,
                recommendation: None,
                error: Some(e.to_string()),
            }
        }
    }
}

fn resolve_yields(
    request: &RecommendationRequest,
    calibration: &Calibration,
) -> Result<(f64, f64), FertiplanError> {
    let tables = &calibration.visual_estimates;
    let visual = request.input.visual();

    let previous = match (request.previous_yield_kg_ha, visual) {
        (Some(kg), _) => kg,
        (None, Some(v)) => normalize::previous_yield_kg_ha(v.previous_yield, tables)?,
        (None, None) => {
            return Err(FertiplanError::InvalidInput(
                "previous_yield_kg_ha is required for lab input".into(),
            ))
        }
    };

    let target = match (request.target_yield_kg_ha, visual) {
        (Some(kg), _) => kg,
        (None, Some(v)) => normalize::target_yield_kg_ha(v.target_yield, tables)?,
        (None, None) => {
            return Err(FertiplanError::InvalidInput(
                "target_yield_kg_ha is required for lab input".into(),
            ))
        }
    };

    Ok((previous, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::builtin::default_calibration;
    use crate::model::{
        Limitation, PreviousYieldBracket, SoilColor, SoilSample, SoilTexture, TargetYieldBracket,
        VisualAssessment,
    };

    fn lab(n: f64, p: f64, k: f64) -> SoilInput {
        SoilInput::Lab(SoilSample::new(n, p, k, None).unwrap())
    }

    fn visual() -> SoilInput {
        SoilInput::Visual(VisualAssessment {
            soil_color: Some(SoilColor::VeryDarkBrown),
            soil_texture: Some(SoilTexture::Clay),
            previous_yield: PreviousYieldBracket::OneToTwoTons,
            target_yield: TargetYieldBracket::FourTons,
        })
    }

    #[test]
    fn test_zero_target_yield_rejected() {
        let c = default_calibration().unwrap();
        let err = compute_recommendation(
            &lab(1.2, 15.0, 180.0),
            1500.0,
            0.0,
            2.0,
            &c,
            &RecommendOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, FertiplanError::InvalidInput(_)));
    }

    #[test]
    fn test_negative_previous_yield_rejected() {
        let c = default_calibration().unwrap();
        assert!(compute_recommendation(
            &lab(1.2, 15.0, 180.0),
            -1.0,
            3000.0,
            2.0,
            &c,
            &RecommendOptions::default(),
        )
        .is_err());
    }

    #[test]
    fn test_request_with_visual_brackets() {
        let c = default_calibration().unwrap();
        let request = RecommendationRequest {
            id: Some("farmer-7".into()),
            input: visual(),
            previous_yield_kg_ha: None,
            target_yield_kg_ha: None,
            farm_size_ha: 1.0,
            latitude: None,
        };
        let rec = recommend(&request, &c, &RecommendOptions::default()).unwrap();
        assert_eq!(rec.id.as_deref(), Some("farmer-7"));
        assert_eq!(rec.previous_yield_kg_ha, 1500.0);
        assert_eq!(rec.target_yield_kg_ha, 4000.0);
        assert_eq!(rec.limitations.nitrogen, Limitation::Low);
    }

    #[test]
    fn test_explicit_yields_override_brackets() {
        let c = default_calibration().unwrap();
        let request = RecommendationRequest {
            id: None,
            input: visual(),
            previous_yield_kg_ha: Some(2000.0),
            target_yield_kg_ha: Some(3000.0),
            farm_size_ha: 1.0,
            latitude: None,
        };
        let rec = recommend(&request, &c, &RecommendOptions::default()).unwrap();
        assert_eq!(rec.previous_yield_kg_ha, 2000.0);
        assert_eq!(rec.yield_factor, 1.0);
    }

    #[test]
    fn test_lab_request_requires_yields() {
        let c = default_calibration().unwrap();
        let request = RecommendationRequest {
            id: None,
            input: lab(1.2, 15.0, 180.0),
            previous_yield_kg_ha: None,
            target_yield_kg_ha: Some(3000.0),
            farm_size_ha: 1.0,
            latitude: None,
        };
        let err = recommend(&request, &c, &RecommendOptions::default()).unwrap_err();
        assert!(err.to_string().contains("previous_yield_kg_ha"));
    }

    #[test]
    fn test_batch_keeps_going_after_bad_record() {
        let c = default_calibration().unwrap();
        let good = RecommendationRequest {
            id: Some("a".into()),
            input: visual(),
            previous_yield_kg_ha: None,
            target_yield_kg_ha: None,
            farm_size_ha: 2.0,
            latitude: None,
        };
        let bad = RecommendationRequest {
            id: Some("b".into()),
            farm_size_ha: 0.0,
            ..good.clone()
        };
        let items = recommend_batch(
            &[good.clone(), bad, good],
            &c,
            &RecommendOptions::default(),
        );
        assert_eq!(items.len(), 3);
        assert!(items[0].recommendation.is_some());
        assert!(items[1].recommendation.is_none());
        assert!(items[1].error.as_deref().unwrap().contains("farm_size_ha"));
        assert_eq!(items[1].id.as_deref(), Some("b"));
        assert_eq!(items[2].index, 2);
        assert_eq!(items[0].recommendation, items[2].recommendation);
    }

    #[test]
    fn test_latitude_adds_planting_window() {
        let c = default_calibration().unwrap();
        let request = RecommendationRequest {
            id: None,
            input: visual(),
            previous_yield_kg_ha: None,
            target_yield_kg_ha: None,
            farm_size_ha: 1.0,
            latitude: Some(12.5),
        };
        let rec = recommend(&request, &c, &RecommendOptions::default()).unwrap();
        let notes = &rec.application_plan.notes;
        assert!(notes.last().unwrap().contains("May-June"));

        let without = recommend(
            &RecommendationRequest {
                latitude: None,
                ..request.clone()
            },
            &c,
            &RecommendOptions::default(),
        )
        .unwrap();
        assert_eq!(without.application_plan.notes.len() + 1, notes.len());
    }

    #[test]
    fn test_json_batch_isolates_undecodable_record() {
        let c = default_calibration().unwrap();
        let records: Vec<serde_json::Value> = serde_json::from_str(
            r#"[
                { "id": "ok", "input": { "visual": { "soil_color": "Brown", "soil_texture": "Sandy",
                  "previous_yield": "1-2 tons", "target_yield": "3 tons/ha" } }, "farm_size_ha": 1 },
                { "id": "bad", "input": { "visual": { "soil_color": "Brown", "soil_texture": "Sandy",
                  "previous_yield": "lots", "target_yield": "3 tons/ha" } }, "farm_size_ha": 1 },
                { "input": { "lab": { "nitrogen_percent": 1.2, "phosphorus_ppm": 15, "potassium_ppm": 180 } },
                  "previous_yield_kg_ha": 1500, "target_yield_kg_ha": 3000 }
            ]"#,
        )
        .unwrap();

        let items = recommend_batch_json(&records, &c, &RecommendOptions::default());

        assert_eq!(items.len(), 3);
        assert!(items[0].recommendation.is_some());
        assert_eq!(items[1].id.as_deref(), Some("bad"));
        assert!(items[1].recommendation.is_none());
        let err = items[1].error.as_deref().unwrap();
        assert!(err.starts_with("invalid input"));
        assert!(err.contains("lots"));
        assert_eq!(items[2].index, 2);
        assert!(items[2].error.as_deref().unwrap().contains("farm_size_ha"));
    }

    #[test]
    fn test_mitscherlich_option_changes_expected_yield() {
        let c = default_calibration().unwrap();
        let input = lab(0.8, 10.0, 100.0);
        let linear =
            compute_recommendation(&input, 1500.0, 3000.0, 1.0, &c, &RecommendOptions::default())
                .unwrap();
        let options = RecommendOptions {
            yield_model: YieldModel::Mitscherlich,
        };
        let curve = compute_recommendation(&input, 1500.0, 3000.0, 1.0, &c, &options).unwrap();
        assert_eq!(linear.rates, curve.rates);
        assert_eq!(linear.economics.total_cost, curve.economics.total_cost);
        assert_ne!(
            linear.economics.expected_yield,
            curve.economics.expected_yield
        );
        assert_eq!(curve.yield_model, YieldModel::Mitscherlich);
    }
}
