use fertiplan_core::calibration::builtin;
use fertiplan_core::calibration::schema::Calibration;
use fertiplan_core::error::FertiplanError;
use fertiplan_core::model::{
    Limitation, Nutrient, PreviousYieldBracket, SoilColor, SoilTexture, TargetYieldBracket,
};
use std::path::Path;

pub fn list() -> Result<(), FertiplanError> {
    println!("Available predefined calibrations:\n");
    for name in builtin::PRESETS {
        let c = builtin::load_preset(name)?;
        let crop = match c.crop.as_deref() {
            Some(crop) => format!(" [{}]", crop),
            None => String::new(),
        };
        let default_marker = if *name == builtin::DEFAULT_PRESET {
            " (default)"
        } else {
            ""
        };
        println!("  {:<10} {} (v{}){}{}", name, c.name, c.version, crop, default_marker);
        if let Some(ref desc) = c.description {
            println!("             {}", desc);
        }
        println!();
    }
    Ok(())
}

pub fn explain(preset: &str) -> Result<(), FertiplanError> {
    let c = builtin::load_preset(preset)?;

    println!("{} (version {})\n", c.name, c.version);
    if let Some(ref desc) = c.description {
        println!("{}\n", desc);
    }

    println!("Soil nutrients are classified by how much they limit yield:\n");
    println!(
        "  {:<11} {:<14} {:<14} {:<8}",
        "Nutrient", "High below", "Medium below", "Unit"
    );
    println!("  {}", "-".repeat(49));
    for nutrient in Nutrient::ALL {
        let t = c.thresholds.for_nutrient(nutrient);
        println!(
            "  {:<11} {:<14} {:<14} {:<8}",
            nutrient.to_string(),
            t.high_below,
            t.medium_below,
            nutrient.soil_unit()
        );
    }
    println!("\nAnything at or above the Medium bound is a Low limitation.\n");

    println!(
        "Base rates (kg/ha) at a {} kg/ha target:\n",
        c.yield_scaling.reference_yield_kg_ha
    );
    println!("  {:<6} {:<8} {:<8} {:<8}", "", "High", "Medium", "Low");
    for nutrient in Nutrient::ALL {
        let r = c.base_rates.for_nutrient(nutrient);
        println!(
            "  {:<6} {:<8} {:<8} {:<8}",
            nutrient.rate_form(),
            r.for_tier(Limitation::High),
            r.for_tier(Limitation::Medium),
            r.for_tier(Limitation::Low)
        );
    }
    println!(
        "\nRates scale with target yield / {} kg/ha, up to {}x.\n",
        c.yield_scaling.reference_yield_kg_ha, c.yield_scaling.max_factor
    );

    let p = &c.products;
    println!("Products:");
    println!(
        "  Urea {}% N, DAP {}% P2O5, MOP {}% K2O\n",
        p.urea_n_fraction * 100.0,
        p.dap_p2o5_fraction * 100.0,
        p.mop_k2o_fraction * 100.0
    );

    let pr = &c.prices;
    println!("Prices (USD/kg of nutrient):");
    println!(
        "  N {}, P2O5 {}, K2O {}; crop sells at {} USD/kg\n",
        pr.n_usd_per_kg, pr.p2o5_usd_per_kg, pr.k2o_usd_per_kg, pr.crop_usd_per_kg
    );

    let y = &c.yield_response;
    println!("Yield response:");
    println!(
        "  capped-linear  expected yield = min(target, {} x last season)",
        y.capped_linear.ceiling_multiplier
    );
    println!(
        "  mitscherlich   potential {} x last season; decay N {}, P {}, K {}\n",
        y.mitscherlich.potential_multiplier,
        y.mitscherlich.decay.n,
        y.mitscherlich.decay.p,
        y.mitscherlich.decay.k
    );

    explain_visual(&c);

    if let Some(ref calendar) = c.planting_calendar {
        println!(
            "Planting windows (north of {} degrees / elsewhere):",
            calendar.northern_above_latitude
        );
        println!(
            "  wet season  {} / {}",
            calendar.northern.wet_season, calendar.southern.wet_season
        );
        println!(
            "  dry season  {} / {}\n",
            calendar.northern.dry_season, calendar.southern.dry_season
        );
    }
    Ok(())
}

fn explain_visual(c: &Calibration) {
    let v = &c.visual_estimates;
    println!("Visual assessment estimates:\n");
    for color in SoilColor::ALL {
        match v.color_nitrogen_percent.get(&color) {
            Some(n) => println!("  {:<24} N {}%", color.to_string(), n),
            None => println!(
                "  {:<24} N {}% (default)",
                color.to_string(),
                v.default_nitrogen_percent
            ),
        }
    }
    println!();
    for texture in SoilTexture::ALL {
        let (pk, marker) = match v.texture_phosphorus_potassium.get(&texture) {
            Some(pk) => (*pk, ""),
            None => (v.default_phosphorus_potassium, " (default)"),
        };
        println!(
            "  {:<24} P {} ppm, K {} ppm{}",
            texture.to_string(),
            pk.phosphorus_ppm,
            pk.potassium_ppm,
            marker
        );
    }
    println!();
    for bracket in PreviousYieldBracket::ALL {
        if let Some(kg) = v.previous_yield_kg_ha.get(&bracket) {
            println!("  Last season {:<18} {} kg/ha", bracket.to_string(), kg);
        }
    }
    for bracket in TargetYieldBracket::ALL {
        if let Some(kg) = v.target_yield_kg_ha.get(&bracket) {
            println!("  Target {:<23} {} kg/ha", bracket.to_string(), kg);
        }
    }
    println!();
}

pub fn schema() -> Result<(), FertiplanError> {
    print!(
        r#"Calibration JSON Schema
=======================

A calibration holds every regional constant the recommendation engine
uses. `fertiplan recommend --calibration FILE` replaces the built-in
preset with your own file.

Top-level fields:
  name          (string, required)  Human-readable name
  description   (string, optional)  What region/crop this is for
  version       (string, required)  Version identifier (e.g., "2.0.0")
  crop          (string, optional)  Crop the yields and prices refer to
  thresholds    (object, required)  Limitation thresholds per nutrient
  base_rates    (object, required)  kg/ha per nutrient and tier
  yield_scaling (object, required)  Target-yield scaling of base rates
  products      (object, required)  Nutrient fraction of each product
  prices        (object, required)  USD prices
  yield_response
                (object, required)  Yield-response model parameters
  visual_estimates
                (object, required)  Lookup tables for visual assessment
  planting_calendar
                (object, optional)  Planting windows by latitude

thresholds.{{nitrogen_percent, phosphorus_ppm, potassium_ppm}}:
  high_below    (number)  Below this the nutrient is a High limitation
  medium_below  (number)  Below this (and not High) it is Medium;
                          otherwise Low. Must be >= high_below.

base_rates.{{n, p2o5, k2o}}:
  high, medium, low  (number)  kg/ha; must satisfy high >= medium >= low

yield_scaling:
  reference_yield_kg_ha  (number)  Target at which base rates apply as-is
  max_factor             (number)  Cap on target / reference

products:
  urea_n_fraction, dap_p2o5_fraction, mop_k2o_fraction
                (number)  Nutrient content by weight, within (0, 1]

prices:
  n_usd_per_kg, p2o5_usd_per_kg, k2o_usd_per_kg
                (number)  Per kg of nutrient, not of product
  crop_usd_per_kg (number)  Farm-gate crop price

yield_response:
  capped_linear.ceiling_multiplier    (number)  Cap as a multiple of
                                                last season's yield
  mitscherlich.potential_multiplier   (number)  >= 1
  mitscherlich.decay.{{n, p, k}}        (number)  Response curvature

visual_estimates:
  color_nitrogen_percent        (object)  soil color -> N %; may be partial
  default_nitrogen_percent      (number)  Used for unlisted colors
  texture_phosphorus_potassium  (object)  texture -> {{phosphorus_ppm,
                                          potassium_ppm}}; may be partial
  default_phosphorus_potassium  (object)  Used for unlisted textures
  previous_yield_kg_ha          (object)  Every bracket: below_1t, 1_2t,
                                          2_3t, 3_4t, above_4t
  target_yield_kg_ha            (object)  Every bracket: 2t, 3t, 4t, 5t

planting_calendar:
  northern_above_latitude       (number)  Sites strictly north of this use
                                          "northern"; others "southern"
  northern, southern            (object)  {{wet_season, dry_season}} labels,
                                          e.g. "May-June"

Soil colors: very_dark_brown, dark_brown, brown, light_brown, red, gray
Textures:    very_sandy, sandy, loamy, clay

Run `fertiplan calibration explain ng-north` to see the built-in values.
"#
    );
    Ok(())
}

pub fn validate(file: &Path) -> Result<(), FertiplanError> {
    let c = fertiplan_core::calibration::load_calibration(file)?;

    println!("Calibration '{}' (v{}) is valid.", c.name, c.version);
    if let Some(ref crop) = c.crop {
        println!("  Crop: {}", crop);
    }

    // Partial lookup tables are allowed but worth pointing out.
    let v = &c.visual_estimates;
    let mut warnings = Vec::new();
    for color in SoilColor::ALL {
        if !v.color_nitrogen_percent.contains_key(&color) {
            warnings.push(format!(
                "soil color '{}' has no nitrogen estimate; default {}% applies",
                color, v.default_nitrogen_percent
            ));
        }
    }
    for texture in SoilTexture::ALL {
        if !v.texture_phosphorus_potassium.contains_key(&texture) {
            warnings.push(format!(
                "soil texture '{}' has no P/K estimate; defaults apply",
                texture
            ));
        }
    }

    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  - {}", w);
        }
    }

    Ok(())
}
