use crate::error::FertiplanError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Lenient parsing of qualitative category labels.
///
/// Accepts the snake_case serialized names as well as the free-text labels
/// shown to farmers (e.g. "Very Dark Brown/Black", "Clay-like (sticky)").
pub trait FromLabel: Sized {
    fn from_label(s: &str) -> Option<Self>;
}

/// Lowercase, map separators to spaces and collapse whitespace.
fn fold_label(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .replace(['_', '-', '/'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keep only ASCII alphanumerics: "1-2 tons" -> "12tons".
fn compact_label(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum SoilColor {
    VeryDarkBrown,
    DarkBrown,
    Brown,
    LightBrown,
    Red,
    Gray,
}

impl SoilColor {
    pub const ALL: [SoilColor; 6] = [
        SoilColor::VeryDarkBrown,
        SoilColor::DarkBrown,
        SoilColor::Brown,
        SoilColor::LightBrown,
        SoilColor::Red,
        SoilColor::Gray,
    ];
}

impl FromLabel for SoilColor {
    fn from_label(s: &str) -> Option<SoilColor> {
        let lower = fold_label(s);
        if lower.contains("very dark") || lower.contains("black") {
            Some(SoilColor::VeryDarkBrown)
        } else if lower.contains("dark brown") {
            Some(SoilColor::DarkBrown)
        } else if lower.contains("light brown") {
            Some(SoilColor::LightBrown)
        } else if lower.contains("brown") {
            Some(SoilColor::Brown)
        } else if lower.contains("red") {
            Some(SoilColor::Red)
        } else if lower.contains("gray") || lower.contains("grey") {
            Some(SoilColor::Gray)
        } else {
            None
        }
    }
}

impl TryFrom<String> for SoilColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SoilColor::from_label(&value).ok_or_else(|| format!("unknown soil color '{value}'"))
    }
}

impl fmt::Display for SoilColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoilColor::VeryDarkBrown => write!(f, "Very dark brown/black"),
            SoilColor::DarkBrown => write!(f, "Dark brown"),
            SoilColor::Brown => write!(f, "Brown"),
            SoilColor::LightBrown => write!(f, "Light brown"),
            SoilColor::Red => write!(f, "Red"),
            SoilColor::Gray => write!(f, "Gray"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum SoilTexture {
    VerySandy,
    Sandy,
    Loamy,
    Clay,
}

impl SoilTexture {
    pub const ALL: [SoilTexture; 4] = [
        SoilTexture::VerySandy,
        SoilTexture::Sandy,
        SoilTexture::Loamy,
        SoilTexture::Clay,
    ];
}

impl FromLabel for SoilTexture {
    fn from_label(s: &str) -> Option<SoilTexture> {
        let lower = fold_label(s);
        if lower.contains("very sandy") {
            Some(SoilTexture::VerySandy)
        } else if lower.contains("sand") {
            Some(SoilTexture::Sandy)
        } else if lower.contains("loam") || lower.contains("balanced") {
            Some(SoilTexture::Loamy)
        } else if lower.contains("clay") {
            Some(SoilTexture::Clay)
        } else {
            None
        }
    }
}

impl TryFrom<String> for SoilTexture {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SoilTexture::from_label(&value).ok_or_else(|| format!("unknown soil texture '{value}'"))
    }
}

impl fmt::Display for SoilTexture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoilTexture::VerySandy => write!(f, "Very sandy"),
            SoilTexture::Sandy => write!(f, "Sandy"),
            SoilTexture::Loamy => write!(f, "Loamy"),
            SoilTexture::Clay => write!(f, "Clay"),
        }
    }
}

/// Last season's yield, as reported by the farmer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum PreviousYieldBracket {
    #[serde(rename = "below_1t")]
    BelowOneTon,
    #[serde(rename = "1_2t")]
    OneToTwoTons,
    #[serde(rename = "2_3t")]
    TwoToThreeTons,
    #[serde(rename = "3_4t")]
    ThreeToFourTons,
    #[serde(rename = "above_4t")]
    AboveFourTons,
}

impl PreviousYieldBracket {
    pub const ALL: [PreviousYieldBracket; 5] = [
        PreviousYieldBracket::BelowOneTon,
        PreviousYieldBracket::OneToTwoTons,
        PreviousYieldBracket::TwoToThreeTons,
        PreviousYieldBracket::ThreeToFourTons,
        PreviousYieldBracket::AboveFourTons,
    ];
}

impl FromLabel for PreviousYieldBracket {
    fn from_label(s: &str) -> Option<PreviousYieldBracket> {
        let key = compact_label(s);
        if key.starts_with("lessthan1") || key.starts_with("below1") {
            Some(PreviousYieldBracket::BelowOneTon)
        } else if key.starts_with("12t") {
            Some(PreviousYieldBracket::OneToTwoTons)
        } else if key.starts_with("23t") {
            Some(PreviousYieldBracket::TwoToThreeTons)
        } else if key.starts_with("34t") {
            Some(PreviousYieldBracket::ThreeToFourTons)
        } else if key.starts_with("morethan4") || key.starts_with("above4") {
            Some(PreviousYieldBracket::AboveFourTons)
        } else {
            None
        }
    }
}

impl TryFrom<String> for PreviousYieldBracket {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PreviousYieldBracket::from_label(&value)
            .ok_or_else(|| format!("unknown previous yield bracket '{value}'"))
    }
}

impl fmt::Display for PreviousYieldBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreviousYieldBracket::BelowOneTon => write!(f, "Less than 1 ton"),
            PreviousYieldBracket::OneToTwoTons => write!(f, "1-2 tons"),
            PreviousYieldBracket::TwoToThreeTons => write!(f, "2-3 tons"),
            PreviousYieldBracket::ThreeToFourTons => write!(f, "3-4 tons"),
            PreviousYieldBracket::AboveFourTons => write!(f, "More than 4 tons"),
        }
    }
}

/// Yield the farmer is aiming for this season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum TargetYieldBracket {
    #[serde(rename = "2t")]
    TwoTons,
    #[serde(rename = "3t")]
    ThreeTons,
    #[serde(rename = "4t")]
    FourTons,
    #[serde(rename = "5t")]
    FiveTons,
}

impl TargetYieldBracket {
    pub const ALL: [TargetYieldBracket; 4] = [
        TargetYieldBracket::TwoTons,
        TargetYieldBracket::ThreeTons,
        TargetYieldBracket::FourTons,
        TargetYieldBracket::FiveTons,
    ];
}

impl FromLabel for TargetYieldBracket {
    fn from_label(s: &str) -> Option<TargetYieldBracket> {
        let key = compact_label(s);
        if key.starts_with("2t") {
            Some(TargetYieldBracket::TwoTons)
        } else if key.starts_with("3t") {
            Some(TargetYieldBracket::ThreeTons)
        } else if key.starts_with("4t") {
            Some(TargetYieldBracket::FourTons)
        } else if key.starts_with("5t") {
            Some(TargetYieldBracket::FiveTons)
        } else {
            None
        }
    }
}

impl TryFrom<String> for TargetYieldBracket {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TargetYieldBracket::from_label(&value)
            .ok_or_else(|| format!("unknown target yield bracket '{value}'"))
    }
}

impl fmt::Display for TargetYieldBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetYieldBracket::TwoTons => write!(f, "2 tons/ha"),
            TargetYieldBracket::ThreeTons => write!(f, "3 tons/ha"),
            TargetYieldBracket::FourTons => write!(f, "4 tons/ha"),
            TargetYieldBracket::FiveTons => write!(f, "5 tons/ha"),
        }
    }
}

/// Deserialize a free-text label, mapping anything unrecognized to `None`.
fn lenient_label<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromLabel,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(T::from_label))
}

/// Laboratory soil test values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilSample {
    pub nitrogen_percent: f64,
    pub phosphorus_ppm: f64,
    pub potassium_ppm: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ph: Option<f64>,
}

impl SoilSample {
    pub const PH_RANGE: (f64, f64) = (4.0, 9.0);

    pub fn new(
        nitrogen_percent: f64,
        phosphorus_ppm: f64,
        potassium_ppm: f64,
        ph: Option<f64>,
    ) -> Result<SoilSample, FertiplanError> {
        let sample = SoilSample {
            nitrogen_percent,
            phosphorus_ppm,
            potassium_ppm,
            ph,
        };
        sample.validate()?;
        Ok(sample)
    }

    /// Check concentrations are finite and non-negative and pH is in range.
    pub fn validate(&self) -> Result<(), FertiplanError> {
        for (name, value) in [
            ("nitrogen_percent", self.nitrogen_percent),
            ("phosphorus_ppm", self.phosphorus_ppm),
            ("potassium_ppm", self.potassium_ppm),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(FertiplanError::InvalidInput(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        if let Some(ph) = self.ph {
            let (lo, hi) = Self::PH_RANGE;
            if !(lo..=hi).contains(&ph) {
                return Err(FertiplanError::InvalidInput(format!(
                    "ph must be within [{lo}, {hi}], got {ph}"
                )));
            }
        }

        Ok(())
    }
}

/// Qualitative field assessment used when no lab test is available.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualAssessment {
    /// `None` when the color was not reported or not recognized.
    #[serde(default, deserialize_with = "lenient_label")]
    pub soil_color: Option<SoilColor>,
    /// `None` when the texture was not reported or not recognized.
    #[serde(default, deserialize_with = "lenient_label")]
    pub soil_texture: Option<SoilTexture>,
    pub previous_yield: PreviousYieldBracket,
    pub target_yield: TargetYieldBracket,
}

/// The single source of soil information for a request.
///
/// A lab sample is always complete; partially filled lab values never reach
/// the engine (see [`crate::normalize::resolve_input`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoilInput {
    Lab(SoilSample),
    Visual(VisualAssessment),
}

impl SoilInput {
    pub fn visual(&self) -> Option<&VisualAssessment> {
        match self {
            SoilInput::Lab(_) => None,
            SoilInput::Visual(v) => Some(v),
        }
    }
}

/// One record as submitted by a form or a bulk upload.
///
/// Explicit yields take precedence; otherwise they come from the visual
/// assessment's brackets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub input: SoilInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_yield_kg_ha: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_yield_kg_ha: Option<f64>,
    pub farm_size_ha: f64,
    /// Site latitude in degrees north; adds the planting window to the plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Nutrient {
    #[serde(rename = "N")]
    Nitrogen,
    #[serde(rename = "P")]
    Phosphorus,
    #[serde(rename = "K")]
    Potassium,
}

impl Nutrient {
    pub const ALL: [Nutrient; 3] = [Nutrient::Nitrogen, Nutrient::Phosphorus, Nutrient::Potassium];

    pub fn symbol(&self) -> &'static str {
        match self {
            Nutrient::Nitrogen => "N",
            Nutrient::Phosphorus => "P",
            Nutrient::Potassium => "K",
        }
    }

    /// Unit of the soil concentration used for classification.
    pub fn soil_unit(&self) -> &'static str {
        match self {
            Nutrient::Nitrogen => "%",
            Nutrient::Phosphorus | Nutrient::Potassium => "ppm",
        }
    }

    /// Form in which the application rate is expressed.
    pub fn rate_form(&self) -> &'static str {
        match self {
            Nutrient::Nitrogen => "N",
            Nutrient::Phosphorus => "P2O5",
            Nutrient::Potassium => "K2O",
        }
    }
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Nutrient::Nitrogen => write!(f, "Nitrogen"),
            Nutrient::Phosphorus => write!(f, "Phosphorus"),
            Nutrient::Potassium => write!(f, "Potassium"),
        }
    }
}

/// Severity of a nutrient deficiency. `High` means the nutrient most limits yield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Limitation {
    High,
    Medium,
    Low,
}

impl fmt::Display for Limitation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limitation::High => write!(f, "High"),
            Limitation::Medium => write!(f, "Medium"),
            Limitation::Low => write!(f, "Low"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateSource {
    Lab,
    Visual,
}

impl fmt::Display for EstimateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimateSource::Lab => write!(f, "lab test"),
            EstimateSource::Visual => write!(f, "visual estimate"),
        }
    }
}

/// Soil nutrient concentrations handed to the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutrientEstimate {
    pub nitrogen_percent: f64,
    pub phosphorus_ppm: f64,
    pub potassium_ppm: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ph: Option<f64>,
    pub source: EstimateSource,
}

impl NutrientEstimate {
    pub fn concentration(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Nitrogen => self.nitrogen_percent,
            Nutrient::Phosphorus => self.phosphorus_ppm,
            Nutrient::Potassium => self.potassium_ppm,
        }
    }
}
