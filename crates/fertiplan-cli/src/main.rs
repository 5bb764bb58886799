mod commands;
mod config;
mod output;
mod telemetry;

use clap::{Parser, Subcommand};
use fertiplan_core::recommend::YieldModel;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "fertiplan",
    version,
    about = "Fertilizer recommendations from soil tests or visual soil assessment"
)]
struct Cli {
    /// Log level or filter (overrides FERTIPLAN_LOG_LEVEL; RUST_LOG wins over both)
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a fertilizer recommendation
    Recommend(RecommendArgs),
    /// Inspect and validate calibrations
    Calibration {
        #[command(subcommand)]
        action: CalibrationAction,
    },
}

#[derive(clap::Args)]
pub struct RecommendArgs {
    /// Soil nitrogen from a lab test (%)
    #[arg(long, value_name = "PERCENT")]
    pub nitrogen: Option<f64>,

    /// Soil phosphorus from a lab test (ppm)
    #[arg(long, value_name = "PPM")]
    pub phosphorus: Option<f64>,

    /// Soil potassium from a lab test (ppm)
    #[arg(long, value_name = "PPM")]
    pub potassium: Option<f64>,

    /// Soil pH from a lab test
    #[arg(long)]
    pub ph: Option<f64>,

    /// Soil color, e.g. "Dark Brown" or very_dark_brown
    #[arg(long)]
    pub color: Option<String>,

    /// Soil feel when wet, e.g. "Sandy" or "Clay-like (sticky)"
    #[arg(long)]
    pub texture: Option<String>,

    /// Last season's yield bracket, e.g. "1-2 tons"
    #[arg(long, value_name = "BRACKET")]
    pub previous_yield: Option<String>,

    /// Target yield bracket, e.g. "4 tons/ha"
    #[arg(long, value_name = "BRACKET")]
    pub target_yield: Option<String>,

    /// Last season's yield in kg/ha (overrides --previous-yield)
    #[arg(long, value_name = "KG_HA")]
    pub previous_yield_kg: Option<f64>,

    /// Target yield in kg/ha (overrides --target-yield)
    #[arg(long, value_name = "KG_HA")]
    pub target_yield_kg: Option<f64>,

    /// Farm size in hectares
    #[arg(long, value_name = "HA")]
    pub farm_size: Option<f64>,

    /// Site latitude in degrees north, for the planting window
    #[arg(long, value_name = "DEGREES", allow_negative_numbers = true)]
    pub latitude: Option<f64>,

    /// JSON file with an array of recommendation requests (batch mode)
    #[arg(short, long, value_name = "FILE", conflicts_with_all = ["nitrogen", "phosphorus", "potassium", "color", "texture"])]
    pub input: Option<PathBuf>,

    /// Custom calibration JSON file
    #[arg(short, long, value_name = "FILE", conflicts_with = "preset")]
    pub calibration: Option<PathBuf>,

    /// Predefined calibration (default: ng-north)
    #[arg(short, long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Yield response model: capped-linear or mitscherlich
    #[arg(long, default_value = "capped-linear")]
    pub yield_model: YieldModel,

    /// Output format: table (default) or json
    #[arg(short, long, default_value = "table")]
    pub output: String,

    /// Include the derivation trace
    #[arg(long)]
    pub trace: bool,
}

#[derive(Subcommand)]
enum CalibrationAction {
    /// List predefined calibrations
    List,
    /// Explain a calibration in plain language
    Explain {
        /// Preset name (e.g., "ng-north")
        preset: String,
    },
    /// Print the calibration JSON schema with field descriptions
    Schema,
    /// Validate a custom calibration file
    Validate {
        /// Path to calibration JSON file
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    let config = config::CliConfig::load();

    let log_level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    if let Err(e) = telemetry::init(log_level) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Recommend(args) => commands::recommend::run(args, &config),
        Commands::Calibration { action } => match action {
            CalibrationAction::List => commands::calibration::list(),
            CalibrationAction::Explain { preset } => commands::calibration::explain(&preset),
            CalibrationAction::Schema => commands::calibration::schema(),
            CalibrationAction::Validate { file } => commands::calibration::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
