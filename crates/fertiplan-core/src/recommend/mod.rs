pub mod classifier;
pub mod economics;
pub mod outcome;
pub mod products;
pub mod rates;
pub mod yield_model;

pub use classifier::classify;
pub use economics::project_economics;
pub use outcome::{
    BatchItem, EconomicProjection, FertilizerQuantities, NutrientLimitation, NutrientRates,
    Recommendation,
};
pub use products::convert_to_products;
pub use rates::{calculate_rates, yield_factor};
pub use yield_model::{estimate_yield_response, YieldModel, YieldResponse};
