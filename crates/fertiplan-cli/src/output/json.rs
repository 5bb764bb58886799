use fertiplan_core::error::FertiplanError;
use fertiplan_core::recommend::outcome::{BatchItem, Recommendation};
use fertiplan_core::trace::TraceBundle;
use serde::Serialize;

#[derive(Serialize)]
struct Traced<'a> {
    recommendation: &'a Recommendation,
    trace: &'a TraceBundle,
}

#[derive(Serialize)]
struct TracedBatch<'a> {
    items: &'a [BatchItem],
    trace: &'a TraceBundle,
}

pub fn print(rec: &Recommendation, trace: Option<&TraceBundle>) -> Result<(), FertiplanError> {
    let json = match trace {
        Some(trace) => serde_json::to_string_pretty(&Traced {
            recommendation: rec,
            trace,
        })?,
        None => serde_json::to_string_pretty(rec)?,
    };
    println!("{json}");
    Ok(())
}

pub fn print_batch(items: &[BatchItem], trace: Option<&TraceBundle>) -> Result<(), FertiplanError> {
    let json = match trace {
        Some(trace) => serde_json::to_string_pretty(&TracedBatch { items, trace })?,
        None => serde_json::to_string_pretty(items)?,
    };
    println!("{json}");
    Ok(())
}
