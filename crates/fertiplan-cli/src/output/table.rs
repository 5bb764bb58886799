use fertiplan_core::calibration::schema::Calibration;
use fertiplan_core::model::{EstimateSource, Limitation, Nutrient};
use fertiplan_core::recommend::outcome::{BatchItem, Recommendation};
use fertiplan_core::recommend::products::Product;
use fertiplan_core::trace::TraceBundle;

const PRODUCTS: [Product; 3] = [Product::Urea, Product::Dap, Product::Mop];

pub fn print(rec: &Recommendation, calibration: &Calibration, trace: Option<&TraceBundle>) {
    println!("=== {} (v{}) ===\n", calibration.name, calibration.version);
    print_recommendation(rec);
    if let Some(trace) = trace {
        print_trace(trace);
    }
}

pub fn print_batch(items: &[BatchItem], trace: Option<&TraceBundle>) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            println!();
        }
        let label = item
            .id
            .clone()
            .unwrap_or_else(|| format!("#{}", item.index + 1));
        println!("--- Record: {} ---\n", label);

        match (&item.recommendation, &item.error) {
            (Some(rec), _) => print_recommendation(rec),
            (None, Some(err)) => println!("  Skipped: {}\n", err),
            (None, None) => println!("  Skipped\n"),
        }
    }

    let failed = items.iter().filter(|i| i.recommendation.is_none()).count();
    println!(
        "{} of {} records processed, {} skipped",
        items.len() - failed,
        items.len(),
        failed
    );

    if let Some(trace) = trace {
        println!();
        print_trace(trace);
    }
}

fn print_recommendation(rec: &Recommendation) {
    let soil = &rec.soil;
    let source = match soil.source {
        EstimateSource::Lab => "lab test",
        EstimateSource::Visual => "estimated from visual assessment",
    };
    println!("  Soil ({}):", source);
    for nutrient in Nutrient::ALL {
        println!(
            "    {:<11} {:>7} {:<3}  -> {}",
            nutrient.to_string(),
            format_concentration(soil.concentration(nutrient)),
            nutrient.soil_unit(),
            status(rec.limitations.get(nutrient))
        );
    }
    if let Some(ph) = soil.ph {
        println!("    {:<11} {:>7.1}", "pH", ph);
    }
    println!();

    println!(
        "  Nutrient rates (yield factor {:.2}, target {:.0} kg/ha):",
        rec.yield_factor, rec.target_yield_kg_ha
    );
    for nutrient in Nutrient::ALL {
        println!(
            "    {:<5} {:>7.1} kg/ha",
            nutrient.rate_form(),
            rec.rates.get(nutrient)
        );
    }
    println!();

    println!("  Shopping list for {} ha:", rec.farm_size_ha);
    for product in PRODUCTS {
        let kg = product.quantity(&rec.fertilizers);
        println!(
            "    {:<18} {:>6.0} kg  ({:.1} bags of 50 kg, {})",
            product.to_string(),
            kg,
            kg / 50.0,
            product.appearance()
        );
    }
    println!();

    let e = &rec.economics;
    println!("  Economics ({} model):", rec.yield_model);
    println!("    Fertilizer cost     {:>10.0} USD", e.total_cost);
    println!(
        "    Expected yield      {:>10.0} kg/ha (from {:.0})",
        e.expected_yield, rec.previous_yield_kg_ha
    );
    println!("    Yield increase      {:>10.0} kg/ha", e.yield_increase);
    println!("    Revenue increase    {:>10.0} USD", e.revenue_increase);
    println!("    Net profit          {:>10.0} USD", e.net_profit);
    println!("    Return on money     {:>10.1} %", e.roi_percent);
    println!(
        "    Break-even gain     {:>10.0} kg/ha",
        e.breakeven_yield_kg_ha
    );
    println!();

    if !rec.application_plan.steps.is_empty() {
        println!("  Application plan:");
        for step in &rec.application_plan.steps {
            println!(
                "    {:<46} {:<18} {:>6.0} kg",
                step.timing.to_string(),
                step.product.to_string(),
                step.quantity_kg
            );
        }
        for note in &rec.application_plan.notes {
            println!("    * {}", note);
        }
        println!();
    }

    if !rec.warnings.is_empty() {
        println!("  Warnings:");
        for w in &rec.warnings {
            println!("    - {}", w);
        }
        println!();
    }
}

fn print_trace(trace: &TraceBundle) {
    for line in trace_lines(trace) {
        println!("{line}");
    }
    println!();
}

fn trace_lines(trace: &TraceBundle) -> Vec<String> {
    let mut lines = vec!["  Derivation:".to_string()];
    for entry in &trace.entries {
        lines.push(format!("    [{}] {}", entry.request_id, entry.nutrient));
        for step in &entry.steps {
            lines.push(format!("      {}", step.message));
        }
    }
    for decision in &trace.decisions {
        lines.push(format!("    [{}] {}", decision.request_id, decision.summary));
        for step in &decision.steps {
            lines.push(format!("      {}", step.message));
        }
    }

    if !trace.warnings.is_empty() {
        lines.push("  Warnings:".to_string());
        for w in &trace.warnings {
            match w.request_id {
                Some(ref id) => lines.push(format!("    [{}] {}", id, w.message)),
                None => lines.push(format!("    {}", w.message)),
            }
        }
    }
    lines
}

fn status(limitation: Limitation) -> &'static str {
    match limitation {
        Limitation::High => "High limitation (deficient)",
        Limitation::Medium => "Medium limitation",
        Limitation::Low => "Low limitation (adequate)",
    }
}

fn format_concentration(value: f64) -> String {
    if value < 10.0 {
        format!("{:.2}", value)
    } else {
        format!("{:.0}", value)
    }
}
