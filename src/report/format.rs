//! Formatted terminal output.
//!
//! Formatting lives in one place so the engine stays free of presentation
//! concerns and output changes stay localized.

use crate::app::pipeline::BatchOutcome;
use crate::domain::{RunoutFile, TrendModel};

/// Summary block for one SKU.
pub fn format_runout_summary(doc: &RunoutFile) -> String {
    let mut out = String::new();

    out.push_str("=== runout - SKU stock runout estimate ===\n");
    out.push_str(&format!("SKU: {}\n", doc.sku));
    out.push_str(&format!("Last observed: {}\n", doc.last_observed_date));
    out.push_str(&format!("Current stock: {:.2}\n", doc.current_stock));
    out.push_str(&format!(
        "Period: {} day(s) | iterations: {} | horizon: {} day(s)\n",
        doc.period,
        doc.iterations,
        doc.forecast.len()
    ));
    out.push_str(&format!(
        "Trend: {} | n={} | rmse={:.4}\n",
        format_model(&doc.model),
        doc.fit_quality.n,
        doc.fit_quality.rmse
    ));

    out.push_str(&format!(
        "Runout: {} ({} day(s) after last observation)\n",
        doc.runout_day, doc.days_until_runout
    ));

    out
}

/// Forecast table. Long horizons show the head and the rows around runout.
pub fn format_forecast_table(doc: &RunoutFile, max_rows: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<12} {:>12} {:>14}\n",
        "date", "forecast", "cumulative"
    ));

    let n = doc.forecast.len();
    let runout_idx = doc
        .cumulative_sold_units
        .iter()
        .position(|c| c.date == doc.runout_day);

    let show = |i: usize| -> bool {
        if n <= max_rows {
            return true;
        }
        let head = max_rows / 2;
        if i < head {
            return true;
        }
        match runout_idx {
            Some(r) => i + 2 >= r && i <= r + 1,
            None => i + (max_rows - head) >= n,
        }
    };

    let mut skipped = false;
    for (i, (f, c)) in doc.forecast.iter().zip(&doc.cumulative_sold_units).enumerate() {
        if !show(i) {
            skipped = true;
            continue;
        }
        if skipped {
            out.push_str("...\n");
            skipped = false;
        }
        let marker = if Some(i) == runout_idx { "  <- runout" } else { "" };
        out.push_str(&format!(
            "{:<12} {:>12.2} {:>14.2}{}\n",
            f.date.to_string(),
            f.quantity,
            c.running_total,
            marker
        ));
    }
    if skipped {
        out.push_str("...\n");
    }

    out
}

/// One line per SKU for batch runs, failures included.
pub fn format_batch_table(outcomes: &[BatchOutcome]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<16} {:>10} {:>12} {:>6} {:>5}  {}\n",
        "sku", "stock", "runout", "days", "iter", "status"
    ));

    let mut found = 0usize;
    for o in outcomes {
        match &o.result {
            Ok(r) => {
                found += 1;
                out.push_str(&format!(
                    "{:<16} {:>10.2} {:>12} {:>6} {:>5}  ok\n",
                    o.sku,
                    r.current_stock,
                    r.runout_date.to_string(),
                    r.days_until_runout(),
                    r.iterations,
                ));
            }
            Err(e) => {
                out.push_str(&format!(
                    "{:<16} {:>10} {:>12} {:>6} {:>5}  {}: {}\n",
                    o.sku,
                    "-",
                    "-",
                    "-",
                    "-",
                    e.kind(),
                    e
                ));
            }
        }
    }
    out.push_str(&format!(
        "\n{} SKU(s): {} with runout, {} failed or undetermined\n",
        outcomes.len(),
        found,
        outcomes.len() - found
    ));

    out
}

fn format_model(model: &TrendModel) -> String {
    match *model {
        TrendModel::Linear { intercept, slope } => {
            format!("{} (qty = {intercept:.4} {:+.4} * day)", model.display_name(), slope)
        }
        TrendModel::Constant { level } => format!("{} (qty = {level:.4})", model.display_name()),
    }
}
