//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

use crate::domain::{LineFit, Regime, SearchTrace, TgReport};
use crate::report::{compute_residuals, regime_rmse};

/// Format the full run summary (dataset stats + split + both regimes + Tg).
pub fn format_run_summary(report: &TgReport) -> String {
    let series = &report.series;
    let estimate = &report.estimate;
    let fit = &estimate.result;
    let mut out = String::new();

    out.push_str("=== tg - Bilinear Tg Fit ===\n");
    out.push_str(&format!("Source: {}\n", report.source));
    let (t_min, t_max) = series.temperature_range();
    let (v_min, v_max) = series
        .samples()
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
            (lo.min(s.specific_volume), hi.max(s.specific_volume))
        });
    out.push_str(&format!(
        "Samples: n={} | T=[{t_min:.1}, {t_max:.1}] | v=[{v_min:.5}, {v_max:.5}]\n",
        series.len()
    ));

    out.push_str(&format!("\nSplit strategy: {}\n", estimate.strategy.display_name()));
    out.push_str(&format!("Breakpoint: {}\n", fit.breakpoint));
    if let Some(trace) = &estimate.trace {
        out.push_str(&format!(
            "Grid: {} candidate(s) evaluated, {} skipped\n",
            trace.records.len(),
            trace.skipped.len()
        ));
    }
    if let Some(it) = &estimate.iterative {
        let status = if it.converged { "converged" } else { "NOT converged (last guess used)" };
        out.push_str(&format!(
            "Fixed-point: {status} after {} attempt(s), last step {:.4}\n",
            it.attempts, it.last_step
        ));
    }

    let residuals = compute_residuals(series, fit);
    out.push_str("\nRegime fits:\n");
    out.push_str(&format_line("low ", &fit.low, regime_rmse(&residuals, Regime::Low)));
    out.push_str(&format_line("high", &fit.high, regime_rmse(&residuals, Regime::High)));

    out.push_str("\nResult:\n");
    out.push_str(&format!("- Tg              : {:.2}\n", fit.tg));
    out.push_str(&format!("- v(Tg)           : {:.6}\n", fit.tg_specific_volume));
    out.push_str(&format!("- density(Tg)     : {:.6}\n", fit.tg_density()));
    out.push('\n');

    out
}

fn format_line(label: &str, line: &LineFit, rmse: Option<f64>) -> String {
    let rmse = rmse.map(|v| format!("{v:.3e}")).unwrap_or_else(|| "-".to_string());
    format!(
        "  {label} n={:<4} slope={:+.6e} intercept={:.6} R2={:.6} RMSE={rmse}\n",
        line.n_points, line.slope, line.intercept, line.r_squared
    )
}

/// Format the 2-D search trace as a table.
pub fn format_trace(trace: &SearchTrace) -> String {
    let mut out = String::new();
    out.push_str("2-D search trace:\n");
    out.push_str(&format!(
        "{:>10}  {:>10}  {:>12}  {:>12}\n",
        "split", "tg", "low R2", "high R2"
    ));
    for r in &trace.records {
        out.push_str(&format!(
            "{:>10.2}  {:>10.2}  {:>12.8}  {:>12.8}\n",
            r.breakpoint, r.tg, r.low_score, r.high_score
        ));
    }
    for s in &trace.skipped {
        out.push_str(&format!("{:>10.2}  skipped: {}\n", s.breakpoint, s.reason));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SplitStrategy, TgConfig};
    use crate::fit::estimate_tg;
    use crate::fit::testdata::exact_bilinear;

    fn report(strategy: SplitStrategy) -> TgReport {
        let series = exact_bilinear();
        let config = TgConfig {
            strategy,
            tolerance: 1e-6,
            ..TgConfig::default()
        };
        TgReport {
            tool: "tg".to_string(),
            generated_at: chrono::Utc::now(),
            source: "synthetic".to_string(),
            estimate: estimate_tg(&series, &config).unwrap(),
            series,
        }
    }

    #[test]
    fn summary_mentions_strategy_and_tg() {
        let text = format_run_summary(&report(SplitStrategy::Auto2d));
        assert!(text.contains("auto2d"));
        assert!(text.contains("Tg              : 380.00"));
        assert!(text.contains("Grid: 31 candidate(s) evaluated, 0 skipped"));
    }

    #[test]
    fn summary_reports_iteration_status() {
        let text = format_run_summary(&report(SplitStrategy::Auto1d));
        assert!(text.contains("Fixed-point: converged"));
    }

    #[test]
    fn trace_table_has_one_row_per_record() {
        let r = report(SplitStrategy::Auto2d);
        let trace = r.estimate.trace.unwrap();
        let text = format_trace(&trace);
        assert_eq!(text.lines().count(), 2 + trace.records.len());
    }
}
