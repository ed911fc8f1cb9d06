//! 2-D grid split selection.
//!
//! Every candidate temperature is tried as a symmetric breakpoint. The low
//! and high breakpoints are then chosen *independently*: the candidate with the
//! best low-side R² bounds the glassy fit set, and the candidate with the best
//! high-side R² bounds the melt fit set. Samples in between are left out of
//! both fits, which lets an asymmetric transition band drop out.
//!
//! Candidates are evaluated in parallel; aggregation happens afterwards in
//! candidate order, so the selection matches a sequential scan exactly.

use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::domain::{Breakpoint, SampleSeries, SearchRecord, SearchTrace, SkippedCandidate};
use crate::error::FitError;
use crate::fit::bilinear::fit_bilinear;

/// Output of the 2-D search.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSelection {
    pub best_low: f64,
    pub best_high: f64,
    pub trace: SearchTrace,
}

impl GridSelection {
    /// Breakpoint pair for the final fit.
    ///
    /// The two sides are optimized independently, so `best_low` may exceed
    /// `best_high`; the pair is used as found and the fit sets then overlap.
    pub fn breakpoint(&self) -> Breakpoint {
        Breakpoint::Pair(self.best_low, self.best_high)
    }
}

/// Scan `candidates` and pick the best low-side and high-side breakpoints.
///
/// Candidates leaving fewer than two points on either side are skipped and
/// recorded in `trace.skipped`. Any other fit error aborts the search.
#[instrument(level = "debug", skip_all, fields(n_candidates = candidates.len()))]
pub fn select_split_2d(series: &SampleSeries, candidates: &[f64]) -> Result<GridSelection, FitError> {
    let evaluated: Vec<_> = candidates
        .par_iter()
        .map(|&s| (s, fit_bilinear(series, Breakpoint::Single(s))))
        .collect();

    let mut trace = SearchTrace::default();
    for (s, outcome) in evaluated {
        match outcome {
            Ok(fit) => {
                debug!(
                    breakpoint = s,
                    tg = fit.tg,
                    low_r2 = fit.low.r_squared,
                    high_r2 = fit.high.r_squared,
                    "candidate evaluated"
                );
                trace.records.push(SearchRecord {
                    breakpoint: s,
                    tg: fit.tg,
                    low_score: fit.low.r_squared,
                    high_score: fit.high.r_squared,
                });
            }
            Err(err @ FitError::InsufficientData { .. }) => {
                warn!(breakpoint = s, %err, "candidate skipped");
                trace.skipped.push(SkippedCandidate {
                    breakpoint: s,
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }

    let (Some(best_low), Some(best_high)) = (
        argmax_by(&trace.records, |r| r.low_score),
        argmax_by(&trace.records, |r| r.high_score),
    ) else {
        return Err(FitError::EmptySearch {
            candidates: candidates.len(),
        });
    };
    let best_low = trace.records[best_low].breakpoint;
    let best_high = trace.records[best_high].breakpoint;

    info!(
        best_low,
        best_high,
        evaluated = trace.records.len(),
        skipped = trace.skipped.len(),
        "2-D split selected"
    );

    Ok(GridSelection {
        best_low,
        best_high,
        trace,
    })
}

/// Index of the maximum score; ties go to the earliest record.
fn argmax_by(records: &[SearchRecord], score: impl Fn(&SearchRecord) -> f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, r) in records.iter().enumerate() {
        let value = score(r);
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::testdata::{T0, exact_bilinear};

    #[test]
    fn grid_search_brackets_the_join() {
        let series = exact_bilinear();
        let candidates = series.trimmed_temperatures(10);
        assert_eq!(candidates.first(), Some(&200.0));
        assert_eq!(candidates.last(), Some(&500.0));

        let selection = select_split_2d(&series, &candidates).unwrap();
        assert!(selection.best_low <= T0, "best_low={}", selection.best_low);
        assert!(selection.best_high >= T0, "best_high={}", selection.best_high);
        assert_eq!(selection.trace.records.len(), candidates.len());
        assert!(selection.trace.skipped.is_empty());

        let fit = fit_bilinear(&series, selection.breakpoint()).unwrap();
        assert!((fit.tg - T0).abs() < 1e-6, "tg={}", fit.tg);
    }

    #[test]
    fn trace_preserves_candidate_order() {
        let series = exact_bilinear();
        let candidates = [450.0, 250.0, 350.0];
        let selection = select_split_2d(&series, &candidates).unwrap();
        let order: Vec<f64> = selection.trace.records.iter().map(|r| r.breakpoint).collect();
        assert_eq!(order, candidates.to_vec());
    }

    #[test]
    fn edge_candidates_are_skipped_not_fatal() {
        let series = exact_bilinear();
        let candidates = [100.0, 300.0, 600.0];
        let selection = select_split_2d(&series, &candidates).unwrap();

        assert_eq!(selection.trace.records.len(), 1);
        assert_eq!(selection.trace.skipped.len(), 2);
        assert_eq!(selection.best_low, 300.0);
        assert_eq!(selection.best_high, 300.0);
    }

    #[test]
    fn skipped_candidates_show_up_at_the_default_level() {
        use std::sync::{Arc, Mutex};
        use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

        #[derive(Clone, Default)]
        struct Sink(Arc<Mutex<Vec<u8>>>);

        impl std::io::Write for Sink {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let sink = Sink::default();
        let writer = sink.clone();
        let subscriber = tracing_subscriber::registry().with(LevelFilter::WARN).with(
            fmt::layer()
                .with_writer(move || writer.clone())
                .with_ansi(false),
        );

        let series = exact_bilinear();
        tracing::subscriber::with_default(subscriber, || {
            select_split_2d(&series, &[100.0, 300.0]).unwrap();
        });

        let text = String::from_utf8(sink.0.lock().unwrap().clone()).unwrap();
        assert!(text.contains("WARN"), "{text}");
        assert!(text.contains("candidate skipped"), "{text}");
        assert_eq!(text.matches("candidate skipped").count(), 1);
    }

    #[test]
    fn all_candidates_rejected_is_empty_search() {
        let series = exact_bilinear();
        assert_eq!(
            select_split_2d(&series, &[50.0, 100.0, 600.0, 650.0]),
            Err(FitError::EmptySearch { candidates: 4 })
        );
        assert_eq!(
            select_split_2d(&series, &[]),
            Err(FitError::EmptySearch { candidates: 0 })
        );
    }

    #[test]
    fn argmax_prefers_earliest_on_ties() {
        let rec = |breakpoint, low_score| SearchRecord {
            breakpoint,
            tg: 0.0,
            low_score,
            high_score: 0.0,
        };
        let records = [rec(1.0, 0.5), rec(2.0, 0.9), rec(3.0, 0.9), rec(4.0, 0.1)];
        assert_eq!(argmax_by(&records, |r| r.low_score), Some(1));
        assert_eq!(argmax_by(&[], |r: &SearchRecord| r.low_score), None);
    }
}
