use std::path::Path;

use crate::types::{Endpoint, EndpointSummary, IterationOutcome};

const CSV_HEADER: [&str; 3] = ["iteration", "endpoint", "elapsed_seconds"];

#[derive(Debug, Default)]
struct EndpointStats {
    samples: Vec<f64>,
    attempted: u32,
    succeeded: u32,
}

/// Accumulates every step outcome of a run. Successful steps contribute one
/// timing sample each; failures only bump the attempted counter. Summary
/// statistics are computed once, at the end, over the full sample set.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    per_endpoint: [EndpointStats; 4],
    records: Vec<(u32, Endpoint, f64)>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: &IterationOutcome) {
        let stats = &mut self.per_endpoint[outcome.endpoint.index()];
        stats.attempted += 1;
        if outcome.status.is_success() {
            stats.succeeded += 1;
            stats.samples.push(outcome.elapsed_secs);
            self.records
                .push((outcome.iteration, outcome.endpoint, outcome.elapsed_secs));
        }
    }

    /// Mean elapsed time for one endpoint, 0.0 when it has no successes.
    pub fn average(&self, endpoint: Endpoint) -> f64 {
        let samples = &self.per_endpoint[endpoint.index()].samples;
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().sum::<f64>() / samples.len() as f64
    }

    pub fn summary(&self) -> Vec<(Endpoint, EndpointSummary)> {
        Endpoint::ALL
            .iter()
            .map(|&endpoint| {
                let samples = &self.per_endpoint[endpoint.index()].samples;
                let summary = if samples.is_empty() {
                    EndpointSummary {
                        count: 0,
                        min_secs: 0.0,
                        max_secs: 0.0,
                        mean_secs: 0.0,
                    }
                } else {
                    EndpointSummary {
                        count: samples.len(),
                        min_secs: samples.iter().copied().fold(f64::INFINITY, f64::min),
                        max_secs: samples.iter().copied().fold(0.0, f64::max),
                        mean_secs: self.average(endpoint),
                    }
                };
                (endpoint, summary)
            })
            .collect()
    }

    pub fn attempted(&self, endpoint: Endpoint) -> u32 {
        self.per_endpoint[endpoint.index()].attempted
    }

    pub fn succeeded(&self, endpoint: Endpoint) -> u32 {
        self.per_endpoint[endpoint.index()].succeeded
    }

    /// Grand totals across all endpoints: (attempted, succeeded).
    pub fn totals(&self) -> (u32, u32) {
        let attempted = self.per_endpoint.iter().map(|s| s.attempted).sum();
        let succeeded = self.per_endpoint.iter().map(|s| s.succeeded).sum();
        (attempted, succeeded)
    }

    /// Successful steps only, in the order they were recorded.
    pub fn export_records(&self) -> &[(u32, Endpoint, f64)] {
        &self.records
    }

    /// Writes the record stream as CSV. With zero successful steps no file is
    /// created at all; returns whether a file was written.
    pub fn write_csv(&self, path: &Path) -> Result<bool, Box<dyn std::error::Error>> {
        if self.records.is_empty() {
            return Ok(false);
        }
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(CSV_HEADER)?;
        for (iteration, endpoint, elapsed) in &self.records {
            writer.write_record([
                iteration.to_string(),
                endpoint.name().to_string(),
                format!("{:.6}", elapsed),
            ])?;
        }
        writer.flush()?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{StepFailure, StepStatus};

    fn success(iteration: u32, endpoint: Endpoint, elapsed: f64) -> IterationOutcome {
        IterationOutcome {
            iteration,
            endpoint,
            elapsed_secs: elapsed,
            status: StepStatus::Success,
        }
    }

    fn failure(iteration: u32, endpoint: Endpoint) -> IterationOutcome {
        IterationOutcome {
            iteration,
            endpoint,
            elapsed_secs: 0.01,
            status: StepStatus::Failure(StepFailure::Application {
                status: 400,
                detail: "bad request".into(),
            }),
        }
    }

    #[test]
    fn every_success_contributes_exactly_one_sample() {
        let mut agg = ResultAggregator::new();
        for i in 1..=5 {
            agg.record(&success(i, Endpoint::Register, 0.1));
        }
        let summary = agg.summary();
        assert_eq!(summary[0].1.count, 5);
        assert_eq!(agg.succeeded(Endpoint::Register), 5);
        assert_eq!(agg.attempted(Endpoint::Register), 5);
    }

    #[test]
    fn failures_count_as_attempted_but_yield_no_samples() {
        let mut agg = ResultAggregator::new();
        agg.record(&success(1, Endpoint::Login, 0.2));
        agg.record(&failure(2, Endpoint::Login));
        assert_eq!(agg.attempted(Endpoint::Login), 2);
        assert_eq!(agg.succeeded(Endpoint::Login), 1);
        assert_eq!(agg.export_records().len(), 1);
    }

    #[test]
    fn average_of_an_empty_endpoint_is_zero() {
        let agg = ResultAggregator::new();
        assert_eq!(agg.average(Endpoint::Logout), 0.0);
        let (_, summary) = agg.summary()[3];
        assert_eq!(summary.mean_secs, 0.0);
        assert!(!summary.mean_secs.is_nan());
    }

    // Scenario: all four steps succeed with known durations.
    #[test]
    fn single_iteration_export_and_means_are_exact() {
        let mut agg = ResultAggregator::new();
        let durations = [0.10, 0.20, 0.15, 0.05];
        for (endpoint, elapsed) in Endpoint::ALL.into_iter().zip(durations) {
            agg.record(&success(1, endpoint, elapsed));
        }

        let records = agg.export_records();
        assert_eq!(records.len(), 4);
        for ((iteration, endpoint, elapsed), (expected_ep, expected_d)) in
            records.iter().zip(Endpoint::ALL.into_iter().zip(durations))
        {
            assert_eq!(*iteration, 1);
            assert_eq!(*endpoint, expected_ep);
            assert_eq!(*elapsed, expected_d);
        }

        for ((endpoint, summary), expected) in agg.summary().into_iter().zip(durations) {
            assert_eq!(summary.count, 1, "endpoint {}", endpoint.name());
            assert_eq!(summary.mean_secs, expected);
            assert_eq!(summary.min_secs, expected);
            assert_eq!(summary.max_secs, expected);
        }
    }

    #[test]
    fn summary_min_max_over_multiple_samples() {
        let mut agg = ResultAggregator::new();
        agg.record(&success(1, Endpoint::Refresh, 0.3));
        agg.record(&success(2, Endpoint::Refresh, 0.1));
        agg.record(&success(3, Endpoint::Refresh, 0.2));
        let (_, summary) = agg.summary()[2];
        assert_eq!(summary.min_secs, 0.1);
        assert_eq!(summary.max_secs, 0.3);
        assert!((summary.mean_secs - 0.2).abs() < 1e-12);
    }

    #[test]
    fn csv_is_skipped_entirely_with_zero_successes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("response_times.csv");
        let mut agg = ResultAggregator::new();
        agg.record(&failure(1, Endpoint::Register));
        assert!(!agg.write_csv(&path).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn csv_rows_match_the_record_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("response_times.csv");
        let mut agg = ResultAggregator::new();
        agg.record(&success(1, Endpoint::Register, 0.125));
        agg.record(&success(1, Endpoint::Login, 0.25));
        assert!(agg.write_csv(&path).unwrap());

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("iteration,endpoint,elapsed_seconds"));
        assert_eq!(lines.next(), Some("1,register,0.125000"));
        assert_eq!(lines.next(), Some("1,login,0.250000"));
        assert_eq!(lines.next(), None);
    }
}
