//! Metrics and observability utilities
//!
//! Provides counters and histograms for the scoring core with
//! standardized naming conventions. Without an installed recorder every
//! call is a no-op.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};

/// Metrics prefix for all CiteForge metrics
pub const METRICS_PREFIX: &str = "citeforge";

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_distance_computations_total", METRICS_PREFIX),
        Unit::Count,
        "Document distances computed by the engine"
    );

    describe_counter!(
        format!("{}_distance_unavailable_total", METRICS_PREFIX),
        Unit::Count,
        "Document pairs for which no distance could be computed"
    );

    describe_counter!(
        format!("{}_cache_hits_total", METRICS_PREFIX),
        Unit::Count,
        "Total distance cache hits"
    );

    describe_counter!(
        format!("{}_cache_misses_total", METRICS_PREFIX),
        Unit::Count,
        "Total distance cache misses"
    );

    describe_counter!(
        format!("{}_contributions_total", METRICS_PREFIX),
        Unit::Count,
        "Contribution computations by outcome"
    );

    describe_histogram!(
        format!("{}_contribution_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Contribution computation latency in seconds"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record cache metrics
pub fn record_cache(hit: bool) {
    if hit {
        counter!(format!("{}_cache_hits_total", METRICS_PREFIX)).increment(1);
    } else {
        counter!(format!("{}_cache_misses_total", METRICS_PREFIX)).increment(1);
    }
}

/// Helper to record one engine invocation
pub fn record_distance(unavailable_reason: Option<&str>) {
    match unavailable_reason {
        None => {
            counter!(format!("{}_distance_computations_total", METRICS_PREFIX)).increment(1);
        }
        Some(reason) => {
            counter!(
                format!("{}_distance_unavailable_total", METRICS_PREFIX),
                "reason" => reason.to_string()
            )
            .increment(1);
        }
    }
}

/// Helper to record one contribution with its outcome label (`defined`, `empty_group`, ...)
pub fn record_contribution(outcome: &str, duration_secs: f64) {
    counter!(
        format!("{}_contributions_total", METRICS_PREFIX),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    histogram!(format!("{}_contribution_duration_seconds", METRICS_PREFIX))
        .record(duration_secs);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder() {
        register_metrics();
        record_cache(true);
        record_cache(false);
        record_distance(None);
        record_distance(Some("empty_text"));
        record_contribution("defined", 0.02);
        // Just verify it runs without panic
    }
}
