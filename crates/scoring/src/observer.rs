//! Diagnostic events emitted while scoring
//!
//! The calculator reports what it does through a [`ContributionObserver`].
//! Observers never influence results; swapping [`TracingObserver`] for
//! [`NoopObserver`] changes logging and metrics only.

use crate::contribution::{Side, UndefinedReason};
use crate::distance::Unavailable;
use citeforge_common::metrics;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Something that happened during a contribution computation
#[derive(Debug, Clone, PartialEq)]
pub enum ScoringEvent<'a> {
    SelfPairSkipped { index: &'a str },
    CacheHit { a: &'a str, b: &'a str, distance: f64 },
    DistanceComputed { a: &'a str, b: &'a str, distance: f64 },
    DistanceUnavailable { a: &'a str, b: &'a str, reason: Unavailable },
    MeanDistance { mean: Option<f64>, pairs: usize },
    AdjustmentForcedToOne { side: Side },
    AdjustmentParameter { side: Side, value: Option<f64> },
    Undefined { reason: &'a UndefinedReason, elapsed: Duration },
    Computed { score: f64, adjust: f64, mean_distance: f64, elapsed: Duration },
}

/// Receiver of scoring events
pub trait ContributionObserver: Send + Sync {
    fn observe(&self, event: &ScoringEvent<'_>);
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ContributionObserver for NoopObserver {
    fn observe(&self, _event: &ScoringEvent<'_>) {}
}

/// Forwards events to `tracing` and the metrics facade
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ContributionObserver for TracingObserver {
    fn observe(&self, event: &ScoringEvent<'_>) {
        match event {
            ScoringEvent::SelfPairSkipped { index } => {
                debug!(index = %index, "Identical indices, skipping");
            }
            ScoringEvent::CacheHit { a, b, distance } => {
                metrics::record_cache(true);
                debug!(a = %a, b = %b, distance, "Reusing distance");
            }
            ScoringEvent::DistanceComputed { a, b, distance } => {
                metrics::record_cache(false);
                metrics::record_distance(None);
                debug!(a = %a, b = %b, distance, "Distance computed");
            }
            ScoringEvent::DistanceUnavailable { a, b, reason } => {
                metrics::record_cache(false);
                metrics::record_distance(Some(reason.label()));
                match reason {
                    Unavailable::OutOfRange { value } => {
                        warn!(a = %a, b = %b, value, "Incorrect distance, discarding");
                    }
                    _ => debug!(a = %a, b = %b, reason = %reason, "Distance unavailable"),
                }
            }
            ScoringEvent::MeanDistance { mean: Some(mean), pairs } => {
                info!(mean, pairs, "Mean distance");
            }
            ScoringEvent::MeanDistance { mean: None, .. } => {
                warn!("Could not calculate distances");
            }
            ScoringEvent::AdjustmentForcedToOne { side } => {
                info!(side = %side, "Only one paper in group, setting its adjustment parameter to 1");
            }
            ScoringEvent::AdjustmentParameter { side, value } => {
                debug!(side = ?side, value = ?value, "Adjustment parameter");
            }
            ScoringEvent::Undefined { reason, elapsed } => {
                metrics::record_contribution(reason.label(), elapsed.as_secs_f64());
                warn!(reason = %reason, "Contribution undefined");
            }
            ScoringEvent::Computed { score, adjust, mean_distance, elapsed } => {
                metrics::record_contribution("defined", elapsed.as_secs_f64());
                info!(score, adjust, mean_distance, "Contribution computed");
            }
        }
    }
}
