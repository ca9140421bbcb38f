//! Contribution aggregation
//!
//! Group A holds the documents a publication cites, group B the documents
//! citing it. The score is the mean A-to-B distance rescaled by how
//! cohesive each group is internally:
//!
//! ```text
//! contribution = (overline_b / overline_a) * mean_distance(A, B)
//! ```
//!
//! where `overline_x` is the mean distance between distinct members of
//! group `x`. Every data-shape problem degrades to [`Contribution::Undefined`];
//! the only hard failure is an externally imposed deadline.

use crate::cache::DistanceCache;
use crate::distance::{DistanceEngine, DocumentDistance};
use crate::observer::{ContributionObserver, ScoringEvent, TracingObserver};
use citeforge_common::config::ScoringConfig;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Lookup of document text by index
///
/// A missing index and an index without text are both "no text".
pub trait DocumentSource: Sync {
    fn text(&self, index: &str) -> Option<&str>;
}

impl<S: BuildHasher + Sync> DocumentSource for HashMap<String, String, S> {
    fn text(&self, index: &str) -> Option<&str> {
        self.get(index).map(String::as_str)
    }
}

impl<S: BuildHasher + Sync> DocumentSource for HashMap<String, Option<String>, S> {
    fn text(&self, index: &str) -> Option<&str> {
        self.get(index).and_then(|text| text.as_deref())
    }
}

impl DocumentSource for BTreeMap<String, String> {
    fn text(&self, index: &str) -> Option<&str> {
        self.get(index).map(String::as_str)
    }
}

impl DocumentSource for BTreeMap<String, Option<String>> {
    fn text(&self, index: &str) -> Option<&str> {
        self.get(index).and_then(|text| text.as_deref())
    }
}

/// Which of the two groups an adjustment parameter belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    A,
    B,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => f.write_str("a"),
            Side::B => f.write_str("b"),
        }
    }
}

/// Why no score could be produced
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UndefinedReason {
    #[error("one of the groups is empty")]
    EmptyGroup,

    #[error("adjustment parameter for group {side} is {value:?}, expected a value in (0, 1]")]
    InvalidAdjustmentParameter { side: Side, value: Option<f64> },

    #[error("inter-group mean distance is {value:?}, expected a value in [0, 1]")]
    InvalidInterGroupDistance { value: Option<f64> },
}

impl UndefinedReason {
    /// Short label for metrics
    pub fn label(&self) -> &'static str {
        match self {
            UndefinedReason::EmptyGroup => "empty_group",
            UndefinedReason::InvalidAdjustmentParameter { .. } => "invalid_adjustment_parameter",
            UndefinedReason::InvalidInterGroupDistance { .. } => "invalid_inter_group_distance",
        }
    }
}

/// A defined score together with the quantities it was built from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContributionScore {
    pub score: f64,
    pub overline_a: f64,
    pub overline_b: f64,
    pub mean_distance: f64,
}

/// Result of one contribution computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Contribution {
    Defined(ContributionScore),
    Undefined { reason: UndefinedReason },
}

impl Contribution {
    fn undefined(reason: UndefinedReason) -> Self {
        Contribution::Undefined { reason }
    }

    /// The score, if one was produced
    pub fn value(&self) -> Option<f64> {
        match self {
            Contribution::Defined(score) => Some(score.score),
            Contribution::Undefined { .. } => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Contribution::Defined(_))
    }
}

impl fmt::Display for Contribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Contribution::Defined(score) => write!(f, "{}", score.score),
            Contribution::Undefined { reason } => write!(f, "undefined ({reason})"),
        }
    }
}

/// The deadline passed before every needed distance was available
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("deadline exceeded before the contribution was computed")]
pub struct DeadlineExceeded;

/// Computes contribution scores over a shared distance cache
pub struct ContributionCalculator<E = DistanceEngine> {
    engine: E,
    cache: Arc<DistanceCache>,
    observer: Arc<dyn ContributionObserver>,
    config: ScoringConfig,
}

impl ContributionCalculator<DistanceEngine> {
    /// Calculator with the TF-IDF engine, a fresh cache, and tracing output
    pub fn new() -> Self {
        Self::with_engine(DistanceEngine::new())
    }
}

impl Default for ContributionCalculator<DistanceEngine> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: DocumentDistance> ContributionCalculator<E> {
    pub fn with_engine(engine: E) -> Self {
        Self {
            engine,
            cache: Arc::new(DistanceCache::new()),
            observer: Arc::new(TracingObserver),
            config: ScoringConfig::default(),
        }
    }

    /// Share an existing cache, e.g. across a batch of publications
    pub fn with_cache(mut self, cache: Arc<DistanceCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ContributionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_config(mut self, config: ScoringConfig) -> Self {
        self.config = config;
        self
    }

    pub fn cache(&self) -> &Arc<DistanceCache> {
        &self.cache
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Distances for every pair `(x, y)` with `x` in A, `y` in B and `x != y`
    ///
    /// Pairs without a usable distance are left out. Order follows the
    /// enumeration of A, then B.
    pub fn pairwise_distances<S, D>(&self, group_a: &[S], group_b: &[S], docs: &D) -> Vec<f64>
    where
        S: AsRef<str> + Sync,
        D: DocumentSource + ?Sized,
    {
        self.pairwise_within(group_a, group_b, docs, None)
            .unwrap_or_else(|_| unreachable!("no deadline was set"))
    }

    /// Arithmetic mean of [`pairwise_distances`](Self::pairwise_distances)
    pub fn mean_distance<S, D>(&self, group_a: &[S], group_b: &[S], docs: &D) -> Option<f64>
    where
        S: AsRef<str> + Sync,
        D: DocumentSource + ?Sized,
    {
        self.mean_within(group_a, group_b, docs, None)
            .unwrap_or_else(|_| unreachable!("no deadline was set"))
    }

    /// Contribution of the publication whose references are `indices_a`
    /// and whose citations are `indices_b`
    pub fn contribution<S, D>(&self, indices_a: &[S], indices_b: &[S], docs: &D) -> Contribution
    where
        S: AsRef<str> + Sync,
        D: DocumentSource + ?Sized,
    {
        self.contribution_within(indices_a, indices_b, docs, None)
            .unwrap_or_else(|_| unreachable!("no deadline was set"))
    }

    /// Same as [`contribution`](Self::contribution), giving up once `deadline` passes
    ///
    /// The deadline is checked before each engine call, so cache hits never
    /// fail. Distances computed before giving up stay cached.
    pub fn contribution_within<S, D>(
        &self,
        indices_a: &[S],
        indices_b: &[S],
        docs: &D,
        deadline: Option<Instant>,
    ) -> Result<Contribution, DeadlineExceeded>
    where
        S: AsRef<str> + Sync,
        D: DocumentSource + ?Sized,
    {
        let started = Instant::now();
        let outcome = self.evaluate(indices_a, indices_b, docs, deadline)?;
        self.report(&outcome, started.elapsed());
        Ok(outcome)
    }

    /// Convenience wrapper taking a budget instead of an instant
    pub fn contribution_with_budget<S, D>(
        &self,
        indices_a: &[S],
        indices_b: &[S],
        docs: &D,
        budget: Option<Duration>,
    ) -> Result<Contribution, DeadlineExceeded>
    where
        S: AsRef<str> + Sync,
        D: DocumentSource + ?Sized,
    {
        let deadline = budget.map(|budget| Instant::now() + budget);
        self.contribution_within(indices_a, indices_b, docs, deadline)
    }

    fn evaluate<S, D>(
        &self,
        indices_a: &[S],
        indices_b: &[S],
        docs: &D,
        deadline: Option<Instant>,
    ) -> Result<Contribution, DeadlineExceeded>
    where
        S: AsRef<str> + Sync,
        D: DocumentSource + ?Sized,
    {
        if indices_a.is_empty() || indices_b.is_empty() {
            return Ok(Contribution::undefined(UndefinedReason::EmptyGroup));
        }

        let overline_a = self.adjustment(Side::A, indices_a, docs, deadline)?;
        let overline_b = self.adjustment(Side::B, indices_b, docs, deadline)?;

        let Some(overline_a) = valid_adjustment(overline_a) else {
            return Ok(Contribution::undefined(UndefinedReason::InvalidAdjustmentParameter {
                side: Side::A,
                value: overline_a,
            }));
        };
        let Some(overline_b) = valid_adjustment(overline_b) else {
            return Ok(Contribution::undefined(UndefinedReason::InvalidAdjustmentParameter {
                side: Side::B,
                value: overline_b,
            }));
        };

        let mean = self.mean_within(indices_a, indices_b, docs, deadline)?;
        let Some(mean_distance) = mean.filter(|m| (0.0..=1.0).contains(m)) else {
            return Ok(Contribution::undefined(UndefinedReason::InvalidInterGroupDistance {
                value: mean,
            }));
        };

        Ok(Contribution::Defined(ContributionScore {
            score: (overline_b / overline_a) * mean_distance,
            overline_a,
            overline_b,
            mean_distance,
        }))
    }

    fn report(&self, outcome: &Contribution, elapsed: Duration) {
        match outcome {
            Contribution::Defined(score) => self.emit(ScoringEvent::Computed {
                score: score.score,
                adjust: score.overline_b / score.overline_a,
                mean_distance: score.mean_distance,
                elapsed,
            }),
            Contribution::Undefined { reason } => {
                self.emit(ScoringEvent::Undefined { reason, elapsed })
            }
        }
    }

    /// Adjustment parameter of one group
    ///
    /// A group with a single member has no intra-group pairs, so its own
    /// parameter is exactly 1. Otherwise it is the mean intra-group distance.
    fn adjustment<S, D>(
        &self,
        side: Side,
        indices: &[S],
        docs: &D,
        deadline: Option<Instant>,
    ) -> Result<Option<f64>, DeadlineExceeded>
    where
        S: AsRef<str> + Sync,
        D: DocumentSource + ?Sized,
    {
        if indices.len() == 1 {
            self.emit(ScoringEvent::AdjustmentForcedToOne { side });
            return Ok(Some(1.0));
        }

        let value = self.mean_within(indices, indices, docs, deadline)?;
        self.emit(ScoringEvent::AdjustmentParameter { side, value });
        Ok(value)
    }

    fn mean_within<S, D>(
        &self,
        group_a: &[S],
        group_b: &[S],
        docs: &D,
        deadline: Option<Instant>,
    ) -> Result<Option<f64>, DeadlineExceeded>
    where
        S: AsRef<str> + Sync,
        D: DocumentSource + ?Sized,
    {
        let distances = self.pairwise_within(group_a, group_b, docs, deadline)?;
        let mean = if distances.is_empty() {
            None
        } else {
            Some(distances.iter().sum::<f64>() / distances.len() as f64)
        };
        self.emit(ScoringEvent::MeanDistance { mean, pairs: distances.len() });
        Ok(mean)
    }

    fn pairwise_within<S, D>(
        &self,
        group_a: &[S],
        group_b: &[S],
        docs: &D,
        deadline: Option<Instant>,
    ) -> Result<Vec<f64>, DeadlineExceeded>
    where
        S: AsRef<str> + Sync,
        D: DocumentSource + ?Sized,
    {
        let pairs: Vec<(&str, &str)> = group_a
            .iter()
            .flat_map(|x| group_b.iter().map(move |y| (x.as_ref(), y.as_ref())))
            .collect();

        let resolved: Vec<Option<f64>> =
            if self.config.parallel && pairs.len() >= self.config.parallel_threshold {
                pairs
                    .par_iter()
                    .map(|&(x, y)| self.resolve_pair(x, y, docs, deadline))
                    .collect::<Result<_, _>>()?
            } else {
                pairs
                    .iter()
                    .map(|&(x, y)| self.resolve_pair(x, y, docs, deadline))
                    .collect::<Result<_, _>>()?
            };

        Ok(resolved.into_iter().flatten().collect())
    }

    fn resolve_pair<D>(
        &self,
        x: &str,
        y: &str,
        docs: &D,
        deadline: Option<Instant>,
    ) -> Result<Option<f64>, DeadlineExceeded>
    where
        D: DocumentSource + ?Sized,
    {
        if x == y {
            self.emit(ScoringEvent::SelfPairSkipped { index: x });
            return Ok(None);
        }

        if let Some(distance) = self.cache.get(x, y) {
            self.emit(ScoringEvent::CacheHit { a: x, b: y, distance });
            return Ok(Some(distance));
        }

        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(DeadlineExceeded);
        }

        match self.engine.document_distance(docs.text(x), docs.text(y)) {
            Ok(distance) => {
                self.cache.put(x, y, distance);
                self.emit(ScoringEvent::DistanceComputed { a: x, b: y, distance });
                Ok(Some(distance))
            }
            Err(reason) => {
                self.emit(ScoringEvent::DistanceUnavailable { a: x, b: y, reason });
                Ok(None)
            }
        }
    }

    fn emit(&self, event: ScoringEvent<'_>) {
        self.observer.observe(&event);
    }
}

/// Presence first, then the (0, 1] bound
fn valid_adjustment(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v > 0.0 && *v <= 1.0)
}
