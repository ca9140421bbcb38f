//! CiteForge Scoring
//!
//! Estimates how much a publication contributes by comparing the texts of
//! the documents it cites with the texts of the documents citing it.
//!
//! Provides:
//! - TF-IDF cosine distance between two texts ([`DistanceEngine`])
//! - A symmetric, thread-safe distance cache ([`DistanceCache`])
//! - Contribution aggregation ([`ContributionCalculator`])
//! - Diagnostic events through an injectable [`ContributionObserver`]
//!
//! ```no_run
//! use citeforge_scoring::ContributionCalculator;
//! use std::collections::HashMap;
//!
//! let docs: HashMap<String, String> = HashMap::from([
//!     ("1".to_string(), "the cat sat on the mat".to_string()),
//!     ("2".to_string(), "a cat on a mat".to_string()),
//! ]);
//! let calculator = ContributionCalculator::new();
//! let result = calculator.contribution(&["1"], &["2"], &docs);
//! println!("{result}");
//! ```

pub mod cache;
pub mod contribution;
pub mod distance;
pub mod observer;
pub mod text;

pub use cache::{DistanceCache, DistanceSnapshot, SnapshotError};
pub use contribution::{
    Contribution, ContributionCalculator, ContributionScore, DeadlineExceeded, DocumentSource,
    Side, UndefinedReason,
};
pub use distance::{DistanceEngine, DocumentDistance, Unavailable};
pub use observer::{ContributionObserver, NoopObserver, ScoringEvent, TracingObserver};
pub use text::TextNormalizer;
