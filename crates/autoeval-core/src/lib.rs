//! # autoeval-core
//!
//! Deterministic claim-matching arithmetic for autoeval.
//!
//! This crate owns everything that happens *after* the LLM has labeled
//! sentences: partitioning labeled sentences into a confusion set,
//! the forward/backward merge policy, and precision/recall/F1.
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same labeled input always produces same output
//! 2. **No LLM calls**: decomposition and classification live in
//!    `autoeval-runtime`; this crate is pure arithmetic
//! 3. **Disjoint buckets**: no sentence instance lands in more than one
//!    confusion bucket
//!
//! ## Example
//!
//! ```rust
//! use autoeval_core::ConfusionSet;
//!
//! let forward = vec![("Birds can fly.".to_string(), true),
//!                    ("The sky is green.".to_string(), false)];
//! let backward = vec![("Birds can fly.".to_string(), true),
//!                     ("The ocean is salty.".to_string(), false)];
//!
//! let confusion = ConfusionSet::from_passes(forward, backward);
//! let metrics = confusion.metrics();
//! assert_eq!(metrics.recall, 0.5);
//! ```

pub mod confusion;
pub mod metrics;
pub mod report;

pub use confusion::ConfusionSet;
pub use metrics::Metrics;
pub use report::EvalReport;
