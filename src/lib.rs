//! namerec - AI-assisted fuzzy name reconciliation
//!
//! Given input name strings and one or more candidate lists, find the
//! best-matching candidate for each input using exact lookup, AI-model
//! fuzzy matching, and lexical similarity scoring.
//!
//! # Architecture
//!
//! - Exact matches short-circuit before any model call
//! - Model calls are memoized with a staleness window
//! - Every (candidate list, model) hit is ranked by weighted confidence
//!   and the best one wins
//! - Batches are lazy: one result per pull, in input order
//!
//! # Modules
//!
//! - `completion`: External text-generation collaborator (client trait,
//!   OpenAI-compatible implementation, response decoding)
//! - `matching`: Match strategies and result memoization
//! - `reconcile`: The reconciliation engine and batch driver
//! - `domain`: Data structures (Confidence, CandidateList, results)
//! - `config`: YAML configuration
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use namerec::{ModelMatcher, OpenAiClient, Reconciler};
//!
//! let client = Arc::new(OpenAiClient::new("sk-..."));
//! let matcher = Arc::new(ModelMatcher::new(client));
//! let reconciler = Reconciler::new(["gpt-4o-mini"], matcher);
//!
//! let inputs = vec![(0usize, Some("Acme Corp".to_string()))];
//! let candidates = vec![vec![
//!     Some("Acme Corporation".to_string()),
//!     Some("Other Inc".to_string()),
//! ]];
//!
//! for item in reconciler.reconcile(inputs, candidates) {
//!     let (key, result) = item.unwrap();
//!     println!("{key}: {result:?}");
//! }
//! ```

pub mod completion;
pub mod config;
pub mod domain;
pub mod matching;
pub mod reconcile;
pub mod similarity;

// Re-export main types at crate root for convenience
pub use completion::{CompletionClient, CompletionRequest, CompletionResponse, OpenAiClient};
pub use config::ReconcilerConfig;
pub use domain::{CandidateList, Confidence, ConfidenceWeights, ListMatch, ReconcileResult};
pub use matching::{ExactMatcher, MatchCache, Matcher, ModelMatcher, NoopCache, StaleCache};
pub use reconcile::Reconciler;
pub use similarity::sequence_ratio;
