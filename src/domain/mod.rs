//! Domain types for name reconciliation.
//!
//! This module contains the core data structures:
//! - Confidence: weighted two-component match score
//! - CandidateList: prepared candidate names with original positions
//! - ListMatch / ReconcileResult: per-attempt and finalized outcomes

pub mod confidence;
pub mod result;

// Re-export commonly used types
pub use confidence::{Confidence, ConfidenceWeights};
pub use result::{CandidateList, ListMatch, ReconcileResult};
