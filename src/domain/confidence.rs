//! Confidence scoring for reconciliation matches.
//!
//! A match carries two independent scores: a lexical similarity ratio
//! computed locally, and a self-reported confidence from the AI model.
//! The combined `percent` is a weighted average of the two.

use serde::{Deserialize, Serialize};

/// Weights applied when combining the two confidence components.
///
/// The defaults (0.8 lexical, 1.2 model, averaged over 2) are tuning
/// values, not a law. Callers that want a different balance supply
/// their own weights via [`ReconcilerConfig`](crate::config::ReconcilerConfig)
/// or [`Reconciler::with_weights`](crate::reconcile::Reconciler::with_weights).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceWeights {
    /// Weight for the locally computed lexical similarity ratio
    pub lexical: f64,
    /// Weight for the model's self-reported confidence
    pub model: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            lexical: 0.8,
            model: 1.2,
        }
    }
}

/// Confidence score for a single match.
///
/// Both components default to 0.0. No range validation is performed;
/// producers are expected to supply values in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Confidence {
    /// Lexical similarity ratio between input and matched name
    pub lexical: f64,
    /// Confidence self-reported by the AI model
    pub model: f64,
}

impl Confidence {
    /// Confidence with only the model component set
    pub fn from_model(model: f64) -> Self {
        Self {
            lexical: 0.0,
            model,
        }
    }

    /// Combined score under the default weights
    pub fn percent(&self) -> f64 {
        self.percent_with(&ConfidenceWeights::default())
    }

    /// Combined score under explicit weights
    pub fn percent_with(&self, weights: &ConfidenceWeights) -> f64 {
        (self.lexical * weights.lexical + self.model * weights.model) / 2.0
    }
}
