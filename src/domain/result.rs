//! Result and candidate-list data types for reconciliation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::confidence::Confidence;

/// A candidate list prepared for matching.
///
/// Built from a caller-supplied sequence of optional names: missing
/// entries are dropped and the remainder is sorted by name, keeping the
/// original positions so matches can be reported against the caller's
/// indexing. Sorting keeps the prompt presented to the AI model stable
/// across runs; it is not a business requirement.
#[derive(Debug, Clone)]
pub struct CandidateList {
    /// Original positions in the caller's list, parallel to `names`
    indices: Vec<usize>,
    /// Candidate names, sorted
    names: Vec<String>,
}

impl CandidateList {
    /// Build from a dense list of names (no missing entries)
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_sparse(names.into_iter().map(|n| Some(n.into())))
    }

    /// Build from a list that may contain missing entries
    pub fn from_sparse<I>(names: I) -> Self
    where
        I: IntoIterator<Item = Option<String>>,
    {
        let mut entries: Vec<(usize, String)> = names
            .into_iter()
            .enumerate()
            .filter_map(|(ix, name)| name.map(|n| (ix, n)))
            .collect();
        entries.sort_by(|a, b| a.1.cmp(&b.1));

        let (indices, names) = entries.into_iter().unzip();
        Self { indices, names }
    }

    /// Candidate names in working (sorted) order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Translate a working-order index back to the original position
    pub fn original_index(&self, working_ix: usize) -> usize {
        self.indices[working_ix]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// One candidate's outcome for a single (input, list, model) attempt.
///
/// `index` is relative to the list as searched; the reconciler
/// translates it back to the caller's original indexing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListMatch {
    /// Match index within the searched list
    pub index: usize,
    /// Matched name, verbatim from the candidate list
    pub name: String,
    /// Match confidence
    pub confidence: Confidence,
}

/// Finalized outcome of reconciling one input name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcileResult {
    /// Original input name
    pub input_name: String,
    /// Successfully matched name, verbatim from the candidate list
    pub matched_name: String,
    /// Index into the original (caller-supplied) candidate list
    pub match_ix: usize,
    /// Which candidate list the match came from
    pub match_list_ix: usize,
    /// AI model that produced the match
    pub model: String,
    /// Match confidence
    pub confidence: Confidence,
    /// Additional caller-attached annotations
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}
