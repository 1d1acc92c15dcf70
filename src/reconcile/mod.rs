//! Reconciliation engine: search order, ranking, and the batch driver.
//!
//! For a single input name the engine tries every (candidate list,
//! model) pair in priority order, enriches each hit with a lexical
//! similarity ratio, and keeps the hit with the highest combined
//! confidence. All hits are collected and ranked rather than stopping
//! at the first one; with equal confidences the stable sort preserves
//! enumeration order, so first-match behavior falls out as the tie case.
//!
//! Batches are lazy: results are produced one per pull, in input order,
//! and abandoning the iterator issues no further model calls.

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::config::ReconcilerConfig;
use crate::domain::{CandidateList, ConfidenceWeights, ReconcileResult};
use crate::matching::Matcher;
use crate::similarity::sequence_ratio;

/// Name reconciliation engine.
///
/// Holds the model priority list, optional steering context, the
/// confidence weighting policy, and the match strategy.
pub struct Reconciler {
    models: Vec<String>,
    context: Option<String>,
    weights: ConfidenceWeights,
    matcher: Arc<dyn Matcher>,
}

impl Reconciler {
    /// Engine trying `models` in order with the given match strategy
    pub fn new<M, S>(models: M, matcher: Arc<dyn Matcher>) -> Self
    where
        M: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            models: models.into_iter().map(Into::into).collect(),
            context: None,
            weights: ConfidenceWeights::default(),
            matcher,
        }
    }

    /// Engine configured from a [`ReconcilerConfig`]
    pub fn from_config(config: &ReconcilerConfig, matcher: Arc<dyn Matcher>) -> Self {
        Self {
            models: config.models.clone(),
            context: config.context.clone(),
            weights: config.weights,
            matcher,
        }
    }

    /// Free-text context appended to the match instruction
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Override the confidence weighting policy
    pub fn with_weights(mut self, weights: ConfidenceWeights) -> Self {
        self.weights = weights;
        self
    }

    /// One match attempt against one list with one model.
    ///
    /// Translates the hit's index back to the list's original positions
    /// and attaches the lexical similarity ratio.
    fn attempt(
        &self,
        name: &str,
        list: &CandidateList,
        list_ix: usize,
        model: &str,
    ) -> Result<Option<ReconcileResult>> {
        let hit = self
            .matcher
            .find_match(name, list.names(), model, self.context.as_deref())?;

        let Some(mut hit) = hit else {
            warn!(name, model, list_ix, "No match found");
            return Ok(None);
        };

        hit.confidence.lexical = sequence_ratio(name, &hit.name);

        Ok(Some(ReconcileResult {
            input_name: name.to_string(),
            matched_name: hit.name,
            match_ix: list.original_index(hit.index),
            match_list_ix: list_ix,
            model: model.to_string(),
            confidence: hit.confidence,
            metadata: Default::default(),
        }))
    }

    /// Reconcile one input name across all candidate lists and models.
    ///
    /// `None` input (a missing value) is skipped without any match
    /// attempt. Returns the highest-confidence hit, or `None` when no
    /// (list, model) pair produced one.
    pub fn reconcile_name(
        &self,
        name: Option<&str>,
        match_lists: &[CandidateList],
    ) -> Result<Option<ReconcileResult>> {
        let Some(name) = name else {
            return Ok(None);
        };

        let mut results: Vec<ReconcileResult> = Vec::new();

        for (list_ix, list) in match_lists.iter().enumerate() {
            for model in &self.models {
                if let Some(result) = self.attempt(name, list, list_ix, model)? {
                    results.push(result);
                }
            }
        }

        if results.is_empty() {
            return Ok(None);
        }

        // Stable sort: equal confidences keep (list, model) order
        results.sort_by(|a, b| {
            b.confidence
                .percent_with(&self.weights)
                .total_cmp(&a.confidence.percent_with(&self.weights))
        });

        for result in &results {
            info!(
                input_name = %result.input_name,
                matched_name = %result.matched_name,
                percent = result.confidence.percent_with(&self.weights),
                "Candidate match"
            );
        }

        let best = results.swap_remove(0);
        info!(
            name,
            matched_name = %best.matched_name,
            percent = best.confidence.percent_with(&self.weights),
            "Best match selected"
        );

        Ok(Some(best))
    }

    /// Reconcile a batch of keyed input names.
    ///
    /// Candidate lists are normalized once up front (missing entries
    /// dropped, sorted by name, original positions retained). Output is
    /// a lazy iterator yielding one `(key, result-or-none)` per input,
    /// in input order; nothing is computed until pulled. A collaborator
    /// failure is yielded as an `Err` item and ends the sequence.
    pub fn reconcile<'a, K, I>(
        &'a self,
        inputs: I,
        match_lists: Vec<Vec<Option<String>>>,
    ) -> impl Iterator<Item = Result<(K, Option<ReconcileResult>)>> + 'a
    where
        I: IntoIterator<Item = (K, Option<String>)>,
        I::IntoIter: 'a,
        K: std::fmt::Debug + 'a,
    {
        let match_lists: Vec<CandidateList> = match_lists
            .into_iter()
            .map(CandidateList::from_sparse)
            .collect();

        let mut inputs = inputs.into_iter();
        let mut failed = false;

        std::iter::from_fn(move || {
            if failed {
                return None;
            }
            let (key, name) = inputs.next()?;
            info!(key = ?key, name = ?name, "Processing row");

            match self.reconcile_name(name.as_deref(), &match_lists) {
                Ok(result) => Some(Ok((key, result))),
                Err(e) => {
                    failed = true;
                    Some(Err(e))
                }
            }
        })
    }
}
