//! Reconciliation integration tests
//!
//! Exercises the engine end to end with scripted match strategies and
//! completion clients, so no external service is involved.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use namerec::completion::{ChatMessage, Choice, CompletionRequest, CompletionResponse, Role};
use namerec::{
    sequence_ratio, CandidateList, CompletionClient, Confidence, ListMatch, Matcher, ModelMatcher,
    NoopCache, ReconcileResult, Reconciler,
};

/// Install a subscriber once so RUST_LOG=namerec=debug shows the
/// engine's decisions while debugging a test
fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Match strategy driven by a fixed lookup table
struct TableMatcher {
    /// ((input name, model), hit) pairs
    table: Vec<((String, String), ListMatch)>,
    calls: AtomicUsize,
}

impl TableMatcher {
    fn new(entries: Vec<((&str, &str), ListMatch)>) -> Self {
        Self {
            table: entries
                .into_iter()
                .map(|((n, m), hit)| ((n.to_string(), m.to_string()), hit))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    fn empty() -> Self {
        Self::new(Vec::new())
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Matcher for TableMatcher {
    fn find_match(
        &self,
        input_name: &str,
        candidates: &[String],
        model: &str,
        _context: Option<&str>,
    ) -> Result<Option<ListMatch>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let hit = self
            .table
            .iter()
            .find(|((n, m), hit)| {
                n == input_name && m == model && candidates.get(hit.index) == Some(&hit.name)
            })
            .map(|(_, hit)| hit.clone());
        Ok(hit)
    }
}

/// Strategy that always errors, standing in for a collaborator failure
struct FailingMatcher;

impl Matcher for FailingMatcher {
    fn find_match(
        &self,
        _input_name: &str,
        _candidates: &[String],
        _model: &str,
        _context: Option<&str>,
    ) -> Result<Option<ListMatch>> {
        anyhow::bail!("completion service unavailable")
    }
}

fn hit(index: usize, name: &str, model_confidence: f64) -> ListMatch {
    ListMatch {
        index,
        name: name.to_string(),
        confidence: Confidence::from_model(model_confidence),
    }
}

fn keyed(names: &[&str]) -> Vec<(usize, Option<String>)> {
    names
        .iter()
        .enumerate()
        .map(|(ix, n)| (ix, Some(n.to_string())))
        .collect()
}

fn sparse(names: &[&str]) -> Vec<Option<String>> {
    names.iter().map(|n| Some(n.to_string())).collect()
}

#[test]
fn test_batch_preserves_input_order_and_arity() {
    // "Beta" matches, the other two do not
    let matcher = Arc::new(TableMatcher::new(vec![(("Beta", "m"), hit(1, "Beta", 0.9))]));
    let reconciler = Reconciler::new(["m"], matcher);

    let results: Vec<_> = reconciler
        .reconcile(keyed(&["Alpha?", "Beta", "Gamma?"]), vec![sparse(&["Aleph", "Beta"])])
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].0, 0);
    assert!(results[0].1.is_none());
    assert_eq!(results[1].0, 1);
    assert_eq!(results[1].1.as_ref().unwrap().matched_name, "Beta");
    assert_eq!(results[2].0, 2);
    assert!(results[2].1.is_none());
}

#[test]
fn test_missing_input_skipped_without_match_attempt() {
    let matcher = Arc::new(TableMatcher::empty());
    let reconciler = Reconciler::new(["m"], matcher.clone());

    let inputs: Vec<(usize, Option<String>)> = vec![(0, None)];
    let results: Vec<_> = reconciler
        .reconcile(inputs, vec![sparse(&["Acme"])])
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(results, vec![(0, None)]);
    assert_eq!(matcher.call_count(), 0);
}

#[test]
fn test_match_ix_refers_to_original_unsorted_list() {
    // Working list sorts to [Aardvark, Zebra]; "Zebra" sits at
    // position 0 of the caller's list.
    let matcher = Arc::new(TableMatcher::new(vec![(("Zebra Inc", "m"), hit(1, "Zebra", 0.9))]));
    let reconciler = Reconciler::new(["m"], matcher);

    let results: Vec<_> = reconciler
        .reconcile(keyed(&["Zebra Inc"]), vec![sparse(&["Zebra", "Aardvark"])])
        .collect::<Result<_>>()
        .unwrap();

    let result = results[0].1.as_ref().unwrap();
    assert_eq!(result.matched_name, "Zebra");
    assert_eq!(result.match_ix, 0);
}

#[test]
fn test_missing_candidates_dropped_but_positions_kept() {
    let matcher = Arc::new(TableMatcher::new(vec![(("Acme Corp", "m"), hit(0, "Acme", 0.9))]));
    let reconciler = Reconciler::new(["m"], matcher);

    let candidates = vec![None, None, Some("Acme".to_string()), Some("Zed".to_string())];
    let results: Vec<_> = reconciler
        .reconcile(keyed(&["Acme Corp"]), vec![candidates])
        .collect::<Result<_>>()
        .unwrap();

    let result = results[0].1.as_ref().unwrap();
    assert_eq!(result.match_ix, 2);
}

#[test]
fn test_ranking_picks_highest_percent_across_models() {
    // Second model's hit has the better lexical and model scores
    let matcher = Arc::new(TableMatcher::new(vec![
        (("Acme Corp", "weak"), hit(1, "Ajax Ltd", 0.3)),
        (("Acme Corp", "strong"), hit(0, "Acme Corporation", 0.9)),
    ]));
    let reconciler = Reconciler::new(["weak", "strong"], matcher);

    let results: Vec<_> = reconciler
        .reconcile(
            keyed(&["Acme Corp"]),
            vec![sparse(&["Acme Corporation", "Ajax Ltd"])],
        )
        .collect::<Result<_>>()
        .unwrap();

    let result = results[0].1.as_ref().unwrap();
    assert_eq!(result.matched_name, "Acme Corporation");
    assert_eq!(result.model, "strong");
}

#[test]
fn test_tie_broken_by_enumeration_order() {
    // Both models return the identical hit; the first model wins
    let matcher = Arc::new(TableMatcher::new(vec![
        (("Acme Corp", "first"), hit(0, "Acme Corporation", 0.7)),
        (("Acme Corp", "second"), hit(0, "Acme Corporation", 0.7)),
    ]));
    let reconciler = Reconciler::new(["first", "second"], matcher);

    let results: Vec<_> = reconciler
        .reconcile(keyed(&["Acme Corp"]), vec![sparse(&["Acme Corporation"])])
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(results[0].1.as_ref().unwrap().model, "first");
}

#[test]
fn test_second_list_searched_when_first_has_no_match() {
    let matcher = Arc::new(TableMatcher::new(vec![(("Acme Corp", "m"), hit(0, "Acme Corporation", 0.8))]));
    let reconciler = Reconciler::new(["m"], matcher);

    let results: Vec<_> = reconciler
        .reconcile(
            keyed(&["Acme Corp"]),
            vec![sparse(&["Unrelated"]), sparse(&["Acme Corporation"])],
        )
        .collect::<Result<_>>()
        .unwrap();

    let result = results[0].1.as_ref().unwrap();
    assert_eq!(result.match_list_ix, 1);
    assert_eq!(result.match_ix, 0);
}

#[test]
fn test_lexical_ratio_attached_to_confidence() {
    let matcher = Arc::new(TableMatcher::new(vec![(("Acme Corp", "m"), hit(0, "Acme Corporation", 0.7))]));
    let reconciler = Reconciler::new(["m"], matcher);

    let results: Vec<_> = reconciler
        .reconcile(keyed(&["Acme Corp"]), vec![sparse(&["Acme Corporation"])])
        .collect::<Result<_>>()
        .unwrap();

    let result = results[0].1.as_ref().unwrap();
    let expected = sequence_ratio("Acme Corp", "Acme Corporation");
    assert_eq!(result.confidence.lexical, expected);
    assert_eq!(result.confidence.model, 0.7);
    let expected_percent = (expected * 0.8 + 0.7 * 1.2) / 2.0;
    assert!((result.confidence.percent() - expected_percent).abs() < 1e-12);
}

#[test]
fn test_collaborator_failure_ends_sequence() {
    let reconciler = Reconciler::new(["m"], Arc::new(FailingMatcher));

    let mut iter = reconciler.reconcile(keyed(&["One", "Two"]), vec![sparse(&["Acme"])]);
    assert!(iter.next().unwrap().is_err());
    // Sequence is fused after the failure
    assert!(iter.next().is_none());
}

#[test]
fn test_laziness_no_work_before_pull() {
    let matcher = Arc::new(TableMatcher::empty());
    let reconciler = Reconciler::new(["m"], matcher.clone());

    let iter = reconciler.reconcile(keyed(&["One", "Two"]), vec![sparse(&["Acme"])]);
    assert_eq!(matcher.call_count(), 0);

    // Pulling one element attempts only that input
    let mut iter = iter;
    iter.next().unwrap().unwrap();
    assert_eq!(matcher.call_count(), 1);
    drop(iter);
    assert_eq!(matcher.call_count(), 1);
}

#[test]
fn test_reconcile_name_direct() {
    let matcher = Arc::new(TableMatcher::new(vec![(("Acme Corp", "m"), hit(0, "Acme Corporation", 0.9))]));
    let reconciler = Reconciler::new(["m"], matcher);

    let lists = vec![CandidateList::new(["Acme Corporation"])];
    let result = reconciler
        .reconcile_name(Some("Acme Corp"), &lists)
        .unwrap()
        .unwrap();
    assert_eq!(result.matched_name, "Acme Corporation");

    assert!(reconciler.reconcile_name(None, &lists).unwrap().is_none());
}

#[test]
fn test_from_config_applies_weights() {
    // With an all-model weighting, the higher model score wins even
    // though its lexical score is worse.
    let yaml = "models: [a, b]\nweights:\n  lexical: 0.0\n  model: 2.0\n";
    let config = namerec::ReconcilerConfig::from_yaml(yaml).unwrap();

    let matcher = Arc::new(TableMatcher::new(vec![
        (("Acme Corp", "a"), hit(0, "Acme Corporation", 0.2)),
        (("Acme Corp", "b"), hit(1, "Ajax Ltd", 0.8)),
    ]));
    let reconciler = Reconciler::from_config(&config, matcher);

    let results: Vec<_> = reconciler
        .reconcile(
            keyed(&["Acme Corp"]),
            vec![sparse(&["Acme Corporation", "Ajax Ltd"])],
        )
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(results[0].1.as_ref().unwrap().matched_name, "Ajax Ltd");
}

// --- End to end through ModelMatcher with a scripted completion client ---

/// Completion client returning a fixed body, counting calls
struct ScriptedClient {
    body: String,
    calls: AtomicUsize,
}

impl ScriptedClient {
    fn new(body: &str) -> Self {
        Self {
            body: body.to_string(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl CompletionClient for ScriptedClient {
    fn name(&self) -> &str {
        "scripted"
    }

    fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(CompletionResponse {
            choices: vec![Choice {
                message: ChatMessage {
                    role: Role::Assistant,
                    content: Some(self.body.clone()),
                },
            }],
        })
    }
}

#[test]
fn test_end_to_end_model_match() {
    init_tracing();
    let client = Arc::new(ScriptedClient::new(
        "```json\n{\"best_match\": [\"Acme Corporation\"], \"confidence\": 0.7}\n```",
    ));
    let matcher = Arc::new(ModelMatcher::new(client).with_cache(Arc::new(NoopCache)));
    let reconciler = Reconciler::new(["gpt-4o-mini"], matcher);

    let results: Vec<_> = reconciler
        .reconcile(
            keyed(&["Acme Corp"]),
            vec![sparse(&["Acme Corporation", "Other Inc"])],
        )
        .collect::<Result<_>>()
        .unwrap();

    let result: &ReconcileResult = results[0].1.as_ref().unwrap();
    assert_eq!(result.matched_name, "Acme Corporation");
    assert_eq!(result.model, "gpt-4o-mini");
    assert_eq!(result.confidence.model, 0.7);
    assert_eq!(
        result.confidence.lexical,
        sequence_ratio("Acme Corp", "Acme Corporation")
    );
}

#[test]
fn test_end_to_end_exact_match_never_calls_model() {
    let client = Arc::new(ScriptedClient::new("{}"));
    let matcher = Arc::new(ModelMatcher::new(client.clone()).with_cache(Arc::new(NoopCache)));
    let reconciler = Reconciler::new(["gpt-4o-mini"], matcher);

    let results: Vec<_> = reconciler
        .reconcile(
            keyed(&["Other Inc"]),
            vec![sparse(&["Acme Corporation", "Other Inc"])],
        )
        .collect::<Result<_>>()
        .unwrap();

    let result = results[0].1.as_ref().unwrap();
    assert_eq!(result.matched_name, "Other Inc");
    assert_eq!(result.match_ix, 1);
    assert_eq!(result.confidence.model, 1.0);
    // Lexical ratio of identical strings
    assert_eq!(result.confidence.lexical, 1.0);
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_end_to_end_invented_name_is_no_result() {
    let client = Arc::new(ScriptedClient::new(
        r#"{"best_match": ["Nonexistent Name"], "confidence": 0.9}"#,
    ));
    let matcher = Arc::new(ModelMatcher::new(client).with_cache(Arc::new(NoopCache)));
    let reconciler = Reconciler::new(["gpt-4o-mini"], matcher);

    let results: Vec<_> = reconciler
        .reconcile(keyed(&["Acme Corp"]), vec![sparse(&["Acme Corporation"])])
        .collect::<Result<_>>()
        .unwrap();

    assert!(results[0].1.is_none());
}
