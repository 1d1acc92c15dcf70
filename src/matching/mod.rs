//! Match strategies: how one input name is located in one candidate list.
//!
//! The reconciler depends on the [`Matcher`] trait, not on any concrete
//! strategy. The production strategy is [`ModelMatcher`] (exact lookup
//! first, then an AI model); [`ExactMatcher`] matches literally and
//! nothing else, useful as a cheap backend or a test stand-in.

pub mod cache;

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info, warn};

use crate::completion::decode::decode_match_payload;
use crate::completion::{ChatMessage, CompletionClient, CompletionRequest, ResponseFormat};
use crate::domain::{Confidence, ListMatch};

pub use cache::{CacheKey, MatchCache, NoopCache, StaleCache};

/// Strategy for matching one input name against one candidate list.
///
/// `Ok(None)` means "no reasonable match" and is an expected outcome;
/// `Err` is reserved for collaborator failures and propagates.
pub trait Matcher: Send + Sync {
    fn find_match(
        &self,
        input_name: &str,
        candidates: &[String],
        model: &str,
        context: Option<&str>,
    ) -> Result<Option<ListMatch>>;
}

/// Literal-equality matcher; never calls out.
pub struct ExactMatcher;

impl Matcher for ExactMatcher {
    fn find_match(
        &self,
        input_name: &str,
        candidates: &[String],
        _model: &str,
        _context: Option<&str>,
    ) -> Result<Option<ListMatch>> {
        Ok(exact_lookup(input_name, candidates))
    }
}

fn exact_lookup(input_name: &str, candidates: &[String]) -> Option<ListMatch> {
    let index = candidates.iter().position(|c| c == input_name)?;
    Some(ListMatch {
        index,
        name: input_name.to_string(),
        confidence: Confidence::from_model(1.0),
    })
}

/// AI-backed fuzzy matcher with memoization.
///
/// Tries exact lookup first; otherwise prompts the completion backend
/// with the full candidate list and decodes its structured answer. A
/// name the model invents (absent from the candidate list) is rejected
/// and logged, never returned.
pub struct ModelMatcher {
    client: Arc<dyn CompletionClient>,
    cache: Arc<dyn MatchCache>,
}

impl ModelMatcher {
    /// Matcher with the standard one-day result cache
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            cache: Arc::new(StaleCache::one_day()),
        }
    }

    /// Substitute the result cache
    pub fn with_cache(mut self, cache: Arc<dyn MatchCache>) -> Self {
        self.cache = cache;
        self
    }

    fn build_system_message(context: Option<&str>) -> String {
        let context = context.unwrap_or("");
        format!(
            "Take the following input-name and match-list and fuzzy-find the \
             input-name within the match-list.\n\n\
             Use your reason to find the best match, and return the best match \
             as a JSON object with the following properties:\n\n\
             - best_match (list[str]): The best match, a list of the best match, \
             or matches, from the **MATCH LIST VERBATIM, NOT FROM THE INPUT NAME**. \
             If a **REASONABLE** match is not found, return an empty list. \
             Don't overthink it, just use your intuition.\n\
             - confidence (float): An approximate confidence of the match, \
             a number between 0 and 1.\n\n\
             You **MUST** only include values from the match-list in the \
             best_match list.\n\n{context}"
        )
    }

    fn build_user_message(input_name: &str, candidates: &[String]) -> String {
        format!(
            "Input-name: {input_name}\nMatch-list:\n{}",
            candidates.join("\n")
        )
    }

    /// Uncached match attempt
    fn find_match_uncached(
        &self,
        input_name: &str,
        candidates: &[String],
        model: &str,
        context: Option<&str>,
    ) -> Result<Option<ListMatch>> {
        // Exact lookup short-circuits the completion call entirely
        if let Some(hit) = exact_lookup(input_name, candidates) {
            info!(input_name, "Exact match found");
            return Ok(Some(hit));
        }

        let request = CompletionRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage::system(Self::build_system_message(context)),
                ChatMessage::user(Self::build_user_message(input_name, candidates)),
            ],
            response_format: Some(ResponseFormat::json_object()),
            drop_params: true,
        };

        let response = self.client.complete(&request)?;

        let Some(payload) = decode_match_payload(&response) else {
            warn!(input_name, model, "Unusable completion response, treating as no match");
            return Ok(None);
        };

        let Some(match_name) = payload.best_match.first() else {
            warn!(input_name, model, "No match found");
            return Ok(None);
        };

        // The model must answer verbatim from the candidate list. An
        // invented name is a contract violation, not a match.
        let Some(index) = candidates.iter().position(|c| c == match_name) else {
            error!(
                input_name,
                %match_name, "Model returned a name absent from the candidate list"
            );
            return Ok(None);
        };

        info!(input_name, %match_name, "Match found");

        Ok(Some(ListMatch {
            index,
            name: match_name.clone(),
            confidence: Confidence::from_model(payload.confidence),
        }))
    }
}

impl Matcher for ModelMatcher {
    fn find_match(
        &self,
        input_name: &str,
        candidates: &[String],
        model: &str,
        context: Option<&str>,
    ) -> Result<Option<ListMatch>> {
        let key = CacheKey {
            input_name: input_name.to_string(),
            candidates: candidates.to_vec(),
            model: model.to_string(),
            context: context.map(String::from),
        };

        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let result = self.find_match_uncached(input_name, candidates, model, context)?;
        self.cache.put(key, result.clone());
        Ok(result)
    }
}
