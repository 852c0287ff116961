// src/application/enricher.rs
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::application::{cloze, word_extract};
use crate::domain::{EnrichError, EnrichedSentence, LlmError, SourceSentence};
use crate::util::retry::RetryPolicy;

/// One text-generation call: system prompt plus user prompt in, completion out.
/// Implemented by the chat-completion client and by fakes in tests.
pub trait LanguageModel {
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError>;
}

const SYSTEM_PROMPT: &str = "You are a helpful assistant for language learners. \
Respond with a single JSON object and nothing else.";

const CLOZE_SYSTEM_PROMPT: &str = "You are a helpful assistant for language learners. \
Reply with plain text only, no markdown.";

/// Structured response expected from the model. A reply missing either field
/// is malformed and the item is skipped; retrying would return the same text.
#[derive(Debug, Deserialize)]
struct Enrichment {
    definition: String,
    sentence: String,
}

pub struct Enricher<L: LanguageModel> {
    model: L,
    retry: RetryPolicy,
}

impl<L: LanguageModel> Enricher<L> {
    pub fn new(model: L, retry: RetryPolicy) -> Self {
        Self { model, retry }
    }

    /// Extract the word, ask the model for a definition and one new example
    /// sentence, then produce the cloze-ready sentence list. Transient
    /// transport failures are retried; a structurally invalid response is
    /// not.
    #[instrument(level = "debug", skip(self, source), fields(id = %source.id))]
    pub fn enrich(&self, source: &SourceSentence) -> Result<EnrichedSentence, EnrichError> {
        let word = word_extract::word_for(&source.entry_text, &source.sentence)
            .ok_or_else(|| EnrichError::NoWord(source.entry_text.clone()))?;

        debug!(%word, "Requesting enrichment");
        let user_prompt = build_prompt(&word, &source.sentence);

        let raw = self.retry.run(
            "language model request",
            |err: &LlmError| err.is_transient(),
            || self.model.complete(SYSTEM_PROMPT, &user_prompt),
        )?;

        let enrichment = parse_response(&raw)?;
        let sentences = [source.sentence.as_str(), enrichment.sentence.as_str()]
            .into_iter()
            .filter(|s| !s.trim().is_empty())
            .map(|s| self.cloze_sentence(&word, s))
            .collect();

        Ok(EnrichedSentence {
            source: source.clone(),
            word,
            definition: enrichment.definition,
            sentences,
        })
    }

    /// Plain pattern clozing first; when the sentence only carries an
    /// inflected form of the word, ask the model to mark it up. A sentence
    /// that cannot be clozed either way is stored verbatim, which still
    /// yields a usable card back.
    fn cloze_sentence(&self, word: &str, sentence: &str) -> String {
        if let Some(clozed) = cloze::build_cloze(word, sentence) {
            return clozed;
        }
        match self.model_cloze(word, sentence) {
            Ok(clozed) => clozed,
            Err(err) => {
                warn!(word, %err, "Storing sentence without cloze");
                sentence.to_string()
            }
        }
    }

    fn model_cloze(&self, word: &str, sentence: &str) -> Result<String, EnrichError> {
        let user_prompt = format!(
            "The sentence below contains a form of the word \"{word}\", possibly \
             inflected (e.g. a past tense or plural). Return the sentence exactly \
             as given, except wrap that form as an Anki cloze deletion: \
             {{{{c1::form}}}}. Reply with the sentence only.\n---\n{sentence}\n---"
        );

        let raw = self.retry.run(
            "cloze request",
            |err: &LlmError| err.is_transient(),
            || self.model.complete(CLOZE_SYSTEM_PROMPT, &user_prompt),
        )?;

        let candidate = strip_code_fence(raw.trim()).trim();
        if cloze::is_cloze_of(candidate, sentence) {
            Ok(candidate.to_string())
        } else {
            Err(EnrichError::MalformedResponse(
                "cloze reply does not match the sentence".to_string(),
            ))
        }
    }
}

fn build_prompt(word: &str, context: &str) -> String {
    format!(
        "The word or phrase to learn is \"{word}\". It appeared in this context:\n\
         ---\n{context}\n---\n\
         Based on the context, provide the most likely meaning of \"{word}\" and one new, \
         distinct sentence using \"{word}\" in a different context. The sentence should be \
         easy to understand and clearly demonstrate the meaning.\n\
         Reply with a JSON object with exactly two string fields: \
         \"definition\" and \"sentence\"."
    )
}

fn parse_response(raw: &str) -> Result<Enrichment, EnrichError> {
    let body = strip_code_fence(raw.trim());

    let enrichment: Enrichment = serde_json::from_str(body)
        .map_err(|err| EnrichError::MalformedResponse(err.to_string()))?;

    if enrichment.definition.trim().is_empty() {
        return Err(EnrichError::MalformedResponse("empty definition".to_string()));
    }
    if enrichment.sentence.trim().is_empty() {
        return Err(EnrichError::MalformedResponse("empty sentence".to_string()));
    }
    Ok(enrichment)
}

/// Models routinely wrap replies in a markdown code fence despite instructions.
fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.trim_start_matches('\n').trim_end().trim_end_matches("```").trim()
}
