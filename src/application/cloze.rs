// src/application/cloze.rs
use regex::Regex;

/// Wrap every occurrence of `word` in `sentence` as an Anki cloze deletion,
/// keeping the casing found in the sentence.
///
/// Returns `None` when the sentence never mentions the word literally, for
/// example when it carries an inflected form ("ran" for "run"). The enricher
/// then falls back to a model-assisted cloze.
pub fn build_cloze(word: &str, sentence: &str) -> Option<String> {
    let word = word.trim();
    if word.is_empty() || sentence.trim().is_empty() {
        return None;
    }

    let pattern = format!(r"(?i)({})", regex::escape(word));
    let re = Regex::new(&pattern).expect("escaped word is a valid pattern");

    if !re.is_match(sentence) {
        return None;
    }
    Some(re.replace_all(sentence, "{{c1::$1}}").into_owned())
}

/// True when `candidate` is `sentence` with one or more spans wrapped as
/// cloze deletions and nothing else changed. Guards against a model that
/// rewrites the sentence instead of marking it up.
pub fn is_cloze_of(candidate: &str, sentence: &str) -> bool {
    let candidate = candidate.trim();
    candidate.contains("{{c1::")
        && candidate.replace("{{c1::", "").replace("}}", "") == sentence.trim()
}
