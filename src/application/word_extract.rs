// src/application/word_extract.rs
use regex::Regex;

/// Extract the word to learn from a source entry.
///
/// Recognized formats, in order of preference:
/// 1. `**word**` anywhere in the text
/// 2. an `english:` / `english` prefix followed by the word
/// 3. `{word}` braces
/// 4. the whole remaining text
pub fn extract_word(entry_text: &str) -> Option<String> {
    let content = entry_text.trim();

    let bold = Regex::new(r"\*\*([^*]+?)\*\*").unwrap();
    if let Some(caps) = bold.captures(content) {
        let word = caps[1].trim();
        if !word.is_empty() {
            return Some(word.to_string());
        }
    }

    let prefix = Regex::new(r"(?i)^english\s*:?\s*").unwrap();
    let content = prefix.replace(content, "").trim().to_string();

    let content = if content.len() >= 2 && content.starts_with('{') && content.ends_with('}') {
        content[1..content.len() - 1].trim().to_string()
    } else {
        content
    };

    if content.is_empty() {
        None
    } else {
        Some(content)
    }
}

/// Remove bold and italic markdown markers from a word.
pub fn strip_markdown(text: &str) -> String {
    let bold = Regex::new(r"\*\*(.*?)\*\*").unwrap();
    let italic_star = Regex::new(r"\*(.*?)\*").unwrap();
    let italic_underscore = Regex::new(r"_(.*?)_").unwrap();

    let text = bold.replace_all(text, "$1");
    let text = italic_star.replace_all(&text, "$1");
    italic_underscore.replace_all(&text, "$1").trim().to_string()
}

/// Extraction with fallback: when the entry text yields no word, take the
/// first word of the context sentence.
pub fn word_for(entry_text: &str, sentence: &str) -> Option<String> {
    extract_word(entry_text)
        .map(|w| strip_markdown(&w))
        .filter(|w| !w.is_empty())
        .or_else(|| first_word(sentence))
}

fn first_word(sentence: &str) -> Option<String> {
    let re = Regex::new(r"\w+").unwrap();
    re.find(sentence).map(|m| m.as_str().to_string())
}
