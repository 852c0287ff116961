// src/domain/note.rs
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Deterministic identity of a note in the flashcard store.
///
/// Derived from the learned word and its definition, so the same word with a
/// different meaning gets its own note. The writer never creates two notes
/// with the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NoteKey(String);

impl NoteKey {
    pub fn new(word: &str, definition: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(word.trim().to_lowercase().as_bytes());
        hasher.update(b"\x1f");
        hasher.update(definition.trim().to_lowercase().as_bytes());
        NoteKey(format!("{:x}", hasher.finalize()))
    }

    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

/// The writer's view of a note that already exists in the flashcard store.
/// `studied` is derived from scheduling metadata: any card of the note has a
/// review interval greater than zero.
#[derive(Debug, Clone)]
pub struct StoredNote {
    pub id: i64,
    pub sentences: Vec<String>,
    pub tags: Vec<String>,
    pub studied: bool,
}

/// Payload for creating a fresh note.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub key: NoteKey,
    pub word: String,
    pub definition: String,
    pub context: String,
    pub sentences: Vec<String>,
    pub tags: Vec<String>,
}

/// What the duplicate-reconciliation policy decided to do with an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteOutcome {
    Created,
    Overwritten,
    Appended,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_same_word_and_definition_when_deriving_key_then_keys_match() {
        let a = NoteKey::new("run", "to move at a speed faster than a walk");
        let b = NoteKey::new("run", "to move at a speed faster than a walk");

        assert_eq!(a, b);
    }

    #[test]
    fn given_different_definition_when_deriving_key_then_keys_differ() {
        let a = NoteKey::new("run", "to move at a speed faster than a walk");
        let b = NoteKey::new("run", "to manage or operate something");

        assert_ne!(a, b);
    }

    #[test]
    fn given_case_and_whitespace_variants_when_deriving_key_then_keys_match() {
        let a = NoteKey::new("Run", " to move fast ");
        let b = NoteKey::new("run", "to move fast");

        assert_eq!(a, b);
    }

    #[test]
    fn given_any_inputs_when_deriving_key_then_hex_is_sha256_sized() {
        let key = NoteKey::new("ubiquitous", "present everywhere");

        assert_eq!(key.as_hex().len(), 64);
        assert!(key.as_hex().chars().all(|c| c.is_ascii_hexdigit()));
    }
}
