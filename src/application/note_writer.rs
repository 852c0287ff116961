// src/application/note_writer.rs
use chrono::Local;
use tracing::{debug, info, instrument, warn};

use crate::application::tags;
use crate::domain::{
    EnrichedSentence, NewNote, NoteKey, NoteOutcome, StoreError, StoredNote, WriteError,
};
use crate::util::retry::RetryPolicy;

/// A note carries at most this many example sentences.
pub const MAX_SENTENCES: usize = 3;

/// Flashcard store operations the duplicate-reconciliation policy needs.
/// Implemented by the AnkiConnect adapter and by in-memory fakes in tests.
pub trait NoteStore {
    fn find_note(&self, key: &NoteKey) -> Result<Option<StoredNote>, StoreError>;
    fn add_note(&self, note: &NewNote) -> Result<i64, StoreError>;
    fn replace_sentences(&self, id: i64, sentences: &[String]) -> Result<(), StoreError>;
    fn update_tags(&self, id: i64, tags: &[String]) -> Result<(), StoreError>;
    /// Reset scheduling so the note's cards count as new again.
    fn reset_scheduling(&self, id: i64) -> Result<(), StoreError>;
}

pub struct NoteWriter<S: NoteStore> {
    store: S,
    retry: RetryPolicy,
}

impl<S: NoteStore> NoteWriter<S> {
    pub fn new(store: S, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }

    /// Reconcile an enriched item with the flashcard store.
    ///
    /// - no note with the item's key: create one
    /// - existing note already studied: overwrite its sentences and reset
    ///   scheduling, so the card reflects the latest encounter without
    ///   conflating old and new material in the review statistics
    /// - existing note never studied: append the new example sentence in
    ///   place, scheduling untouched
    ///
    /// Every store call is retried with backoff before a `WriteError`
    /// surfaces.
    #[instrument(level = "debug", skip(self, item, batch_tags), fields(word = %item.word))]
    pub fn write(
        &self,
        item: &EnrichedSentence,
        batch_tags: &[String],
    ) -> Result<NoteOutcome, WriteError> {
        let key = NoteKey::new(&item.word, &item.definition);
        let item_tags = tags::assemble_tags(&item.source.tags, batch_tags, Local::now());
        let sentences = item.sentences.clone();

        let existing = self.with_retry("find note", || self.store.find_note(&key))?;

        match existing {
            None => {
                let note = NewNote {
                    key,
                    word: item.word.clone(),
                    definition: item.definition.clone(),
                    context: item.source.sentence.clone(),
                    sentences,
                    tags: item_tags,
                };
                let id = self.with_retry("add note", || self.store.add_note(&note))?;
                info!(id, "Created note");
                Ok(NoteOutcome::Created)
            }
            Some(note) if note.studied => {
                let merged = tags::union(&note.tags, &item_tags);
                self.with_retry("replace sentences", || {
                    self.store.replace_sentences(note.id, &sentences)
                })?;
                self.with_retry("update tags", || self.store.update_tags(note.id, &merged))?;
                self.with_retry("reset scheduling", || self.store.reset_scheduling(note.id))?;
                info!(id = note.id, "Overwrote studied note and reset scheduling");
                Ok(NoteOutcome::Overwritten)
            }
            Some(note) => {
                let merged = tags::union(&note.tags, &item_tags);
                let mut kept = note.sentences.clone();
                match sentences.last() {
                    Some(new_sentence) if kept.len() < MAX_SENTENCES => {
                        kept.push(new_sentence.clone());
                        self.with_retry("append sentence", || {
                            self.store.replace_sentences(note.id, &kept)
                        })?;
                        debug!(id = note.id, "Appended sentence to unstudied note");
                    }
                    Some(_) => {
                        warn!(id = note.id, "Sentence slots full, keeping existing sentences");
                    }
                    None => {
                        debug!(id = note.id, "No new sentence to append");
                    }
                }
                self.with_retry("update tags", || self.store.update_tags(note.id, &merged))?;
                info!(id = note.id, "Updated unstudied note in place");
                Ok(NoteOutcome::Appended)
            }
        }
    }

    fn with_retry<T>(
        &self,
        what: &str,
        op: impl FnMut() -> Result<T, StoreError>,
    ) -> Result<T, WriteError> {
        self.retry
            .run(what, |err: &StoreError| err.is_transient(), op)
            .map_err(WriteError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SourceSentence;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;
    use std::time::Duration;

    #[derive(Default)]
    struct StoreState {
        notes: HashMap<i64, (NoteKey, StoredNote)>,
        next_id: i64,
        forgotten: Vec<i64>,
        find_failures: u32,
        calls: u32,
    }

    #[derive(Clone, Default)]
    struct FakeStore {
        state: Rc<RefCell<StoreState>>,
    }

    impl FakeStore {
        fn with_note(self, key: NoteKey, note: StoredNote) -> Self {
            self.state.borrow_mut().notes.insert(note.id, (key, note));
            self
        }

        fn failing_finds(self, failures: u32) -> Self {
            self.state.borrow_mut().find_failures = failures;
            self
        }

        fn note(&self, id: i64) -> StoredNote {
            self.state.borrow().notes.get(&id).unwrap().1.clone()
        }
    }

    impl NoteStore for FakeStore {
        fn find_note(&self, key: &NoteKey) -> Result<Option<StoredNote>, StoreError> {
            let mut state = self.state.borrow_mut();
            state.calls += 1;
            if state.find_failures > 0 {
                state.find_failures -= 1;
                return Err(StoreError::Unreachable("connection refused".to_string()));
            }
            Ok(state
                .notes
                .values()
                .find(|(k, _)| k == key)
                .map(|(_, note)| note.clone()))
        }

        fn add_note(&self, note: &NewNote) -> Result<i64, StoreError> {
            let mut state = self.state.borrow_mut();
            state.next_id += 1;
            let id = state.next_id;
            state.notes.insert(
                id,
                (
                    note.key.clone(),
                    StoredNote {
                        id,
                        sentences: note.sentences.clone(),
                        tags: note.tags.clone(),
                        studied: false,
                    },
                ),
            );
            Ok(id)
        }

        fn replace_sentences(&self, id: i64, sentences: &[String]) -> Result<(), StoreError> {
            let mut state = self.state.borrow_mut();
            let (_, note) = state.notes.get_mut(&id).ok_or_else(|| StoreError::Protocol {
                action: "updateNoteFields".to_string(),
                message: format!("note not found: {id}"),
            })?;
            note.sentences = sentences.to_vec();
            Ok(())
        }

        fn update_tags(&self, id: i64, tags: &[String]) -> Result<(), StoreError> {
            let mut state = self.state.borrow_mut();
            let (_, note) = state.notes.get_mut(&id).ok_or_else(|| StoreError::Protocol {
                action: "updateNoteTags".to_string(),
                message: format!("note not found: {id}"),
            })?;
            note.tags = tags.to_vec();
            Ok(())
        }

        fn reset_scheduling(&self, id: i64) -> Result<(), StoreError> {
            let mut state = self.state.borrow_mut();
            state.forgotten.push(id);
            if let Some((_, note)) = state.notes.get_mut(&id) {
                note.studied = false;
            }
            Ok(())
        }
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
        }
    }

    fn enriched(word: &str, definition: &str) -> EnrichedSentence {
        EnrichedSentence {
            source: SourceSentence {
                id: "item-1".to_string(),
                entry_text: format!("**{word}**"),
                sentence: format!("Original sentence with {word}."),
                tags: vec!["Check".to_string()],
            },
            word: word.to_string(),
            definition: definition.to_string(),
            sentences: vec![
                format!("Original sentence with {{{{c1::{word}}}}}."),
                format!("Generated sentence with {{{{c1::{word}}}}}."),
            ],
        }
    }

    #[test]
    fn given_no_existing_note_when_writing_then_creates_exactly_one_note() {
        let store = FakeStore::default();
        let writer = NoteWriter::new(store.clone(), fast_retry());

        let outcome = writer
            .write(&enriched("ubiquitous", "present everywhere"), &["Topic::Tech".to_string()])
            .unwrap();

        assert_eq!(outcome, NoteOutcome::Created);
        let state = store.state.borrow();
        assert_eq!(state.notes.len(), 1);
        let (_, note) = state.notes.values().next().unwrap();
        assert!(note.tags.contains(&"Check".to_string()));
        assert!(note.tags.contains(&"Topic::Tech".to_string()));
        assert!(note.tags.iter().any(|t| t.starts_with("Year::")));
        assert!(note.tags.iter().any(|t| t.starts_with("Month::")));
        assert_eq!(note.sentences.len(), 2);
        assert!(note.sentences[0].contains("{{c1::ubiquitous}}"));
    }

    #[test]
    fn given_studied_note_when_writing_then_overwrites_and_resets_scheduling() {
        let key = NoteKey::new("run", "to move at a speed faster than a walk");
        let store = FakeStore::default().with_note(
            key,
            StoredNote {
                id: 7,
                sentences: vec!["He {{c1::ran}} a marathon.".to_string()],
                tags: vec!["Old".to_string()],
                studied: true,
            },
        );
        let writer = NoteWriter::new(store.clone(), fast_retry());

        let outcome = writer
            .write(&enriched("run", "to move at a speed faster than a walk"), &[])
            .unwrap();

        assert_eq!(outcome, NoteOutcome::Overwritten);
        let note = store.note(7);
        assert_eq!(note.sentences.len(), 2);
        assert!(note.sentences.iter().all(|s| s.contains("{{c1::run}}")));
        assert!(!note.studied);
        assert_eq!(store.state.borrow().forgotten, vec![7]);
        // Old tags survive the overwrite, merged with the new set.
        assert!(note.tags.contains(&"Old".to_string()));
        assert!(note.tags.contains(&"Check".to_string()));
    }

    #[test]
    fn given_unstudied_note_when_writing_then_appends_and_keeps_prior_sentences() {
        let key = NoteKey::new("run", "to move at a speed faster than a walk");
        let store = FakeStore::default().with_note(
            key,
            StoredNote {
                id: 3,
                sentences: vec!["First {{c1::run}}.".to_string()],
                tags: vec![],
                studied: false,
            },
        );
        let writer = NoteWriter::new(store.clone(), fast_retry());

        let outcome = writer
            .write(&enriched("run", "to move at a speed faster than a walk"), &[])
            .unwrap();

        assert_eq!(outcome, NoteOutcome::Appended);
        let note = store.note(3);
        assert_eq!(note.sentences.len(), 2);
        assert_eq!(note.sentences[0], "First {{c1::run}}.");
        assert_eq!(note.sentences[1], "Generated sentence with {{c1::run}}.");
        assert!(store.state.borrow().forgotten.is_empty());
    }

    #[test]
    fn given_unstudied_note_with_full_slots_when_writing_then_sentences_unchanged() {
        let key = NoteKey::new("run", "def");
        let full: Vec<String> = (1..=MAX_SENTENCES).map(|i| format!("Sentence {i}")).collect();
        let store = FakeStore::default().with_note(
            key,
            StoredNote {
                id: 5,
                sentences: full.clone(),
                tags: vec![],
                studied: false,
            },
        );
        let writer = NoteWriter::new(store.clone(), fast_retry());

        let outcome = writer.write(&enriched("run", "def"), &[]).unwrap();

        assert_eq!(outcome, NoteOutcome::Appended);
        assert_eq!(store.note(5).sentences, full);
    }

    #[test]
    fn given_transient_store_failures_when_writing_then_retries_and_succeeds() {
        let store = FakeStore::default().failing_finds(2);
        let writer = NoteWriter::new(store.clone(), fast_retry());

        let outcome = writer.write(&enriched("word", "a unit of language"), &[]).unwrap();

        assert_eq!(outcome, NoteOutcome::Created);
    }

    #[test]
    fn given_store_down_for_good_when_writing_then_write_error_after_budget() {
        let store = FakeStore::default().failing_finds(10);
        let writer = NoteWriter::new(store.clone(), fast_retry());

        let result = writer.write(&enriched("word", "a unit of language"), &[]);

        assert!(matches!(
            result,
            Err(WriteError::Store(StoreError::Unreachable(_)))
        ));
        assert_eq!(store.state.borrow().calls, 3);
    }

    #[test]
    fn given_same_item_written_twice_when_writing_then_single_note_per_key() {
        let store = FakeStore::default();
        let writer = NoteWriter::new(store.clone(), fast_retry());
        let item = enriched("ephemeral", "lasting a very short time");

        writer.write(&item, &[]).unwrap();
        writer.write(&item, &[]).unwrap();

        assert_eq!(store.state.borrow().notes.len(), 1);
    }

    #[test]
    fn given_empty_context_sentence_when_writing_then_note_built_from_generated_only() {
        let store = FakeStore::default();
        let writer = NoteWriter::new(store.clone(), fast_retry());
        let mut item = enriched("word", "a unit of language");
        item.source.sentence = String::new();
        item.sentences = vec!["Generated sentence with {{c1::word}}.".to_string()];

        writer.write(&item, &[]).unwrap();

        let state = store.state.borrow();
        let (_, note) = state.notes.values().next().unwrap();
        assert_eq!(note.sentences.len(), 1);
        assert!(note.sentences[0].contains("{{c1::word}}"));
    }
}
