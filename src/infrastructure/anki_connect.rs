// src/infrastructure/anki_connect.rs
use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

use crate::application::NoteStore;
use crate::domain::{NewNote, NoteKey, StoreError, StoredNote};

const ANKI_CONNECT_VERSION: u8 = 6;

pub const FIELD_WORD: &str = "Word";
pub const FIELD_DEFINITION: &str = "Definition";
pub const FIELD_CONTEXT: &str = "Context";
pub const FIELD_KEY: &str = "Key";
pub const SENTENCE_FIELDS: [&str; 3] = ["Sentence1", "Sentence2", "Sentence3"];

const CARD_CSS: &str = "\
.card {
 font-family: arial;
 font-size: 20px;
 text-align: center;
 color: black;
 background-color: white;
}
.cloze {
 font-weight: bold;
 color: blue;
}
";

/// JSON-over-HTTP client for the AnkiConnect automation endpoint.
pub struct AnkiConnectClient {
    http: reqwest::blocking::Client,
    url: String,
    deck: String,
    note_type: String,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    result: Option<Value>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NoteInfo {
    #[serde(rename = "noteId")]
    note_id: i64,
    tags: Vec<String>,
    fields: HashMap<String, FieldValue>,
    #[serde(default)]
    cards: Vec<i64>,
}

#[derive(Debug, Deserialize)]
struct FieldValue {
    value: String,
}

#[derive(Debug, Deserialize)]
struct CardInfo {
    interval: i64,
}

impl AnkiConnectClient {
    pub fn new(url: &str, deck: &str, note_type: &str) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            url: url.to_string(),
            deck: deck.to_string(),
            note_type: note_type.to_string(),
        })
    }

    /// Probe the endpoint and make sure the deck and note type exist.
    pub fn ensure_ready(&self) -> Result<(), StoreError> {
        let version: u64 = self.call_typed("version", json!({}))?;
        debug!(version, "AnkiConnect reachable");
        self.ensure_deck()?;
        self.ensure_note_type()
    }

    fn call(&self, action: &str, params: Value) -> Result<Value, StoreError> {
        let payload = json!({
            "action": action,
            "version": ANKI_CONNECT_VERSION,
            "params": params,
        });

        let response = self
            .http
            .post(&self.url)
            .json(&payload)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|err| StoreError::Unreachable(err.to_string()))?;

        let envelope: Envelope = response
            .json()
            .map_err(|err| StoreError::MalformedResponse(err.to_string()))?;

        if let Some(error) = envelope.error {
            return Err(StoreError::Protocol {
                action: action.to_string(),
                message: error,
            });
        }
        Ok(envelope.result.unwrap_or(Value::Null))
    }

    fn call_typed<T: DeserializeOwned>(&self, action: &str, params: Value) -> Result<T, StoreError> {
        serde_json::from_value(self.call(action, params)?).map_err(|err| {
            StoreError::MalformedResponse(format!("unexpected result for '{action}': {err}"))
        })
    }

    fn ensure_deck(&self) -> Result<(), StoreError> {
        let decks: Vec<String> = self.call_typed("deckNames", json!({}))?;
        if decks.contains(&self.deck) {
            return Ok(());
        }
        info!(deck = %self.deck, "Creating deck");
        self.call("createDeck", json!({ "deck": self.deck }))?;
        Ok(())
    }

    fn ensure_note_type(&self) -> Result<(), StoreError> {
        let models: Vec<String> = self.call_typed("modelNames", json!({}))?;
        if models.contains(&self.note_type) {
            return Ok(());
        }
        info!(note_type = %self.note_type, "Creating note type");

        let templates: Vec<Value> = SENTENCE_FIELDS
            .iter()
            .enumerate()
            .map(|(index, field)| {
                json!({
                    "Name": format!("Sentence Gap {} -> Word", index + 1),
                    "Front": format!("{{{{cloze:{field}}}}}"),
                    "Back": format!(
                        "{{{{cloze:{field}}}}}<hr id=\"answer\">{{{{Word}}}}<br>{{{{Definition}}}}<br><br>{{{{Context}}}}"
                    ),
                })
            })
            .collect();

        let mut fields = vec![FIELD_WORD, FIELD_DEFINITION, FIELD_CONTEXT];
        fields.extend(SENTENCE_FIELDS);
        fields.push(FIELD_KEY);

        self.call(
            "createModel",
            json!({
                "modelName": self.note_type,
                "inOrderFields": fields,
                "css": CARD_CSS,
                "isCloze": true,
                "cardTemplates": templates,
            }),
        )?;
        Ok(())
    }

    fn sentence_fields(sentences: &[String]) -> Value {
        let mut fields = serde_json::Map::new();
        for (index, name) in SENTENCE_FIELDS.iter().enumerate() {
            let value = sentences.get(index).map(String::as_str).unwrap_or("");
            fields.insert((*name).to_string(), Value::String(value.to_string()));
        }
        Value::Object(fields)
    }

    fn note_payload(&self, note: &NewNote) -> Value {
        let mut fields = serde_json::Map::new();
        fields.insert(FIELD_WORD.to_string(), Value::String(note.word.clone()));
        fields.insert(
            FIELD_DEFINITION.to_string(),
            Value::String(note.definition.clone()),
        );
        fields.insert(FIELD_CONTEXT.to_string(), Value::String(note.context.clone()));
        fields.insert(FIELD_KEY.to_string(), Value::String(note.key.as_hex().to_string()));
        if let Value::Object(sentence_fields) = Self::sentence_fields(&note.sentences) {
            fields.extend(sentence_fields);
        }

        // Anki's own duplicate check compares only the first field (Word),
        // which would reject a second note for the same word with a new
        // definition. The key lookup in find_note handles real duplicates.
        json!({
            "deckName": self.deck,
            "modelName": self.note_type,
            "fields": fields,
            "tags": note.tags,
            "options": { "allowDuplicate": true },
        })
    }

    fn note_is_studied(&self, cards: &[i64]) -> Result<bool, StoreError> {
        if cards.is_empty() {
            return Ok(false);
        }
        let infos: Vec<CardInfo> = self.call_typed("cardsInfo", json!({ "cards": cards }))?;
        Ok(infos.iter().any(|card| card.interval > 0))
    }
}

impl NoteStore for AnkiConnectClient {
    #[instrument(level = "debug", skip(self))]
    fn find_note(&self, key: &NoteKey) -> Result<Option<StoredNote>, StoreError> {
        let query = format!("\"deck:{}\" \"{}:{}\"", self.deck, FIELD_KEY, key.as_hex());
        let ids: Vec<i64> = self.call_typed("findNotes", json!({ "query": query }))?;

        let Some(&id) = ids.first() else {
            return Ok(None);
        };
        if ids.len() > 1 {
            warn!(count = ids.len(), "Multiple notes share one key, using the first");
        }

        let infos: Vec<NoteInfo> = self.call_typed("notesInfo", json!({ "notes": [id] }))?;
        let info = infos.into_iter().next().ok_or_else(|| {
            StoreError::MalformedResponse("notesInfo returned no entries".to_string())
        })?;

        let sentences: Vec<String> = SENTENCE_FIELDS
            .iter()
            .filter_map(|field| info.fields.get(*field))
            .map(|field| field.value.clone())
            .filter(|value| !value.trim().is_empty())
            .collect();

        let studied = self.note_is_studied(&info.cards)?;

        Ok(Some(StoredNote {
            id: info.note_id,
            sentences,
            tags: info.tags,
            studied,
        }))
    }

    #[instrument(level = "debug", skip(self, note), fields(word = %note.word))]
    fn add_note(&self, note: &NewNote) -> Result<i64, StoreError> {
        self.call_typed("addNote", json!({ "note": self.note_payload(note) }))
    }

    #[instrument(level = "debug", skip(self, sentences))]
    fn replace_sentences(&self, id: i64, sentences: &[String]) -> Result<(), StoreError> {
        self.call(
            "updateNoteFields",
            json!({
                "note": {
                    "id": id,
                    "fields": Self::sentence_fields(sentences),
                },
            }),
        )?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self, tags))]
    fn update_tags(&self, id: i64, tags: &[String]) -> Result<(), StoreError> {
        self.call(
            "updateNoteTags",
            json!({ "note": id, "tags": tags }),
        )?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    fn reset_scheduling(&self, id: i64) -> Result<(), StoreError> {
        let infos: Vec<NoteInfo> = self.call_typed("notesInfo", json!({ "notes": [id] }))?;
        let Some(info) = infos.into_iter().next() else {
            return Err(StoreError::Protocol {
                action: "notesInfo".to_string(),
                message: format!("note not found: {id}"),
            });
        };
        if info.cards.is_empty() {
            return Ok(());
        }
        self.call("forgetCards", json!({ "cards": info.cards }))?;
        Ok(())
    }
}
