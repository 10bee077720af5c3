//! Vocabulary provider
//!
//! Read-only word table the games draw targets and distractors from.

use serde::{Deserialize, Serialize};

use crate::error::ArcadeError;

/// One word the learner has to recognise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    /// English spelling (what falls down the screen)
    pub english: String,
    /// Native-language prompt shown as the target
    pub translation: String,
    /// Optional grouping tag (digraph, category)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl VocabularyEntry {
    pub fn new(english: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            english: english.into(),
            translation: translation.into(),
            tag: None,
        }
    }

    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Two entries name the same answer when their English text matches
    pub fn same_answer(&self, other: &VocabularyEntry) -> bool {
        self.english == other.english
    }
}

/// Immutable, non-empty sequence of entries
#[derive(Debug, Clone)]
pub struct Vocabulary {
    entries: Vec<VocabularyEntry>,
}

impl Vocabulary {
    /// Wrap a word list. An empty list is refused so no round can start
    /// without a target.
    pub fn new(entries: Vec<VocabularyEntry>) -> Result<Self, ArcadeError> {
        if entries.is_empty() {
            return Err(ArcadeError::EmptyVocabulary);
        }
        Ok(Self { entries })
    }

    /// Parse a JSON array of entries
    pub fn from_json(json: &str) -> Result<Self, ArcadeError> {
        let entries: Vec<VocabularyEntry> = serde_json::from_str(json)?;
        Self::new(entries)
    }

    /// The classroom word list shipped with the games
    pub fn builtin() -> Self {
        let entries = BUILTIN_WORDS
            .iter()
            .map(|&(english, translation, tag)| {
                let entry = VocabularyEntry::new(english, translation);
                match tag {
                    Some(tag) => entry.tagged(tag),
                    None => entry,
                }
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[VocabularyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&VocabularyEntry> {
        self.entries.get(index)
    }
}

/// (english, translation, digraph tag)
const BUILTIN_WORDS: &[(&str, &str, Option<&str>)] = &[
    // Town
    ("friend", "חבר/ה", None),
    ("grade", "כיתה/ציון", None),
    ("house", "בית", None),
    ("new", "חדש", None),
    ("school", "בית ספר", None),
    ("teacher", "מורה", Some("ch")),
    ("town", "עיירה", None),
    ("where do you live?", "איפה אתה גר?", None),
    ("I live in...", "אני גר ב...", None),
    // School objects
    ("board", "לוח", None),
    ("book", "ספר", None),
    ("chair", "כיסא", Some("ch")),
    ("eraser", "מחק", None),
    ("homework", "שיעורי בית", None),
    ("lunch", "ארוחת צהריים", Some("ch")),
    ("need", "צריך", None),
    ("notebook", "מחברת", None),
    ("paper", "נייר", None),
    ("pencil", "עיפרון", None),
    ("thanks", "תודה", Some("th")),
    ("do you have..?", "האם יש לך..?", None),
    ("i dont have...", "אין לי...", None),
    ("let's go...", "בוא נלך...", None),
    // Digraphs
    ("math", "חשבון", Some("th")),
    ("brother", "אח", Some("th")),
    ("shop", "חנות", Some("sh")),
    ("fish", "דג", Some("sh")),
    ("English", "אנגלית", Some("sh")),
    ("what", "מה", Some("wh")),
    ("where", "איפה", Some("wh")),
];
