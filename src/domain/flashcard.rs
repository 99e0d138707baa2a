use serde::{Deserialize, Serialize};

use super::slug::slugify;

/// Kind of vocabulary entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
  PhrasalVerb,
  IrregularVerb,
  Verb,
  #[default]
  Word,
}

impl Category {
  pub const ALL: [Category; 4] = [
    Category::PhrasalVerb,
    Category::IrregularVerb,
    Category::Verb,
    Category::Word,
  ];

  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "phrasal_verb" => Some(Self::PhrasalVerb),
      "irregular_verb" => Some(Self::IrregularVerb),
      "verb" => Some(Self::Verb),
      "word" => Some(Self::Word),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::PhrasalVerb => "phrasal_verb",
      Self::IrregularVerb => "irregular_verb",
      Self::Verb => "verb",
      Self::Word => "word",
    }
  }

  /// Human-readable name shown in lists and card headers
  pub fn label(&self) -> &'static str {
    match self {
      Self::PhrasalVerb => "Phrasal verb",
      Self::IrregularVerb => "Irregular verb",
      Self::Verb => "Verb",
      Self::Word => "Word",
    }
  }
}

/// Learning status a learner assigns to a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MarkAs {
  #[default]
  Review,
  Learned,
}

impl MarkAs {
  pub const ALL: [MarkAs; 2] = [MarkAs::Review, MarkAs::Learned];

  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "review" => Some(Self::Review),
      "learned" => Some(Self::Learned),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Review => "review",
      Self::Learned => "learned",
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      Self::Review => "Review",
      Self::Learned => "Learned",
    }
  }
}

/// A single bilingual vocabulary record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
  pub id: i64,
  pub category: Category,
  pub word_english: String,
  pub word_spanish: String,
  /// IPA pronunciation, empty when unknown
  pub ipa_english: String,
  pub ipa_spanish: String,
  /// Media-relative audio file references (e.g. `audio/english/run.mp3`)
  pub audio_english: Option<String>,
  pub audio_spanish: Option<String>,
  pub content: String,
  pub mean_english: String,
  pub mean_espanish: String,
  pub image_url: Option<String>,
  pub viewed: bool,
  pub mark_as: MarkAs,
  pub slug: String,
}

impl Flashcard {
  /// Build an unsaved card from a draft (id 0, slug derived when blank)
  pub fn from_draft(draft: FlashcardDraft) -> Self {
    let slug = draft.resolved_slug();
    Self {
      id: 0,
      category: draft.category,
      word_english: draft.word_english,
      word_spanish: draft.word_spanish,
      ipa_english: draft.ipa_english,
      ipa_spanish: draft.ipa_spanish,
      audio_english: draft.audio_english,
      audio_spanish: draft.audio_spanish,
      content: draft.content,
      mean_english: draft.mean_english,
      mean_espanish: draft.mean_espanish,
      image_url: draft.image_url,
      viewed: draft.viewed,
      mark_as: draft.mark_as,
      slug,
    }
  }

  /// One-line description, e.g. `[Verb] run - correr`
  pub fn display_name(&self) -> String {
    format!(
      "[{}] {} - {}",
      self.category.label(),
      self.word_english,
      self.word_spanish
    )
  }
}

/// Editable fields of a flashcard, as submitted from the admin form
#[derive(Debug, Clone, Default)]
pub struct FlashcardDraft {
  pub category: Category,
  pub word_english: String,
  pub word_spanish: String,
  pub ipa_english: String,
  pub ipa_spanish: String,
  pub audio_english: Option<String>,
  pub audio_spanish: Option<String>,
  pub content: String,
  pub mean_english: String,
  pub mean_espanish: String,
  pub image_url: Option<String>,
  pub viewed: bool,
  pub mark_as: MarkAs,
  /// Blank means "derive from category and English word"
  pub slug: String,
}

impl FlashcardDraft {
  /// The slug to store: the submitted one, or `<category>-<word_english>` slugified
  pub fn resolved_slug(&self) -> String {
    let submitted = self.slug.trim();
    if submitted.is_empty() {
      slugify(&format!("{}-{}", self.category.as_str(), self.word_english))
    } else {
      submitted.to_string()
    }
  }

  /// Required-field checks, returned as user-facing messages
  pub fn validate(&self) -> Vec<String> {
    let mut errors = Vec::new();
    if self.word_english.trim().is_empty() {
      errors.push("English word is required".to_string());
    }
    if self.word_spanish.trim().is_empty() {
      errors.push("Spanish word is required".to_string());
    }
    if self.word_english.chars().count() > 200 || self.word_spanish.chars().count() > 200 {
      errors.push("Words must be at most 200 characters".to_string());
    }
    if let Some(url) = &self.image_url {
      if !(url.starts_with("http://") || url.starts_with("https://")) {
        errors.push("Image URL must start with http:// or https://".to_string());
      } else if url.len() > 500 {
        errors.push("Image URL must be at most 500 characters".to_string());
      }
    }
    errors
  }
}
