pub mod chapter;
pub mod flashcard;
pub mod slug;

pub use chapter::{chapter_url, Chapter, ChapterDraft, ChapterOverview, ChapterStats};
pub use flashcard::{Category, Flashcard, FlashcardDraft, MarkAs};
pub use quiz_test::{Test, TestDraft};
pub use slug::{is_valid_slug, slugify};
