//! Flashcard list with filters and inline status editing; create/edit with audio uploads.

use std::collections::HashMap;
use std::fs;
use std::path::Path as FsPath;

use askama::Template;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::Uri;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use rusqlite::Connection;

use crate::auth::AdminContext;
use crate::config;
use crate::db::{self, try_lock, FlashcardFilter};
use crate::domain::{slugify, Category, Flashcard, FlashcardDraft, MarkAs};
use crate::error::AppError;
use crate::handlers::templates::MarkOption;
use crate::paths;
use crate::state::AppState;

use super::slug_errors;
use super::templates::{
  category_filter_options, mark_filter_options, parse_viewed_filter, viewed_options, FlashcardAdminListTemplate,
  FlashcardAdminRow, FlashcardFormTemplate, FlashcardListQuery, SelectOption, StatusForm,
};

const LIST_URL: &str = "/admin/flashcards/";

/// Audio formats accepted for upload
const AUDIO_EXTENSIONS: [&str; 7] = ["mp3", "ogg", "oga", "wav", "m4a", "aac", "webm"];

/// An uploaded audio file not yet written to the media directory
#[derive(Debug)]
struct AudioUpload {
  file_name: String,
  bytes: Vec<u8>,
}

impl AudioUpload {
  /// Lowercased extension, if the file name has one
  fn extension(&self) -> Option<String> {
    FsPath::new(&self.file_name)
      .extension()
      .and_then(|e| e.to_str())
      .map(|e| e.to_ascii_lowercase())
  }

  fn errors(&self, label: &str) -> Vec<String> {
    let mut errors = Vec::new();
    match self.extension() {
      Some(ext) if AUDIO_EXTENSIONS.contains(&ext.as_str()) => {}
      _ => errors.push(format!(
        "{} audio must be one of: {}",
        label,
        AUDIO_EXTENSIONS.join(", ")
      )),
    }
    if self.bytes.len() > config::MAX_AUDIO_UPLOAD_BYTES {
      errors.push(format!(
        "{} audio must be at most {} MB",
        label,
        config::MAX_AUDIO_UPLOAD_BYTES / (1024 * 1024)
      ));
    }
    errors
  }
}

/// Everything posted by the flashcard form
#[derive(Debug, Default)]
struct FlashcardSubmission {
  fields: HashMap<String, String>,
  audio_english: Option<AudioUpload>,
  audio_spanish: Option<AudioUpload>,
}

impl FlashcardSubmission {
  fn field(&self, name: &str) -> String {
    self.fields.get(name).cloned().unwrap_or_default()
  }

  /// Checkboxes are only sent when checked
  fn checked(&self, name: &str) -> bool {
    self.fields.contains_key(name)
  }

  /// Build the draft to save. Audio references carry over from `existing`
  /// unless the matching "clear" box is checked; new uploads are applied later.
  fn to_draft(&self, existing: Option<&Flashcard>) -> (FlashcardDraft, Vec<String>) {
    let mut errors = Vec::new();

    let category = Category::from_str(&self.field("category")).unwrap_or_else(|| {
      errors.push("Select a valid category".to_string());
      Category::default()
    });
    let mark_as = MarkAs::from_str(&self.field("mark_as")).unwrap_or_else(|| {
      errors.push("Select a valid status".to_string());
      MarkAs::default()
    });

    let keep_audio = |current: Option<&String>, clear: &str| {
      if self.checked(clear) {
        None
      } else {
        current.cloned()
      }
    };

    let image_url = self.field("image_url").trim().to_string();
    let draft = FlashcardDraft {
      category,
      word_english: self.field("word_english").trim().to_string(),
      word_spanish: self.field("word_spanish").trim().to_string(),
      ipa_english: self.field("ipa_english").trim().to_string(),
      ipa_spanish: self.field("ipa_spanish").trim().to_string(),
      audio_english: keep_audio(existing.and_then(|c| c.audio_english.as_ref()), "clear_audio_english"),
      audio_spanish: keep_audio(existing.and_then(|c| c.audio_spanish.as_ref()), "clear_audio_spanish"),
      content: self.field("content"),
      mean_english: self.field("mean_english"),
      mean_espanish: self.field("mean_espanish"),
      image_url: (!image_url.is_empty()).then_some(image_url),
      viewed: self.checked("viewed"),
      mark_as,
      slug: self.field("slug").trim().to_string(),
    };

    errors.extend(draft.validate());
    if let Some(upload) = &self.audio_english {
      errors.extend(upload.errors("English"));
    }
    if let Some(upload) = &self.audio_spanish {
      errors.extend(upload.errors("Spanish"));
    }
    (draft, errors)
  }
}

/// Drain the multipart body. File inputs left empty are ignored.
async fn read_submission(mut multipart: Multipart) -> Result<FlashcardSubmission, AppError> {
  let malformed = |e: axum::extract::multipart::MultipartError| AppError::Validation(format!("Malformed form data: {}", e));
  let mut submission = FlashcardSubmission::default();

  while let Some(field) = multipart.next_field().await.map_err(malformed)? {
    let name = field.name().unwrap_or_default().to_string();
    match name.as_str() {
      "audio_english" | "audio_spanish" => {
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(malformed)?;
        if file_name.is_empty() || bytes.is_empty() {
          continue;
        }
        let upload = Some(AudioUpload {
          file_name,
          bytes: bytes.to_vec(),
        });
        if name == "audio_english" {
          submission.audio_english = upload;
        } else {
          submission.audio_spanish = upload;
        }
      }
      _ => {
        let value = field.text().await.map_err(malformed)?;
        submission.fields.insert(name, value);
      }
    }
  }
  Ok(submission)
}

/// File name for an upload in `dir`: slugified stem, original extension, numbered when taken
fn available_name(dir: &FsPath, upload: &AudioUpload) -> String {
  let stem = FsPath::new(&upload.file_name)
    .file_stem()
    .and_then(|s| s.to_str())
    .map(slugify)
    .filter(|s| !s.is_empty())
    .unwrap_or_else(|| "audio".to_string());
  let ext = upload.extension().unwrap_or_default();

  let mut name = format!("{}.{}", stem, ext);
  let mut n = 1;
  while dir.join(&name).exists() {
    name = format!("{}_{}.{}", stem, n, ext);
    n += 1;
  }
  name
}

/// Write an upload under `<media_root>/<dir>/` and return its media-relative reference
fn store_upload(media_root: &FsPath, dir: &str, upload: &AudioUpload) -> std::io::Result<String> {
  let target_dir = media_root.join(dir);
  fs::create_dir_all(&target_dir)?;
  let name = available_name(&target_dir, upload);
  fs::write(target_dir.join(&name), &upload.bytes)?;
  tracing::debug!("Stored audio upload {}/{} ({} bytes)", dir, name, upload.bytes.len());
  Ok(format!("{}/{}", dir, name))
}

fn load(conn: &Connection, id: i64) -> Result<Flashcard, AppError> {
  db::get_flashcard(conn, id)?.ok_or_else(|| AppError::not_found(format!("Flashcard #{}", id)))
}

fn form_template(
  username: String,
  existing: Option<i64>,
  draft: &FlashcardDraft,
  errors: Vec<String>,
) -> FlashcardFormTemplate {
  let (heading, action_url, delete_url) = match existing {
    Some(id) => (
      "Edit flashcard".to_string(),
      format!("/admin/flashcards/{}/edit", id),
      Some(format!("/admin/flashcards/{}/delete", id)),
    ),
    None => ("Add flashcard".to_string(), "/admin/flashcards/new".to_string(), None),
  };

  FlashcardFormTemplate {
    username,
    heading,
    action_url,
    delete_url,
    id: existing,
    categories: SelectOption::categories(Some(draft.category)),
    word_english: draft.word_english.clone(),
    word_spanish: draft.word_spanish.clone(),
    ipa_english: draft.ipa_english.clone(),
    ipa_spanish: draft.ipa_spanish.clone(),
    audio_english_url: draft.audio_english.as_deref().map(paths::media_url),
    audio_spanish_url: draft.audio_spanish.as_deref().map(paths::media_url),
    content: draft.content.clone(),
    mean_english: draft.mean_english.clone(),
    mean_espanish: draft.mean_espanish.clone(),
    image_url: draft.image_url.clone().unwrap_or_default(),
    viewed: draft.viewed,
    mark_options: MarkOption::all(draft.mark_as),
    slug: draft.slug.clone(),
    errors,
  }
}

/// Validate, store uploads, then insert or update
fn save(
  state: &AppState,
  admin: AdminContext,
  existing_id: Option<i64>,
  submission: FlashcardSubmission,
) -> Result<Response, AppError> {
  let conn = try_lock(&state.db)?;
  let existing = match existing_id {
    Some(id) => Some(load(&conn, id)?),
    None => None,
  };

  let (mut draft, mut errors) = submission.to_draft(existing.as_ref());
  if errors.is_empty() {
    let slug = draft.resolved_slug();
    let taken = db::flashcard_slug_taken(&conn, &slug, existing_id)?;
    errors.extend(slug_errors(&slug, taken));
  }
  if !errors.is_empty() {
    drop(conn);
    let template = form_template(admin.username, existing_id, &draft, errors);
    return Ok(Html(template.render()?).into_response());
  }

  let media_root = &state.config.media_dir;
  if let Some(upload) = &submission.audio_english {
    draft.audio_english = Some(store_upload(media_root, paths::AUDIO_ENGLISH_DIR, upload)?);
  }
  if let Some(upload) = &submission.audio_spanish {
    draft.audio_spanish = Some(store_upload(media_root, paths::AUDIO_SPANISH_DIR, upload)?);
  }

  let id = match existing_id {
    Some(id) => {
      db::update_flashcard(&conn, id, &draft)?;
      id
    }
    None => db::insert_flashcard(&conn, &draft)?,
  };
  tracing::info!(
    "Admin '{}' saved flashcard #{} '{}'",
    admin.username,
    id,
    draft.word_english
  );
  Ok(Redirect::to(LIST_URL).into_response())
}

/// GET /admin/flashcards/?q=&category=&viewed=&mark_as=
pub async fn flashcard_list(
  admin: AdminContext,
  State(state): State<AppState>,
  uri: Uri,
  Query(query): Query<FlashcardListQuery>,
) -> Result<Html<String>, AppError> {
  let filter = FlashcardFilter {
    query: Some(query.q.clone()).filter(|q| !q.trim().is_empty()),
    category: Category::from_str(&query.category),
    viewed: parse_viewed_filter(&query.viewed),
    mark_as: MarkAs::from_str(&query.mark_as),
  };

  let cards = {
    let conn = try_lock(&state.db)?;
    db::list_flashcards(&conn, &filter)?
  };

  let template = FlashcardAdminListTemplate {
    username: admin.username,
    query: query.q,
    category_filter: category_filter_options(filter.category),
    viewed_filter: viewed_options(filter.viewed),
    mark_filter: mark_filter_options(filter.mark_as),
    rows: cards.iter().map(FlashcardAdminRow::from).collect(),
    back_url: uri.path_and_query().map(|pq| pq.as_str()).unwrap_or(LIST_URL).to_string(),
  };
  Ok(Html(template.render()?))
}

/// POST /admin/flashcards/{id}/status - inline `viewed`/`mark_as` edit from the list
pub async fn flashcard_status(
  admin: AdminContext,
  State(state): State<AppState>,
  Path(id): Path<i64>,
  Form(form): Form<StatusForm>,
) -> Result<Redirect, AppError> {
  let mark_as = MarkAs::from_str(&form.mark_as)
    .ok_or_else(|| AppError::Validation(format!("Unknown status '{}'", form.mark_as)))?;
  let viewed = form.viewed.is_some();

  let updated = {
    let conn = try_lock(&state.db)?;
    db::set_flashcard_status(&conn, id, viewed, mark_as)?
  };
  if !updated {
    return Err(AppError::not_found(format!("Flashcard #{}", id)));
  }
  tracing::info!(
    "Admin '{}' set flashcard #{} to viewed={} mark_as={}",
    admin.username,
    id,
    viewed,
    mark_as.as_str()
  );

  let back = form
    .back
    .as_deref()
    .filter(|b| b.starts_with(LIST_URL))
    .unwrap_or(LIST_URL);
  Ok(Redirect::to(back))
}

/// GET /admin/flashcards/new
pub async fn flashcard_new(admin: AdminContext) -> Result<Html<String>, AppError> {
  let template = form_template(admin.username, None, &FlashcardDraft::default(), Vec::new());
  Ok(Html(template.render()?))
}

/// POST /admin/flashcards/new (multipart)
pub async fn flashcard_create(
  admin: AdminContext,
  State(state): State<AppState>,
  multipart: Multipart,
) -> Result<Response, AppError> {
  let submission = read_submission(multipart).await?;
  save(&state, admin, None, submission)
}

/// GET /admin/flashcards/{id}/edit
pub async fn flashcard_edit(
  admin: AdminContext,
  State(state): State<AppState>,
  Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
  let card = {
    let conn = try_lock(&state.db)?;
    load(&conn, id)?
  };

  let draft = FlashcardDraft {
    category: card.category,
    word_english: card.word_english,
    word_spanish: card.word_spanish,
    ipa_english: card.ipa_english,
    ipa_spanish: card.ipa_spanish,
    audio_english: card.audio_english,
    audio_spanish: card.audio_spanish,
    content: card.content,
    mean_english: card.mean_english,
    mean_espanish: card.mean_espanish,
    image_url: card.image_url,
    viewed: card.viewed,
    mark_as: card.mark_as,
    slug: card.slug,
  };
  let template = form_template(admin.username, Some(id), &draft, Vec::new());
  Ok(Html(template.render()?))
}

/// POST /admin/flashcards/{id}/edit (multipart)
pub async fn flashcard_update(
  admin: AdminContext,
  State(state): State<AppState>,
  Path(id): Path<i64>,
  multipart: Multipart,
) -> Result<Response, AppError> {
  let submission = read_submission(multipart).await?;
  save(&state, admin, Some(id), submission)
}

/// POST /admin/flashcards/{id}/delete
pub async fn flashcard_delete(
  admin: AdminContext,
  State(state): State<AppState>,
  Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
  let deleted = {
    let conn = try_lock(&state.db)?;
    db::delete_flashcard(&conn, id)?
  };
  if !deleted {
    return Err(AppError::not_found(format!("Flashcard #{}", id)));
  }
  tracing::info!("Admin '{}' deleted flashcard #{}", admin.username, id);
  Ok(Redirect::to(LIST_URL))
}
