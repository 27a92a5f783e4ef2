//! FFI intent API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose one sync function per user intent to Dart via FRB.
//! - Own the single process-wide `NotesApp` behind a mutex.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every call locks, runs to completion and returns an envelope.
//! - Delete is unconditional; Dart confirms with the user before calling.

use log::{error, warn};
use nebula_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CommitOutcome, EditorTarget, KvNoteRepository, MutationOutcome, Note, NoteId, NotesApp,
    NotesConfig, SqliteKeyValueStore,
};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

const DB_FILE_NAME: &str = "nebula_notes.sqlite3";
const DB_PATH_ENV: &str = "NEBULA_NOTES_DB_PATH";

type FfiApp = NotesApp<KvNoteRepository<SqliteKeyValueStore>>;

static NOTES_APP: Mutex<Option<FfiApp>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Note projection handed to Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: String,
    pub title: String,
    pub content: String,
    /// ISO-8601, millisecond precision, UTC.
    pub created_at: String,
    pub is_pinned: bool,
}

/// Derived view envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesViewResponse {
    /// Filtered and ordered notes.
    pub items: Vec<NoteItem>,
    /// Search text the view was computed for.
    pub query: String,
    pub message: String,
}

/// Generic action envelope for intents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActionResponse {
    pub ok: bool,
    /// Affected note, when there is one.
    pub note_id: Option<String>,
    pub message: String,
}

impl NoteActionResponse {
    fn success(message: impl Into<String>, note_id: Option<NoteId>) -> Self {
        Self {
            ok: true,
            note_id: note_id.map(|id| id.to_string()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            note_id: None,
            message: message.into(),
        }
    }
}

/// Editor modal state for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorStateResponse {
    pub is_open: bool,
    /// `New Note` / `Edit Note`; `None` when closed.
    pub heading: Option<String>,
    pub editing_id: Option<String>,
    pub title: String,
    pub content: String,
}

/// Opens (or re-opens) the notes database.
///
/// An empty `db_path` falls back to `NEBULA_NOTES_DB_PATH`, then to a file in
/// the system temp directory.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_open(db_path: String) -> NoteActionResponse {
    let path = resolve_db_path(db_path.trim());
    match open_app(path) {
        Ok(app) => {
            let count = app.store().len();
            *lock_app() = Some(app);
            NoteActionResponse::success(format!("Loaded {count} note(s)."), None)
        }
        Err(err) => {
            error!("event=notes_open module=ffi status=error error={err}");
            NoteActionResponse::failure(format!("notes_open failed: {err}"))
        }
    }
}

/// Opens the editor with an empty draft.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_add() -> NoteActionResponse {
    respond(with_app(|app| {
        app.add_note();
        Ok(NoteActionResponse::success("Editor opened.", None))
    }))
}

/// Opens the editor seeded from an existing note.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_edit(note_id: String) -> NoteActionResponse {
    respond(with_app(|app| edit_in(app, &note_id)))
}

/// Updates the draft from keystrokes.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_draft_changed(title: String, content: String) -> EditorStateResponse {
    with_app(|app| Ok(draft_changed_in(app, title, content)))
        .unwrap_or_else(|_| closed_editor_state())
}

/// Current editor modal state.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_editor() -> EditorStateResponse {
    with_app(|app| Ok(editor_state_of(app))).unwrap_or_else(|_| closed_editor_state())
}

/// Commits the editor with the submitted fields.
///
/// Blank fields return `ok=false` and leave the editor open.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_save(title: String, content: String) -> NoteActionResponse {
    respond(with_app(|app| save_in(app, &title, &content)))
}

/// Closes the editor and discards the draft.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_cancel() -> NoteActionResponse {
    respond(with_app(|app| {
        app.cancel();
        Ok(NoteActionResponse::success("Editor closed.", None))
    }))
}

/// Deletes a note. Caller must have obtained user confirmation.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_delete(note_id: String) -> NoteActionResponse {
    respond(with_app(|app| {
        let id = parse_note_id(&note_id)?;
        let outcome = app.delete_note(id).map_err(|err| err.to_string())?;
        Ok(mutation_response(outcome, id, "Note deleted."))
    }))
}

#[flutter_rust_bridge::frb(sync)]
pub fn notes_toggle_pin(note_id: String) -> NoteActionResponse {
    respond(with_app(|app| {
        let id = parse_note_id(&note_id)?;
        let outcome = app.toggle_pin(id).map_err(|err| err.to_string())?;
        Ok(mutation_response(outcome, id, "Pin toggled."))
    }))
}

/// Sets the search text and returns the new view.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_search(text: String) -> NotesViewResponse {
    view_response(with_app(|app| {
        app.search_changed(text);
        Ok(view_of(app))
    }))
}

/// Returns the view for the current search text.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_visible() -> NotesViewResponse {
    view_response(with_app(|app| Ok(view_of(app))))
}

fn open_app(path: PathBuf) -> Result<FfiApp, String> {
    let config = NotesConfig {
        db_path: Some(path),
        ..NotesConfig::default()
    };
    let repo = config
        .open_repository()
        .map_err(|err| format!("notes DB open failed: {err}"))?;
    Ok(NotesApp::open(repo))
}

fn resolve_db_path(requested: &str) -> PathBuf {
    resolve_db_path_with(requested, std::env::var(DB_PATH_ENV).ok())
}

/// Argument first, then the env override, then the temp-dir default.
fn resolve_db_path_with(requested: &str, env_override: Option<String>) -> PathBuf {
    if !requested.is_empty() {
        return PathBuf::from(requested);
    }
    if let Some(raw) = env_override {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(DB_FILE_NAME)
}

fn lock_app() -> MutexGuard<'static, Option<FfiApp>> {
    NOTES_APP.lock().unwrap_or_else(|poisoned| {
        warn!("event=app_lock module=ffi status=recovered reason=poisoned");
        poisoned.into_inner()
    })
}

fn with_app<T>(f: impl FnOnce(&mut FfiApp) -> Result<T, String>) -> Result<T, String> {
    let mut guard = lock_app();
    if guard.is_none() {
        *guard = Some(open_app(resolve_db_path(""))?);
    }
    match guard.as_mut() {
        Some(app) => f(app),
        None => Err("notes app is not open".to_string()),
    }
}

fn respond(result: Result<NoteActionResponse, String>) -> NoteActionResponse {
    result.unwrap_or_else(NoteActionResponse::failure)
}

fn view_response(result: Result<NotesViewResponse, String>) -> NotesViewResponse {
    result.unwrap_or_else(|err| NotesViewResponse {
        items: Vec::new(),
        query: String::new(),
        message: format!("notes view failed: {err}"),
    })
}

fn draft_changed_in(app: &mut FfiApp, title: String, content: String) -> EditorStateResponse {
    let editor = app.editor_mut();
    editor.set_title(title);
    editor.set_content(content);
    editor_state_of(app)
}

fn edit_in(app: &mut FfiApp, note_id: &str) -> Result<NoteActionResponse, String> {
    let id = parse_note_id(note_id)?;
    if app.edit_note(id) {
        Ok(NoteActionResponse::success("Editor opened.", Some(id)))
    } else {
        Ok(NoteActionResponse::failure(format!("note not found: {id}")))
    }
}

fn save_in(app: &mut FfiApp, title: &str, content: &str) -> Result<NoteActionResponse, String> {
    let outcome = app.save(title, content).map_err(|err| err.to_string())?;
    Ok(match outcome {
        CommitOutcome::Created(note) => {
            NoteActionResponse::success("Note created.", Some(note.id))
        }
        CommitOutcome::Updated(id) => NoteActionResponse::success("Note updated.", Some(id)),
        CommitOutcome::TargetMissing(id) => {
            NoteActionResponse::failure(format!("note not found: {id}"))
        }
        CommitOutcome::Rejected(reason) => NoteActionResponse::failure(reason.to_string()),
        CommitOutcome::NotOpen => NoteActionResponse::failure("editor is not open"),
    })
}

fn mutation_response(
    outcome: MutationOutcome,
    id: NoteId,
    ok_message: &str,
) -> NoteActionResponse {
    match outcome {
        MutationOutcome::Applied => NoteActionResponse::success(ok_message, Some(id)),
        MutationOutcome::NotFound => NoteActionResponse::failure(format!("note not found: {id}")),
        MutationOutcome::Invalid(reason) => NoteActionResponse::failure(reason.to_string()),
    }
}

fn view_of(app: &FfiApp) -> NotesViewResponse {
    let items = app
        .visible_notes()
        .into_iter()
        .map(to_note_item)
        .collect::<Vec<_>>();
    let message = if items.is_empty() {
        "No notes.".to_string()
    } else {
        format!("Showing {} note(s).", items.len())
    };
    NotesViewResponse {
        items,
        query: app.search_query().to_string(),
        message,
    }
}

fn editor_state_of(app: &FfiApp) -> EditorStateResponse {
    let editor = app.editor();
    let Some(draft) = editor.draft() else {
        return closed_editor_state();
    };
    EditorStateResponse {
        is_open: true,
        heading: editor.heading().map(str::to_string),
        editing_id: match editor.target() {
            Some(EditorTarget::Editing(id)) => Some(id.to_string()),
            _ => None,
        },
        title: draft.title.clone(),
        content: draft.content.clone(),
    }
}

fn closed_editor_state() -> EditorStateResponse {
    EditorStateResponse {
        is_open: false,
        heading: None,
        editing_id: None,
        title: String::new(),
        content: String::new(),
    }
}

fn to_note_item(note: &Note) -> NoteItem {
    NoteItem {
        id: note.id.to_string(),
        title: note.title.clone(),
        content: note.content.clone(),
        created_at: note.created_at_iso(),
        is_pinned: note.is_pinned,
    }
}

fn parse_note_id(raw: &str) -> Result<NoteId, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid note id `{raw}`"))
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, draft_changed_in, edit_in, editor_state_of, init_logging, open_app,
        parse_note_id, ping, resolve_db_path, resolve_db_path_with, save_in, view_of, FfiApp,
        DB_FILE_NAME,
    };
    use std::path::PathBuf;

    fn temp_app(dir: &tempfile::TempDir) -> FfiApp {
        open_app(dir.path().join("notes.db")).expect("open app")
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn explicit_db_path_wins_over_defaults() {
        assert_eq!(resolve_db_path("/data/n.db"), PathBuf::from("/data/n.db"));
    }

    #[test]
    fn env_override_used_when_argument_is_empty() {
        assert_eq!(
            resolve_db_path_with("", Some(" /env/notes.db ".to_string())),
            PathBuf::from("/env/notes.db")
        );
        assert_eq!(
            resolve_db_path_with("/arg.db", Some("/env/notes.db".to_string())),
            PathBuf::from("/arg.db")
        );
    }

    #[test]
    fn temp_dir_default_when_no_override() {
        let expected = std::env::temp_dir().join(DB_FILE_NAME);
        assert_eq!(resolve_db_path_with("", None), expected);
        assert_eq!(resolve_db_path_with("", Some("   ".to_string())), expected);
    }

    #[test]
    fn draft_changes_are_ignored_while_editor_closed() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = temp_app(&dir);

        let state = draft_changed_in(&mut app, "t".to_string(), "c".to_string());
        assert!(!state.is_open);
        assert!(state.title.is_empty());
    }

    #[test]
    fn draft_changes_flow_into_committed_note() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = temp_app(&dir);
        app.add_note();

        let state = draft_changed_in(&mut app, "Groceries".to_string(), "Milk".to_string());
        assert!(state.is_open);
        assert_eq!(state.heading.as_deref(), Some("New Note"));
        assert_eq!(state.title, "Groceries");
        assert_eq!(state.content, "Milk");

        let committed = app.save_draft().unwrap();
        assert!(matches!(committed, nebula_core::CommitOutcome::Created(_)));
        assert_eq!(app.store().len(), 1);
    }

    #[test]
    fn parse_note_id_rejects_garbage() {
        assert!(parse_note_id("not-a-uuid").is_err());
    }

    #[test]
    fn save_without_open_editor_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = temp_app(&dir);
        let response = save_in(&mut app, "title", "content").unwrap();
        assert!(!response.ok);
    }

    #[test]
    fn create_edit_and_view_flow() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = temp_app(&dir);

        app.add_note();
        let rejected = save_in(&mut app, "  ", "content").unwrap();
        assert!(!rejected.ok);
        assert!(editor_state_of(&app).is_open);

        let created = save_in(&mut app, "Trip", "Pack bags").unwrap();
        assert!(created.ok, "{}", created.message);
        let note_id = created.note_id.expect("created note id");
        assert!(!editor_state_of(&app).is_open);

        let opened = edit_in(&mut app, &note_id).unwrap();
        assert!(opened.ok);
        let editor = editor_state_of(&app);
        assert_eq!(editor.heading.as_deref(), Some("Edit Note"));
        assert_eq!(editor.editing_id.as_deref(), Some(note_id.as_str()));

        let updated = save_in(&mut app, "Trip", "Pack bags and passport").unwrap();
        assert!(updated.ok);

        app.search_changed("PASSPORT");
        let view = view_of(&app);
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].id, note_id);
        assert!(view.items[0].created_at.ends_with('Z'));
    }
}
