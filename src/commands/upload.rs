use crate::gateway::{FileUpload, GatewayError};
use crate::session::models::{Message, UploadedFile};
use crate::AppState;
use std::path::Path;
use tracing::Instrument;

pub const FILE_REMOVED: &str =
    "The file and its data have been removed. Upload a new Excel file to continue.";
pub const CLEAR_FAILED: &str = "Failed to clear data. Please try again.";

/// Uploads the spreadsheet at `path` and makes it the active file.
///
/// Every failure becomes an assistant message; the active file is only set on
/// success. Returns the new file, or `None` when nothing was registered.
pub async fn upload_file(state: &mut AppState, path: &Path) -> Option<UploadedFile> {
    // Same in-flight guard as `chat::send_message`
    if state.session.flags.is_uploading {
        tracing::debug!("upload already in flight, ignoring request");
        return None;
    }

    state.session.flags.is_uploading = true;
    let span = tracing::info_span!("upload", session = %state.id, path = %path.display());
    let result = submit(state, path).instrument(span).await;
    state.session.flags.is_uploading = false;

    match result {
        Ok((file, server_message)) => {
            if let Err(e) = state.db.cache_active_file(&file) {
                tracing::warn!(error = %e, "could not cache active file");
            }
            let notice = server_message.unwrap_or_else(|| {
                format!(
                    "\"{}\" uploaded successfully. Ask me anything about your data.",
                    file.name
                )
            });
            state.session.set_active_file(Some(file.clone()));
            state.session.append_message(Message::assistant(notice));
            Some(file)
        }
        Err(e) => {
            tracing::warn!(kind = ?e.kind(), error = %e, "upload failed");
            state
                .session
                .append_message(Message::assistant(e.user_message()));
            None
        }
    }
}

async fn submit(
    state: &AppState,
    path: &Path,
) -> Result<(UploadedFile, Option<String>), GatewayError> {
    // Local checks go first so a bad request never touches the disk or network
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    if let Some(current) = state.session.active_file() {
        return Err(GatewayError::Conflict(current.name.clone()));
    }
    if !crate::gateway::is_allowed_file_name(name) {
        return Err(GatewayError::Validation(name.to_string()));
    }

    let upload = FileUpload::from_path(path).await?;
    let outcome = state
        .gateway
        .submit_upload(state.session.active_file(), upload)
        .await?;
    Ok((outcome.file, outcome.message))
}

/// Drops the active file on the gateway and locally.
///
/// On failure local state is left exactly as it was, plus one notice.
pub async fn remove_file(state: &mut AppState) -> bool {
    // Same in-flight guard as `chat::send_message`
    if state.session.flags.is_deleting_file {
        return false;
    }

    state.session.flags.is_deleting_file = true;
    let span = tracing::info_span!("remove_file", session = %state.id);
    let result = state.gateway.request_cleanup().instrument(span).await;
    state.session.flags.is_deleting_file = false;

    match result {
        Ok(()) => {
            state.session.reset_session();
            state.session.append_message(Message::assistant(FILE_REMOVED));
            if let Err(e) = state.db.clear_cache() {
                tracing::warn!(error = %e, "could not clear upload cache");
            }
            true
        }
        Err(e) => {
            tracing::warn!(kind = ?e.kind(), error = %e, "cleanup failed, keeping local state");
            state.session.append_message(Message::assistant(CLEAR_FAILED));
            false
        }
    }
}
