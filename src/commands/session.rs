use crate::AppState;
use tracing::Instrument;

/// Clears whatever a previous run left on the gateway.
///
/// The cached upload id is only logged; the cleanup call is issued either way.
/// On failure the cache is kept so the next start tries again.
pub async fn cleanup_on_load(state: &mut AppState) -> bool {
    match state.db.cached_upload_id() {
        Ok(Some(upload_id)) => tracing::info!(%upload_id, "found upload from a previous session"),
        Ok(None) => tracing::debug!("no cached upload"),
        Err(e) => tracing::warn!(error = %e, "could not read upload cache"),
    }
    if let Ok(Some(file)) = state.db.cached_active_file() {
        tracing::info!(file = %file.name, size = file.size, "previous session had an active file");
    }

    let span = tracing::info_span!("cleanup_on_load", session = %state.id);
    match state.gateway.request_cleanup().instrument(span).await {
        Ok(()) => {
            state.session.reset_session();
            if let Err(e) = state.db.clear_cache() {
                tracing::warn!(error = %e, "could not clear upload cache");
            }
            true
        }
        Err(e) => {
            tracing::warn!(kind = ?e.kind(), error = %e, "startup cleanup failed");
            false
        }
    }
}
