//! Window lifecycle commands

use crate::commands::recording::RecorderState;
use crate::events;
use tauri::{AppHandle, State};

/// Finalize any active recording, then close the window for real.
///
/// Invoked by the frontend after the user confirms quitting while a
/// recording is in progress (the close request itself is intercepted in
/// `run`), so the output file is never left unfinalized on a clean exit.
#[tauri::command]
pub async fn confirm_quit(
    app: AppHandle,
    state: State<'_, RecorderState>,
    window: tauri::WebviewWindow,
) -> Result<(), String> {
    let result = {
        let mut controller = state.controller.lock();
        let result = controller.stop();
        events::emit_status(&app, &controller.status_text());
        result
    };
    match result {
        Ok(Some(summary)) => events::emit_saved(&app, &summary),
        Ok(None) => {}
        Err(e) => tracing::warn!("Finalizing recording on quit failed: {}", e),
    }
    window.destroy().map_err(|e| e.to_string())
}
