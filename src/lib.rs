//! QuickRec - Simple screen recording with live preview.
//!
//! This is the main library crate for the QuickRec application. It provides
//! the Tauri application setup and all backend functionality.

pub mod capture;
pub mod commands;
pub mod encoder;
pub mod events;
pub mod recorder;
pub mod utils;

use commands::recording::RecorderState;
use recorder::state::RecordingState;
use std::sync::Arc;
use tauri::Manager;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the application
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quickrec=debug,tauri=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting QuickRec v{}", env!("CARGO_PKG_VERSION"));

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .manage(RecorderState::default())
        .invoke_handler(tauri::generate_handler![
            // Recording commands
            commands::recording::get_displays,
            commands::recording::start_recording,
            commands::recording::pause_recording,
            commands::recording::resume_recording,
            commands::recording::stop_recording,
            commands::recording::get_recording_state,
            commands::recording::get_status,
            commands::recording::get_frame_count,
            commands::recording::set_show_preview,
            commands::recording::suggest_output_path,
            commands::recording::get_video_metadata,
            // Window commands
            commands::window::confirm_quit,
        ])
        .setup(|app| {
            let state = app.state::<RecorderState>();
            commands::recording::spawn_preview_loop(
                app.handle().clone(),
                Arc::clone(&state.controller),
            );
            Ok(())
        })
        .on_window_event(|window, event| {
            if let tauri::WindowEvent::CloseRequested { api, .. } = event {
                let state = window.app_handle().state::<RecorderState>();
                let active = state.controller.lock().state() != RecordingState::Idle;
                if active {
                    // Keep the window open until the user confirms; the
                    // frontend then calls confirm_quit, which finalizes the
                    // file before destroying the window.
                    api.prevent_close();
                    events::emit_close_requested(window.app_handle());
                }
            }
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
