use crate::session::SessionExt;
use crate::voice::{DialogueOutcome, DialogueView};
use tauri::AppHandle;

// Dialogue commands return immediately; progress and navigation reach the
// page as `kiosk://dialogue` events.

#[tauri::command]
pub async fn get_dialogue_view(app: AppHandle) -> Result<DialogueView, String> {
    Ok(app.session().dialogue_view().await)
}

#[tauri::command]
pub async fn reset_dialogue(app: AppHandle) -> Result<DialogueView, String> {
    let session = app.session();
    // Interrupt first: settling the old page's speech wakes the old dialogue.
    session.interrupt_dialogue();
    app.speech().abandon();
    session.reset_dialogue().await;
    Ok(session.dialogue_view().await)
}

#[tauri::command]
pub fn user_gesture(app: AppHandle) -> Result<(), String> {
    let session = app.session();
    tauri::async_runtime::spawn(async move {
        if let Some(outcome) = session.on_user_gesture().await {
            log_outcome(outcome);
        }
    });
    Ok(())
}

#[tauri::command]
pub fn start_voice(app: AppHandle) -> Result<(), String> {
    let session = app.session();
    tauri::async_runtime::spawn(async move {
        if let Some(outcome) = session.start_voice().await {
            log_outcome(outcome);
        }
    });
    Ok(())
}

#[tauri::command]
pub fn toggle_microphone(app: AppHandle) -> Result<(), String> {
    let session = app.session();
    tauri::async_runtime::spawn(async move {
        if let Some(outcome) = session.toggle_microphone().await {
            log_outcome(outcome);
        }
    });
    Ok(())
}

#[tauri::command]
pub fn stop_listening(app: AppHandle) -> Result<(), String> {
    app.session().stop_listening();
    Ok(())
}

fn log_outcome(outcome: DialogueOutcome) {
    tracing::debug!("Dialogue finished: {:?}", outcome);
}

// ===== Reports from the page's speech APIs =====

#[tauri::command]
pub fn speech_started(app: AppHandle, id: u64) -> Result<(), String> {
    app.speech().on_speech_started(id);
    Ok(())
}

#[tauri::command]
pub fn speech_ended(app: AppHandle, id: u64, error: Option<String>) -> Result<(), String> {
    app.speech().on_speech_ended(id, error);
    Ok(())
}

#[tauri::command]
pub fn recognition_result(app: AppHandle, transcript: String) -> Result<(), String> {
    app.speech().on_recognition_result(transcript);
    Ok(())
}

#[tauri::command]
pub fn recognition_error(app: AppHandle, error: String) -> Result<(), String> {
    app.speech().on_recognition_error(error);
    Ok(())
}

#[tauri::command]
pub fn recognition_end(app: AppHandle) -> Result<(), String> {
    app.speech().on_recognition_end();
    Ok(())
}
