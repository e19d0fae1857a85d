pub mod cart;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod order;
pub mod session;
pub mod voice;

#[cfg(feature = "desktop")]
mod commands;


pub use error::{KioskError, Result};
pub use session::KioskSession;

#[cfg(feature = "desktop")]
pub fn run() {
    use std::sync::Arc;

    use cart::SqliteCartStorage;
    use catalog::ApiClient;
    use commands::{cart as cart_cmd, menu, orders, voice as voice_cmd};
    use config::KioskConfig;
    use db::Database;
    use tauri::{Emitter, Manager};
    use tracing_subscriber::EnvFilter;
    use voice::{SpeechBridge, SpeechRecognizer, SpeechSynthesizer};

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let config = KioskConfig::from_env();
            tracing::info!("Kiosk backend at {}", config.api_base_url);

            // Cart blob lives next to the app data
            let app_dir = app.path().app_data_dir()?;
            std::fs::create_dir_all(&app_dir)?;
            let db = Arc::new(Database::open(app_dir.join(&config.cart_db_file))?);

            let backend = Arc::new(ApiClient::from_config(&config)?);

            let handle = app.handle().clone();
            let speech = Arc::new(SpeechBridge::new(move |request| {
                if let Err(e) = handle.emit("kiosk://speech", &request) {
                    tracing::warn!("Failed to reach the page speech bridge: {}", e);
                }
            }));
            let synthesizer: Arc<dyn SpeechSynthesizer> = speech.clone();
            let recognizer: Arc<dyn SpeechRecognizer> = speech.clone();

            let (events_tx, mut events_rx) = tokio::sync::mpsc::unbounded_channel();
            let handle = app.handle().clone();
            tauri::async_runtime::spawn(async move {
                while let Some(event) = events_rx.recv().await {
                    let _ = handle.emit("kiosk://dialogue", &event);
                }
            });

            let session = Arc::new(KioskSession::new(
                &config,
                backend,
                Box::new(SqliteCartStorage::new(db)),
                synthesizer,
                Some(recognizer),
                Some(events_tx),
            ));

            app.manage(session);
            app.manage(speech);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Menu
            menu::get_categories,
            menu::get_menu_by_category,
            menu::get_menu_board,
            menu::get_menu_detail,
            menu::get_options_by_type,
            menu::get_voice_guide,
            menu::order_item,
            menu::confirm_options,
            // Cart
            cart_cmd::get_cart,
            cart_cmd::get_cart_totals,
            cart_cmd::add_to_cart,
            cart_cmd::increase_quantity,
            cart_cmd::decrease_quantity,
            cart_cmd::remove_item,
            cart_cmd::clear_cart,
            // Orders
            orders::get_order_summary,
            orders::submit_order,
            // Voice
            voice_cmd::get_dialogue_view,
            voice_cmd::reset_dialogue,
            voice_cmd::user_gesture,
            voice_cmd::start_voice,
            voice_cmd::toggle_microphone,
            voice_cmd::stop_listening,
            voice_cmd::speech_started,
            voice_cmd::speech_ended,
            voice_cmd::recognition_result,
            voice_cmd::recognition_error,
            voice_cmd::recognition_end,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
