//! Voice dialogue: the kiosk speaks, listens for one command and moves the
//! customer to the menu or order page.
//!
//! ```text
//! AwaitingInteraction --gesture--> Speaking --done/watchdog--> Listening
//!        Listening --transcript--> Processing --+--> Speaking --> navigate
//!                                               +--> Speaking --2 units--> Listening
//! ```
//!
//! Audio lives outside the crate. [`SpeechSynthesizer`] and
//! [`SpeechRecognizer`] are implemented by the webview bridge in the desktop
//! shell and by scripted fakes in tests.

pub mod bridge;
pub mod command;
pub mod engine;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::oneshot;

use crate::config::KioskConfig;
use crate::error::Result;

pub use bridge::{BridgeRequest, SpeechBridge};
pub use command::{classify, VoiceCommand, COMMAND_KEYWORDS};
pub use engine::{
    DialogueControl, DialogueEngine, DialogueOutcome, DialogueTiming, ListenOutcome,
    SpeechOutcome, TurnOutcome,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueState {
    Idle,
    AwaitingInteraction,
    Speaking,
    Listening,
    Processing,
}

/// Destinations reachable by voice; each is a full page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Home,
    Menu,
    Order,
}

impl Page {
    pub fn path(self) -> &'static str {
        match self {
            Page::Home => "index.html",
            Page::Menu => "menu.html",
            Page::Order => "order.html",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CaptionStyle {
    #[default]
    Plain,
    Speaking,
    Listening,
}

/// What the home page shows for the dialogue.
#[derive(Debug, Clone, Serialize)]
pub struct DialogueView {
    pub state: DialogueState,
    pub status: String,
    pub caption: String,
    pub caption_style: CaptionStyle,
    pub transcript: Option<String>,
    pub listening: bool,
    /// False once the platform turned out to have no speech recognition
    pub voice_available: bool,
}

/// UI notifications pushed while a dialogue runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DialogueEvent {
    State { state: DialogueState },
    Status { text: String },
    Caption { text: String, style: CaptionStyle },
    Transcript { text: String },
    Navigate { page: Page, path: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeechRequest {
    pub text: String,
    pub lang: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSettings {
    pub lang: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl VoiceSettings {
    pub fn from_config(config: &KioskConfig) -> Self {
        Self {
            lang: config.speech_lang.clone(),
            rate: config.speech_rate,
            pitch: config.speech_pitch,
            volume: config.speech_volume,
        }
    }

    pub fn request(&self, text: &str) -> SpeechRequest {
        SpeechRequest {
            text: text.to_string(),
            lang: self.lang.clone(),
            rate: self.rate,
            pitch: self.pitch,
            volume: self.volume,
        }
    }
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self::from_config(&KioskConfig::default())
    }
}

/// Producer side of one utterance, held by the synthesizer.
#[derive(Debug)]
pub struct UtteranceSignals {
    started: Option<oneshot::Sender<()>>,
    finished: Option<oneshot::Sender<std::result::Result<(), String>>>,
}

impl UtteranceSignals {
    pub fn started(&mut self) {
        if let Some(tx) = self.started.take() {
            let _ = tx.send(());
        }
    }

    pub fn finished(mut self) {
        if let Some(tx) = self.finished.take() {
            let _ = tx.send(Ok(()));
        }
    }

    pub fn failed(mut self, error: impl Into<String>) {
        if let Some(tx) = self.finished.take() {
            let _ = tx.send(Err(error.into()));
        }
    }
}

/// Consumer side of one utterance, awaited by the engine.
#[derive(Debug)]
pub struct UtteranceHandle {
    started: oneshot::Receiver<()>,
    finished: oneshot::Receiver<std::result::Result<(), String>>,
}

impl UtteranceHandle {
    /// Resolves when audio starts. `false` means the utterance ended or
    /// failed without ever starting.
    pub async fn started(&mut self) -> bool {
        (&mut self.started).await.is_ok()
    }

    pub async fn finished(self) -> SpeechOutcome {
        match self.finished.await {
            Ok(Ok(())) => SpeechOutcome::Completed,
            Ok(Err(e)) => SpeechOutcome::Failed(e),
            Err(_) => SpeechOutcome::Failed("utterance dropped".to_string()),
        }
    }
}

pub fn utterance() -> (UtteranceSignals, UtteranceHandle) {
    let (started_tx, started_rx) = oneshot::channel();
    let (finished_tx, finished_rx) = oneshot::channel();
    (
        UtteranceSignals {
            started: Some(started_tx),
            finished: Some(finished_tx),
        },
        UtteranceHandle {
            started: started_rx,
            finished: finished_rx,
        },
    )
}

pub trait SpeechSynthesizer: Send + Sync {
    /// Queues `request` for playback. Only one utterance plays at a time.
    fn speak(&self, request: SpeechRequest) -> Result<UtteranceHandle>;
    fn cancel(&self);
    /// Whether the platform is still producing audio.
    fn is_speaking(&self) -> bool;
}

#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Captures a single utterance. `Ok(None)` when recognition ended
    /// without a final transcript (silence or a stop request).
    async fn recognize(&self, lang: &str) -> Result<Option<String>>;
    /// Asks a running recognition to end; `recognize` settles on its own.
    fn stop(&self);
}
