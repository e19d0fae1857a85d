use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::command::classify;
use super::{
    CaptionStyle, DialogueEvent, DialogueState, DialogueView, Page, SpeechRecognizer,
    SpeechSynthesizer, VoiceSettings,
};
use crate::catalog::KioskBackend;
use crate::error::KioskError;

pub const IDLE_PROMPT: &str = "페이지를 클릭하거나 마이크를 클릭하여 음성을 시작하세요.";
pub const READY_STATUS: &str = "음성 인식을 시작하세요.";
pub const LISTENING_STATUS: &str = "음성을 듣고 있습니다...";
pub const RETRY_STATUS: &str = "다시 말씀해주세요.";
pub const RECOGNITION_ERROR_STATUS: &str = "음성 인식 중 오류가 발생했습니다.";
pub const UNSUPPORTED_STATUS: &str = "음성 인식을 지원하지 않는 브라우저입니다.";
pub const FALLBACK_WELCOME: &str = "안녕하세요. 반갑습니다. 주문하고 싶은 메뉴가 있으시면 메뉴명을 말씀해주시고, 못 정하셨으면 '메뉴'라고 말해 주세요.";

/// Delays of the dialogue, all derived from one time unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogueTiming {
    pub unit: Duration,
}

impl DialogueTiming {
    pub fn new(unit: Duration) -> Self {
        Self { unit }
    }

    /// Wait for the audio-start signal before giving up on an utterance.
    pub fn speech_start_timeout(&self) -> Duration {
        self.unit
    }

    pub fn listen_retry(&self) -> Duration {
        self.unit
    }

    pub fn navigation_delay(&self) -> Duration {
        self.unit
    }

    pub fn reprompt_delay(&self) -> Duration {
        self.unit * 2
    }

    pub fn after_welcome(&self) -> Duration {
        self.unit / 2
    }
}

impl Default for DialogueTiming {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechOutcome {
    /// No gesture yet; nothing was sent to the synthesizer
    Suppressed,
    Completed,
    /// Audio never started within the watchdog window
    TimedOut,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenOutcome {
    Heard(String),
    NoSpeech,
    Failed(String),
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Navigate(Page),
    Reprompt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueOutcome {
    Navigate(Page),
    /// Dialogue ended without a command; the page waits for the user
    Idle,
}

fn initial_view(voice_available: bool) -> DialogueView {
    let status = if voice_available {
        IDLE_PROMPT
    } else {
        UNSUPPORTED_STATUS
    };

    DialogueView {
        state: DialogueState::AwaitingInteraction,
        status: status.to_string(),
        caption: String::new(),
        caption_style: CaptionStyle::Plain,
        transcript: None,
        listening: false,
        voice_available,
    }
}

/// Reaches a running dialogue without taking the engine.
#[derive(Clone)]
pub struct DialogueControl {
    recognizer: Option<Arc<dyn SpeechRecognizer>>,
    listening: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
}

impl DialogueControl {
    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    pub fn stop_listening(&self) {
        if let Some(recognizer) = &self.recognizer {
            if self.is_listening() {
                debug!("Stop requested for running recognition");
                recognizer.stop();
            }
        }
    }

    /// Ends the running dialogue at its next step. It neither speaks nor
    /// listens again until the engine is reset.
    pub fn interrupt(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.stop_listening();
    }
}

pub struct DialogueEngine {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    recognizer: Option<Arc<dyn SpeechRecognizer>>,
    voice: VoiceSettings,
    timing: DialogueTiming,
    has_user_interacted: bool,
    listening: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
    /// Generation this engine was last reset at
    current_generation: u64,
    view: DialogueView,
    events: Option<mpsc::UnboundedSender<DialogueEvent>>,
}

impl DialogueEngine {
    /// `recognizer` is `None` on platforms without speech recognition; the
    /// engine then still speaks but never listens.
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        recognizer: Option<Arc<dyn SpeechRecognizer>>,
        voice: VoiceSettings,
        timing: DialogueTiming,
    ) -> Self {
        let view = initial_view(recognizer.is_some());

        Self {
            synthesizer,
            recognizer,
            voice,
            timing,
            has_user_interacted: false,
            listening: Arc::new(AtomicBool::new(false)),
            generation: Arc::new(AtomicU64::new(0)),
            current_generation: 0,
            view,
            events: None,
        }
    }

    /// Back to the freshly loaded page: audio locked again, idle prompt.
    pub fn reset(&mut self) {
        self.has_user_interacted = false;
        self.current_generation = self.generation.load(Ordering::SeqCst);
        self.view = initial_view(self.recognizer.is_some());
        self.emit(DialogueEvent::State {
            state: self.view.state,
        });
        self.emit(DialogueEvent::Status {
            text: self.view.status.clone(),
        });
    }

    pub fn with_events(mut self, events: mpsc::UnboundedSender<DialogueEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn state(&self) -> DialogueState {
        self.view.state
    }

    pub fn view(&self) -> &DialogueView {
        &self.view
    }

    pub fn has_user_interacted(&self) -> bool {
        self.has_user_interacted
    }

    pub fn control(&self) -> DialogueControl {
        DialogueControl {
            recognizer: self.recognizer.clone(),
            listening: self.listening.clone(),
            generation: self.generation.clone(),
        }
    }

    /// True once [`DialogueControl::interrupt`] was called since the last reset.
    pub fn is_interrupted(&self) -> bool {
        self.generation.load(Ordering::SeqCst) != self.current_generation
    }

    /// Records a user gesture. Returns true only for the first one.
    pub fn register_interaction(&mut self) -> bool {
        if self.has_user_interacted {
            return false;
        }
        self.has_user_interacted = true;
        info!("First user interaction, audio unlocked");
        true
    }

    fn emit(&self, event: DialogueEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }

    fn set_state(&mut self, state: DialogueState) {
        if self.view.state != state {
            debug!("Dialogue {:?} -> {:?}", self.view.state, state);
            self.view.state = state;
            self.emit(DialogueEvent::State { state });
        }
    }

    fn set_status(&mut self, text: &str) {
        self.view.status = text.to_string();
        self.emit(DialogueEvent::Status {
            text: text.to_string(),
        });
    }

    fn set_caption(&mut self, text: Option<&str>, style: CaptionStyle) {
        if let Some(text) = text {
            self.view.caption = text.to_string();
        }
        self.view.caption_style = style;
        self.emit(DialogueEvent::Caption {
            text: self.view.caption.clone(),
            style,
        });
    }

    fn set_voice_unavailable(&mut self) {
        self.recognizer = None;
        self.view.voice_available = false;
    }

    /// Speaks `text` and returns once the utterance is over.
    ///
    /// Before the first gesture nothing is spoken and this returns
    /// immediately. Afterwards the caption shows the whole text at once and
    /// the call resolves on completion, on error, or when audio has not
    /// started within one time unit.
    pub async fn speak(&mut self, text: &str) -> SpeechOutcome {
        if !self.has_user_interacted || self.is_interrupted() {
            debug!("Speech suppressed: {}", text);
            return SpeechOutcome::Suppressed;
        }

        if self.synthesizer.is_speaking() {
            self.synthesizer.cancel();
        }

        self.set_state(DialogueState::Speaking);
        self.set_caption(Some(text), CaptionStyle::Speaking);

        let outcome = match self.synthesizer.speak(self.voice.request(text)) {
            Err(e) => SpeechOutcome::Failed(e.to_string()),
            Ok(mut handle) => {
                let started =
                    tokio::time::timeout(self.timing.speech_start_timeout(), handle.started())
                        .await;
                match started {
                    Err(_) => SpeechOutcome::TimedOut,
                    Ok(_) => handle.finished().await,
                }
            }
        };

        match &outcome {
            SpeechOutcome::TimedOut => warn!("Speech did not start in time, continuing"),
            SpeechOutcome::Failed(e) => warn!("Speech synthesis failed: {}", e),
            _ => debug!("Finished speaking"),
        }

        self.set_caption(None, CaptionStyle::Plain);
        self.set_state(DialogueState::Idle);
        outcome
    }

    /// Captures one utterance. Waits while the synthesizer is still
    /// producing audio so the microphone does not hear the kiosk itself.
    pub async fn listen(&mut self) -> ListenOutcome {
        let Some(recognizer) = self.recognizer.clone() else {
            self.set_status(UNSUPPORTED_STATUS);
            return ListenOutcome::Unsupported;
        };

        while self.synthesizer.is_speaking() {
            debug!("Still speaking, deferring recognition");
            tokio::time::sleep(self.timing.listen_retry()).await;
        }
        if self.is_interrupted() {
            return ListenOutcome::NoSpeech;
        }

        self.set_state(DialogueState::Listening);
        self.set_status(LISTENING_STATUS);
        self.set_caption(None, CaptionStyle::Listening);
        self.listening.store(true, Ordering::SeqCst);
        self.view.listening = true;

        let result = recognizer.recognize(&self.voice.lang).await;

        self.listening.store(false, Ordering::SeqCst);
        self.view.listening = false;
        self.set_caption(None, CaptionStyle::Plain);
        self.set_state(DialogueState::Idle);

        match result {
            Ok(Some(transcript)) => {
                let transcript = transcript.trim().to_string();
                info!("Recognized: {}", transcript);
                self.view.transcript = Some(transcript.clone());
                self.emit(DialogueEvent::Transcript {
                    text: transcript.clone(),
                });
                ListenOutcome::Heard(transcript)
            }
            Ok(None) => ListenOutcome::NoSpeech,
            Err(KioskError::RecognitionUnsupported) => {
                warn!("Speech recognition unsupported, disabling voice controls");
                self.set_voice_unavailable();
                self.set_status(UNSUPPORTED_STATUS);
                ListenOutcome::Unsupported
            }
            Err(e) => {
                warn!("Speech recognition failed: {}", e);
                self.set_status(RECOGNITION_ERROR_STATUS);
                ListenOutcome::Failed(e.to_string())
            }
        }
    }

    /// Acts on a transcript: announce and navigate, or apologise.
    pub async fn process(&mut self, transcript: &str) -> TurnOutcome {
        self.set_state(DialogueState::Processing);
        let command = classify(transcript);
        debug!("Classified {:?} as {:?}", transcript, command);

        self.speak(command.reply()).await;

        match (command.destination(), command.navigating_status()) {
            (Some(page), Some(status)) => {
                self.navigate(page, status).await;
                TurnOutcome::Navigate(page)
            }
            _ => {
                self.set_status(RETRY_STATUS);
                TurnOutcome::Reprompt
            }
        }
    }

    async fn navigate(&mut self, page: Page, status: &str) {
        self.set_status(status);
        tokio::time::sleep(self.timing.navigation_delay()).await;
        if self.is_interrupted() {
            debug!("Dialogue interrupted, not navigating to {}", page.path());
            return;
        }
        info!("Navigating to {}", page.path());
        self.emit(DialogueEvent::Navigate {
            page,
            path: page.path().to_string(),
        });
    }

    /// Speaks the backend's guide text, or the built-in greeting when the
    /// backend is unreachable.
    pub async fn welcome(&mut self, backend: &dyn KioskBackend) -> SpeechOutcome {
        let text = match backend.voice_guide_text().await {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to load voice guide text, using fallback: {}", e);
                FALLBACK_WELCOME.to_string()
            }
        };
        self.speak(&text).await
    }

    /// One full dialogue: welcome, then listen until a command navigates
    /// away or recognition gives up.
    pub async fn start(&mut self, backend: &dyn KioskBackend) -> DialogueOutcome {
        self.welcome(backend).await;
        if self.is_interrupted() {
            return DialogueOutcome::Idle;
        }
        self.set_status(READY_STATUS);
        self.set_caption(None, CaptionStyle::Listening);
        tokio::time::sleep(self.timing.after_welcome()).await;
        self.converse().await
    }

    /// Listen/answer turns until navigation or an idle stop.
    pub async fn converse(&mut self) -> DialogueOutcome {
        loop {
            if self.is_interrupted() {
                debug!("Dialogue interrupted");
                return DialogueOutcome::Idle;
            }
            match self.listen().await {
                ListenOutcome::Heard(transcript) => match self.process(&transcript).await {
                    _ if self.is_interrupted() => return DialogueOutcome::Idle,
                    TurnOutcome::Navigate(page) => return DialogueOutcome::Navigate(page),
                    TurnOutcome::Reprompt => {
                        tokio::time::sleep(self.timing.reprompt_delay()).await;
                    }
                },
                ListenOutcome::NoSpeech | ListenOutcome::Failed(_) | ListenOutcome::Unsupported => {
                    return DialogueOutcome::Idle;
                }
            }
        }
    }
}
