//! Speech through the page's own speech APIs.
//!
//! The bridge turns synthesis and recognition calls into [`BridgeRequest`]s
//! for the page, and the page reports back through the `on_*` methods
//! (wired to Tauri commands in the desktop shell).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::{utterance, SpeechRecognizer, SpeechRequest, SpeechSynthesizer, UtteranceHandle, UtteranceSignals};
use crate::error::{KioskError, Result};

/// Error code the page reports when recognition is missing.
pub const UNSUPPORTED_CODE: &str = "not-supported";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeRequest {
    Speak { id: u64, request: SpeechRequest },
    CancelSpeech,
    Listen { lang: String },
    StopListening,
}

type Emitter = Arc<dyn Fn(BridgeRequest) + Send + Sync>;
type RecognitionReply = oneshot::Sender<Result<Option<String>>>;

pub struct SpeechBridge {
    emit: Emitter,
    next_id: AtomicU64,
    /// Id of the utterance the page reported as playing; 0 when silent
    playing: AtomicU64,
    utterances: Mutex<HashMap<u64, UtteranceSignals>>,
    recognition: Mutex<Option<RecognitionReply>>,
}

impl SpeechBridge {
    pub fn new(emit: impl Fn(BridgeRequest) + Send + Sync + 'static) -> Self {
        Self {
            emit: Arc::new(emit),
            next_id: AtomicU64::new(1),
            playing: AtomicU64::new(0),
            utterances: Mutex::new(HashMap::new()),
            recognition: Mutex::new(None),
        }
    }

    fn take_utterance(&self, id: u64) -> Option<UtteranceSignals> {
        self.utterances.lock().ok().and_then(|mut map| map.remove(&id))
    }

    pub fn on_speech_started(&self, id: u64) {
        if let Ok(mut map) = self.utterances.lock() {
            if let Some(signals) = map.get_mut(&id) {
                self.playing.store(id, Ordering::SeqCst);
                signals.started();
            }
        }
    }

    /// End of utterance `id`. Only the utterance that is playing can mark
    /// the synthesizer silent; late reports for cancelled ones are ignored.
    pub fn on_speech_ended(&self, id: u64, error: Option<String>) {
        let _ = self
            .playing
            .compare_exchange(id, 0, Ordering::SeqCst, Ordering::SeqCst);
        match (self.take_utterance(id), error) {
            (Some(signals), None) => signals.finished(),
            (Some(signals), Some(error)) => signals.failed(error),
            (None, _) => debug!("Ignoring end of unknown utterance {}", id),
        }
    }

    fn take_recognition(&self) -> Option<RecognitionReply> {
        self.recognition.lock().ok().and_then(|mut slot| slot.take())
    }

    pub fn on_recognition_result(&self, transcript: String) {
        if let Some(reply) = self.take_recognition() {
            let _ = reply.send(Ok(Some(transcript)));
        }
    }

    pub fn on_recognition_error(&self, error: String) {
        if let Some(reply) = self.take_recognition() {
            let error = if error == UNSUPPORTED_CODE {
                KioskError::RecognitionUnsupported
            } else {
                KioskError::Recognition(error)
            };
            let _ = reply.send(Err(error));
        }
    }

    /// The page went away: settle everything it still owed us.
    pub fn abandon(&self) {
        if let Ok(mut map) = self.utterances.lock() {
            map.clear();
        }
        self.playing.store(0, Ordering::SeqCst);
        self.on_recognition_end();
    }

    /// Recognition ended; a no-op when a result or error already settled it.
    pub fn on_recognition_end(&self) {
        if let Some(reply) = self.take_recognition() {
            let _ = reply.send(Ok(None));
        }
    }
}

impl SpeechSynthesizer for SpeechBridge {
    fn speak(&self, request: SpeechRequest) -> Result<UtteranceHandle> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (signals, handle) = utterance();

        {
            let mut map = self
                .utterances
                .lock()
                .map_err(|e| KioskError::Synthesis(e.to_string()))?;
            // Only one utterance is queued at a time; anything left was
            // given up on and its handle resolves as failed.
            if !map.is_empty() {
                debug!("Dropping {} unsettled utterance(s)", map.len());
                map.clear();
            }
            map.insert(id, signals);
        }

        (self.emit)(BridgeRequest::Speak { id, request });
        Ok(handle)
    }

    fn cancel(&self) {
        // Dropping the signals resolves every pending handle as failed.
        if let Ok(mut map) = self.utterances.lock() {
            map.clear();
        }
        self.playing.store(0, Ordering::SeqCst);
        (self.emit)(BridgeRequest::CancelSpeech);
    }

    fn is_speaking(&self) -> bool {
        self.playing.load(Ordering::SeqCst) != 0
    }
}

#[async_trait]
impl SpeechRecognizer for SpeechBridge {
    async fn recognize(&self, lang: &str) -> Result<Option<String>> {
        let (tx, rx) = oneshot::channel();
        {
            let mut slot = self
                .recognition
                .lock()
                .map_err(|e| KioskError::Recognition(e.to_string()))?;
            if slot.replace(tx).is_some() {
                warn!("Superseding a recognition that never settled");
            }
        }

        (self.emit)(BridgeRequest::Listen {
            lang: lang.to_string(),
        });

        rx.await
            .unwrap_or_else(|_| Err(KioskError::Recognition("recognition abandoned".to_string())))
    }

    fn stop(&self) {
        (self.emit)(BridgeRequest::StopListening);
    }
}
