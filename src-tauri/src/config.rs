use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Runtime settings for the kiosk.
///
/// Every field has a default; `from_env` overrides them from `KIOSK_*`
/// environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KioskConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Base delay of the dialogue; watchdogs and pauses are multiples of it
    pub time_unit_ms: u64,
    pub speech_lang: String,
    pub speech_rate: f32,
    pub speech_pitch: f32,
    pub speech_volume: f32,
    pub cart_db_file: String,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: 5,
            time_unit_ms: 1000,
            speech_lang: "ko-KR".to_string(),
            speech_rate: 0.8,
            speech_pitch: 1.0,
            speech_volume: 1.0,
            cart_db_file: "kiosk_cart.db".to_string(),
        }
    }
}

impl KioskConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("KIOSK_API_URL") {
            config.api_base_url = url;
        }
        if let Some(secs) = parse_env::<u64>("KIOSK_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = secs;
        }
        if let Some(ms) = parse_env::<u64>("KIOSK_TIME_UNIT_MS") {
            config.time_unit_ms = ms;
        }
        if let Ok(lang) = std::env::var("KIOSK_SPEECH_LANG") {
            config.speech_lang = lang;
        }
        if let Some(rate) = parse_env::<f32>("KIOSK_SPEECH_RATE") {
            config.speech_rate = rate;
        }
        if let Ok(file) = std::env::var("KIOSK_CART_DB") {
            config.cart_db_file = file;
        }

        config
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn time_unit(&self) -> Duration {
        Duration::from_millis(self.time_unit_ms)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}: cannot parse {:?}", key, raw);
            None
        }
    }
}
