use serde::Serialize;

use super::Page;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceCommand {
    Menu,
    Order,
    Unknown,
}

/// Keyword classes in precedence order. An utterance containing both
/// keywords resolves to the first entry.
pub const COMMAND_KEYWORDS: [(VoiceCommand, &str); 2] =
    [(VoiceCommand::Menu, "메뉴"), (VoiceCommand::Order, "주문")];

pub const REPROMPT: &str = "죄송합니다. \"메뉴\" 또는 \"주문\"이라고 말씀해주세요.";

pub fn classify(transcript: &str) -> VoiceCommand {
    let lowered = transcript.to_lowercase();
    COMMAND_KEYWORDS
        .iter()
        .find(|(_, keyword)| lowered.contains(keyword))
        .map(|(command, _)| *command)
        .unwrap_or(VoiceCommand::Unknown)
}

impl VoiceCommand {
    pub fn destination(self) -> Option<Page> {
        match self {
            VoiceCommand::Menu => Some(Page::Menu),
            VoiceCommand::Order => Some(Page::Order),
            VoiceCommand::Unknown => None,
        }
    }

    /// Spoken reply to the command.
    pub fn reply(self) -> &'static str {
        match self {
            VoiceCommand::Menu => "메뉴 페이지로 이동합니다.",
            VoiceCommand::Order => "주문 페이지로 이동합니다.",
            VoiceCommand::Unknown => REPROMPT,
        }
    }

    /// Status line while the page change is pending.
    pub fn navigating_status(self) -> Option<&'static str> {
        match self {
            VoiceCommand::Menu => Some("메뉴 페이지로 이동 중..."),
            VoiceCommand::Order => Some("주문 페이지로 이동 중..."),
            VoiceCommand::Unknown => None,
        }
    }
}
