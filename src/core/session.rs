//! Chat session state and the send/reply lifecycle.
//!
//! The session is the single owner of the transcript and the transient UI
//! flags. All mutation goes through [`ChatSession::send`],
//! [`ChatSession::apply`], [`ChatSession::append_message`], and
//! [`ChatSession::reset`]; the event loop holds the session and drives it.

use crate::api::{ChatReply, HistoryEntry};
use crate::core::message::Message;

/// Shown in place of an empty reply body.
pub const NO_REPLY_FALLBACK: &str = "SERA didn’t respond.";

/// Fixed transcript entry for a client-side transport failure.
pub const TRANSPORT_ERROR_TEXT: &str = "⚠️ Error: Could not connect to the AI server.";

/// Which screen the client is showing. `Intro → Chatting` happens once per
/// session; there is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Intro,
    Chatting,
}

/// A prepared relay call: the trimmed message plus the history projection
/// taken from the transcript as it was before the user message was appended.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub message: String,
    pub history: Vec<HistoryEntry>,
}

/// Outcome of a relay call, fed back into the session by the event loop.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The relay answered with a decodable body (success or a relay-side
    /// error notice; both render as assistant text).
    Reply(ChatReply),
    /// The relay could not be reached or its body could not be decoded.
    TransportFailed,
}

#[derive(Debug)]
pub struct ChatSession {
    messages: Vec<Message>,
    input: String,
    loading: bool,
    screen: Screen,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            input: String::new(),
            loading: false,
            screen: Screen::Intro,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn start_chat(&mut self) {
        self.screen = Screen::Chatting;
    }

    pub fn push_input(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn pop_input(&mut self) {
        self.input.pop();
    }

    /// First half of the send lifecycle.
    ///
    /// Returns `None` without touching any state when the input is blank.
    /// Otherwise appends the user message, clears the input buffer, raises
    /// the loading flag, and hands back the payload for the relay call.
    ///
    /// The history projection is taken before the user message is appended,
    /// so the outgoing history never contains the message being sent. The
    /// relay does not consume history either way; the projection exists to
    /// keep the wire contract stable.
    ///
    /// Nothing stops a second `send` while a call is outstanding. Replies
    /// are appended in completion order, matching the unguarded behavior of
    /// the rest of the lifecycle.
    pub fn send(&mut self) -> Option<Outbound> {
        let text = self.input.trim();
        if text.is_empty() {
            return None;
        }
        let text = text.to_string();

        let history = self
            .messages
            .iter()
            .map(|m| HistoryEntry {
                role: m.sender.api_role(),
                content: m.text.clone(),
            })
            .collect();

        self.messages.push(Message::user(text.clone()));
        self.input.clear();
        self.loading = true;

        Some(Outbound {
            message: text,
            history,
        })
    }

    /// Second half of the send lifecycle: fold a relay outcome into the
    /// transcript. The loading flag clears on every branch.
    pub fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Reply(reply) => {
                let text = if reply.reply.is_empty() {
                    NO_REPLY_FALLBACK.to_string()
                } else {
                    reply.reply
                };
                self.messages
                    .push(Message::assistant_with_image(text, reply.image));
            }
            SessionEvent::TransportFailed => {
                self.messages.push(Message::error(TRANSPORT_ERROR_TEXT));
            }
        }
        self.loading = false;
    }

    pub fn append_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Drop the transcript and transient flags. The screen is untouched;
    /// leaving the intro is one-way for the session.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.input.clear();
        self.loading = false;
    }
}
