use crate::api::ApiRole;

/// Author of a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    pub fn is_user(self) -> bool {
        self == Sender::User
    }

    /// Role used when projecting this message into request history.
    /// Everything that is not the user maps to "assistant".
    pub fn api_role(self) -> ApiRole {
        match self {
            Sender::User => ApiRole::User,
            Sender::Assistant => ApiRole::Assistant,
        }
    }
}

/// One entry in the chat transcript. Immutable once created; the session
/// owns the ordered list and never reorders it.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    pub image: Option<String>,
    pub is_error: bool,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            image: None,
            is_error: false,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::assistant_with_image(text, None)
    }

    pub fn assistant_with_image(text: impl Into<String>, image: Option<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
            image,
            is_error: false,
        }
    }

    /// An assistant-side bubble flagged as an error, rendered with the
    /// contact-developer affordance.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
            image: None,
            is_error: true,
        }
    }

    pub fn is_user(&self) -> bool {
        self.sender.is_user()
    }
}
