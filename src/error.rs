//! The error type every command handler returns.
//!
//! The registry's error callback is the only place that decides between
//! logging and showing something to the user, and it does so by matching on
//! the variant.

use thiserror::Error;

use crate::gateway::GatewayError;
use crate::player::PlayerError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum CommandError {
    /// Caused by the invoking user; the message is shown to them verbatim.
    #[error("{0}")]
    User(String),

    /// The audio node rejected or failed the request.
    #[error("audio node error: {source}")]
    Node { message: String, source: BoxError },

    /// The node or the Discord API could not be reached.
    #[error("transport error: {0}")]
    Transport(BoxError),

    #[error("unexpected error: {0}")]
    Internal(BoxError),
}

impl CommandError {
    pub fn user(message: impl Into<String>) -> Self {
        CommandError::User(message.into())
    }

    pub fn internal(error: impl Into<BoxError>) -> Self {
        CommandError::Internal(error.into())
    }
}

impl From<PlayerError> for CommandError {
    fn from(error: PlayerError) -> Self {
        if let PlayerError::NoResults | PlayerError::NoTrackFound = error {
            return CommandError::User(format!("{}.", capitalize(&error.to_string())));
        }

        if let PlayerError::QueueEmpty { stop_failure: None } = error {
            return CommandError::user("The queue is empty.");
        }

        if let Some(message) = error.node_message() {
            return CommandError::Node {
                message: message.to_string(),
                source: Box::new(error),
            };
        }

        if error.is_transport() {
            CommandError::Transport(Box::new(error))
        } else {
            CommandError::Internal(Box::new(error))
        }
    }
}

impl From<GatewayError> for CommandError {
    fn from(error: GatewayError) -> Self {
        CommandError::Transport(Box::new(error))
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(error: serde_json::Error) -> Self {
        CommandError::Internal(Box::new(error))
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
