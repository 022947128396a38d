use shared::ServerRef;
use thiserror::Error;

/// Malformed command parameters found while a command runs its pre-cycle.
///
/// Contained to the server it happened on: the message becomes that
/// server's result and the command is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct BadCommand {
    pub reason: String,
}

impl BadCommand {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("no server at {0}")]
    UnknownServer(ServerRef),
    #[error("server {0} is already running a command")]
    ServerBusy(ServerRef),
    #[error("player {0} is already registered")]
    AlreadyRegistered(String),
}
