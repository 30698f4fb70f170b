pub mod bubbles;
pub mod session;
pub mod terminal;
pub mod transport;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("a reply is still being delivered")]
    Busy,
    #[error("nothing to send")]
    EmptyInput,
    #[error("{0}")]
    Transport(String),
}
