/// Core error type for the bot.
///
/// Adapter crates map their specific errors into this type so the fan-out
/// classifiers and operator-facing reporting can handle failures in one
/// place.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(String),

    /// The remote API rejected the request; carries the API's description.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The bot was kicked, blocked, or otherwise lost access to the chat.
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("telegram error: {0}")]
    Telegram(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
