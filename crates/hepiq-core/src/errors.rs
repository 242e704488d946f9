/// Core error type for the support bot.
///
/// Adapter crates should map their specific errors into this type so the bot
/// core can handle failures consistently. Business rejections (wrong admin,
/// missing ticket) are not errors; see `tickets::Rejection`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
