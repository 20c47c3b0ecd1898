use {chronicle_common::FromMessage, thiserror::Error};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] toml::de::Error),

    /// A value fails validation. `field` is the dotted config path.
    #[error("invalid config: {field}: {message}")]
    Invalid { field: &'static str, message: String },

    #[error("{0}")]
    Message(String),
}

impl Error {
    #[must_use]
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

impl FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message(message)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

chronicle_common::impl_context!();
