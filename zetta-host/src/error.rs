use zetta_protocol::Fault;

/// Errors returned by the host binding
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The serial port failed while reading.
    #[error("UART error: {0}")]
    Uart(Box<dyn std::error::Error + Send + Sync>),

    /// The protocol handle rejected a request.
    #[error("link fault: {0}")]
    Link(#[from] Fault),

    /// A typed payload could not be encoded or decoded.
    #[error("payload codec error: {0}")]
    Codec(postcard::Error),

    /// A string payload was not valid UTF-8.
    #[error("payload is not UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The configuration file could not be parsed.
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    /// The configuration file could not be read.
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HostError {
    pub(crate) fn uart<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Uart(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, HostError>;
