use std::fmt;

#[derive(Debug)]
pub enum ForgeError {
    ConfigError(String),
    AuthError(String),
    RequestError(String),
    ResponseError(String),
    SerializationError(String),
    RenderError(String),
    Upstream { status: u16, message: String },
}

impl ForgeError {
    /// HTTP status of the failed remote call, when one was observed.
    pub fn status(&self) -> Option<u16> {
        match self {
            ForgeError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for ForgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForgeError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            ForgeError::RequestError(msg) => write!(f, "Request error: {}", msg),
            ForgeError::ResponseError(msg) => write!(f, "Response error: {}", msg),
            ForgeError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            // Auth, render and upstream messages are shown to callers as-is.
            ForgeError::AuthError(msg) => write!(f, "{}", msg),
            ForgeError::RenderError(msg) => write!(f, "{}", msg),
            ForgeError::Upstream { message, .. } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for ForgeError {}

pub type Result<T> = std::result::Result<T, ForgeError>;
