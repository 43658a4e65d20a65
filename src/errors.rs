use std::string::FromUtf8Error;

/// All error types that can occur when talking to a bulb.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A requested field value or combination of fields is not accepted by the bulb.
    ///
    /// Raised before any network traffic takes place.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// The address handed to [`crate::Bulb::connect`] is not a dotted-quad IPv4 address.
    #[error("invalid bulb address {0:?}")]
    InvalidAddress(String),

    /// The initial state or identity query performed while connecting failed.
    #[error("failed to initialise bulb: {0}")]
    Construction(#[source] Box<Error>),

    /// No complete response arrived within any of the retry attempts.
    #[error("bulb did not answer after {attempts} attempts")]
    Timeout { attempts: u32 },

    /// The bulb understood the request and rejected it.
    #[error("bulb returned error code {code:?}: {response}")]
    Protocol { code: Option<i64>, response: String },

    /// A network socket operation failed while communicating with a bulb.
    #[error("socket {action} error: {err:?}")]
    Socket { action: String, err: std::io::Error },

    /// Failed to serialize data to JSON.
    #[error("failed to dump json: {0:?}")]
    JsonDump(serde_json::Error),

    /// Failed to deserialize JSON data.
    #[error("failed to load json: {0:?}")]
    JsonLoad(serde_json::Error),

    /// The decoded response was not valid UTF-8.
    #[error("utf8 decoding error: {0:?}")]
    Utf8Decode(FromUtf8Error),

    /// The response was well formed JSON but lacked an expected field.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl Error {
    /// Create a new socket error
    pub fn socket(action: &str, err: std::io::Error) -> Self {
        Error::Socket {
            action: action.to_string(),
            err,
        }
    }

    /// Create a new validation error
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Error::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// True for the errors [`crate::Bulb::connect`] reports when a bulb cannot be set up.
    pub fn is_construction(&self) -> bool {
        matches!(self, Error::InvalidAddress(_) | Error::Construction(_))
    }

    /// True for errors raised by input checks, before any I/O.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
