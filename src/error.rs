//! Unified error types for the irrigation controller.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! event loop's error handling uniform.  Most errors never reach a caller:
//! decode failures are logged and dropped, link failures only surface as a
//! [`ChannelState`](crate::telemetry::channel::ChannelState) transition.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level controller error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An inbound telemetry frame could not be decoded.
    Decode(DecodeError),
    /// The telemetry link failed or is unavailable.
    Link(LinkError),
    /// An actuator command could not be applied.
    Actuator(ActuatorError),
    /// Startup configuration is invalid or could not be parsed.
    Config(ConfigError),
    /// The event loop is no longer running.
    Runtime(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(e) => write!(f, "decode: {e}"),
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Runtime(msg) => write!(f, "runtime: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Decode errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Binary frame was not valid UTF-8.
    NotUtf8,
    /// Frame was not a JSON object carrying a string `type` field.
    Malformed(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotUtf8 => write!(f, "frame is not valid UTF-8"),
            Self::Malformed(reason) => write!(f, "malformed envelope: {reason}"),
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

// ---------------------------------------------------------------------------
// Link errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// Connection attempt to the remote endpoint failed.
    Connect(String),
    /// Read or write on an established connection failed.
    Io(String),
    /// The link has already been closed.
    Closed,
    /// The outbound queue to the I/O thread is full.
    QueueFull,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect(reason) => write!(f, "connect failed: {reason}"),
            Self::Io(reason) => write!(f, "I/O error: {reason}"),
            Self::Closed => write!(f, "link closed"),
            Self::QueueFull => write!(f, "outbound queue full"),
        }
    }
}

impl std::error::Error for LinkError {}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// Relay/pump GPIO write failed.
    PinWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PinWriteFailed => write!(f, "pin write failed"),
        }
    }
}

impl std::error::Error for ActuatorError {}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A field failed range validation.  Names the field.
    ValidationFailed(&'static str),
    /// An environment override could not be parsed.
    Parse { key: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(field) => write!(f, "validation failed: {field}"),
            Self::Parse { key, reason } => write!(f, "cannot parse {key}: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_subsystem() {
        let e: Error = LinkError::Connect("refused".into()).into();
        assert_eq!(e.to_string(), "link: connect failed: refused");

        let e: Error = ConfigError::ValidationFailed("tick_interval_ms").into();
        assert_eq!(e.to_string(), "config: validation failed: tick_interval_ms");
    }

    #[test]
    fn subsystem_errors_box_as_std_errors() {
        let boxed: Box<dyn std::error::Error + Send + Sync> =
            Box::new(ConfigError::Parse { key: "IRRIGATION_TICK_MS", reason: "fast".into() });
        assert_eq!(boxed.to_string(), "cannot parse IRRIGATION_TICK_MS: fast");
        let _: Box<dyn std::error::Error> = Box::new(DecodeError::NotUtf8);
        let _: Box<dyn std::error::Error> = Box::new(LinkError::QueueFull);
        let _: Box<dyn std::error::Error> = Box::new(ActuatorError::PinWriteFailed);
    }

    #[test]
    fn config_errors_take_anyhow_context() {
        use anyhow::Context as _;
        let loaded: core::result::Result<(), ConfigError> =
            Err(ConfigError::ValidationFailed("tick_interval_ms"));
        let err = loaded.context("invalid IRRIGATION_* configuration").unwrap_err();
        assert_eq!(err.to_string(), "invalid IRRIGATION_* configuration");
        assert_eq!(err.root_cause().to_string(), "validation failed: tick_interval_ms");
    }

    #[test]
    fn decode_error_converts() {
        let e: Error = DecodeError::NotUtf8.into();
        assert!(matches!(e, Error::Decode(DecodeError::NotUtf8)));
    }
}
