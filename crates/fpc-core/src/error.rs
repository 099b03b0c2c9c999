//! Error types for sensor bring-up operations.
//!
//! The taxonomy mirrors how callers are expected to react: `Defer` means the
//! attach should be retried later, everything else is a definitive failure of
//! the requested operation.

/// Result type alias for bring-up operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving the sensor's electrical environment.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unknown regulator or pin-group name.
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    /// Malformed control-surface payload or command.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A platform resource (reset line, clock, rail handle) could not be acquired.
    #[error("Failed to acquire {resource}: {reason}")]
    ResourceAcquireFailed { resource: String, reason: String },

    /// Backend-specific setup failed during attach.
    #[error("Configure failed: {message}")]
    ConfigureFailed { message: String },

    /// A dependency is not ready yet; the attach should be retried later.
    #[error("Dependency not ready: {dependency}")]
    Defer { dependency: String },

    /// The rail rejected the enable request.
    #[error("Failed to enable {name}: {reason}")]
    HardwareEnableFailed { name: String, reason: String },

    /// A platform primitive call was rejected.
    #[error("Platform call {op} failed: {message}")]
    Platform { op: &'static str, message: String },

    /// Invalid bring-up configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new not-found error for a regulator.
    pub fn regulator_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "Regulator",
            name: name.into(),
        }
    }

    /// Create a new not-found error for a pin-control group.
    pub fn pin_group_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "Pin group",
            name: name.into(),
        }
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a new resource acquisition error.
    pub fn acquire_failed(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ResourceAcquireFailed {
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    /// Create a new configure error.
    pub fn configure_failed(message: impl Into<String>) -> Self {
        Self::ConfigureFailed {
            message: message.into(),
        }
    }

    /// Create a new defer error.
    pub fn defer(dependency: impl Into<String>) -> Self {
        Self::Defer {
            dependency: dependency.into(),
        }
    }

    /// Create a new rail enable error.
    pub fn enable_failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::HardwareEnableFailed {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a new platform primitive error.
    pub fn platform(op: &'static str, message: impl Into<String>) -> Self {
        Self::Platform {
            op,
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether the caller should retry the failed operation later.
    ///
    /// Only [`Error::Defer`] is retryable; no operation is retried by the
    /// bring-up engine itself.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Defer { .. })
    }

    /// Whether this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether this is an invalid argument error.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}
