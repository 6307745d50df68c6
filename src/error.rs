//! Error types for the processing engines

use thiserror::Error;

/// Errors reported by the scenario and dumb engines
#[derive(Debug, Error)]
pub enum EngineError {
    /// A processing session is already active on this engine
    #[error("a processing session is already running")]
    AlreadyRunning,

    /// The scenario failed pre-session validation
    #[error("invalid scenario: {0}")]
    InvalidScenario(#[from] ConfigError),

    /// The detector rejected its setup parameters
    #[error(transparent)]
    Detector(#[from] DetectorError),

    /// The device interaction layer rejected a call
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// The worker thread could not be spawned
    #[error("failed to spawn worker thread: {0}")]
    Worker(#[from] std::io::Error),
}

/// Errors from the image detector capability
#[derive(Debug, Clone, Error)]
pub enum DetectorError {
    /// Quality factor outside the accepted range
    #[error("detection quality {0} is outside the accepted range")]
    InvalidQuality(f64),
}

/// Errors from the device interaction capability
///
/// Any rejection is session-ending: the engines stop rather than silently
/// repeat a broken action unattended.
#[derive(Debug, Clone, Error)]
pub enum DeviceError {
    #[error("device interaction rejected: {0}")]
    Rejected(String),
}

/// Scenario snapshot loading and validation errors
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("{0}")]
    Invalid(String),
}
