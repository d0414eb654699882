//! Error types for the simulator bridge.
//!
//! Every fatal condition of a session is a [`BridgeError`]. Non-fatal decode
//! problems never surface as errors: they are reported as [`DecodeWarning`]
//! values alongside the translated tick and logged.
//!
//! ## Error Categories
//!
//! - **Handshake Errors**: the simulator refused us or answered with garbage
//! - **Connection Errors**: short reads/writes and disconnects mid-session
//! - **Decode Errors**: a frame payload that is not a valid sensor message
//! - **Config Errors**: unreadable or inconsistent bridge configuration
//! - **Model Errors**: a joint table the bridge cannot use
//!
//! ## Recovery
//!
//! Nothing is retried inside the bridge. Callers decide whether a fresh
//! session is worth attempting:
//!
//! ```rust
//! use robocup_bridge::BridgeError;
//!
//! let error = BridgeError::connection_failed("peer closed the stream");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::types::SensorKind;

/// Result type alias for bridge operations.
pub type Result<T, E = BridgeError> = std::result::Result<T, E>;

/// Main error type for bridge operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BridgeError {
    #[error("Connection refused by '{address}'")]
    ConnectionRefused { address: String },

    #[error("Could not connect to '{address}': got handshake response {response:?}")]
    ConnectionProtocol { address: String, response: String },

    #[error("Simulator connection failed: {reason}")]
    Connection {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Decode error in {context}: {details}")]
    Decode { context: String, details: String },

    #[error("Configuration error in {path}: {details}")]
    Config { path: PathBuf, details: String },

    #[error("Invalid robot model: {details}")]
    Model { details: String },
}

impl BridgeError {
    /// Whether starting a new session could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            BridgeError::Connection { .. } => true,
            BridgeError::ConnectionRefused { .. } => true,
            BridgeError::ConnectionProtocol { .. } => false,
            BridgeError::Decode { .. } => false,
            BridgeError::Config { .. } => false,
            BridgeError::Model { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            BridgeError::ConnectionRefused { .. } => vec![
                "Check that no other client already holds the robot slot",
                "Verify the port matches the robot's team and player number",
                "Restart the simulator controller",
            ],
            BridgeError::ConnectionProtocol { .. } => vec![
                "Verify the address points at a RoboCup simulator controller",
                "Check simulator and bridge protocol versions",
            ],
            BridgeError::Connection { .. } => vec![
                "Check that the simulator is still running",
                "Inspect simulator logs for a dropped client",
                "Start a new session once the simulator is reachable",
            ],
            BridgeError::Decode { .. } => vec![
                "Verify the simulator speaks the expected message schema",
                "Check for framing desynchronisation on the stream",
            ],
            BridgeError::Config { .. } => vec![
                "Check the configuration file path and YAML syntax",
                "Verify step sizes are positive and joint names unique",
            ],
            BridgeError::Model { .. } => vec![
                "Check the joint table for duplicate names",
                "Verify every velocity limit is a non-negative number",
            ],
        }
    }

    /// Helper constructor for connection errors.
    pub fn connection_failed(reason: impl Into<String>) -> Self {
        BridgeError::Connection { reason: reason.into(), source: None }
    }

    /// Helper constructor for connection errors with source.
    pub fn connection_failed_with_source(
        reason: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        BridgeError::Connection { reason: reason.into(), source: Some(source.into()) }
    }

    /// Helper constructor for decode errors.
    pub fn decode_error(context: impl Into<String>, details: impl Into<String>) -> Self {
        BridgeError::Decode { context: context.into(), details: details.into() }
    }

    /// Helper constructor for robot model errors.
    pub fn model_error(details: impl Into<String>) -> Self {
        BridgeError::Model { details: details.into() }
    }

    /// Helper constructor for configuration errors.
    pub fn config_error(path: impl Into<PathBuf>, details: impl Into<String>) -> Self {
        BridgeError::Config { path: path.into(), details: details.into() }
    }
}

impl From<std::io::Error> for BridgeError {
    fn from(err: std::io::Error) -> Self {
        BridgeError::connection_failed_with_source(err.to_string(), err)
    }
}

impl From<prost::DecodeError> for BridgeError {
    fn from(err: prost::DecodeError) -> Self {
        BridgeError::decode_error("protobuf payload", err.to_string())
    }
}

/// Which of the two IMUs a reading belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImuSlot {
    /// Trunk-mounted IMU, passed through unremapped
    Body,
    /// Head-mounted IMU, axes remapped into the body frame
    Head,
}

impl fmt::Display for ImuSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImuSlot::Body => f.write_str("imu"),
            ImuSlot::Head => f.write_str("imu_head"),
        }
    }
}

/// Non-fatal problem found while translating one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeWarning {
    /// A reading arrived under a name the bridge does not know
    UnknownSensor { kind: SensorKind, name: String },
    /// A diagnostic message with a severity tag outside ERROR/WARNING
    UnknownSeverity { code: i32, text: String },
    /// Only one half of an IMU was present, so the IMU was not published
    IncompleteImu { imu: ImuSlot, accelerometer: bool, gyro: bool },
}

impl fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeWarning::UnknownSensor { kind, name } => {
                write!(f, "Unknown {}: '{}'", kind, name)
            }
            DecodeWarning::UnknownSeverity { code, text } => {
                write!(f, "Message with unknown severity {}: '{}'", code, text)
            }
            DecodeWarning::IncompleteImu { imu, accelerometer, gyro } => write!(
                f,
                "Incomplete {} reading (accelerometer: {}, gyro: {})",
                imu, accelerometer, gyro
            ),
        }
    }
}
