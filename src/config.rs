//! Bridge configuration loaded from YAML.
//!
//! ```yaml
//! address: "localhost:10001"
//! min_frame_step: 16      # camera sampling period [ms]
//! min_control_step: 8     # every other sensor [ms]
//! imu_frame: imu_frame
//! head_imu_frame: imu_frame_2
//! joints:
//!   - { name: HeadPan, velocity_limit: 5.0 }
//!   - { name: HeadTilt, velocity_limit: 5.0 }
//! ```
//!
//! The `ROBOCUP_SIMULATOR_ADDR` environment variable, when set, replaces
//! `address`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::codec::DEFAULT_MAX_FRAME_LEN;
use crate::model::{JointModel, SensorCatalog};
use crate::{BridgeError, Result};

/// Environment variable overriding the simulator address.
pub const ADDRESS_ENV: &str = "ROBOCUP_SIMULATOR_ADDR";

fn default_max_frame_len() -> usize {
    DEFAULT_MAX_FRAME_LEN
}

/// Velocity limit of one actuated joint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JointLimit {
    pub name: String,
    /// [rad/s]
    pub velocity_limit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    /// Simulator `host:port`
    #[serde(default)]
    pub address: String,
    /// Camera sampling period [ms]
    pub min_frame_step: u32,
    /// Sampling period of every other sensor, and the per-tick budget [ms]
    pub min_control_step: u32,
    pub imu_frame: String,
    pub head_imu_frame: String,
    #[serde(default = "default_max_frame_len")]
    pub max_frame_len: usize,
    pub joints: Vec<JointLimit>,
}

impl BridgeConfig {
    /// Load, apply the environment override and validate.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load(path, None)
    }

    /// Like [`from_file`](Self::from_file), with an explicit address that
    /// takes precedence over both the file and the environment.
    pub fn load<P: AsRef<Path>>(path: P, address: Option<String>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading bridge configuration from {}", path.display());

        let yaml = std::fs::read_to_string(path)
            .map_err(|e| BridgeError::config_error(path, format!("cannot read file: {}", e)))?;
        let mut config = Self::parse(&yaml, path)?;
        config.apply_address_override(std::env::var(ADDRESS_ENV).ok());
        config.apply_address_override(address);
        config.validate(path)?;
        Ok(config)
    }

    /// Deserialize without validating. `origin` only labels errors.
    pub fn parse(yaml: &str, origin: impl Into<PathBuf>) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| BridgeError::config_error(origin, e.to_string()))
    }

    /// Replace the address when an override is present and non-empty.
    pub fn apply_address_override(&mut self, address: Option<String>) {
        if let Some(address) = address.filter(|a| !a.trim().is_empty()) {
            debug!("Simulator address overridden: '{}' -> '{}'", self.address, address);
            self.address = address;
        }
    }

    pub fn validate(&self, origin: impl Into<PathBuf>) -> Result<()> {
        let origin = origin.into();
        let fail = |details: String| Err(BridgeError::config_error(origin.clone(), details));

        match self.address.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => {}
            _ => {
                return fail(format!(
                    "address '{}' is not host:port (set it or {})",
                    self.address, ADDRESS_ENV
                ));
            }
        }
        if self.min_frame_step == 0 || self.min_control_step == 0 {
            return fail("min_frame_step and min_control_step must be positive".to_string());
        }
        if self.max_frame_len == 0 {
            return fail("max_frame_len must be positive".to_string());
        }
        if self.imu_frame.is_empty() || self.head_imu_frame.is_empty() {
            return fail("imu_frame and head_imu_frame must be set".to_string());
        }
        if let Err(e) = self.joint_model() {
            return fail(e.to_string());
        }
        Ok(())
    }

    pub fn joint_model(&self) -> Result<JointModel> {
        JointModel::new(self.joints.iter().map(|j| (j.name.as_str(), j.velocity_limit)))
    }

    pub fn sensor_catalog(&self, joints: &JointModel) -> SensorCatalog {
        SensorCatalog::new(joints, self.min_frame_step, self.min_control_step)
    }

    /// Time budget of one tick.
    pub fn tick_budget(&self) -> Duration {
        Duration::from_millis(u64::from(self.min_control_step))
    }
}
