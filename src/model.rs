//! Static robot tables built once at startup.
//!
//! [`JointModel`] maps each actuated joint to its velocity limit and
//! [`SensorCatalog`] lists every sensor the bridge subscribes to on the first
//! tick. Neither changes for the lifetime of a session.

use std::collections::HashMap;
use tracing::debug;

use crate::schema::SensorSubscription;
use crate::{BridgeError, Result};

pub const CAMERA: &str = "camera";
pub const IMU_ACCELEROMETER: &str = "imu accelerometer";
pub const IMU_GYRO: &str = "imu gyro";
pub const HEAD_IMU_ACCELEROMETER: &str = "imu_head accelerometer";
pub const HEAD_IMU_GYRO: &str = "imu_head gyro";

/// Foot pressure cleats, right foot first.
pub const FOOT_CLEATS: [&str; 8] = [
    "r_cleat_l_back",
    "r_cleat_l_front",
    "r_cleat_r_front",
    "r_cleat_r_back",
    "l_cleat_l_back",
    "l_cleat_l_front",
    "l_cleat_r_front",
    "l_cleat_r_back",
];

const POSITION_SENSOR_SUFFIX: &str = "_sensor";

/// Ordered joint table with velocity limits [rad/s].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JointModel {
    joints: Vec<(String, f64)>,
    index: HashMap<String, usize>,
}

impl JointModel {
    /// Build the table, rejecting duplicate names and unusable limits.
    pub fn new<I, S>(joints: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut model = Self::default();
        for (name, limit) in joints {
            let name = name.into();
            if !limit.is_finite() || limit < 0.0 {
                return Err(BridgeError::model_error(format!(
                    "joint '{}' has invalid velocity limit {}",
                    name, limit
                )));
            }
            if model.index.contains_key(&name) {
                return Err(BridgeError::model_error(format!("joint '{}' is listed twice", name)));
            }
            model.index.insert(name.clone(), model.joints.len());
            model.joints.push((name, limit));
        }
        debug!("Joint model holds {} joints", model.joints.len());
        Ok(model)
    }

    pub fn velocity_limit(&self, joint: &str) -> Option<f64> {
        self.index.get(joint).map(|&i| self.joints[i].1)
    }

    pub fn joint_names(&self) -> impl Iterator<Item = &str> {
        self.joints.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }
}

/// Every sensor the bridge can subscribe to, with its sampling periods.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorCatalog {
    names: Vec<String>,
    /// Sampling period of the camera [ms]
    min_frame_step: u32,
    /// Sampling period of every other sensor [ms]
    min_control_step: u32,
}

impl SensorCatalog {
    /// Fixed sensors first, then one position sensor per joint in model order.
    pub fn new(joints: &JointModel, min_frame_step: u32, min_control_step: u32) -> Self {
        let mut names: Vec<String> =
            [CAMERA, IMU_ACCELEROMETER, IMU_GYRO, HEAD_IMU_ACCELEROMETER, HEAD_IMU_GYRO]
                .into_iter()
                .chain(FOOT_CLEATS)
                .map(str::to_string)
                .collect();
        names.extend(joints.joint_names().map(|joint| format!("{joint}{POSITION_SENSOR_SUFFIX}")));

        Self { names, min_frame_step, min_control_step }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Sampling period for a sensor name [ms].
    pub fn time_step(&self, name: &str) -> u32 {
        if name == CAMERA { self.min_frame_step } else { self.min_control_step }
    }

    /// One subscription per catalogued sensor, in catalog order.
    pub fn subscriptions(&self) -> Vec<SensorSubscription> {
        self.names
            .iter()
            .map(|name| SensorSubscription {
                name: name.clone(),
                time_step_ms: self.time_step(name),
            })
            .collect()
    }
}
