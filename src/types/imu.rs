//! IMU readings published to the control stack

use serde::{Deserialize, Serialize};

use super::ClockStamp;
use super::messages;

/// Cartesian 3-vector in the robot's frame conventions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Reassign head-IMU wire axes to the body frame.
    ///
    /// body.x = wire.z, body.y = wire.x, body.z = wire.y
    pub const fn head_to_body(self) -> Self {
        Self { x: self.z, y: self.x, z: self.y }
    }
}

impl From<messages::Vector3> for Vector3 {
    fn from(v: messages::Vector3) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

impl From<Vector3> for messages::Vector3 {
    fn from(v: Vector3) -> Self {
        messages::Vector3 { x: v.x, y: v.y, z: v.z }
    }
}

/// Combined accelerometer and gyro reading of one IMU for one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Imu {
    /// Frame the reading is expressed in
    pub frame_id: String,
    /// Simulated time of the tick
    pub stamp: ClockStamp,
    /// Linear acceleration [m/s^2]
    pub linear_acceleration: Vector3,
    /// Angular velocity [rad/s]
    pub angular_velocity: Vector3,
}
