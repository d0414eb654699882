//! Core types shared by the codec, the translators and the session.
//!
//! ## Layout
//!
//! - [`messages`] holds the protobuf wire structs exactly as the simulator
//!   sends and expects them
//! - [`SensorKind`] names the closed set of sensor categories in a report
//! - [`ClockStamp`], [`Imu`] and [`Vector3`] are what the control stack sees
//! - [`JointCommand`] is what the control stack sends back

mod clock;
mod command;
mod imu;
pub mod messages;
mod sensor_kind;

pub use clock::ClockStamp;
pub use command::{JointCommand, VELOCITY_LIMIT_SENTINEL};
pub use imu::{Imu, Vector3};
pub use sensor_kind::SensorKind;
