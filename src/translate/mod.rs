//! Translation between simulator payloads and the control stack.
//!
//! - [`sensors`] turns a decoded [`SensorReport`](crate::schema::SensorReport)
//!   into clocks and IMU readings, logs simulator diagnostics and hands the
//!   remaining categories to a [`MeasurementHook`]
//! - [`actuators`] turns the latest [`JointCommand`](crate::types::JointCommand)
//!   into an [`ActuatorRequest`](crate::schema::ActuatorRequest)
//!
//! Both directions are pure apart from logging; the session decides when
//! they run.

pub mod actuators;
pub mod sensors;

pub use sensors::{
    IgnoreMeasurements, Measurement, MeasurementHook, SensorTranslator, TranslatedSensors,
};
