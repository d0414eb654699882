//! Tick-synchronous bridge between a humanoid control stack and the RoboCup
//! virtual-league simulator.
//!
//! The simulator drives time. Every tick it sends one length-prefixed
//! protobuf frame of sensor measurements; the bridge translates it into
//! clock and IMU readings for the control stack and answers with exactly one
//! frame of joint targets built from the latest command it was given.
//!
//! # Features
//!
//! - **Handshake**: `Welcome`/`Refused` token exchange over TCP
//! - **Framing**: 4-byte big-endian length prefix with a configurable cap
//! - **Translation**: simulated and wall clocks, body and head IMU with the
//!   head axes remapped into the body convention
//! - **Actuation**: per-joint velocity limits with explicit overrides, and
//!   sensor subscriptions sent once on the first tick
//!
//! ## Example
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use robocup_bridge::{Bridge, BridgeConfig, JointCommand};
//!
//! #[tokio::main]
//! async fn main() -> robocup_bridge::Result<()> {
//!     let config = BridgeConfig::from_file("config/wolfgang.yaml")?;
//!     let (channels, session) = Bridge::connect(&config).await?;
//!
//!     channels.commands().send(JointCommand::positions([("HeadPan", 0.3)]));
//!
//!     let mut imu = Box::pin(channels.imu_updates());
//!     while let Some(reading) = imu.next().await {
//!         println!("{:?}", reading.linear_acceleration);
//!     }
//!
//!     channels.shutdown();
//!     let summary = session.await.expect("session task panicked")?;
//!     println!("{} ticks", summary.ticks);
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod config;
pub mod connection;
mod error;
pub mod model;
pub mod schema;
pub mod session;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod translate;
pub mod types;

pub use error::*;
pub use types::*;

pub use config::BridgeConfig;
pub use connection::{Connection, ConnectionState};
pub use model::{JointModel, SensorCatalog};
pub use schema::{ActuatorRequest, SensorReport};
pub use session::{CommandSender, Session, SessionChannels, SessionSetup, SessionSummary};
pub use translate::{IgnoreMeasurements, Measurement, MeasurementHook, SensorTranslator};

use tokio::task::JoinHandle;

/// Entry point for simulator sessions.
pub struct Bridge;

impl Bridge {
    /// Connect to the configured simulator and start ticking.
    ///
    /// Returns once the handshake succeeded and the tick loop is running on
    /// its own task. The task ends when
    /// [`SessionChannels::shutdown`] is called (after the tick in flight) or
    /// when the connection fails.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The joint table in `config` is unusable
    /// - The simulator cannot be reached
    /// - The simulator refuses the client or answers the handshake with
    ///   anything other than `Welcome`
    pub async fn connect(
        config: &BridgeConfig,
    ) -> Result<(SessionChannels, JoinHandle<Result<SessionSummary>>)> {
        Self::connect_with(config, SessionSetup::from_config(config)?).await
    }

    /// Like [`connect`](Self::connect), with caller-supplied session inputs,
    /// e.g. a [`MeasurementHook`] for bumper, camera or force readings.
    pub async fn connect_with<H: MeasurementHook>(
        config: &BridgeConfig,
        setup: SessionSetup<H>,
    ) -> Result<(SessionChannels, JoinHandle<Result<SessionSummary>>)> {
        let connection =
            Connection::connect(&config.address).await?.with_max_frame_len(config.max_frame_len);
        Ok(Session::spawn(connection, setup))
    }
}
