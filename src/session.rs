//! Session driver: the tick loop between simulator and control stack.
//!
//! One inbound sensor frame always produces exactly one outbound actuator
//! frame. The loop only suspends on those two socket operations; decoding,
//! translation and encoding run inline. Shutdown is cooperative and only
//! observed between ticks, so a stalled simulator stalls the session too.
//!
//! Outputs reach the control stack through `watch` channels, and joint
//! commands come back through a last-write-wins [`CommandSender`] slot that
//! the loop reads at the start of building every actuator frame.

use futures::{Stream, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::BridgeConfig;
use crate::connection::Connection;
use crate::model::{JointModel, SensorCatalog};
use crate::schema::{decode_sensor_report, encode_actuator_request};
use crate::translate::{IgnoreMeasurements, MeasurementHook, SensorTranslator, actuators};
use crate::types::{ClockStamp, Imu, JointCommand};
use crate::Result;

/// Static inputs of a session.
pub struct SessionSetup<H = IgnoreMeasurements> {
    pub joints: JointModel,
    pub catalog: SensorCatalog,
    pub sensors: SensorTranslator<H>,
    /// Frame-in to frame-out time above which a tick is reported as late
    pub tick_budget: Duration,
}

impl SessionSetup<IgnoreMeasurements> {
    pub fn from_config(config: &BridgeConfig) -> Result<Self> {
        let joints = config.joint_model()?;
        let catalog = config.sensor_catalog(&joints);
        Ok(Self {
            joints,
            catalog,
            sensors: SensorTranslator::new(&config.imu_frame, &config.head_imu_frame),
            tick_budget: config.tick_budget(),
        })
    }
}

impl<H: MeasurementHook> SessionSetup<H> {
    /// Route bumper, camera, force and position readings to `hook`.
    pub fn with_hook<H2: MeasurementHook>(self, hook: H2) -> SessionSetup<H2> {
        let SessionSetup { joints, catalog, sensors, tick_budget } = self;
        let (imu_frame, head_imu_frame) = sensors.frames();
        SessionSetup {
            joints,
            catalog,
            sensors: SensorTranslator::with_hook(imu_frame, head_imu_frame, hook),
            tick_budget,
        }
    }
}

/// Write side of the joint command slot.
///
/// Each send replaces the previous command wholesale; the session always
/// uses whichever command was sent last.
#[derive(Clone)]
pub struct CommandSender {
    inner: Arc<watch::Sender<JointCommand>>,
}

impl CommandSender {
    pub fn send(&self, command: JointCommand) {
        self.inner.send_replace(command);
    }

    /// The command the next tick would use.
    pub fn latest(&self) -> JointCommand {
        self.inner.borrow().clone()
    }
}

/// Control-stack side of a running session.
pub struct SessionChannels {
    clock: watch::Receiver<Option<ClockStamp>>,
    server_clock: watch::Receiver<Option<ClockStamp>>,
    imu: watch::Receiver<Option<Imu>>,
    head_imu: watch::Receiver<Option<Imu>>,
    commands: CommandSender,
    cancel: CancellationToken,
}

impl SessionChannels {
    pub fn commands(&self) -> CommandSender {
        self.commands.clone()
    }

    /// Simulated clock, one value per tick.
    pub fn clock(&self) -> watch::Receiver<Option<ClockStamp>> {
        self.clock.clone()
    }

    /// Simulator wall clock, one value per tick.
    pub fn server_clock(&self) -> watch::Receiver<Option<ClockStamp>> {
        self.server_clock.clone()
    }

    pub fn imu(&self) -> watch::Receiver<Option<Imu>> {
        self.imu.clone()
    }

    pub fn head_imu(&self) -> watch::Receiver<Option<Imu>> {
        self.head_imu.clone()
    }

    /// Latest body IMU readings as a stream.
    pub fn imu_updates(&self) -> impl Stream<Item = Imu> + 'static {
        WatchStream::new(self.imu.clone()).filter_map(|opt| async move { opt })
    }

    /// Latest head IMU readings as a stream.
    pub fn head_imu_updates(&self) -> impl Stream<Item = Imu> + 'static {
        WatchStream::new(self.head_imu.clone()).filter_map(|opt| async move { opt })
    }

    /// Latest simulated clock values as a stream.
    pub fn clock_updates(&self) -> impl Stream<Item = ClockStamp> + 'static {
        WatchStream::new(self.clock.clone()).filter_map(|opt| async move { opt })
    }

    /// Ask the session to stop after the tick in flight.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Drop for SessionChannels {
    fn drop(&mut self) {
        debug!("Dropping session channels");
        self.cancel.cancel();
    }
}

/// Outcome of a session that ended on request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Completed sensor-in / actuator-out exchanges
    pub ticks: u64,
    /// Ticks that took longer than the tick budget
    pub late_ticks: u64,
}

struct Outputs {
    clock: watch::Sender<Option<ClockStamp>>,
    server_clock: watch::Sender<Option<ClockStamp>>,
    imu: watch::Sender<Option<Imu>>,
    head_imu: watch::Sender<Option<Imu>>,
}

/// A connected session, ready to run its tick loop.
pub struct Session<S = TcpStream, H = IgnoreMeasurements> {
    connection: Connection<S>,
    setup: SessionSetup<H>,
    commands: watch::Receiver<JointCommand>,
    outputs: Outputs,
    cancel: CancellationToken,
}

impl<S, H> Session<S, H>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    H: MeasurementHook,
{
    pub fn new(connection: Connection<S>, setup: SessionSetup<H>) -> (Self, SessionChannels) {
        let (clock_tx, clock_rx) = watch::channel(None);
        let (server_clock_tx, server_clock_rx) = watch::channel(None);
        let (imu_tx, imu_rx) = watch::channel(None);
        let (head_imu_tx, head_imu_rx) = watch::channel(None);
        let (command_tx, command_rx) = watch::channel(JointCommand::default());
        let cancel = CancellationToken::new();

        let session = Self {
            connection,
            setup,
            commands: command_rx,
            outputs: Outputs {
                clock: clock_tx,
                server_clock: server_clock_tx,
                imu: imu_tx,
                head_imu: head_imu_tx,
            },
            cancel: cancel.clone(),
        };
        let channels = SessionChannels {
            clock: clock_rx,
            server_clock: server_clock_rx,
            imu: imu_rx,
            head_imu: head_imu_rx,
            commands: CommandSender { inner: Arc::new(command_tx) },
            cancel,
        };
        (session, channels)
    }

    /// Run the tick loop on a tokio task.
    pub fn spawn(
        connection: Connection<S>,
        setup: SessionSetup<H>,
    ) -> (SessionChannels, JoinHandle<Result<SessionSummary>>) {
        let (session, channels) = Self::new(connection, setup);
        let handle = tokio::spawn(session.run());
        (channels, handle)
    }

    /// Tick until shutdown is requested or the connection fails.
    ///
    /// The connection is closed before this returns, on every path.
    pub async fn run(mut self) -> Result<SessionSummary> {
        info!("Session with '{}' started", self.connection.address());
        let mut ticks = 0u64;
        let mut late_ticks = 0u64;

        let result = loop {
            if self.cancel.is_cancelled() {
                info!("Shutdown requested");
                break Ok(());
            }
            // Subscriptions go out exactly once, with the first reply
            match self.tick(ticks == 0).await {
                Ok(on_time) => {
                    ticks += 1;
                    late_ticks += u64::from(!on_time);
                }
                Err(e) => break Err(e),
            }
        };

        self.connection.close().await;
        info!("Session ended after {} ticks ({} late)", ticks, late_ticks);
        result.map(|()| SessionSummary { ticks, late_ticks })
    }

    /// One exchange. `Ok(false)` means the reply went out over budget.
    async fn tick(&mut self, first: bool) -> Result<bool> {
        let payload = self.connection.read_frame().await?;
        let started = Instant::now();

        let report = match decode_sensor_report(&payload) {
            Ok(report) => report,
            Err(e) => {
                self.connection.close().await;
                return Err(e);
            }
        };

        let translated = self.setup.sensors.translate(&report);
        trace!(
            "Tick at {:.3}s: {} readings, {} warnings",
            translated.clock.as_secs_f64(),
            report.reading_count(),
            translated.warnings.len()
        );
        self.outputs.clock.send_replace(Some(translated.clock));
        self.outputs.server_clock.send_replace(Some(translated.server_clock));
        if let Some(imu) = translated.imu {
            self.outputs.imu.send_replace(Some(imu));
        }
        if let Some(head_imu) = translated.head_imu {
            self.outputs.head_imu.send_replace(Some(head_imu));
        }

        let subscriptions = first.then_some(&self.setup.catalog);
        if let Some(catalog) = subscriptions {
            debug!("Subscribing to {} sensors", catalog.len());
        }
        let request = {
            let command = self.commands.borrow();
            actuators::build(&command, &self.setup.joints, subscriptions)
        };

        self.connection.write_frame(&encode_actuator_request(&request)).await?;

        let elapsed = started.elapsed();
        let on_time = elapsed <= self.setup.tick_budget;
        if !on_time {
            warn!(
                "Tick at {:.3}s took {:?}, over the {:?} budget",
                translated.clock.as_secs_f64(),
                elapsed,
                self.setup.tick_budget
            );
        }
        Ok(on_time)
    }
}
