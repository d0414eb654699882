//! Simulator connection and handshake.
//!
//! A [`Connection`] owns the duplex byte stream to the simulator and walks
//! `Disconnected → Handshaking → Connected → Closed`. Every fatal failure,
//! during the handshake or afterwards, shuts the stream down before the
//! error is returned, so a failed connection never leaks an open socket.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, error, info, warn};

use crate::codec::{self, DEFAULT_MAX_FRAME_LEN};
use crate::{BridgeError, Result};


/// Size of the handshake token the simulator sends after accepting.
pub const HANDSHAKE_LEN: usize = 8;
/// Token meaning the simulator accepted this client.
pub const WELCOME: &[u8; HANDSHAKE_LEN] = b"Welcome\0";
/// Token meaning the simulator rejected this client.
pub const REFUSED: &[u8; HANDSHAKE_LEN] = b"Refused\0";

/// Lifecycle of a simulator connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Handshaking,
    Connected,
    Closed,
}

/// Connection to the simulator over any async byte stream.
pub struct Connection<S = TcpStream> {
    stream: Option<S>,
    address: String,
    state: ConnectionState,
    max_frame_len: usize,
}

impl Connection<TcpStream> {
    /// Open a TCP stream to `address` (`host:port`) and perform the handshake.
    pub async fn connect(address: &str) -> Result<Self> {
        let connection = Self::new(address);
        info!("Connecting to '{}'", address);
        let stream = TcpStream::connect(address).await.map_err(|e| {
            BridgeError::connection_failed_with_source(format!("cannot reach '{}'", address), e)
        })?;
        if let Err(e) = stream.set_nodelay(true) {
            warn!("Could not disable Nagle on simulator socket: {}", e);
        }
        connection.open(stream).await
    }
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// A connection to `address` with no stream attached yet.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            stream: None,
            address: address.into(),
            state: ConnectionState::Disconnected,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }

    /// Perform the handshake on an already open stream.
    pub async fn handshake(stream: S, address: impl Into<String>) -> Result<Self> {
        Self::new(address).open(stream).await
    }

    /// Attach `stream` and run the handshake on it.
    pub async fn open(mut self, stream: S) -> Result<Self> {
        self.stream = Some(stream);
        self.state = ConnectionState::Handshaking;

        let response = match self.read_handshake().await {
            Ok(response) => response,
            Err(e) => return Err(self.fail(e).await),
        };

        if response.as_slice() == WELCOME {
            self.state = ConnectionState::Connected;
            info!("Successfully connected to '{}'", self.address);
            Ok(self)
        } else if response.as_slice() == REFUSED {
            let address = self.address.clone();
            Err(self.fail(BridgeError::ConnectionRefused { address }).await)
        } else {
            let err = BridgeError::ConnectionProtocol {
                address: self.address.clone(),
                response: String::from_utf8_lossy(&response).into_owned(),
            };
            Err(self.fail(err).await)
        }
    }

    /// Up to [`HANDSHAKE_LEN`] bytes; fewer only if the peer closed early.
    async fn read_handshake(&mut self) -> Result<Vec<u8>> {
        let stream = self.stream_mut()?;
        let mut response = Vec::with_capacity(HANDSHAKE_LEN);
        stream.take(HANDSHAKE_LEN as u64).read_to_end(&mut response).await.map_err(|e| {
            BridgeError::connection_failed_with_source("failed to read handshake", e)
        })?;
        debug!("Handshake response: {:?}", String::from_utf8_lossy(&response));
        Ok(response)
    }

    /// Cap the size of inbound frames.
    pub fn with_max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Read one frame payload. Any failure closes the connection.
    pub async fn read_frame(&mut self) -> Result<Vec<u8>> {
        let max_frame_len = self.max_frame_len;
        let result = match self.stream_mut() {
            Ok(stream) => codec::read_frame_with_limit(stream, max_frame_len).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(payload) => Ok(payload),
            Err(e) => Err(self.fail(e).await),
        }
    }

    /// Write one frame payload. Any failure closes the connection.
    pub async fn write_frame(&mut self, payload: &[u8]) -> Result<()> {
        let result = match self.stream_mut() {
            Ok(stream) => codec::write_frame(stream, payload).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => Ok(()),
            Err(e) => Err(self.fail(e).await),
        }
    }

    /// Shut the stream down. Idempotent.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                debug!("Stream shutdown reported: {}", e);
            }
            info!("Connection to '{}' closed", self.address);
        }
        self.state = ConnectionState::Closed;
    }

    fn stream_mut(&mut self) -> Result<&mut S> {
        match (self.state, self.stream.as_mut()) {
            (ConnectionState::Handshaking | ConnectionState::Connected, Some(stream)) => Ok(stream),
            (state, _) => Err(BridgeError::connection_failed(format!(
                "connection to '{}' is {:?}",
                self.address, state
            ))),
        }
    }

    async fn fail(&mut self, err: BridgeError) -> BridgeError {
        error!("{}", err);
        self.close().await;
        err
    }
}
