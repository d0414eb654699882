//! Length-prefixed frame codec.
//!
//! Every frame on the simulator socket, in both directions, is a 4-byte
//! big-endian payload length followed by exactly that many payload bytes.
//! There is no checksum and no compression. The codec keeps no state between
//! calls and never hands out a partial payload: a stream that ends early is a
//! connection error.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;

use crate::{BridgeError, Result};

/// Size of the big-endian length prefix in bytes
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Largest inbound payload accepted by [`read_frame`] (16 MiB).
///
/// A camera image at full resolution stays well below this; anything larger
/// means the stream lost framing.
pub const DEFAULT_MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// Read one frame, rejecting payloads above [`DEFAULT_MAX_FRAME_LEN`].
pub async fn read_frame<R>(reader: &mut R) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    read_frame_with_limit(reader, DEFAULT_MAX_FRAME_LEN).await
}

/// Read one frame, rejecting payloads above `max_len` bytes.
pub async fn read_frame_with_limit<R>(reader: &mut R, max_len: usize) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    reader.read_exact(&mut prefix).await.map_err(|e| {
        BridgeError::connection_failed_with_source("stream closed before frame length arrived", e)
    })?;

    let len = u32::from_be_bytes(prefix) as usize;
    if len > max_len {
        return Err(BridgeError::connection_failed(format!(
            "frame length {} exceeds limit of {} bytes",
            len, max_len
        )));
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await.map_err(|e| {
        BridgeError::connection_failed_with_source(
            format!("stream closed inside a {} byte frame", len),
            e,
        )
    })?;

    trace!("Read frame ({} bytes)", len);
    Ok(payload)
}

/// Write one frame as a single buffer and flush it.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let len = u32::try_from(payload.len()).map_err(|_| {
        BridgeError::connection_failed(format!(
            "payload of {} bytes does not fit a frame",
            payload.len()
        ))
    })?;

    let mut frame = Vec::with_capacity(LENGTH_PREFIX_SIZE + payload.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(payload);

    writer
        .write_all(&frame)
        .await
        .map_err(|e| BridgeError::connection_failed_with_source("failed to write frame", e))?;
    writer
        .flush()
        .await
        .map_err(|e| BridgeError::connection_failed_with_source("failed to flush frame", e))?;

    trace!("Wrote frame ({} bytes)", payload.len());
    Ok(())
}
