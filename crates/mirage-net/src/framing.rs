//! Length-prefixed packet framing for byte streams.
//!
//! Every packet on the wire is one frame:
//!
//! ```text
//! +-------------------+-------------+------------------------+
//! | length (4 bytes)  | kind (u8)   |  versioned envelope    |
//! | u32 little-endian | wire id     |  (length - 1 bytes)    |
//! +-------------------+-------------+------------------------+
//! ```
//!
//! The length does **not** include the 4 prefix bytes themselves.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::packet::{Packet, PacketKind};

/// Configuration for the framing layer.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum allowed frame body size in bytes. Default: 1 MB.
    pub max_payload_size: u32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: 1_048_576,
        }
    }
}

/// Errors that can occur during framing operations.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The frame size exceeds the configured maximum.
    #[error("payload size {size} exceeds maximum {max}")]
    PayloadTooLarge {
        /// The actual frame size.
        size: u32,
        /// The configured maximum.
        max: u32,
    },

    /// The frame was too short to contain a packet kind.
    #[error("empty frame")]
    EmptyFrame,

    /// The frame named a packet kind this build does not know.
    #[error("unknown packet kind {0}")]
    UnknownKind(u8),

    /// The connection was closed before a complete frame was received.
    #[error("connection closed")]
    ConnectionClosed,

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Write a single packet as one frame.
pub async fn write_packet<W: AsyncWriteExt + Unpin>(
    writer: &mut W,
    packet: &Packet,
    config: &FrameConfig,
) -> Result<(), FrameError> {
    let len = u32::try_from(packet.payload.len() + 1).unwrap_or(u32::MAX);
    if len > config.max_payload_size {
        return Err(FrameError::PayloadTooLarge {
            size: len,
            max: config.max_payload_size,
        });
    }

    writer.write_all(&len.to_le_bytes()).await?;
    writer.write_all(&[packet.kind.wire_id()]).await?;
    writer.write_all(&packet.payload).await?;
    writer.flush().await?;

    Ok(())
}

/// Read a single frame and decode its packet kind.
///
/// Returns [`FrameError::ConnectionClosed`] if the peer closes the connection
/// before the frame is complete.
pub async fn read_packet<R: AsyncReadExt + Unpin>(
    reader: &mut R,
    config: &FrameConfig,
) -> Result<Packet, FrameError> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await.map_err(closed_or_io)?;

    let frame_len = u32::from_le_bytes(len_buf);
    if frame_len > config.max_payload_size {
        return Err(FrameError::PayloadTooLarge {
            size: frame_len,
            max: config.max_payload_size,
        });
    }
    if frame_len == 0 {
        return Err(FrameError::EmptyFrame);
    }

    let mut body = vec![0u8; frame_len as usize];
    reader.read_exact(&mut body).await.map_err(closed_or_io)?;

    let kind = PacketKind::from_wire_id(body[0]).ok_or(FrameError::UnknownKind(body[0]))?;
    body.remove(0);
    Ok(Packet {
        kind,
        payload: body,
    })
}

fn closed_or_io(e: std::io::Error) -> FrameError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        FrameError::ConnectionClosed
    } else {
        FrameError::Io(e)
    }
}

/// Drain a client's outgoing queue into `writer` until every
/// [`crate::sink::QueueSink`] for it is dropped.
///
/// Oversized packets are logged and skipped; I/O errors end the task.
/// Returns the number of packets written.
pub async fn run_writer<W: AsyncWriteExt + Unpin>(
    mut rx: mpsc::UnboundedReceiver<Packet>,
    mut writer: W,
    config: FrameConfig,
) -> Result<usize, FrameError> {
    let mut written = 0;
    while let Some(packet) = rx.recv().await {
        match write_packet(&mut writer, &packet, &config).await {
            Ok(()) => written += 1,
            Err(FrameError::PayloadTooLarge { size, max }) => {
                tracing::warn!(kind = ?packet.kind, size, max, "dropping oversized packet");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(written)
}
