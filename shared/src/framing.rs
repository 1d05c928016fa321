//! Length-prefixed framing over a streaming transport.
//!
//! A frame is `[4-byte big-endian unsigned length][length payload bytes]`.
//! Reads loop until the declared length is fully consumed; a peer that
//! closes mid-frame yields [`FrameError::Incomplete`] rather than a short
//! payload.

use std::io;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Size of the length header in bytes.
pub const HEADER_LEN: usize = 4;

/// Maximum accepted payload size (1 MiB). Bounds allocation against
/// malformed or hostile length headers.
pub const MAX_FRAME_LEN: usize = 1024 * 1024;

#[derive(Debug, Error)]
pub enum FrameError {
    /// The header declared a length beyond [`MAX_FRAME_LEN`]. Rejected
    /// before any allocation happens.
    #[error("declared frame length {0} exceeds the {MAX_FRAME_LEN} byte maximum")]
    TooLarge(usize),
    /// The stream closed before the declared length was satisfied.
    #[error("stream closed before the full frame was read")]
    Incomplete,
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

/// Reads one frame and returns its payload.
///
/// Returns `Ok(None)` on a clean end-of-stream, i.e. the peer closed the
/// connection between frames. EOF anywhere past the first header byte is
/// [`FrameError::Incomplete`].
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Vec<u8>>, FrameError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_LEN];
    let mut filled = 0;
    while filled < HEADER_LEN {
        let n = reader.read(&mut header[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(FrameError::Incomplete);
        }
        filled += n;
    }

    let len = u32::from_be_bytes(header) as usize;
    if len > MAX_FRAME_LEN {
        return Err(FrameError::TooLarge(len));
    }

    let mut payload = vec![0u8; len];
    match reader.read_exact(&mut payload).await {
        Ok(_) => Ok(Some(payload)),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(FrameError::Incomplete),
        Err(e) => Err(e.into()),
    }
}

/// Writes one frame containing `payload`.
///
/// Header and payload go out in a single write so a reader never observes
/// a length prefix without the bytes that back it.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
{
    if payload.len() > MAX_FRAME_LEN {
        return Err(FrameError::TooLarge(payload.len()));
    }

    let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
    buf.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    buf.extend_from_slice(payload);
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}
