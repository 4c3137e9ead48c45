//! Length-prefixed JSON framing for the local intent listener
//!
//! ```text
//! [ u32 body length, big-endian ][ JSON body ]
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Largest accepted body (64 KiB); intents are small
pub const MAX_MESSAGE_SIZE: u32 = 64 * 1024;

const PREFIX_LEN: usize = 4;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("frame body of {0} bytes exceeds {MAX_MESSAGE_SIZE}")]
    MessageTooLarge(usize),

    #[error("frame announces {0} bytes, more than {MAX_MESSAGE_SIZE}")]
    InvalidLength(u32),

    #[error("malformed JSON body: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialize a message and prepend its length
pub fn encode<T: Serialize>(message: &T) -> Result<Bytes, CodecError> {
    let body = serde_json::to_vec(message)?;
    let len = u32::try_from(body.len())
        .ok()
        .filter(|len| *len <= MAX_MESSAGE_SIZE)
        .ok_or(CodecError::MessageTooLarge(body.len()))?;

    let mut frame = BytesMut::with_capacity(PREFIX_LEN + body.len());
    frame.put_u32(len);
    frame.extend_from_slice(&body);
    Ok(frame.freeze())
}

/// Take one complete frame off the front of `buf`.
///
/// `Ok(None)` leaves `buf` untouched until more bytes arrive.
pub fn decode<T: DeserializeOwned>(buf: &mut BytesMut) -> Result<Option<T>, CodecError> {
    let Some(mut prefix) = buf.get(..PREFIX_LEN) else {
        return Ok(None);
    };
    let body_len = prefix.get_u32();
    if body_len > MAX_MESSAGE_SIZE {
        return Err(CodecError::InvalidLength(body_len));
    }

    let body_len = body_len as usize;
    if buf.len() < PREFIX_LEN + body_len {
        return Ok(None);
    }

    buf.advance(PREFIX_LEN);
    let body = buf.split_to(body_len);
    Ok(Some(serde_json::from_slice(&body)?))
}

/// Accumulates socket reads until whole frames are available
#[derive(Debug, Default)]
pub struct FrameDecoder {
    pending: BytesMut,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            pending: BytesMut::with_capacity(4096),
        }
    }

    pub fn extend(&mut self, data: &[u8]) {
        self.pending.extend_from_slice(data);
    }

    /// Next complete message, if any; call until `Ok(None)` to drain
    pub fn decode_next<T: DeserializeOwned>(&mut self) -> Result<Option<T>, CodecError> {
        decode(&mut self.pending)
    }

    /// Bytes received but not yet decoded
    pub fn buffer_len(&self) -> usize {
        self.pending.len()
    }
}
