//! Length-prefixed frames spoken between the producer and the broker.
//!
//! Every frame starts with a 9 byte big endian header:
//! `version u8, flags u8, stream_id u16, op u8, body_len u32`.
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::ProducerError;

pub const FRAME_VERSION: u8 = 1;
pub const HEADER_LEN: usize = 9;
/// Largest body a frame may carry.
pub const MAX_BODY_LEN: usize = 64 * 1024 * 1024;
const MAX_SHORT_FIELD: usize = u8::MAX as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Startup,
    Ready,
    Produce,
    ProduceResponse,
    Error,
}

impl Op {
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Op::Startup => 1,
            Op::Ready => 2,
            Op::Produce => 3,
            Op::ProduceResponse => 4,
            Op::Error => 5,
        }
    }
}

impl TryFrom<u8> for Op {
    type Error = ProducerError;

    fn try_from(code: u8) -> Result<Self, ProducerError> {
        match code {
            1 => Ok(Op::Startup),
            2 => Ok(Op::Ready),
            3 => Ok(Op::Produce),
            4 => Ok(Op::ProduceResponse),
            5 => Ok(Op::Error),
            op => Err(ProducerError::UnexpectedOp { op }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub stream_id: u16,
    pub op: Op,
    pub body_len: u32,
}

impl FrameHeader {
    /// Parses a header.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown version or op code.
    pub fn decode(bytes: [u8; HEADER_LEN]) -> Result<Self, ProducerError> {
        let [version, _flags, s0, s1, op, l0, l1, l2, l3] = bytes;
        if version != FRAME_VERSION {
            return Err(ProducerError::UnsupportedVersion { version });
        }
        Ok(Self {
            stream_id: u16::from_be_bytes([s0, s1]),
            op: Op::try_from(op)?,
            body_len: u32::from_be_bytes([l0, l1, l2, l3]),
        })
    }

    fn encode_into(self, out: &mut Vec<u8>) {
        out.push(FRAME_VERSION);
        out.push(0);
        out.extend_from_slice(&self.stream_id.to_be_bytes());
        out.push(self.op.code());
        out.extend_from_slice(&self.body_len.to_be_bytes());
    }
}

fn body_len(len: usize) -> Result<u32, ProducerError> {
    if len > MAX_BODY_LEN {
        return Err(ProducerError::FrameTooLarge {
            len,
            max: MAX_BODY_LEN,
        });
    }
    u32::try_from(len).map_err(|_| ProducerError::FrameTooLarge {
        len,
        max: MAX_BODY_LEN,
    })
}

fn short_len(field: &'static str, value: &[u8]) -> Result<u8, ProducerError> {
    u8::try_from(value.len()).map_err(|_| ProducerError::FieldTooLong {
        field,
        len: value.len(),
        max: MAX_SHORT_FIELD,
    })
}

/// Encodes a frame with an arbitrary body.
///
/// # Errors
///
/// Returns `FrameTooLarge` when `body` exceeds [`MAX_BODY_LEN`].
pub fn encode_frame(stream_id: u16, op: Op, body: &[u8]) -> Result<Vec<u8>, ProducerError> {
    let header = FrameHeader {
        stream_id,
        op,
        body_len: body_len(body.len())?,
    };
    let mut out = Vec::with_capacity(HEADER_LEN.saturating_add(body.len()));
    header.encode_into(&mut out);
    out.extend_from_slice(body);
    Ok(out)
}

/// Encodes a produce request: `topic_len u8, topic, key_len u8, key, payload`.
///
/// # Errors
///
/// Returns an error when topic or key exceed 255 bytes or the frame is too large.
pub fn encode_produce(
    stream_id: u16,
    topic: &str,
    partition_key: &str,
    payload: &[u8],
) -> Result<Vec<u8>, ProducerError> {
    let topic_len = short_len("topic", topic.as_bytes())?;
    let key_len = short_len("partition key", partition_key.as_bytes())?;
    let len = 2_usize
        .saturating_add(topic.len())
        .saturating_add(partition_key.len())
        .saturating_add(payload.len());
    let header = FrameHeader {
        stream_id,
        op: Op::Produce,
        body_len: body_len(len)?,
    };
    let mut out = Vec::with_capacity(HEADER_LEN.saturating_add(len));
    header.encode_into(&mut out);
    out.push(topic_len);
    out.extend_from_slice(topic.as_bytes());
    out.push(key_len);
    out.extend_from_slice(partition_key.as_bytes());
    out.extend_from_slice(payload);
    Ok(out)
}

/// Splits a produce body into topic, key and payload.
///
/// # Errors
///
/// Returns `TruncatedField` when a declared length overruns the body.
pub fn decode_produce(body: &[u8]) -> Result<(&[u8], &[u8], &[u8]), ProducerError> {
    let (topic, rest) = split_short_field("topic", body)?;
    let (key, payload) = split_short_field("partition key", rest)?;
    Ok((topic, key, payload))
}

fn split_short_field<'body>(
    field: &'static str,
    body: &'body [u8],
) -> Result<(&'body [u8], &'body [u8]), ProducerError> {
    let (len, rest) = body
        .split_first()
        .ok_or(ProducerError::TruncatedField { field })?;
    let len = usize::from(*len);
    if rest.len() < len {
        return Err(ProducerError::TruncatedField { field });
    }
    Ok(rest.split_at(len))
}

/// Reads one frame.
///
/// # Errors
///
/// Returns an error on I/O failure, a malformed header or an oversized body.
pub async fn read_frame<R>(reader: &mut R) -> Result<(FrameHeader, Vec<u8>), ProducerError>
where
    R: AsyncRead + Unpin,
{
    let mut raw = [0_u8; HEADER_LEN];
    reader.read_exact(&mut raw).await?;
    let header = FrameHeader::decode(raw)?;
    let len = usize::try_from(header.body_len).unwrap_or(usize::MAX);
    if len > MAX_BODY_LEN {
        return Err(ProducerError::FrameTooLarge {
            len,
            max: MAX_BODY_LEN,
        });
    }
    let mut body = vec![0_u8; len];
    reader.read_exact(&mut body).await?;
    Ok((header, body))
}
