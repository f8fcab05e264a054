//! Binary producer collaborator used by the `binary` workload.
mod frame;
mod tcp;


use async_trait::async_trait;
use bytes::Bytes;

use crate::error::ProducerError;

pub use frame::{
    FRAME_VERSION, FrameHeader, HEADER_LEN, MAX_BODY_LEN, Op, decode_produce, encode_frame,
    encode_produce, read_frame,
};
pub use tcp::{ProducerSettings, TcpProducer};

/// Publishes one payload to a topic.
///
/// Implementations are shared by every request task of a logical client,
/// so `send` takes `&self` and must be safe to call concurrently.
#[async_trait]
pub trait Producer: Send + Sync {
    async fn send(&self, topic: &str, body: Bytes, partition_key: &str)
    -> Result<(), ProducerError>;
}
