use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::debug;

use crate::error::ProducerError;

use super::Producer;
use super::frame::{Op, encode_frame, encode_produce, read_frame};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProducerSettings {
    /// Persistent connections to open; requests pick one round-robin.
    pub connections: usize,
    /// Bounds connecting, the startup handshake and each produce exchange.
    pub request_timeout: Duration,
}

#[derive(Debug)]
struct Connection {
    stream: Option<TcpStream>,
}

/// Producer over a fixed set of framed TCP connections to one broker.
///
/// Each connection carries one request at a time. A connection that fails
/// mid-exchange is dropped and reopened by the next request that picks it.
#[derive(Debug)]
pub struct TcpProducer {
    addr: String,
    connections: Vec<Mutex<Connection>>,
    next_connection: AtomicUsize,
    next_stream_id: AtomicU16,
    request_timeout: Duration,
}

impl TcpProducer {
    /// Opens every connection and performs the startup handshake on each.
    ///
    /// # Errors
    ///
    /// Returns the first connect or handshake failure; nothing is retried.
    pub async fn connect(addr: &str, settings: ProducerSettings) -> Result<Self, ProducerError> {
        if settings.connections == 0 {
            return Err(ProducerError::NoConnections);
        }
        let mut connections = Vec::with_capacity(settings.connections);
        for _ in 0..settings.connections {
            let stream = open(addr, settings.request_timeout).await?;
            connections.push(Mutex::new(Connection {
                stream: Some(stream),
            }));
        }
        debug!(
            "Producer connected to {} with {} connection(s)",
            addr,
            connections.len()
        );
        Ok(Self {
            addr: addr.to_owned(),
            connections,
            next_connection: AtomicUsize::new(0),
            next_stream_id: AtomicU16::new(0),
            request_timeout: settings.request_timeout,
        })
    }

    #[must_use]
    pub fn addr(&self) -> &str {
        &self.addr
    }

    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    fn pick(&self) -> Option<&Mutex<Connection>> {
        let index = self
            .next_connection
            .fetch_add(1, Ordering::Relaxed)
            .checked_rem(self.connections.len())?;
        self.connections.get(index)
    }
}

async fn open(addr: &str, connect_timeout: Duration) -> Result<TcpStream, ProducerError> {
    let mut stream = match timeout(connect_timeout, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(source)) => {
            return Err(ProducerError::Connect {
                addr: addr.to_owned(),
                source,
            });
        }
        Err(_) => {
            return Err(ProducerError::ConnectTimeout {
                addr: addr.to_owned(),
            });
        }
    };
    stream.set_nodelay(true)?;

    let startup = encode_frame(0, Op::Startup, &[])?;
    let handshake = async {
        stream.write_all(&startup).await?;
        read_frame(&mut stream).await
    };
    let (header, body) = match timeout(connect_timeout, handshake).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(ProducerError::ConnectTimeout {
                addr: addr.to_owned(),
            });
        }
    };
    match header.op {
        Op::Ready => Ok(stream),
        Op::Error => Err(ProducerError::Handshake {
            addr: addr.to_owned(),
            message: String::from_utf8_lossy(&body).into_owned(),
        }),
        Op::Startup | Op::Produce | Op::ProduceResponse => Err(ProducerError::UnexpectedOp {
            op: header.op.code(),
        }),
    }
}

impl Connection {
    async fn exchange(
        &mut self,
        addr: &str,
        connect_timeout: Duration,
        stream_id: u16,
        frame: &[u8],
    ) -> Result<(), ProducerError> {
        if self.stream.is_none() {
            debug!("Reopening producer connection to {}", addr);
            self.stream = Some(open(addr, connect_timeout).await?);
        }
        let Some(stream) = self.stream.as_mut() else {
            return Err(ProducerError::NoConnections);
        };

        stream.write_all(frame).await?;
        let (header, body) = read_frame(stream).await?;
        if header.stream_id != stream_id {
            return Err(ProducerError::StreamMismatch {
                expected: stream_id,
                actual: header.stream_id,
            });
        }
        match header.op {
            Op::ProduceResponse => Ok(()),
            Op::Error => Err(ProducerError::Broker {
                message: String::from_utf8_lossy(&body).into_owned(),
            }),
            Op::Startup | Op::Ready | Op::Produce => Err(ProducerError::UnexpectedOp {
                op: header.op.code(),
            }),
        }
    }
}

#[async_trait]
impl Producer for TcpProducer {
    async fn send(
        &self,
        topic: &str,
        body: Bytes,
        partition_key: &str,
    ) -> Result<(), ProducerError> {
        let stream_id = self
            .next_stream_id
            .fetch_add(1, Ordering::Relaxed)
            .wrapping_add(1);
        let frame = encode_produce(stream_id, topic, partition_key, &body)?;

        let slot = self.pick().ok_or(ProducerError::NoConnections)?;
        let mut connection = slot.lock().await;
        let exchange = connection.exchange(&self.addr, self.request_timeout, stream_id, &frame);
        let result = match timeout(self.request_timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(ProducerError::Timeout),
        };
        // Broker errors leave the stream at a frame boundary.
        if let Err(err) = &result
            && !matches!(err, ProducerError::Broker { .. })
        {
            debug!("Dropping producer connection to {}: {}", self.addr, err);
            connection.stream = None;
        }
        result
    }
}
