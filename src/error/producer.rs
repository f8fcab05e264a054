use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProducerError {
    #[error("Failed to connect to broker {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Timed out connecting to broker {addr}.")]
    ConnectTimeout { addr: String },
    #[error("Broker {addr} rejected startup: {message}")]
    Handshake { addr: String, message: String },
    #[error("Producer needs at least one connection.")]
    NoConnections,
    #[error("Broker I/O failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("Produce request timed out.")]
    Timeout,
    #[error("{message}")]
    Broker { message: String },
    #[error("Unexpected response op {op} from broker.")]
    UnexpectedOp { op: u8 },
    #[error("Response stream id {actual} does not match request {expected}.")]
    StreamMismatch { expected: u16, actual: u16 },
    #[error("Unsupported frame version {version}.")]
    UnsupportedVersion { version: u8 },
    #[error("{field} is {len} bytes; the frame limit is {max}.")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
    #[error("Frame ended inside the {field} field.")]
    TruncatedField { field: &'static str },
    #[error("Frame body of {len} bytes exceeds the {max} byte limit.")]
    FrameTooLarge { len: usize, max: usize },
}
